use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};
use thiserror::Error;
use tracing::warn;

use crate::app::{Tilemap, TilemapError, Tileset};

/// Tiled stores horizontal, vertical and diagonal flip flags in the top GID bits.
const GID_FLIP_FLAGS: u32 = 0x8000_0000 | 0x4000_0000 | 0x2000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("failed to read map file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML at {location}: {message}")]
    XmlMalformed {
        message: String,
        location: SourceLocation,
    },
    #[error("root element must be <map>, found <{found}>")]
    InvalidRoot { found: String },
    #[error("map has no <{element}> element")]
    MissingElement { element: &'static str },
    #[error("<{element}> attribute `{attribute}` is missing or invalid at {location}")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        location: SourceLocation,
    },
    #[error("unsupported layer data encoding `{encoding}` at {location}; expected csv")]
    UnsupportedEncoding {
        encoding: String,
        location: SourceLocation,
    },
    #[error("invalid tile gid `{value}` at data index {index}")]
    InvalidTileData { index: usize, value: String },
    #[error(transparent)]
    Tilemap(#[from] TilemapError),
}

pub fn load_tmx_map(path: &Path) -> Result<Tilemap, MapLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| MapLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tmx_map(&raw)
}

/// Parses an orthogonal Tiled map. Only the first tile layer is read; its rows are
/// stored bottom row first so cell (0,0) sits at the world origin.
pub fn parse_tmx_map(raw: &str) -> Result<Tilemap, MapLoadError> {
    let doc = Document::parse(raw).map_err(|error| MapLoadError::XmlMalformed {
        message: error.to_string(),
        location: SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        },
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "map" {
        return Err(MapLoadError::InvalidRoot {
            found: root.tag_name().name().to_string(),
        });
    }

    let width = required_u32(&doc, root, "map", "width")?;
    let height = required_u32(&doc, root, "map", "height")?;
    let tile_width = required_u32(&doc, root, "map", "tilewidth")?;
    let tile_height = required_u32(&doc, root, "map", "tileheight")?;

    let layer = first_child(root, "layer").ok_or(MapLoadError::MissingElement {
        element: "layer",
    })?;
    let data = first_child(layer, "data").ok_or(MapLoadError::MissingElement { element: "data" })?;
    let top_down = parse_layer_data(&doc, data)?;

    let row_len = width as usize;
    let mut tiles = Vec::with_capacity(top_down.len());
    if row_len > 0 {
        for row in top_down.chunks(row_len).rev() {
            tiles.extend_from_slice(row);
        }
    }

    let tilemap = Tilemap::new(width, height, tile_width, tile_height, tiles)?;
    match first_child(root, "tileset") {
        Some(node) => Ok(match parse_tileset(&doc, node)? {
            Some(tileset) => tilemap.with_tileset(tileset),
            None => tilemap,
        }),
        None => Ok(tilemap),
    }
}

fn parse_tileset(doc: &Document<'_>, node: Node<'_, '_>) -> Result<Option<Tileset>, MapLoadError> {
    if let Some(source) = node.attribute("source") {
        warn!(source, "tmx_external_tileset_unsupported_using_fallback_colors");
        return Ok(None);
    }

    let first_gid = required_u32(doc, node, "tileset", "firstgid")?;
    let tile_width = required_u32(doc, node, "tileset", "tilewidth")?;
    let tile_height = required_u32(doc, node, "tileset", "tileheight")?;
    let Some(image) = first_child(node, "image") else {
        warn!(first_gid, "tmx_tileset_without_image_using_fallback_colors");
        return Ok(None);
    };
    let texture_key = image
        .attribute("source")
        .and_then(|source| Path::new(source).file_name())
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| invalid_attribute(doc, image, "image", "source"))?;

    let columns = match node.attribute("columns") {
        Some(_) => required_u32(doc, node, "tileset", "columns")?,
        None => {
            let image_width = required_u32(doc, image, "image", "width")?;
            image_width / tile_width.max(1)
        }
    };

    Ok(Some(Tileset {
        first_gid,
        texture_key,
        tile_width,
        tile_height,
        columns,
    }))
}

fn parse_layer_data(doc: &Document<'_>, data: Node<'_, '_>) -> Result<Vec<u32>, MapLoadError> {
    if let Some(compression) = data.attribute("compression") {
        return Err(MapLoadError::UnsupportedEncoding {
            encoding: compression.to_string(),
            location: location_of(doc, data),
        });
    }

    match data.attribute("encoding") {
        Some("csv") => data
            .text()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .enumerate()
            .map(|(index, value)| parse_gid(index, value))
            .collect(),
        Some(other) => Err(MapLoadError::UnsupportedEncoding {
            encoding: other.to_string(),
            location: location_of(doc, data),
        }),
        None => data
            .children()
            .filter(|child| child.has_tag_name("tile"))
            .enumerate()
            .map(|(index, tile)| parse_gid(index, tile.attribute("gid").unwrap_or("0")))
            .collect(),
    }
}

fn parse_gid(index: usize, value: &str) -> Result<u32, MapLoadError> {
    value
        .parse::<u32>()
        .map(|gid| gid & !GID_FLIP_FLAGS)
        .map_err(|_| MapLoadError::InvalidTileData {
            index,
            value: value.to_string(),
        })
}

fn first_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| child.has_tag_name(tag))
}

fn required_u32(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> Result<u32, MapLoadError> {
    node.attribute(attribute)
        .and_then(|value| value.trim().parse::<u32>().ok())
        .ok_or_else(|| invalid_attribute(doc, node, element, attribute))
}

fn invalid_attribute(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    element: &'static str,
    attribute: &'static str,
) -> MapLoadError {
    MapLoadError::InvalidAttribute {
        element,
        attribute,
        location: location_of(doc, node),
    }
}

fn location_of(doc: &Document<'_>, node: Node<'_, '_>) -> SourceLocation {
    let pos = doc.text_pos_at(node.range().start);
    SourceLocation {
        line: pos.row as usize,
        column: pos.col as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::TileId;

    const SMALL_MAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="3" height="2" tilewidth="16" tileheight="16">
 <tileset firstgid="1" name="tiles" tilewidth="16" tileheight="16" tilecount="8" columns="4">
  <image source="../textures/tiles.png" width="64" height="32"/>
 </tileset>
 <layer id="1" name="ground" width="3" height="2">
  <data encoding="csv">
0,0,4,
1,2,3
</data>
 </layer>
</map>
"#;

    #[test]
    fn csv_rows_are_stored_bottom_row_first() {
        let map = parse_tmx_map(SMALL_MAP).expect("parse");

        assert_eq!((map.width(), map.height()), (3, 2));
        assert_eq!((map.tile_width(), map.tile_height()), (16, 16));
        assert_eq!(map.tile_at(0, 0), Some(TileId(1)));
        assert_eq!(map.tile_at(2, 0), Some(TileId(3)));
        assert_eq!(map.tile_at(0, 1), None);
        assert_eq!(map.tile_at(2, 1), Some(TileId(4)));
    }

    #[test]
    fn tileset_image_becomes_texture_file_name() {
        let map = parse_tmx_map(SMALL_MAP).expect("parse");
        let tileset = map.tileset().expect("tileset");

        assert_eq!(tileset.first_gid, 1);
        assert_eq!(tileset.texture_key, "tiles.png");
        assert_eq!(tileset.columns, 4);
    }

    #[test]
    fn flip_flags_are_masked_off_gids() {
        let raw = SMALL_MAP.replace("1,2,3", &format!("{},2,3", 0x8000_0000u32 | 2));
        let map = parse_tmx_map(&raw).expect("parse");

        assert_eq!(map.tile_at(0, 0), Some(TileId(2)));
    }

    #[test]
    fn xml_tile_elements_are_accepted_without_encoding() {
        let raw = r#"<map width="2" height="1" tilewidth="16" tileheight="16">
 <layer name="ground" width="2" height="1">
  <data><tile gid="5"/><tile/></data>
 </layer>
</map>"#;
        let map = parse_tmx_map(raw).expect("parse");

        assert_eq!(map.tile_at(0, 0), Some(TileId(5)));
        assert_eq!(map.tile_at(1, 0), None);
        assert!(map.tileset().is_none());
    }

    #[test]
    fn missing_layer_errors() {
        let raw = r#"<map width="1" height="1" tilewidth="16" tileheight="16"></map>"#;
        let error = parse_tmx_map(raw).expect_err("should fail");

        assert!(matches!(
            error,
            MapLoadError::MissingElement { element: "layer" }
        ));
    }

    #[test]
    fn missing_map_attribute_reports_location() {
        let raw = "<map width=\"1\" tilewidth=\"16\" tileheight=\"16\"/>";
        let error = parse_tmx_map(raw).expect_err("should fail");

        match error {
            MapLoadError::InvalidAttribute {
                element,
                attribute,
                location,
            } => {
                assert_eq!(element, "map");
                assert_eq!(attribute, "height");
                assert_eq!(location.line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn base64_encoding_is_rejected() {
        let raw = SMALL_MAP.replace("encoding=\"csv\"", "encoding=\"base64\"");
        let error = parse_tmx_map(&raw).expect_err("should fail");

        assert!(matches!(
            error,
            MapLoadError::UnsupportedEncoding { ref encoding, .. } if encoding == "base64"
        ));
    }

    #[test]
    fn non_numeric_gid_errors() {
        let raw = SMALL_MAP.replace("1,2,3", "1,x,3");
        let error = parse_tmx_map(&raw).expect_err("should fail");

        assert!(matches!(
            error,
            MapLoadError::InvalidTileData { index: 4, ref value } if value == "x"
        ));
    }

    #[test]
    fn tile_count_mismatch_errors() {
        let raw = SMALL_MAP.replace("1,2,3", "1,2");
        let error = parse_tmx_map(&raw).expect_err("should fail");

        assert!(matches!(
            error,
            MapLoadError::Tilemap(TilemapError::TileCountMismatch {
                expected: 6,
                actual: 5
            })
        ));
    }

    #[test]
    fn malformed_xml_reports_location() {
        let error = parse_tmx_map("<map width=\"1\"").expect_err("should fail");
        assert!(matches!(error, MapLoadError::XmlMalformed { .. }));
    }

    #[test]
    fn wrong_root_errors() {
        let error = parse_tmx_map("<tileset/>").expect_err("should fail");
        assert!(matches!(error, MapLoadError::InvalidRoot { ref found } if found == "tileset"));
    }

    #[test]
    fn load_reads_map_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("level.tmx");
        fs::write(&path, SMALL_MAP).expect("write map");

        let map = load_tmx_map(&path).expect("load");
        assert_eq!(map.tile_at(1, 0), Some(TileId(2)));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.tmx");

        match load_tmx_map(&path).expect_err("should fail") {
            MapLoadError::Read { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }
}
