mod tmx;

pub use tmx::{load_tmx_map, parse_tmx_map, MapLoadError, SourceLocation};
