#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in world units. `(x, y)` is the bottom-left corner; the
/// world is y-up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap test: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.top()
            && self.top() > other.y
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        Some(Rect {
            x,
            y,
            width: self.right().min(other.right()) - x,
            height: self.top().min(other.top()) - y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_partial_overlap() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let b = Rect::new(10.0, 12.0, 16.0, 16.0);

        let inter = a.intersection(&b).expect("overlap");
        assert_eq!(inter, Rect::new(10.0, 12.0, 6.0, 4.0));
        assert_eq!(b.intersection(&a), Some(inter));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 16.0, 16.0);
        let right = Rect::new(16.0, 0.0, 16.0, 16.0);
        let above = Rect::new(0.0, 16.0, 16.0, 16.0);

        assert!(!a.overlaps(&right));
        assert_eq!(a.intersection(&right), None);
        assert_eq!(a.intersection(&above), None);
    }

    #[test]
    fn contained_rect_intersects_as_itself() {
        let outer = Rect::new(0.0, 0.0, 32.0, 32.0);
        let inner = Rect::new(4.0, 4.0, 8.0, 8.0);
        assert_eq!(outer.intersection(&inner), Some(inner));
    }

    #[test]
    fn set_position_keeps_size() {
        let mut rect = Rect::new(0.0, 0.0, 16.0, 16.0);
        rect.set_position(5.0, -3.0);
        assert_eq!(rect, Rect::new(5.0, -3.0, 16.0, 16.0));
    }
}
