/// An axis-aligned rectangle in pixel space, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub pos: (u32, u32),
    pub size: (u32, u32),
}

impl Rect {
    #[inline]
    pub fn new(pos: (u32, u32), size: (u32, u32)) -> Self {
        Self { pos, size }
    }

    /// A rectangle of the given size anchored at the origin.
    #[inline]
    pub fn from_size(size: (u32, u32)) -> Self {
        Self { pos: (0, 0), size }
    }

    #[inline]
    pub fn min(&self) -> (u32, u32) {
        self.pos
    }

    #[inline]
    pub fn max(&self) -> (u32, u32) {
        (self.pos.0 + self.size.0, self.pos.1 + self.size.1)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.size.0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.size.1
    }

    #[inline]
    pub fn area(&self) -> u64 {
        area_of(self.size)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.0 == 0 || self.size.1 == 0
    }

    /// Whether the two rectangles share any area. Rectangles that only touch
    /// along an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());

        a_min.0 < b_max.0 && b_min.0 < a_max.0 && a_min.1 < b_max.1 && b_min.1 < a_max.1
    }

    /// Whether `other` lies entirely within this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());

        a_min.0 <= b_min.0 && a_min.1 <= b_min.1 && b_max.0 <= a_max.0 && b_max.1 <= a_max.1
    }
}

#[inline]
pub(crate) fn area_of(size: (u32, u32)) -> u64 {
    u64::from(size.0) * u64::from(size.1)
}

#[inline]
pub(crate) fn swapped(size: (u32, u32)) -> (u32, u32) {
    (size.1, size.0)
}
