use std::fmt;

use crate::{geometry::Rect, id::Id};

/// Opaque identity of an item's content, such as a hash of its pixels. Items
/// with equal hashes and matching sizes are treated as duplicates.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for ContentHash {
    fn from(bytes: [u8; 32]) -> Self {
        ContentHash(bytes)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash(")?;
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        write!(f, "..)")
    }
}

/// An input to a [`PackingSession`](crate::PackingSession).
///
/// `InputItem` is a 2D size, the part of it that holds visible content, an
/// optional content hash and a generated unique identifier. Consumers map the
/// ID back to their own objects once packing is done.
#[derive(Debug, Clone, Copy)]
pub struct InputItem {
    pub(crate) id: Id,
    pub(crate) size: (u32, u32),
    pub(crate) crop: Rect,
    pub(crate) hash: Option<ContentHash>,
}

impl InputItem {
    #[inline]
    pub fn new(size: (u32, u32)) -> Self {
        Self {
            id: Id::new(),
            size,
            crop: Rect::from_size(size),
            hash: None,
        }
    }

    /// Sets the region of the item that actually holds content. Clamped to
    /// the item's bounds.
    pub fn with_crop(mut self, crop: Rect) -> Self {
        let pos = (crop.pos.0.min(self.size.0), crop.pos.1.min(self.size.1));
        let size = (
            crop.size.0.min(self.size.0 - pos.0),
            crop.size.1.min(self.size.1 - pos.1),
        );

        self.crop = Rect::new(pos, size);
        self
    }

    pub fn with_content_hash<H: Into<ContentHash>>(mut self, hash: H) -> Self {
        self.hash = Some(hash.into());
        self
    }

    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    pub fn crop(&self) -> Rect {
        self.crop
    }

    #[inline]
    pub fn content_hash(&self) -> Option<ContentHash> {
        self.hash
    }
}

/// Space reserved around an item's content inside its packed rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Padding {
    #[inline]
    pub fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    #[inline]
    pub fn vertical(&self) -> u32 {
        self.top + self.bottom
    }

    /// Each side capped at `max`.
    pub fn limited(&self, max: u32) -> Self {
        Self {
            left: self.left.min(max),
            top: self.top.min(max),
            right: self.right.min(max),
            bottom: self.bottom.min(max),
        }
    }

    /// The same padding after its item is turned 90 degrees
    /// counter-clockwise.
    pub fn rotated(&self) -> Self {
        Self {
            left: self.top,
            top: self.right,
            right: self.bottom,
            bottom: self.left,
        }
    }
}

/// Where an item was put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Placement {
    pub bin: usize,
    pub position: (u32, u32),

    /// The item is stored turned 90 degrees counter-clockwise.
    pub rotated: bool,
}

/// An item as it came out of a packing run.
///
/// `OutputItem` corresponds 1:1 to the `InputItem` values that were added to
/// the session. Duplicates share the placement of the item they duplicate.
#[derive(Debug, Clone, Copy)]
pub struct OutputItem {
    pub(crate) id: Id,
    pub(crate) size: (u32, u32),
    pub(crate) padding: Padding,
    pub(crate) rotated: bool,
    pub(crate) placement: Option<Placement>,
    pub(crate) duplicate_of: Option<Id>,
}

impl OutputItem {
    #[inline]
    pub fn id(&self) -> Id {
        self.id
    }

    /// The packed size, padding included, in the orientation it was packed
    /// in.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    #[inline]
    pub fn padding(&self) -> Padding {
        self.padding
    }

    #[inline]
    pub fn rotated(&self) -> bool {
        self.rotated
    }

    /// `None` if the item could not be placed.
    #[inline]
    pub fn placement(&self) -> Option<Placement> {
        self.placement
    }

    #[inline]
    pub fn duplicate_of(&self) -> Option<Id> {
        self.duplicate_of
    }

    /// The rectangle occupied by the item in its bin, padding included.
    pub fn rect(&self) -> Option<Rect> {
        self.placement
            .map(|placement| Rect::new(placement.position, self.size))
    }

    /// The part of [`rect`](Self::rect) that receives the item's content.
    pub fn content_rect(&self) -> Option<Rect> {
        self.rect().map(|rect| {
            Rect::new(
                (rect.pos.0 + self.padding.left, rect.pos.1 + self.padding.top),
                (
                    rect.size.0 - self.padding.horizontal(),
                    rect.size.1 - self.padding.vertical(),
                ),
            )
        })
    }
}

/// A canvas that items were packed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    pub(crate) index: usize,
    pub(crate) size: (u32, u32),
}

impl Bin {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

/// How a packing run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackStatus {
    /// Every item has a placement.
    Done,

    /// Some items did not fit anywhere and have no placement.
    Incomplete { missing: usize },
}

/// The results from running a packing session.
#[derive(Debug, Clone)]
pub struct PackOutput {
    pub(crate) bins: Vec<Bin>,
    pub(crate) items: Vec<OutputItem>,
    pub(crate) missing: usize,
    pub(crate) merged: usize,
    pub(crate) needed_area: u64,
    pub(crate) placed_area: u64,
}

impl PackOutput {
    #[inline]
    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    /// Every item added to the session, in the order it was added.
    #[inline]
    pub fn items(&self) -> &[OutputItem] {
        &self.items
    }

    pub fn item(&self, id: Id) -> Option<&OutputItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of items that could not be placed.
    #[inline]
    pub fn missing(&self) -> usize {
        self.missing
    }

    /// Number of duplicates that took over another item's placement.
    #[inline]
    pub fn merged(&self) -> usize {
        self.merged
    }

    /// Total padded area of the items that needed their own space.
    #[inline]
    pub fn needed_area(&self) -> u64 {
        self.needed_area
    }

    #[inline]
    pub fn placed_area(&self) -> u64 {
        self.placed_area
    }

    /// Placed area divided by the total area of all bins.
    pub fn fill_rate(&self) -> f64 {
        fill_rate(self.placed_area, self.bins.iter().map(|bin| bin.size))
    }

    pub fn status(&self) -> PackStatus {
        if self.missing == 0 {
            PackStatus::Done
        } else {
            PackStatus::Incomplete {
                missing: self.missing,
            }
        }
    }
}

pub(crate) fn fill_rate<I: IntoIterator<Item = (u32, u32)>>(placed_area: u64, bins: I) -> f64 {
    let bin_area: u64 = bins.into_iter().map(crate::geometry::area_of).sum();

    if bin_area == 0 {
        0.0
    } else {
        placed_area as f64 / bin_area as f64
    }
}
