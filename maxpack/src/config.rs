//! Options that control how a [`PackingSession`](crate::PackingSession)
//! sizes its bins and places items into them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::area_of;

/// Scoring policy used to choose between free rectangles that can hold an
/// item. Lower scores win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Heuristic {
    /// Take the first free rectangle that fits.
    None,

    /// Prefer free rectangles near the top of the bin that continue an
    /// existing row of items.
    TopLeft,

    /// Prefer the smallest free rectangle.
    BestAreaFit,

    /// Prefer the free rectangle whose shorter leftover side is smallest.
    BestShortSideFit,

    /// Prefer the free rectangle whose longer leftover side is smallest.
    BestLongSideFit,

    /// Prefer the narrowest free rectangle.
    MinWidth,

    /// Prefer the shortest free rectangle.
    MinHeight,
}

/// Decides whether items may be turned 90 degrees, and whether they are
/// turned before packing even starts.
///
/// Every policy except `Never` lets the packer rotate an item when that is
/// the better (or only) way to fit it into a free rectangle. The aspect ratio
/// variants additionally rotate matching items up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RotationPolicy {
    Never,
    OnlyWhenNeeded,
    WidthGreaterThanHeight,
    WidthGreaterThanTwiceHeight,
    WidthBetweenHeightAndTwiceHeight,
    HeightGreaterThanWidth,
    HeightGreaterThanTwiceWidth,
    HeightBetweenWidthAndTwiceWidth,
}

impl RotationPolicy {
    #[inline]
    pub fn allows_rotation(self) -> bool {
        self != RotationPolicy::Never
    }

    /// Whether an item of this (padded) size should start out rotated.
    pub fn rotates_up_front(self, size: (u32, u32)) -> bool {
        let (w, h) = (u64::from(size.0), u64::from(size.1));

        match self {
            RotationPolicy::Never | RotationPolicy::OnlyWhenNeeded => false,
            RotationPolicy::WidthGreaterThanHeight => w > h,
            RotationPolicy::WidthGreaterThanTwiceHeight => w > 2 * h,
            RotationPolicy::WidthBetweenHeightAndTwiceHeight => w > h && 2 * h > w,
            RotationPolicy::HeightGreaterThanWidth => h > w,
            RotationPolicy::HeightGreaterThanTwiceWidth => h > 2 * w,
            RotationPolicy::HeightBetweenWidthAndTwiceWidth => h > w && 2 * w > h,
        }
    }
}

/// The order items are offered to the packer in. All orders are descending
/// and stable, so items with equal keys keep the order they were added in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum SortOrder {
    None,
    ByWidth,
    ByHeight,
    ByArea,

    /// By the longer side, then by area.
    ByMax,
}

impl SortOrder {
    /// Sort key for an item of the given size. Larger keys are packed first.
    pub(crate) fn key(self, size: (u32, u32)) -> (u64, u64) {
        let (w, h) = (u64::from(size.0), u64::from(size.1));

        match self {
            SortOrder::None => (0, 0),
            SortOrder::ByWidth => (w, h),
            SortOrder::ByHeight => (h, w),
            SortOrder::ByArea => (area_of(size), 0),
            SortOrder::ByMax => (w.max(h), area_of(size)),
        }
    }
}

/// Blank space kept clear around each packed item, per edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct Border {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Border {
    pub fn uniform(width: u32) -> Self {
        Self {
            top: width,
            right: width,
            bottom: width,
            left: width,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(default, deny_unknown_fields, rename_all = "kebab-case")
)]
pub struct PackerConfig {
    /// Size of the first bin. In fixed size mode every bin starts out at this
    /// size.
    pub size: (u32, u32),

    /// The largest bin that auto-grow mode is allowed to produce.
    pub max_size: (u32, u32),

    /// Bins are never divided when either side is already at or below this
    /// size.
    pub min_size: (u32, u32),

    /// Grow and shrink both sides of a bin together.
    pub square: bool,

    /// Pack everything into a single bin that doubles in size until all items
    /// fit. When disabled, new bins of `size` are opened as needed.
    pub auto_grow: bool,

    /// After a fixed size pack, try to halve the last bin while it still
    /// holds everything assigned to it.
    pub shrink: bool,

    /// Allow splitting a poorly filled last bin into several smaller ones.
    pub auto_size: bool,

    /// Fill ratio below which splitting the last bin is attempted.
    pub min_fill_rate: f64,

    pub border: Border,

    /// Pixels of edge content replicated around each item.
    pub extrude: u32,

    /// Pack items by their crop rectangle instead of their full size.
    pub crop: bool,

    /// Give items with identical content a single shared placement.
    pub merge_duplicates: bool,

    pub sort_order: SortOrder,
    pub heuristic: Heuristic,
    pub rotation: RotationPolicy,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            size: (512, 512),
            max_size: (8192, 8192),
            min_size: (32, 32),
            square: true,
            auto_grow: true,
            shrink: true,
            auto_size: true,
            min_fill_rate: 0.8,
            border: Border::default(),
            extrude: 0,
            crop: true,
            merge_duplicates: true,
            sort_order: SortOrder::ByMax,
            heuristic: Heuristic::BestAreaFit,
            rotation: RotationPolicy::Never,
        }
    }
}

impl PackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration that packs into as many `size` bins as needed and never
    /// resizes them.
    pub fn fixed(size: (u32, u32)) -> Self {
        Self {
            size,
            auto_grow: false,
            shrink: false,
            auto_size: false,
            ..Self::default()
        }
    }

    pub fn size(self, size: (u32, u32)) -> Self {
        Self { size, ..self }
    }

    pub fn max_size(self, max_size: (u32, u32)) -> Self {
        Self { max_size, ..self }
    }

    pub fn min_size(self, min_size: (u32, u32)) -> Self {
        Self { min_size, ..self }
    }

    pub fn square(self, square: bool) -> Self {
        Self { square, ..self }
    }

    pub fn auto_grow(self, auto_grow: bool) -> Self {
        Self { auto_grow, ..self }
    }

    pub fn shrink(self, shrink: bool) -> Self {
        Self { shrink, ..self }
    }

    pub fn auto_size(self, auto_size: bool, min_fill_rate: f64) -> Self {
        Self {
            auto_size,
            min_fill_rate,
            ..self
        }
    }

    pub fn border(self, border: Border) -> Self {
        Self { border, ..self }
    }

    pub fn extrude(self, extrude: u32) -> Self {
        Self { extrude, ..self }
    }

    pub fn crop(self, crop: bool) -> Self {
        Self { crop, ..self }
    }

    pub fn merge_duplicates(self, merge_duplicates: bool) -> Self {
        Self {
            merge_duplicates,
            ..self
        }
    }

    pub fn sort_order(self, sort_order: SortOrder) -> Self {
        Self { sort_order, ..self }
    }

    pub fn heuristic(self, heuristic: Heuristic) -> Self {
        Self { heuristic, ..self }
    }

    pub fn rotation(self, rotation: RotationPolicy) -> Self {
        Self { rotation, ..self }
    }
}
