use crate::{
    cancel::CancelToken,
    config::PackerConfig,
    error::PackError,
    geometry::{area_of, swapped},
    id::Id,
    search::BinSizeSearch,
    types::{Bin, InputItem, OutputItem, PackOutput, Padding, Placement},
};

/// A sprite's spot in a bin while a search is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub bin: usize,
    pub pos: (u32, u32),
    pub rotated: bool,
}

/// Per-item packing state. The input item itself is never modified; sizes
/// are derived from it on every run, and orientation is only ever a flag.
#[derive(Debug, Clone)]
pub(crate) struct Sprite {
    pub item: InputItem,

    /// Index of the earlier sprite with the same content.
    pub duplicate_of: Option<usize>,

    /// Padding around the content, before any rotation.
    pub padding: Padding,

    /// Content plus padding, before any rotation.
    pub padded_size: (u32, u32),

    /// Orientation chosen by the rotation policy before packing.
    pub pre_rotated: bool,

    pub slot: Option<Slot>,
}

impl Sprite {
    fn new(item: InputItem) -> Self {
        Self {
            item,
            duplicate_of: None,
            padding: Padding::default(),
            padded_size: item.size(),
            pre_rotated: false,
            slot: None,
        }
    }

    pub fn rotated(&self) -> bool {
        match self.slot {
            Some(slot) => slot.rotated,
            None => self.pre_rotated,
        }
    }

    /// The padded size in the sprite's current orientation.
    pub fn current_size(&self) -> (u32, u32) {
        if self.rotated() {
            swapped(self.padded_size)
        } else {
            self.padded_size
        }
    }

    #[inline]
    pub fn area(&self) -> u64 {
        area_of(self.padded_size)
    }

    #[inline]
    pub fn has_area(&self) -> bool {
        self.area() > 0
    }

    /// Duplicates borrow their representative's space instead of their own.
    #[inline]
    pub fn takes_space(&self) -> bool {
        self.duplicate_of.is_none()
    }
}

/// Holds a set of items and packs them into bins.
///
/// Items stay in the session between runs, so a session can be packed again
/// after its configuration changes. Every run starts from scratch.
///
/// ## Example
/// ```
/// use maxpack::{InputItem, PackerConfig, PackingSession, PackStatus};
///
/// let mut session = PackingSession::new(PackerConfig::fixed((512, 512)));
/// let a = session.add(InputItem::new((100, 100)));
/// let b = session.add(InputItem::new((100, 100)));
///
/// let output = session.pack().unwrap();
///
/// assert_eq!(output.status(), PackStatus::Done);
/// assert_eq!(output.item(a).unwrap().placement().unwrap().bin, 0);
/// assert_eq!(output.item(b).unwrap().placement().unwrap().bin, 0);
/// ```
#[derive(Debug, Clone)]
pub struct PackingSession {
    config: PackerConfig,
    sprites: Vec<Sprite>,

    /// Packing order as indices into `sprites`, which itself stays in the
    /// order items were added.
    order: Vec<usize>,

    needed_area: u64,
}

impl PackingSession {
    pub fn new(config: PackerConfig) -> Self {
        Self {
            config,
            sprites: Vec::new(),
            order: Vec::new(),
            needed_area: 0,
        }
    }

    #[inline]
    pub fn config(&self) -> &PackerConfig {
        &self.config
    }

    #[inline]
    pub fn config_mut(&mut self) -> &mut PackerConfig {
        &mut self.config
    }

    pub fn add(&mut self, item: InputItem) -> Id {
        let id = item.id();

        self.order.push(self.sprites.len());
        self.sprites.push(Sprite::new(item));

        id
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Total padded area of the items that need space of their own, as of the
    /// last call to [`sort_items`](Self::sort_items).
    #[inline]
    pub fn needed_area(&self) -> u64 {
        self.needed_area
    }

    /// IDs in the order they will be offered to the packer, as of the last
    /// call to [`sort_items`](Self::sort_items).
    pub fn packing_order(&self) -> impl Iterator<Item = Id> + '_ {
        self.order.iter().map(move |&index| self.sprites[index].item.id())
    }

    /// The item an item duplicates, as of the last duplicate scan.
    pub fn duplicate_of(&self, id: Id) -> Option<Id> {
        let sprite = self.sprites.iter().find(|sprite| sprite.item.id() == id)?;

        sprite
            .duplicate_of
            .map(|index| self.sprites[index].item.id())
    }

    /// Marks every item whose content matches an earlier item as a duplicate
    /// of it. Items match when their content hashes and full sizes are equal
    /// and the earlier item's crop is as large as the later item's full size.
    ///
    /// Does nothing but clear old marks when duplicate merging is off.
    pub fn recalculate_duplicates(&mut self) {
        for sprite in &mut self.sprites {
            sprite.duplicate_of = None;
        }

        if !self.config.merge_duplicates {
            return;
        }

        for i in 0..self.sprites.len() {
            if self.sprites[i].duplicate_of.is_some() {
                continue;
            }

            let original = self.sprites[i].item;
            let hash = match original.content_hash() {
                Some(hash) => hash,
                None => continue,
            };

            for later in &mut self.sprites[i + 1..] {
                if later.duplicate_of.is_none()
                    && later.item.content_hash() == Some(hash)
                    && later.item.size() == original.size()
                    && original.crop().size == later.item.size()
                {
                    later.duplicate_of = Some(i);
                }
            }
        }
    }

    /// Works out the padded size and initial orientation of every item for
    /// bins of size `canvas`, clears old placements and puts the items in
    /// packing order.
    pub fn sort_items(&mut self, canvas: (u32, u32)) {
        self.recalculate_duplicates();

        let config = &self.config;
        let extrude = config.extrude;
        let mut needed_area = 0;

        for sprite in &mut self.sprites {
            sprite.slot = None;

            let content = if config.crop {
                sprite.item.crop().size
            } else {
                sprite.item.size()
            };

            let mut padding = Padding {
                left: config.border.left + extrude,
                top: config.border.top + extrude,
                right: config.border.right + extrude,
                bottom: config.border.bottom + extrude,
            };

            // Content that spans the whole canvas would never fit with
            // padding added on top.
            if content.0 == canvas.0 {
                padding.left = 0;
                padding.right = 0;
            }
            if content.1 == canvas.1 {
                padding.top = 0;
                padding.bottom = 0;
            }

            sprite.padding = padding;
            sprite.padded_size = (
                content.0 + padding.horizontal(),
                content.1 + padding.vertical(),
            );
            sprite.pre_rotated = config.rotation.rotates_up_front(sprite.padded_size);

            if sprite.takes_space() {
                needed_area += sprite.area();
            }
        }

        self.needed_area = needed_area;

        let sort_order = config.sort_order;
        let sprites = &self.sprites;

        self.order = (0..sprites.len()).collect();
        self.order.sort_by(|&a, &b| {
            let key_a = sort_order.key(sprites[a].current_size());
            let key_b = sort_order.key(sprites[b].current_size());

            key_b.cmp(&key_a)
        });
    }

    pub fn pack(&mut self) -> Result<PackOutput, PackError> {
        self.pack_cancellable(&CancelToken::new())
    }

    /// Packs every item, checking `cancel` between insertions.
    pub fn pack_cancellable(&mut self, cancel: &CancelToken) -> Result<PackOutput, PackError> {
        log::trace!("Packing {} items", self.sprites.len());

        self.sort_items(self.config.size);
        cancel.check()?;

        let needs_bins = self
            .sprites
            .iter()
            .any(|sprite| sprite.takes_space() && sprite.has_area());

        let (bins, placed_area) = if needs_bins {
            let outcome =
                BinSizeSearch::new(&self.config, cancel, &mut self.sprites, &self.order).run()?;

            (outcome.bins, outcome.placed_area)
        } else {
            (Vec::new(), 0)
        };

        let merged = self.merge_duplicates();
        let output = self.output(bins, placed_area, merged);

        log::debug!(
            "Packed {} items into {} bins ({} missing, {} merged, {:.1}% filled)",
            self.sprites.len(),
            output.bins().len(),
            output.missing(),
            output.merged(),
            output.fill_rate() * 100.0
        );

        Ok(output)
    }

    /// Copies each representative's placement onto its duplicates.
    fn merge_duplicates(&mut self) -> usize {
        let mut merged = 0;

        for index in 0..self.sprites.len() {
            if let Some(original) = self.sprites[index].duplicate_of {
                let slot = self.sprites[original].slot;
                self.sprites[index].slot = slot;

                if slot.is_some() {
                    merged += 1;
                }
            }
        }

        merged
    }

    fn output(&self, bins: Vec<(u32, u32)>, placed_area: u64, merged: usize) -> PackOutput {
        let items = self
            .sprites
            .iter()
            .map(|sprite| {
                // Duplicates are drawn from their representative's pixels, so
                // they take on its shape as well as its slot.
                let shape = match sprite.duplicate_of {
                    Some(index) => &self.sprites[index],
                    None => sprite,
                };
                let rotated = shape.rotated();

                OutputItem {
                    id: sprite.item.id(),
                    size: shape.current_size(),
                    padding: if rotated {
                        shape.padding.rotated()
                    } else {
                        shape.padding
                    },
                    rotated,
                    placement: sprite.slot.map(|slot| Placement {
                        bin: slot.bin,
                        position: slot.pos,
                        rotated: slot.rotated,
                    }),
                    duplicate_of: sprite
                        .duplicate_of
                        .map(|index| self.sprites[index].item.id()),
                }
            })
            .collect();

        let missing = self
            .sprites
            .iter()
            .filter(|sprite| sprite.takes_space() && sprite.has_area() && sprite.slot.is_none())
            .count();

        PackOutput {
            bins: bins
                .into_iter()
                .enumerate()
                .map(|(index, size)| Bin { index, size })
                .collect(),
            items,
            missing,
            merged,
            needed_area: self.needed_area,
            placed_area,
        }
    }
}
