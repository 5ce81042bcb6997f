//! Decides how many bins to use and how big they are, by repeatedly filling
//! bins and keeping or undoing the result.

use crate::{
    cancel::CancelToken,
    config::PackerConfig,
    error::PackError,
    free_rects::FreeRects,
    session::{Slot, Sprite},
    types::fill_rate,
};

/// What a finished search settled on.
#[derive(Debug)]
pub(crate) struct SearchOutcome {
    pub bins: Vec<(u32, u32)>,
    pub placed_area: u64,
}

/// The result of filling a single bin.
#[derive(Debug, Default, Clone, Copy)]
struct Fill {
    placed: usize,
    missing: usize,
    area: u64,
}

/// Everything a speculative shrink or divide can change, so that it can be
/// put back exactly as it was.
#[derive(Debug)]
struct Snapshot {
    slots: Vec<Option<Slot>>,
    bins: Vec<(u32, u32)>,
    area: u64,
}

pub(crate) struct BinSizeSearch<'a> {
    config: &'a PackerConfig,
    cancel: &'a CancelToken,
    sprites: &'a mut [Sprite],

    /// Indices into `sprites`, in the order they are offered to each bin.
    order: &'a [usize],

    bins: Vec<(u32, u32)>,

    /// Padded area of every placed sprite.
    area: u64,
    missing: usize,
}

impl<'a> BinSizeSearch<'a> {
    pub fn new(
        config: &'a PackerConfig,
        cancel: &'a CancelToken,
        sprites: &'a mut [Sprite],
        order: &'a [usize],
    ) -> Self {
        Self {
            config,
            cancel,
            sprites,
            order,
            bins: Vec::new(),
            area: 0,
            missing: 0,
        }
    }

    pub fn run(mut self) -> Result<SearchOutcome, PackError> {
        if self.config.auto_grow {
            self.grow()?;
        } else {
            let size = self.config.size;
            let area = self.fill_new_bins(size)?;

            if area != 0 && self.missing == 0 && self.config.shrink {
                self.shrink_last(size, false)?;
            }
        }

        self.place_empty_sprites();

        Ok(SearchOutcome {
            bins: self.bins,
            placed_area: self.area,
        })
    }

    /// Packs everything into a single bin, doubling it until nothing is left
    /// over or the configured maximum is reached.
    fn grow(&mut self) -> Result<(), PackError> {
        let max_size = (self.config.max_size.0.max(1), self.config.max_size.1.max(1));
        let mut size = (
            self.config.size.0.clamp(1, max_size.0),
            self.config.size.1.clamp(1, max_size.1),
        );

        self.check_items_fit(max_size)?;

        let mut widen = true;

        loop {
            self.cancel.check()?;

            for sprite in self.sprites.iter_mut() {
                sprite.slot = None;
            }
            self.area = 0;
            self.bins = vec![size];

            let fill = self.fill_bin(0, size)?;
            self.missing = fill.missing;

            if fill.missing == 0 {
                log::debug!("All items fit into a {}x{} bin", size.0, size.1);
                return Ok(());
            }

            let next = grown(size, self.config.square, widen, max_size);
            if next == size {
                return Err(PackError::GrowLimitExceeded { size, max_size });
            }

            log::debug!(
                "{} items did not fit into {}x{}, growing to {}x{}",
                fill.missing,
                size.0,
                size.1,
                next.0,
                next.1
            );

            size = next;
            if !self.config.square {
                widen = !widen;
            }
        }
    }

    /// Auto-grow has an upper bound, so anything that cannot fit into the
    /// largest allowed bin would make it fail every time.
    fn check_items_fit(&self, max_size: (u32, u32)) -> Result<(), PackError> {
        let allow_rotation = self.config.rotation.allows_rotation();

        for sprite in self.sprites.iter().filter(|sprite| sprite.takes_space()) {
            let size = sprite.current_size();
            let fits = size.0 <= max_size.0 && size.1 <= max_size.1;
            let fits_rotated = allow_rotation && size.1 <= max_size.0 && size.0 <= max_size.1;

            if !fits && !fits_rotated {
                return Err(PackError::ItemTooLarge {
                    id: sprite.item.id(),
                    size,
                    max_size,
                });
            }
        }

        Ok(())
    }

    /// Opens bins of a fixed size until every unplaced sprite has a spot, or
    /// until a fresh bin takes no area at all, in which case that bin is
    /// dropped again.
    ///
    /// Returns the area placed by this call.
    fn fill_new_bins(&mut self, size: (u32, u32)) -> Result<u64, PackError> {
        let mut area = 0;

        loop {
            self.cancel.check()?;

            let index = self.bins.len();
            self.bins.push(size);

            let fill = self.fill_bin(index, size)?;
            self.missing = fill.missing;
            area += fill.area;

            if fill.area == 0 {
                log::trace!("Bin {} took no items, dropping it", index);
                self.bins.pop();
            }

            if fill.missing == 0 || fill.area == 0 {
                return Ok(area);
            }
        }
    }

    /// Sprites without area never get a bin of their own. They sit at the
    /// origin of the first bin, if there is one.
    fn place_empty_sprites(&mut self) {
        if self.bins.is_empty() {
            return;
        }

        for sprite in self.sprites.iter_mut() {
            if sprite.takes_space() && !sprite.has_area() {
                sprite.slot = Some(Slot {
                    bin: 0,
                    pos: (0, 0),
                    rotated: sprite.pre_rotated,
                });
            }
        }
    }

    /// Offers every unplaced sprite, in order, to a fresh bin.
    fn fill_bin(&mut self, bin: usize, size: (u32, u32)) -> Result<Fill, PackError> {
        log::trace!("Filling bin {} at {}x{}", bin, size.0, size.1);

        let heuristic = self.config.heuristic;
        let allow_rotation = self.config.rotation.allows_rotation();

        let mut rects = FreeRects::new(size);
        let mut fill = Fill::default();

        for &index in self.order {
            self.cancel.check()?;

            let sprite = &mut self.sprites[index];
            if sprite.slot.is_some() || !sprite.takes_space() || !sprite.has_area() {
                continue;
            }

            match rects.insert(sprite.current_size(), heuristic, allow_rotation) {
                Some(insertion) => {
                    sprite.slot = Some(Slot {
                        bin,
                        pos: insertion.pos,
                        rotated: sprite.pre_rotated != insertion.rotated,
                    });

                    fill.placed += 1;
                    fill.area += sprite.area();
                }
                None => fill.missing += 1,
            }
        }

        self.area += fill.area;

        log::trace!(
            "Bin {} took {} items, {} left over",
            bin,
            fill.placed,
            fill.missing
        );

        Ok(fill)
    }

    /// Halves the last bin for as long as everything it holds still fits.
    ///
    /// `halve_width` picks the side to halve next for non-square bins; it
    /// flips after every successful halving.
    fn shrink_last(&mut self, mut size: (u32, u32), mut halve_width: bool) -> Result<(), PackError> {
        if self.bins.is_empty() {
            return Ok(());
        }

        loop {
            self.cancel.check()?;

            let smaller = match halved(size, self.config.square, halve_width) {
                Some(smaller) => smaller,
                None => return Ok(()),
            };

            let snapshot = self.snapshot();
            let last = self.bins.len() - 1;

            self.clear_bin(last);
            self.bins[last] = smaller;

            let fill = self.fill_bin(last, smaller)?;

            if fill.missing == 0 {
                log::debug!(
                    "Shrunk bin {} from {}x{} to {}x{}",
                    last,
                    size.0,
                    size.1,
                    smaller.0,
                    smaller.1
                );

                size = smaller;
                if !self.config.square {
                    halve_width = !halve_width;
                }
                continue;
            }

            log::trace!(
                "Bin {} does not fit into {}x{}, keeping {}x{}",
                last,
                smaller.0,
                smaller.1,
                size.0,
                size.1
            );

            self.restore(snapshot);
            self.missing = 0;

            if self.config.auto_size {
                let rate = self.fill_rate();
                let min_size = self.config.min_size;

                if rate < self.config.min_fill_rate && size.0 > min_size.0 && size.1 > min_size.1 {
                    self.divide_last(size, halve_width)?;
                }
            }

            return Ok(());
        }
    }

    /// Replaces the last bin with as many half-sized bins as its contents
    /// need, keeping the result only if it is at least as well filled.
    fn divide_last(&mut self, size: (u32, u32), halve_width: bool) -> Result<(), PackError> {
        let half = match halved(size, self.config.square, halve_width) {
            Some(half) => half,
            None => return Ok(()),
        };

        let snapshot = self.snapshot();
        let rate = self.fill_rate();
        let last = self.bins.len() - 1;

        log::trace!(
            "Bin {} is only {:.1}% full, trying to divide it into {}x{} bins",
            last,
            rate * 100.0,
            half.0,
            half.1
        );

        self.clear_bin(last);
        self.bins.pop();

        self.fill_new_bins(half)?;

        if self.missing != 0 {
            log::trace!("Dividing bin {} left items over, undoing it", last);

            self.restore(snapshot);
            self.missing = 0;
            return Ok(());
        }

        if self.config.shrink {
            let next_halve_width = if self.config.square {
                halve_width
            } else {
                !halve_width
            };

            self.shrink_last(half, next_halve_width)?;
        }

        let new_rate = self.fill_rate();
        if new_rate < rate {
            log::trace!(
                "Dividing bin {} lowered the fill rate to {:.1}%, undoing it",
                last,
                new_rate * 100.0
            );

            self.restore(snapshot);
        } else {
            log::debug!(
                "Divided bin {} into {} bins of {}x{}",
                last,
                self.bins.len() - last,
                half.0,
                half.1
            );
        }

        Ok(())
    }

    /// Takes every sprite out of the given bin.
    fn clear_bin(&mut self, bin: usize) {
        for sprite in self.sprites.iter_mut() {
            if sprite.slot.map(|slot| slot.bin) == Some(bin) {
                self.area -= sprite.area();
                sprite.slot = None;
            }
        }
    }

    fn fill_rate(&self) -> f64 {
        fill_rate(self.area, self.bins.iter().copied())
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            slots: self.sprites.iter().map(|sprite| sprite.slot).collect(),
            bins: self.bins.clone(),
            area: self.area,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        for (sprite, slot) in self.sprites.iter_mut().zip(snapshot.slots) {
            sprite.slot = slot;
        }

        self.bins = snapshot.bins;
        self.area = snapshot.area;
    }
}

/// The next size up for auto-grow. Non-square bins double one side at a time,
/// falling back to the other side once one reaches the maximum. Returns
/// `size` unchanged when neither side can grow.
fn grown(size: (u32, u32), square: bool, widen: bool, max_size: (u32, u32)) -> (u32, u32) {
    let double = |side: u32, max: u32| side.saturating_mul(2).min(max).max(side);

    if square {
        return (double(size.0, max_size.0), double(size.1, max_size.1));
    }

    let wider = (double(size.0, max_size.0), size.1);
    let taller = (size.0, double(size.1, max_size.1));

    match (widen, wider != size, taller != size) {
        (true, true, _) | (false, true, false) => wider,
        (false, _, true) | (true, false, true) => taller,
        _ => size,
    }
}

/// The next size down for shrinking, or `None` once a side would reach zero.
fn halved(size: (u32, u32), square: bool, halve_width: bool) -> Option<(u32, u32)> {
    let smaller = if square {
        (size.0 / 2, size.1 / 2)
    } else if halve_width {
        (size.0 / 2, size.1)
    } else {
        (size.0, size.1 / 2)
    };

    if smaller.0 == 0 || smaller.1 == 0 {
        None
    } else {
        Some(smaller)
    }
}
