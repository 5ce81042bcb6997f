use crate::{
    config::Heuristic,
    geometry::{swapped, Rect},
    heuristic,
};

/// Where an item ended up after a successful [`FreeRects::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    pub pos: (u32, u32),

    /// Whether the item was turned 90 degrees relative to the size it was
    /// offered with.
    pub rotated: bool,
}

/// The free space of a single bin, tracked as a list of maximal free
/// rectangles (the MaxRects method).
///
/// Free rectangles may overlap each other, but none of them overlaps a placed
/// item and none is contained in another. List order matters: when two
/// candidates score the same, the one that comes first wins.
#[derive(Debug, Clone)]
pub struct FreeRects {
    bin_size: (u32, u32),
    free: Vec<Rect>,
    used: Vec<Rect>,
}

impl FreeRects {
    pub fn new(bin_size: (u32, u32)) -> Self {
        let whole = Rect::from_size(bin_size);
        let free = if whole.is_empty() {
            Vec::new()
        } else {
            vec![whole]
        };

        Self {
            bin_size,
            free,
            used: Vec::new(),
        }
    }

    #[inline]
    pub fn bin_size(&self) -> (u32, u32) {
        self.bin_size
    }

    #[inline]
    pub fn free_rects(&self) -> &[Rect] {
        &self.free
    }

    #[inline]
    pub fn used_rects(&self) -> &[Rect] {
        &self.used
    }

    /// Places an item of the given size into the best scoring free rectangle,
    /// or returns `None` if it fits nowhere.
    ///
    /// Items with no area take up no space and are always put at the origin.
    pub fn insert(
        &mut self,
        size: (u32, u32),
        heuristic: Heuristic,
        allow_rotation: bool,
    ) -> Option<Insertion> {
        if size.0 == 0 || size.1 == 0 {
            return Some(Insertion {
                pos: (0, 0),
                rotated: false,
            });
        }

        let (index, rotated) = self.find_best(size, heuristic, allow_rotation)?;
        let size = if rotated { swapped(size) } else { size };

        let target = self.free[index];
        let placed = Rect::new(target.pos, size);

        log::trace!(
            "Placing {}x{} at {:?} (rotated: {}) in free rect {:?}",
            size.0,
            size.1,
            placed.pos,
            rotated,
            target
        );

        self.split_free_rect(index, &placed);
        self.carve(&placed);
        self.prune();
        self.used.push(placed);

        Some(Insertion {
            pos: placed.pos,
            rotated,
        })
    }

    /// Finds the cheapest free rectangle for the item. The rotated
    /// orientation is only considered for free rectangles the item does not
    /// fit into upright. Earlier candidates win ties.
    fn find_best(
        &self,
        size: (u32, u32),
        heuristic: Heuristic,
        allow_rotation: bool,
    ) -> Option<(usize, bool)> {
        let rotated_size = swapped(size);
        let mut best: Option<(i64, usize, bool)> = None;

        for (index, free) in self.free.iter().enumerate() {
            let (candidate, rotated) = if fits(free, size) {
                (size, false)
            } else if allow_rotation && fits(free, rotated_size) {
                (rotated_size, true)
            } else {
                continue;
            };

            if heuristic == Heuristic::None {
                return Some((index, rotated));
            }

            let cost = heuristic::cost(heuristic, free, candidate, &self.used, self.bin_size);

            match best {
                Some((best_cost, _, _)) if best_cost <= cost => {}
                _ => best = Some((cost, index, rotated)),
            }
        }

        best.map(|(_, index, rotated)| (index, rotated))
    }

    /// Replaces the free rectangle at `index` with what is left of it to the
    /// right of and below `placed`.
    fn split_free_rect(&mut self, index: usize, placed: &Rect) {
        let target = self.free.remove(index);

        if target.width() > placed.width() {
            self.free.push(Rect::new(
                (placed.max().0, target.pos.1),
                (target.width() - placed.width(), target.height()),
            ));
        }

        if target.height() > placed.height() {
            self.free.push(Rect::new(
                (target.pos.0, placed.max().1),
                (target.width(), target.height() - placed.height()),
            ));
        }
    }

    /// Cuts `placed` out of every other free rectangle it overlaps, keeping
    /// the parts on each of its four sides.
    fn carve(&mut self, placed: &Rect) {
        let mut pieces = Vec::new();

        self.free.retain(|free| {
            if !free.intersects(placed) {
                return true;
            }

            let (free_min, free_max) = (free.min(), free.max());
            let (placed_min, placed_max) = (placed.min(), placed.max());

            if placed_max.0 < free_max.0 {
                pieces.push(Rect::new(
                    (placed_max.0, free_min.1),
                    (free_max.0 - placed_max.0, free.height()),
                ));
            }

            if placed_max.1 < free_max.1 {
                pieces.push(Rect::new(
                    (free_min.0, placed_max.1),
                    (free.width(), free_max.1 - placed_max.1),
                ));
            }

            if placed_min.0 > free_min.0 {
                pieces.push(Rect::new(
                    free_min,
                    (placed_min.0 - free_min.0, free.height()),
                ));
            }

            if placed_min.1 > free_min.1 {
                pieces.push(Rect::new(
                    free_min,
                    (free.width(), placed_min.1 - free_min.1),
                ));
            }

            false
        });

        self.free.extend(pieces.into_iter().filter(|piece| !piece.is_empty()));
    }

    /// Drops every free rectangle that is contained in another one. Of two
    /// identical rectangles, the earlier one survives.
    fn prune(&mut self) {
        let mut i = 0;

        'outer: while i < self.free.len() {
            let mut j = i + 1;

            while j < self.free.len() {
                if self.free[i].contains(&self.free[j]) {
                    self.free.remove(j);
                } else if self.free[j].contains(&self.free[i]) {
                    self.free.remove(i);
                    continue 'outer;
                } else {
                    j += 1;
                }
            }

            i += 1;
        }
    }
}

fn fits(free: &Rect, size: (u32, u32)) -> bool {
    free.width() >= size.0 && free.height() >= size.1
}
