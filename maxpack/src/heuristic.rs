//! Placement scoring. Every candidate free rectangle gets a cost and the
//! cheapest one wins.

use crate::{config::Heuristic, geometry::Rect};

/// Subtracted from a top-left cost for every placed item sitting directly
/// beside the candidate free rectangle.
const NEIGHBOR_BONUS: i64 = 5;

/// Subtracted when the candidate has no neighbors but touches a side of the
/// bin instead.
const BIN_EDGE_BONUS: i64 = 1;

/// Cost of putting an item of `size` into `free`. `placed` holds everything
/// already in the bin.
pub(crate) fn cost(
    heuristic: Heuristic,
    free: &Rect,
    size: (u32, u32),
    placed: &[Rect],
    bin_size: (u32, u32),
) -> i64 {
    let leftover_width = i64::from(free.width()) - i64::from(size.0);
    let leftover_height = i64::from(free.height()) - i64::from(size.1);

    match heuristic {
        Heuristic::None => 0,
        Heuristic::TopLeft => top_left_cost(free, placed, bin_size),
        Heuristic::BestAreaFit => free.area() as i64,
        Heuristic::BestShortSideFit => leftover_width.min(leftover_height),
        Heuristic::BestLongSideFit => leftover_width.max(leftover_height),
        Heuristic::MinWidth => i64::from(free.width()),
        Heuristic::MinHeight => i64::from(free.height()),
    }
}

fn top_left_cost(free: &Rect, placed: &[Rect], bin_size: (u32, u32)) -> i64 {
    let mut cost = i64::from(free.pos.1);

    let mut left_neighbor = false;
    let mut right_neighbor = false;

    // Centers are compared doubled to stay in integers.
    let free_center = 2 * i64::from(free.pos.1) + i64::from(free.height());

    for other in placed {
        let other_center = 2 * i64::from(other.pos.1) + i64::from(other.height());
        let reach = 2 * i64::from(other.height().max(free.height() / 2));

        if (other_center - free_center).abs() >= reach {
            continue;
        }

        if other.max().0 == free.pos.0 {
            cost -= NEIGHBOR_BONUS;
            left_neighbor = true;
        }

        if other.pos.0 == free.max().0 {
            cost -= NEIGHBOR_BONUS;
            right_neighbor = true;
        }
    }

    if !left_neighbor && !right_neighbor {
        if free.max().0 == bin_size.0 {
            cost -= BIN_EDGE_BONUS;
        }

        if free.pos.0 == 0 {
            cost -= BIN_EDGE_BONUS;
        }
    }

    cost
}
