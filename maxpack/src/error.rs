use thiserror::Error;

use crate::id::Id;

/// Failures that end a packing run without a usable layout.
///
/// Running out of room is not one of them: items that could not be placed are
/// reported through [`PackOutput::status`](crate::PackOutput::status).
#[derive(Debug, Error)]
pub enum PackError {
    #[error("packing was cancelled")]
    Cancelled,

    #[error("item {id} is {size:?} after padding and cannot fit the maximum bin size {max_size:?}")]
    ItemTooLarge {
        id: Id,
        size: (u32, u32),
        max_size: (u32, u32),
    },

    #[error("items still did not fit after growing the bin to {size:?} (maximum is {max_size:?})")]
    GrowLimitExceeded {
        size: (u32, u32),
        max_size: (u32, u32),
    },
}
