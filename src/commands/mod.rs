mod layout;
mod pack;

pub use layout::*;
pub use pack::*;
