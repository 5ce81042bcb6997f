//! Maxpack packs rectangles into as few, as small canvases as it can. It was
//! built to lay out texture atlases: every input is a sprite with an optional
//! transparent border cropped away and a content hash so that identical
//! sprites share one spot.
//!
//! Placement uses the MaxRects method with a choice of scoring heuristics.
//! Around it, a bin sizing search either grows a single canvas until
//! everything fits, or opens fixed size canvases as needed and then tries to
//! shrink or split the last one to waste less space.
//!
//! The packer is a greedy heuristic. It is deterministic for a given input
//! order and configuration, but makes no promise of an optimal layout.
//!
//! ## Example
//! ```
//! use maxpack::{InputItem, PackerConfig, PackingSession};
//!
//! // Auto-grow from a 32x32 canvas, up to 1024x1024.
//! let config = PackerConfig::new()
//!     .size((32, 32))
//!     .max_size((1024, 1024));
//!
//! let mut session = PackingSession::new(config);
//! session.add(InputItem::new((128, 64)));
//! session.add(InputItem::new((64, 64)));
//! session.add(InputItem::new((1, 300)));
//!
//! let output = session.pack().expect("every item fits in 1024x1024");
//!
//! for item in output.items() {
//!     println!("{} -> {:?}", item.id(), item.placement());
//! }
//! ```

mod cancel;
mod config;
mod error;
mod free_rects;
mod geometry;
mod heuristic;
mod id;
mod search;
mod session;
mod types;

pub use cancel::*;
pub use config::*;
pub use error::*;
pub use free_rects::*;
pub use geometry::Rect;
pub use id::*;
pub use session::PackingSession;
pub use types::*;
