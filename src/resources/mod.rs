//! Resource kinds
//!
//! Field tables and page wiring for each supported resource. All of the
//! decoding and traversal logic lives in `decode` and `pagination`.

mod image;
mod volume;

pub use image::{Image, ImagePage, ImageStatus, ImageVisibility};
pub use volume::{Attachment, Volume, VolumePage};
