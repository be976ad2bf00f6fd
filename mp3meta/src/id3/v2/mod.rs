//! ID3v2 items and utilities
//!
//! ## Important notes
//!
//! See:
//!
//! * [`Id3v2Tag`]
//! * [`Frame`]

mod frame;
pub(crate) mod header;
mod items;
pub(crate) mod read;
pub(crate) mod tag;
pub mod util;
pub(crate) mod write;

// Exports

pub use header::{Id3v2TagFlags, Id3v2Version, probable_tag_length};
pub use read::create_tag;

pub use tag::{ITUNES_COMMENT_DESCRIPTION, Id3v2Tag};

pub use items::*;

pub use frame::{Frame, FrameFlags, FrameHeaderFormat, FrameSet};
