//! MPEG audio frames and files
//!
//! See:
//!
//! * [`Mp3File`]
//! * [`MpegFrame`]

mod constants;
mod file;
mod header;
mod read;

pub use file::Mp3File;
pub use header::{ChannelMode, Emphasis, Layer, ModeExtension, MpegFrame, MpegVersion};
