//! Read and write ID3 tags, and locate the audio in MPEG files.
//!
//! # Examples
//!
//! ## Reading a file
//!
//! ```rust,no_run
//! # fn main() -> mp3meta::error::Result<()> {
//! use mp3meta::mpeg::Mp3File;
//!
//! let mp3 = Mp3File::open("test.mp3")?;
//!
//! println!("MPEG {} layer {}", mp3.version(), mp3.layer());
//! println!("{} kbps, {} ms", mp3.bitrate(), mp3.length_in_milliseconds());
//!
//! if let Some(tag) = mp3.id3v2_tag() {
//! 	println!("Title: {:?}", tag.title());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Editing tags
//!
//! Files are never written in place, [`Mp3File::save`](mpeg::Mp3File::save) copies the audio
//! frames from the original file into a new one.
//!
//! ```rust,no_run
//! # fn main() -> mp3meta::error::Result<()> {
//! use mp3meta::id3::v1::Id3v1Tag;
//! use mp3meta::id3::v2::{Id3v2Tag, Id3v2Version};
//! use mp3meta::mpeg::Mp3File;
//!
//! let mut mp3 = Mp3File::open("test.mp3")?;
//!
//! let mut tag = Id3v2Tag::new(Id3v2Version::V4);
//! tag.set_title("Foo title")?;
//! tag.set_genre(13)?;
//! mp3.set_id3v2_tag(tag);
//!
//! mp3.remove_id3v1_tag();
//! mp3.save("retagged.mp3")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Notes on ID3v2
//!
//! See [`Id3v2Tag`](id3::v2::Id3v2Tag) for how the tag versions differ.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod error;
pub(crate) mod macros;
mod util;

pub mod id3;
pub mod mpeg;

pub use util::text::TextEncoding;
