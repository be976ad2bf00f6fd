//! ID3v1 items
//!
//! # ID3v1 notes
//!
//! See also: [`Id3v1Tag`]
//!
//! ## Genres
//!
//! ID3v1 stores the genre in a single byte ranging from 0 to 191 (inclusive), with `0xFF`
//! meaning no genre. All possible genres have been stored in the [`GENRES`] constant.
//!
//! ## Track Numbers
//!
//! ID3v1.1 stores the track number in a non-zero byte at the end of the comment field.
//! A track number of 0 will be treated as an empty field.

pub(crate) mod constants;
mod tag;

pub use constants::GENRES;
pub use tag::{ID3V1_TAG_LENGTH, Id3v1Tag};
