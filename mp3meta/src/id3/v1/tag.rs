use crate::error::Result;
use crate::id3::v1::constants::GENRES;
use crate::macros::err;
use crate::util::text::latin1_decode;

/// The fixed size of an ID3v1 tag
pub const ID3V1_TAG_LENGTH: usize = 128;

const TITLE: std::ops::Range<usize> = 3..33;
const ARTIST: std::ops::Range<usize> = 33..63;
const ALBUM: std::ops::Range<usize> = 63..93;
const YEAR: std::ops::Range<usize> = 93..97;
const COMMENT_V1_0: std::ops::Range<usize> = 97..127;
const COMMENT_V1_1: std::ops::Range<usize> = 97..125;
const TRACK_MARKER_OFFSET: usize = 125;
const TRACK_OFFSET: usize = 126;
const GENRE_OFFSET: usize = 127;

/// An ID3v1 tag
///
/// ID3v1 is a severely limited format, with each field being incredibly small in size.
/// All fields have been commented with their maximum sizes.
///
/// Attempting to write a field greater than the maximum size will **not** error, it will just
/// be shrunk. Characters outside of ISO-8859-1 are written as `?`.
#[derive(Default, Debug, PartialEq, Eq, Clone)]
pub struct Id3v1Tag {
	/// Track title, 30 bytes max
	pub title: Option<String>,
	/// Track artist, 30 bytes max
	pub artist: Option<String>,
	/// Album title, 30 bytes max
	pub album: Option<String>,
	/// Release year, 4 bytes max
	pub year: Option<String>,
	/// A short comment
	///
	/// A V1 tag has 30 bytes available, a V1.1 tag (one with a track number) only 28.
	pub comment: Option<String>,
	/// The track number, 1 byte max
	///
	/// The track number **cannot** be 0. Readers look for a null byte at the end of the
	/// comment to differentiate between V1 and V1.1.
	pub track_number: Option<u8>,
	/// The track's genre, an index into [`GENRES`]
	pub genre: Option<u8>,
}

impl Id3v1Tag {
	/// Create a new empty `Id3v1Tag`
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::id3::v1::Id3v1Tag;
	///
	/// let id3v1_tag = Id3v1Tag::new();
	/// assert!(id3v1_tag.is_empty());
	/// ```
	pub fn new() -> Self {
		Self::default()
	}

	/// Read an ID3v1 tag
	///
	/// # Errors
	///
	/// * `bytes` is not exactly [`ID3V1_TAG_LENGTH`] bytes long
	/// * `bytes` does not start with "TAG"
	pub fn parse(bytes: &[u8]) -> Result<Self> {
		if bytes.len() != ID3V1_TAG_LENGTH {
			err!(NoSuchTag, "Buffer length wrong");
		}

		if &bytes[..3] != b"TAG" {
			err!(NoSuchTag, "No ID3v1 tag signature");
		}

		let (comment, track_number) = if bytes[TRACK_MARKER_OFFSET] == 0 {
			let track = bytes[TRACK_OFFSET];
			(&bytes[COMMENT_V1_1], (track != 0).then_some(track))
		} else {
			(&bytes[COMMENT_V1_0], None)
		};

		let genre = bytes[GENRE_OFFSET];

		Ok(Self {
			title: decode_text(&bytes[TITLE]),
			artist: decode_text(&bytes[ARTIST]),
			album: decode_text(&bytes[ALBUM]),
			year: decode_text(&bytes[YEAR]),
			comment: decode_text(comment),
			track_number,
			genre: (genre != 0xFF).then_some(genre),
		})
	}

	/// The name of the genre, if it is in [`GENRES`]
	pub fn genre_name(&self) -> Option<&'static str> {
		self.genre
			.and_then(|genre| GENRES.get(usize::from(genre)))
			.copied()
	}

	/// Whether the tag has no fields set
	pub fn is_empty(&self) -> bool {
		self.title.is_none()
			&& self.artist.is_none()
			&& self.album.is_none()
			&& self.year.is_none()
			&& self.comment.is_none()
			&& self.track_number.is_none()
			&& self.genre.is_none()
	}

	/// Convert the tag to its 128 byte representation
	///
	/// A V1.1 tag is written when there is a track number, otherwise the comment gets the
	/// full 30 bytes.
	pub fn as_bytes(&self) -> [u8; ID3V1_TAG_LENGTH] {
		let mut bytes = [0; ID3V1_TAG_LENGTH];
		bytes[..3].copy_from_slice(b"TAG");

		encode_text(&mut bytes[TITLE], self.title.as_deref());
		encode_text(&mut bytes[ARTIST], self.artist.as_deref());
		encode_text(&mut bytes[ALBUM], self.album.as_deref());
		encode_text(&mut bytes[YEAR], self.year.as_deref());

		match self.track_number {
			Some(track) => {
				encode_text(&mut bytes[COMMENT_V1_1], self.comment.as_deref());
				bytes[TRACK_OFFSET] = track;
			},
			None => encode_text(&mut bytes[COMMENT_V1_0], self.comment.as_deref()),
		}

		bytes[GENRE_OFFSET] = self.genre.unwrap_or(0xFF);
		bytes
	}
}

// Fields are padded with zeros or spaces, both are trimmed
fn decode_text(bytes: &[u8]) -> Option<String> {
	let text = latin1_decode(bytes);
	let trimmed = text.trim_end_matches(|c: char| c == '\0' || c.is_whitespace());

	if trimmed.is_empty() {
		return None;
	}

	Some(trimmed.to_owned())
}

fn encode_text(field: &mut [u8], value: Option<&str>) {
	let Some(value) = value else {
		return;
	};

	for (dest, c) in field.iter_mut().zip(value.chars()) {
		*dest = u8::try_from(u32::from(c)).unwrap_or(b'?');
	}
}

#[cfg(test)]
mod tests {
	use super::{ID3V1_TAG_LENGTH, Id3v1Tag};
	use crate::error::ErrorKind;

	fn test_tag() -> Id3v1Tag {
		Id3v1Tag {
			title: Some(String::from("Foo title")),
			artist: Some(String::from("Bar artist")),
			album: Some(String::from("Baz album")),
			year: Some(String::from("1984")),
			comment: Some(String::from("Qux comment")),
			track_number: Some(1),
			genre: Some(32),
		}
	}

	#[test_log::test]
	fn parse_id3v1() {
		let mut bytes = [0; ID3V1_TAG_LENGTH];
		bytes[..3].copy_from_slice(b"TAG");
		bytes[3..12].copy_from_slice(b"Foo title");
		bytes[33..43].copy_from_slice(b"Bar artist");
		bytes[63..72].copy_from_slice(b"Baz album");
		bytes[93..97].copy_from_slice(b"1984");
		bytes[97..108].copy_from_slice(b"Qux comment");
		bytes[126] = 1;
		bytes[127] = 32;

		let tag = Id3v1Tag::parse(&bytes).unwrap();
		assert_eq!(tag, test_tag());
		assert_eq!(tag.genre_name(), Some("Classical"));
		assert_eq!(tag.as_bytes(), bytes);
	}

	#[test_log::test]
	fn v1_0_comment_uses_full_field() {
		let tag = Id3v1Tag {
			comment: Some("c".repeat(30)),
			..Id3v1Tag::default()
		};

		let bytes = tag.as_bytes();
		assert_eq!(bytes[127], 0xFF);

		let reparsed = Id3v1Tag::parse(&bytes).unwrap();
		assert_eq!(reparsed.comment.as_deref().map(str::len), Some(30));
		assert_eq!(reparsed.track_number, None);
		assert_eq!(reparsed.genre, None);
	}

	#[test_log::test]
	fn fields_are_trimmed_and_truncated() {
		let tag = Id3v1Tag {
			title: Some(format!("{}  ", "t".repeat(35))),
			artist: Some(String::from("Spaced   ")),
			..Id3v1Tag::default()
		};

		let reparsed = Id3v1Tag::parse(&tag.as_bytes()).unwrap();
		assert_eq!(reparsed.title, Some("t".repeat(30)));
		assert_eq!(reparsed.artist.as_deref(), Some("Spaced"));
		assert!(reparsed.album.is_none());
	}

	#[test_log::test]
	fn not_a_tag() {
		let err = Id3v1Tag::parse(&[0; 127]).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NoSuchTag);
		assert_eq!(err.message(), "Buffer length wrong");

		let err = Id3v1Tag::parse(&[0; 128]).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NoSuchTag);
	}
}
