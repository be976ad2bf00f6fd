use crate::error::{ErrorKind, Mp3MetaError, Result};
use crate::macros::err;
use crate::util::charset;
use crate::util::text::TextEncoding;

use std::borrow::Cow;

/// A text value paired with its ID3v2 encoding
///
/// The payload never includes a byte order mark or a trailing terminator. Both are stripped
/// on construction and are only re-added by [`EncodedText::to_bytes`].
///
/// Two values are equal if their encodings and payload bytes are equal, regardless of whether
/// they decode to the same string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncodedText {
	encoding: TextEncoding,
	value: Vec<u8>,
}

impl EncodedText {
	/// Create an `EncodedText` from an encoding and raw bytes
	///
	/// A leading BOM and a trailing terminator are stripped. UTF-16 payloads are stored in the
	/// byte order of `encoding`, and are swapped if their BOM declares the other order.
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::TextEncoding;
	/// use mp3meta::id3::v2::EncodedText;
	///
	/// let text = EncodedText::from_bytes(TextEncoding::UTF16, &[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x00]);
	/// assert_eq!(text.value(), &[0x41, 0x00]);
	/// assert_eq!(text.text().as_deref(), Some("A"));
	/// ```
	pub fn from_bytes(encoding: TextEncoding, bytes: &[u8]) -> Self {
		let mut swap = false;
		let mut value = match bytes {
			[0xFE, 0xFF, rest @ ..] => {
				swap = encoding == TextEncoding::UTF16;
				rest
			},
			[0xFF, 0xFE, rest @ ..] => {
				swap = encoding == TextEncoding::UTF16BE;
				rest
			},
			[0xEF, 0xBB, 0xBF, rest @ ..] => rest,
			_ => bytes,
		};

		let terminator = encoding.terminator();
		if let Some(stripped) = value.strip_suffix(terminator) {
			value = stripped;
		}

		let mut value = value.to_vec();
		if swap {
			for pair in value.chunks_exact_mut(2) {
				pair.swap(0, 1);
			}
		}

		Self { encoding, value }
	}

	/// Create an `EncodedText` from raw bytes, inferring the encoding from a leading BOM
	///
	/// `FF FE` is UTF-16, `FE FF` is UTF-16BE, `EF BB BF` is UTF-8, and anything else is
	/// ISO-8859-1.
	pub fn from_bom_bytes(bytes: &[u8]) -> Self {
		let encoding = match bytes {
			[0xFF, 0xFE, ..] => TextEncoding::UTF16,
			[0xFE, 0xFF, ..] => TextEncoding::UTF16BE,
			[0xEF, 0xBB, 0xBF, ..] => TextEncoding::UTF8,
			_ => TextEncoding::Latin1,
		};

		Self::from_bytes(encoding, bytes)
	}

	/// Create an `EncodedText` from a string, picking the first encoding that represents it losslessly
	///
	/// Encodings are tried in the order ISO-8859-1, UTF-16BE, UTF-16, UTF-8.
	///
	/// # Errors
	///
	/// No encoding can round-trip `text`
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::TextEncoding;
	/// use mp3meta::id3::v2::EncodedText;
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// assert_eq!(EncodedText::new("Pop")?.encoding(), TextEncoding::Latin1);
	/// assert_eq!(EncodedText::new("\u{4e2d}\u{6587}")?.encoding(), TextEncoding::UTF16BE);
	/// # Ok(()) }
	/// ```
	pub fn new(text: &str) -> Result<Self> {
		for encoding in TextEncoding::FALLBACK_ORDER {
			let Some(value) = encoding.encode(text) else {
				continue;
			};

			if encoding.decode(&value).as_deref() == Some(text) {
				return Ok(Self::from_bytes(encoding, &value));
			}
		}

		err!(
			InvalidEncoding,
			"Invalid string, could not find appropriate encoding"
		)
	}

	/// Create an `EncodedText` from a string in a specific encoding
	///
	/// NOTE: Asking for [`TextEncoding::Latin1`] produces [`TextEncoding::UTF16`] text instead.
	/// Files in the wild frequently carry non-Latin text under the ISO-8859-1 marker, so text
	/// built for them is widened to UTF-16 rather than risk losing characters.
	///
	/// # Errors
	///
	/// `text` cannot be represented in the target encoding
	pub fn with_encoding(encoding: TextEncoding, text: &str) -> Result<Self> {
		let encoding = match encoding {
			TextEncoding::Latin1 => TextEncoding::UTF16,
			other => other,
		};

		match encoding.encode(text) {
			Some(value) => Ok(Self::from_bytes(encoding, &value)),
			None => Err(unmappable(encoding)),
		}
	}

	/// Create an `EncodedText` from a string, then transcode it into `encoding`
	///
	/// # Errors
	///
	/// See [`EncodedText::new`] and [`EncodedText::set_encoding`]
	pub fn transcoded(text: &str, encoding: TextEncoding) -> Result<Self> {
		let mut encoded = Self::new(text)?;
		encoded.set_encoding(encoding, true)?;
		Ok(encoded)
	}

	/// The text encoding
	pub fn encoding(&self) -> TextEncoding {
		self.encoding
	}

	/// The encoded payload, without a BOM or terminator
	pub fn value(&self) -> &[u8] {
		&self.value
	}

	/// The terminator for this text's encoding
	pub fn terminator(&self) -> &'static [u8] {
		self.encoding.terminator()
	}

	/// Change the encoding of the text
	///
	/// With `transcode`, the payload is decoded under the current encoding and re-encoded under
	/// the new one. Otherwise only the encoding marker changes.
	///
	/// # Errors
	///
	/// * The current payload cannot be decoded
	/// * The decoded text cannot be represented in `encoding`
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::TextEncoding;
	/// use mp3meta::error::ErrorKind;
	/// use mp3meta::id3::v2::EncodedText;
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// let mut text = EncodedText::new("\u{4e2d}")?;
	/// text.set_encoding(TextEncoding::UTF8, true)?;
	/// assert_eq!(text.value(), "\u{4e2d}".as_bytes());
	///
	/// let err = text.set_encoding(TextEncoding::Latin1, true).unwrap_err();
	/// assert_eq!(err.kind(), ErrorKind::UnmappableCharacter);
	/// # Ok(()) }
	/// ```
	pub fn set_encoding(&mut self, encoding: TextEncoding, transcode: bool) -> Result<()> {
		if self.encoding == encoding {
			return Ok(());
		}

		if transcode {
			let Some(decoded) = self.encoding.decode(&self.value) else {
				return Err(unmappable(self.encoding));
			};

			match encoding.encode(&decoded) {
				Some(value) => self.value = value,
				None => return Err(unmappable(encoding)),
			}
		}

		self.encoding = encoding;
		Ok(())
	}

	/// Serialize the text, optionally with a BOM and terminator
	///
	/// The BOM is empty for single-byte encodings. When nothing is added, the payload is
	/// borrowed as-is.
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::TextEncoding;
	/// use mp3meta::id3::v2::EncodedText;
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// let text = EncodedText::with_encoding(TextEncoding::UTF16, "A")?;
	/// assert_eq!(&*text.to_bytes(false, false), &[0x41, 0x00]);
	/// assert_eq!(&*text.to_bytes(true, true), &[0xFF, 0xFE, 0x41, 0x00, 0x00, 0x00]);
	/// # Ok(()) }
	/// ```
	pub fn to_bytes(&self, include_bom: bool, include_terminator: bool) -> Cow<'_, [u8]> {
		let bom = if include_bom { self.encoding.bom() } else { &[] };
		let terminator = if include_terminator {
			self.encoding.terminator()
		} else {
			&[]
		};

		if bom.is_empty() && terminator.is_empty() {
			return Cow::Borrowed(&self.value);
		}

		let mut bytes = Vec::with_capacity(bom.len() + self.value.len() + terminator.len());
		bytes.extend_from_slice(bom);
		bytes.extend_from_slice(&self.value);
		bytes.extend_from_slice(terminator);

		Cow::Owned(bytes)
	}

	/// Decode the text, stopping at the first embedded terminator
	///
	/// Text marked as ISO-8859-1 is run through charset detection first, as many taggers write
	/// UTF-8 or a local code page under that marker.
	///
	/// Returns `None` if the payload cannot be decoded, such as an odd-length UTF-16 buffer.
	pub fn text(&self) -> Option<String> {
		let mut decoded = match self.encoding {
			TextEncoding::Latin1 => charset::decode_legacy(&self.value)?,
			other => other.decode(&self.value)?,
		};
		if let Some(end) = decoded.find('\0') {
			decoded.truncate(end);
		}

		Some(decoded)
	}
}

fn unmappable(encoding: TextEncoding) -> Mp3MetaError {
	Mp3MetaError::new(
		ErrorKind::UnmappableCharacter,
		format!("Text cannot be represented as {encoding:?}"),
	)
}

#[cfg(test)]
mod tests {
	use super::EncodedText;
	use crate::error::ErrorKind;
	use crate::util::text::TextEncoding;

	use std::borrow::Cow;

	const TEST_STRING: &str = "l\u{00f8}ft\u{00a5}";

	#[test_log::test]
	fn strips_bom_and_terminator() {
		let text = EncodedText::from_bytes(TextEncoding::UTF16, &[0xFF, 0xFE, 0x41, 0x00, 0x00, 0x00]);
		assert_eq!(text.value(), &[0x41, 0x00]);

		let text = EncodedText::from_bytes(TextEncoding::UTF8, &[0xEF, 0xBB, 0xBF, b'h', b'i', 0]);
		assert_eq!(text.value(), b"hi");

		// Only a single terminator is removed
		let text = EncodedText::from_bytes(TextEncoding::Latin1, b"ab\0\0");
		assert_eq!(text.value(), b"ab\0");
		assert_eq!(text.text().as_deref(), Some("ab"));
	}

	#[test_log::test]
	fn big_endian_bom_is_normalized() {
		let be = EncodedText::from_bytes(
			TextEncoding::UTF16,
			&[0xFE, 0xFF, 0x00, 0x6C, 0x00, 0xF8],
		);
		let le = EncodedText::from_bytes(
			TextEncoding::UTF16,
			&[0xFF, 0xFE, 0x6C, 0x00, 0xF8, 0x00],
		);

		assert_eq!(be, le);
		assert_eq!(be.text().as_deref(), Some("l\u{00f8}"));
	}

	#[test_log::test]
	fn bom_inference() {
		assert_eq!(
			EncodedText::from_bom_bytes(&[0xFF, 0xFE, 0x41, 0x00]).encoding(),
			TextEncoding::UTF16
		);
		assert_eq!(
			EncodedText::from_bom_bytes(&[0xFE, 0xFF, 0x00, 0x41]).encoding(),
			TextEncoding::UTF16BE
		);
		assert_eq!(
			EncodedText::from_bom_bytes(&[0xEF, 0xBB, 0xBF, 0x41]).encoding(),
			TextEncoding::UTF8
		);
		assert_eq!(
			EncodedText::from_bom_bytes(b"plain").encoding(),
			TextEncoding::Latin1
		);
	}

	#[test_log::test]
	fn fallback_order() {
		assert_eq!(
			EncodedText::new(TEST_STRING).unwrap().encoding(),
			TextEncoding::Latin1
		);
		assert_eq!(
			EncodedText::new("\u{1F600}").unwrap().encoding(),
			TextEncoding::UTF16BE
		);
	}

	#[test_log::test]
	fn round_trip_every_encoding() {
		for encoding in [TextEncoding::UTF16, TextEncoding::UTF16BE, TextEncoding::UTF8] {
			let text = EncodedText::with_encoding(encoding, TEST_STRING).unwrap();
			let bytes = text.to_bytes(true, true);
			let reparsed = EncodedText::from_bytes(encoding, &bytes);

			assert_eq!(reparsed, text);
			assert_eq!(reparsed.text().as_deref(), Some(TEST_STRING));
		}

		let latin1 = EncodedText::new("Caf\u{e9}").unwrap();
		let reparsed = EncodedText::from_bytes(TextEncoding::Latin1, &latin1.to_bytes(true, true));
		assert_eq!(reparsed, latin1);
		assert_eq!(reparsed.text().as_deref(), Some("Caf\u{e9}"));
	}

	#[test_log::test]
	fn latin1_request_is_widened() {
		let text = EncodedText::with_encoding(TextEncoding::Latin1, "abc").unwrap();
		assert_eq!(text.encoding(), TextEncoding::UTF16);
	}

	#[test_log::test]
	fn to_bytes_borrows_when_unchanged() {
		let text = EncodedText::new("abc").unwrap();
		assert!(matches!(text.to_bytes(false, false), Cow::Borrowed(_)));
		// Single-byte encodings have no BOM
		assert!(matches!(text.to_bytes(true, false), Cow::Borrowed(_)));
		assert_eq!(&*text.to_bytes(true, true), b"abc\0");
	}

	#[test_log::test]
	fn transcoding() {
		let mut text = EncodedText::new(TEST_STRING).unwrap();
		text.set_encoding(TextEncoding::UTF16BE, true).unwrap();
		assert_eq!(text.value().len(), TEST_STRING.chars().count() * 2);
		assert_eq!(text.text().as_deref(), Some(TEST_STRING));

		let mut wide = EncodedText::new("\u{4e2d}").unwrap();
		assert_eq!(
			wide.set_encoding(TextEncoding::Latin1, true)
				.unwrap_err()
				.kind(),
			ErrorKind::UnmappableCharacter
		);

		let transcoded = EncodedText::transcoded("abc", TextEncoding::UTF8).unwrap();
		assert_eq!(transcoded.encoding(), TextEncoding::UTF8);
	}

	#[test_log::test]
	fn latin1_marker_uses_detection() {
		let text = EncodedText::from_bytes(TextEncoding::Latin1, "l\u{00f8}ft".as_bytes());
		assert_eq!(text.text().as_deref(), Some("l\u{00f8}ft"));
	}

	#[test_log::test]
	fn latin1_marker_with_code_page_text() {
		// "Привет" in windows-1251
		let text = EncodedText::from_bytes(TextEncoding::Latin1, &[0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2]);
		assert_eq!(
			text.text().as_deref(),
			Some("\u{41f}\u{440}\u{438}\u{432}\u{435}\u{442}")
		);
	}

	#[test_log::test]
	fn undecodable_text() {
		let text = EncodedText::from_bytes(TextEncoding::UTF16BE, &[0x00, 0x41, 0x00]);
		assert_eq!(text.text(), None);
	}
}
