use super::{EncodedText, FramePayload, read_encoded_terminated, read_encoding, write_description};
use crate::error::Result;
use crate::macros::decode_err;
use crate::util::text::{TextEncoding, latin1_decode, latin1_encode};

/// The language written when none is given
pub const DEFAULT_LANGUAGE: &str = "eng";

/// An `ID3v2` comment frame ("COMM")
///
/// The layout is an encoding byte, a 3 byte language code, a terminated description, and the
/// comment itself. The description and comment share the encoding byte.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommentFrame {
	/// ISO-639-2 language code
	///
	/// Padded with zeros or truncated to 3 characters when written.
	pub language: String,
	/// Description of the comment, empty if there is none
	pub description: EncodedText,
	/// The comment
	pub content: EncodedText,
}

impl CommentFrame {
	/// Create a new [`CommentFrame`]
	///
	/// The description is transcoded into the encoding of `content`.
	///
	/// # Errors
	///
	/// `description` cannot be represented in the encoding of `content`
	pub fn new(
		language: impl Into<String>,
		description: &str,
		content: EncodedText,
	) -> Result<Self> {
		let description = if description.is_empty() {
			EncodedText::from_bytes(content.encoding(), &[])
		} else {
			EncodedText::transcoded(description, content.encoding())?
		};

		Ok(Self {
			language: language.into(),
			description,
			content,
		})
	}

	/// The language code as written, always 3 bytes
	fn language_bytes(&self) -> Result<[u8; 3]> {
		let Some(encoded) = latin1_encode(&self.language) else {
			return Err(decode_err!("Comment language cannot be written as ISO-8859-1"));
		};

		let mut language = [0; 3];
		for (dest, src) in language.iter_mut().zip(encoded) {
			*dest = src;
		}

		Ok(language)
	}
}

impl FramePayload for CommentFrame {
	fn unpack(bytes: &[u8]) -> Result<Self> {
		let encoding = read_encoding(bytes)?;
		let Some(language) = bytes.get(1..4) else {
			return Err(decode_err!("Comment frame is too short"));
		};

		let (description, content_start) = read_encoded_terminated(bytes, 4, encoding, 4);

		Ok(Self {
			language: latin1_decode(language),
			description,
			content: EncodedText::from_bytes(encoding, &bytes[content_start..]),
		})
	}

	fn pack(&self) -> Result<Vec<u8>> {
		let encoding = self.content.encoding();
		if self.description.encoding() != encoding && !self.description.value().is_empty() {
			return Err(decode_err!(
				"Comment description and content must share an encoding"
			));
		}

		let mut bytes = vec![encoding as u8];
		bytes.extend_from_slice(&self.language_bytes()?);

		if self.description.value().is_empty() {
			write_description(&mut bytes, &EncodedText::from_bytes(encoding, &[]));
		} else {
			write_description(&mut bytes, &self.description);
		}

		bytes.extend_from_slice(&self.content.to_bytes(true, false));
		Ok(bytes)
	}
}

impl Default for CommentFrame {
	fn default() -> Self {
		Self {
			language: DEFAULT_LANGUAGE.to_owned(),
			description: EncodedText::from_bytes(TextEncoding::Latin1, &[]),
			content: EncodedText::from_bytes(TextEncoding::Latin1, &[]),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::CommentFrame;
	use crate::id3::v2::items::{EncodedText, FramePayload};
	use crate::util::text::TextEncoding;

	#[test_log::test]
	fn comment_layout() {
		let frame = CommentFrame::new("eng", "", EncodedText::new("Nice").unwrap()).unwrap();
		let packed = frame.pack().unwrap();
		assert_eq!(packed, b"\0eng\0Nice");

		let reparsed = CommentFrame::unpack(&packed).unwrap();
		assert_eq!(reparsed.language, "eng");
		assert!(reparsed.description.value().is_empty());
		assert_eq!(reparsed.content.text().as_deref(), Some("Nice"));
	}

	#[test_log::test]
	fn utf16_comment_with_description() {
		let content = EncodedText::with_encoding(TextEncoding::UTF16, "Body").unwrap();
		let frame = CommentFrame::new("deu", "Desc", content).unwrap();
		assert_eq!(frame.description.encoding(), TextEncoding::UTF16);

		let reparsed = CommentFrame::unpack(&frame.pack().unwrap()).unwrap();
		assert_eq!(reparsed, frame);
		assert_eq!(reparsed.description.text().as_deref(), Some("Desc"));
		assert_eq!(reparsed.content.text().as_deref(), Some("Body"));
	}

	#[test_log::test]
	fn empty_utf16_description_is_aligned() {
		let content = EncodedText::with_encoding(TextEncoding::UTF16, "Body").unwrap();
		let frame = CommentFrame::new("eng", "", content).unwrap();

		// BOM, then the terminator
		let packed = frame.pack().unwrap();
		assert_eq!(&packed[4..8], &[0xFF, 0xFE, 0x00, 0x00]);

		let reparsed = CommentFrame::unpack(&packed).unwrap();
		assert!(reparsed.description.value().is_empty());
		assert_eq!(reparsed.content.text().as_deref(), Some("Body"));
	}

	#[test_log::test]
	fn language_is_padded_and_truncated() {
		let mut frame = CommentFrame {
			content: EncodedText::new("x").unwrap(),
			..CommentFrame::default()
		};

		frame.language = String::from("en");
		assert_eq!(&frame.pack().unwrap()[1..4], b"en\0");

		frame.language = String::from("english");
		assert_eq!(&frame.pack().unwrap()[1..4], b"eng");
	}

	#[test_log::test]
	fn missing_description_terminator() {
		let frame = CommentFrame::unpack(b"\0engabc").unwrap();
		assert!(frame.description.value().is_empty());
		assert_eq!(frame.content.text().as_deref(), Some("abc"));

		assert!(CommentFrame::unpack(b"\0en").is_err());
	}
}
