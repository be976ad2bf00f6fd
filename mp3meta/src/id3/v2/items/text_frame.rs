use super::{EncodedText, FramePayload, read_encoding};
use crate::error::Result;

/// An `ID3v2` text information frame ("T...")
///
/// The layout is an encoding byte followed by the text, with a BOM and no terminator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextFrame {
	/// The text
	pub value: EncodedText,
}

impl TextFrame {
	/// Create a new [`TextFrame`]
	pub fn new(value: EncodedText) -> Self {
		Self { value }
	}
}

impl FramePayload for TextFrame {
	fn unpack(bytes: &[u8]) -> Result<Self> {
		let encoding = read_encoding(bytes)?;
		Ok(Self {
			value: EncodedText::from_bytes(encoding, &bytes[1..]),
		})
	}

	fn pack(&self) -> Result<Vec<u8>> {
		let text = self.value.to_bytes(true, false);

		let mut bytes = Vec::with_capacity(1 + text.len());
		bytes.push(self.value.encoding() as u8);
		bytes.extend_from_slice(&text);

		Ok(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::TextFrame;
	use crate::id3::v2::items::{EncodedText, FramePayload};
	use crate::util::text::TextEncoding;

	#[test_log::test]
	fn text_frame_layout() {
		let frame = TextFrame::new(EncodedText::new("Title").unwrap());
		assert_eq!(frame.pack().unwrap(), b"\0Title");

		let frame =
			TextFrame::new(EncodedText::with_encoding(TextEncoding::UTF16, "Hi").unwrap());
		let packed = frame.pack().unwrap();
		assert_eq!(packed, [1, 0xFF, 0xFE, b'H', 0, b'i', 0]);

		let reparsed = TextFrame::unpack(&packed).unwrap();
		assert_eq!(reparsed, frame);
		assert_eq!(reparsed.value.text().as_deref(), Some("Hi"));
	}

	#[test_log::test]
	fn terminated_text_is_accepted() {
		let frame = TextFrame::unpack(b"\x03Album\0").unwrap();
		assert_eq!(frame.value.encoding(), TextEncoding::UTF8);
		assert_eq!(frame.value.text().as_deref(), Some("Album"));
	}

	#[test_log::test]
	fn unsynchronised_text() {
		let frame = TextFrame::new(EncodedText::from_bytes(TextEncoding::Latin1, &[0xFF, 0xE0]));
		let bytes = frame.to_frame_bytes(true).unwrap();
		assert_eq!(bytes, [0x00, 0xFF, 0x00, 0xE0]);

		let reparsed = TextFrame::from_frame_bytes(&bytes, true).unwrap();
		assert_eq!(reparsed, frame);
	}

	#[test_log::test]
	fn invalid_encoding_byte() {
		assert!(TextFrame::unpack(b"\x09abc").is_err());
		assert!(TextFrame::unpack(b"").is_err());
	}
}
