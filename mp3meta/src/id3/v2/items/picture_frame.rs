use super::{EncodedText, FramePayload, read_encoded_terminated, read_encoding, write_description};
use crate::error::Result;
use crate::macros::decode_err;
use crate::util::buffer::index_of_terminator;
use crate::util::text::{TextEncoding, latin1_decode, latin1_encode};

const UNKNOWN_MIME_TYPE: &str = "image/unknown";

/// An `ID3v2` attached picture frame ("APIC")
///
/// The layout is an encoding byte, a terminated ISO-8859-1 MIME type, the picture type, a
/// terminated description, and the image data.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PictureFrame {
	/// The MIME type of the image, such as "image/jpeg"
	pub mime_type: String,
	/// The picture type byte, 0 is "Other" and 3 is "Cover (front)"
	pub picture_type: u8,
	/// Description of the picture, empty if there is none
	pub description: EncodedText,
	/// The image data
	pub data: Vec<u8>,
}

impl PictureFrame {
	/// Create a [`PictureFrame`] without a description
	pub fn new(mime_type: impl Into<String>, picture_type: u8, data: Vec<u8>) -> Self {
		Self {
			mime_type: mime_type.into(),
			picture_type,
			description: EncodedText::from_bytes(TextEncoding::Latin1, &[]),
			data,
		}
	}
}

impl FramePayload for PictureFrame {
	fn unpack(bytes: &[u8]) -> Result<Self> {
		let encoding = read_encoding(bytes)?;

		let Some(mime_end) = index_of_terminator(bytes, 1, 1) else {
			log::warn!("Picture frame has no MIME type terminator, treating the content as image data");
			return Ok(Self {
				mime_type: UNKNOWN_MIME_TYPE.to_owned(),
				picture_type: 0,
				description: EncodedText::from_bytes(encoding, &[]),
				data: bytes[1..].to_vec(),
			});
		};

		let Some(picture_type) = bytes.get(mime_end + 1) else {
			return Err(decode_err!("Picture frame is too short"));
		};

		let description_start = mime_end + 2;
		let (description, data_start) =
			read_encoded_terminated(bytes, description_start, encoding, description_start);

		Ok(Self {
			mime_type: latin1_decode(&bytes[1..mime_end]),
			picture_type: *picture_type,
			description,
			data: bytes[data_start..].to_vec(),
		})
	}

	fn pack(&self) -> Result<Vec<u8>> {
		let Some(mime_type) = latin1_encode(&self.mime_type) else {
			return Err(decode_err!("MIME type cannot be written as ISO-8859-1"));
		};

		let mut bytes = Vec::with_capacity(mime_type.len() + self.data.len() + 8);
		bytes.push(self.description.encoding() as u8);
		bytes.extend_from_slice(&mime_type);
		bytes.push(0);
		bytes.push(self.picture_type);
		write_description(&mut bytes, &self.description);
		bytes.extend_from_slice(&self.data);

		Ok(bytes)
	}
}

/// An `ID3v2.2` attached picture frame ("PIC")
///
/// Rather than a MIME type, the image format is a 3 character code such as "JPG" or "PNG".
/// It is exposed as the MIME type `image/<code>` in lower case.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObsoletePictureFrame {
	/// The MIME type of the image, derived from the image format code
	pub mime_type: String,
	/// The picture type byte
	pub picture_type: u8,
	/// Description of the picture, empty if there is none
	pub description: EncodedText,
	/// The image data
	pub data: Vec<u8>,
}

impl ObsoletePictureFrame {
	/// The 3 character image format code, as written
	pub fn image_format(&self) -> [u8; 3] {
		let code = self
			.mime_type
			.strip_prefix("image/")
			.unwrap_or(&self.mime_type)
			.to_ascii_uppercase();

		let mut format = [0; 3];
		for (dest, src) in format.iter_mut().zip(code.bytes()) {
			*dest = src;
		}

		format
	}
}

impl From<ObsoletePictureFrame> for PictureFrame {
	fn from(value: ObsoletePictureFrame) -> Self {
		PictureFrame {
			mime_type: value.mime_type,
			picture_type: value.picture_type,
			description: value.description,
			data: value.data,
		}
	}
}

impl FramePayload for ObsoletePictureFrame {
	fn unpack(bytes: &[u8]) -> Result<Self> {
		let encoding = read_encoding(bytes)?;
		let (Some(image_format), Some(picture_type)) = (bytes.get(1..4), bytes.get(4)) else {
			return Err(decode_err!("Picture frame is too short"));
		};

		let (description, data_start) = read_encoded_terminated(bytes, 5, encoding, 5);

		Ok(Self {
			mime_type: format!("image/{}", latin1_decode(image_format).to_lowercase()),
			picture_type: *picture_type,
			description,
			data: bytes[data_start..].to_vec(),
		})
	}

	fn pack(&self) -> Result<Vec<u8>> {
		let mut bytes = Vec::with_capacity(self.data.len() + 8);
		bytes.push(self.description.encoding() as u8);
		bytes.extend_from_slice(&self.image_format());
		bytes.push(self.picture_type);
		write_description(&mut bytes, &self.description);
		bytes.extend_from_slice(&self.data);

		Ok(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::{ObsoletePictureFrame, PictureFrame};
	use crate::id3::v2::items::{EncodedText, FramePayload};
	use crate::util::text::TextEncoding;

	const IMAGE: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

	#[test_log::test]
	fn picture_layout() {
		let frame = PictureFrame::new("image/jpeg", 3, IMAGE.to_vec());
		let packed = frame.pack().unwrap();

		let mut expected = b"\0image/jpeg\0\x03\0".to_vec();
		expected.extend_from_slice(IMAGE);
		assert_eq!(packed, expected);

		let reparsed = PictureFrame::unpack(&packed).unwrap();
		assert_eq!(reparsed, frame);
	}

	#[test_log::test]
	fn picture_with_utf16_description() {
		let mut frame = PictureFrame::new("image/png", 0, IMAGE.to_vec());
		frame.description = EncodedText::with_encoding(TextEncoding::UTF16, "Cover").unwrap();

		let reparsed = PictureFrame::unpack(&frame.pack().unwrap()).unwrap();
		assert_eq!(reparsed.description.text().as_deref(), Some("Cover"));
		assert_eq!(reparsed.data, IMAGE);
	}

	#[test_log::test]
	fn empty_utf16_description_keeps_its_bom() {
		let mut frame = PictureFrame::new("image/png", 3, IMAGE.to_vec());
		frame.description = EncodedText::with_encoding(TextEncoding::UTF16, "").unwrap();

		let mut expected = b"\x01image/png\0\x03\xFF\xFE\0\0".to_vec();
		expected.extend_from_slice(IMAGE);
		let packed = frame.pack().unwrap();
		assert_eq!(packed, expected);

		let reparsed = PictureFrame::unpack(&packed).unwrap();
		assert!(reparsed.description.value().is_empty());
		assert_eq!(reparsed.data, IMAGE);
	}

	#[test_log::test]
	fn missing_mime_terminator() {
		let frame = PictureFrame::unpack(b"\x00image/jpeg").unwrap();
		assert_eq!(frame.mime_type, "image/unknown");
		assert_eq!(frame.data, b"image/jpeg");

		assert!(PictureFrame::unpack(b"\x00image/jpeg\0").is_err());
	}

	#[test_log::test]
	fn obsolete_picture() {
		let mut bytes = b"\0PNG\x03Front\0".to_vec();
		bytes.extend_from_slice(IMAGE);

		let frame = ObsoletePictureFrame::unpack(&bytes).unwrap();
		assert_eq!(frame.mime_type, "image/png");
		assert_eq!(frame.picture_type, 3);
		assert_eq!(frame.description.text().as_deref(), Some("Front"));
		assert_eq!(frame.data, IMAGE);

		assert_eq!(frame.pack().unwrap(), bytes);
	}

	#[test_log::test]
	fn obsolete_picture_without_description() {
		let mut bytes = b"\0JPG\x00".to_vec();
		bytes.extend_from_slice(&[0x01, 0x02, 0x03]);

		let frame = ObsoletePictureFrame::unpack(&bytes).unwrap();
		assert!(frame.description.value().is_empty());
		assert_eq!(frame.data, [0x01, 0x02, 0x03]);
	}
}
