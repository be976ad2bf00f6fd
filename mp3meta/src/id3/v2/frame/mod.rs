mod content;
mod set;

pub use set::FrameSet;

use crate::error::{ErrorKind, Mp3MetaError, Result};
use crate::id3::v2::items::FrameData;
use crate::id3::v2::util::synchsafe::{pack_synchsafe, synchronise, unpack_synchsafe, unsynchronise};
use crate::macros::{decode_err, err};
use crate::util::buffer::{pack_int, unpack_int};

use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder};

/// The layout of a frame header
///
/// A frame's header format follows the tag it was read from:
///
/// * ID3v2.2 tags written with 3 character IDs use [`FrameHeaderFormat::Obsolete`]
/// * ID3v2.2 tags written with 4 character IDs and ID3v2.3 tags use [`FrameHeaderFormat::V23`]
/// * ID3v2.4 tags use [`FrameHeaderFormat::V24`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameHeaderFormat {
	/// 6 bytes: a 3 character ID and a 3 byte plain size, no flags
	///
	/// Frames in this format cannot be written.
	Obsolete,
	/// 10 bytes: a 4 character ID, a plain 4 byte size, and ID3v2.3 flags
	V23,
	/// 10 bytes: a 4 character ID, a synchsafe 4 byte size, and ID3v2.4 flags
	V24,
}

impl FrameHeaderFormat {
	/// The size of the frame header
	pub fn header_len(self) -> usize {
		match self {
			Self::Obsolete => 6,
			Self::V23 | Self::V24 => 10,
		}
	}

	/// The length of the frame ID
	pub fn id_len(self) -> usize {
		match self {
			Self::Obsolete => 3,
			Self::V23 | Self::V24 => 4,
		}
	}
}

/// Various flags to describe the content of a frame
///
/// Obsolete frames have no flags, and all fields will be `false`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct FrameFlags {
	/// Preserve frame on tag edit
	pub tag_alter_preservation: bool,
	/// Preserve frame on file edit
	pub file_alter_preservation: bool,
	/// Item cannot be written to
	pub read_only: bool,
	/// The frame content is preceded by a group identifier byte
	pub grouping_identity: bool,
	/// Frame is zlib compressed
	///
	/// In ID3v2.3, the content is preceded by the 4 byte decompressed size. In ID3v2.4,
	/// `data_length_indicator` must be set as well.
	pub compression: bool,
	/// Frame is encrypted
	///
	/// NOTE: Since the encryption method is unknown, these frames cannot be decoded
	pub encryption: bool,
	/// Frame is unsynchronised (ID3v2.4 only)
	pub unsynchronisation: bool,
	/// The frame content is preceded by a synchsafe data length indicator (ID3v2.4 only)
	pub data_length_indicator: bool,
}

impl FrameFlags {
	/// Parse the flags from an ID3v2.4 frame
	pub fn parse_id3v24(flags: u16) -> Self {
		FrameFlags {
			tag_alter_preservation: flags & 0x4000 == 0x4000,
			file_alter_preservation: flags & 0x2000 == 0x2000,
			read_only: flags & 0x1000 == 0x1000,
			grouping_identity: flags & 0x0040 == 0x0040,
			compression: flags & 0x0008 == 0x0008,
			encryption: flags & 0x0004 == 0x0004,
			unsynchronisation: flags & 0x0002 == 0x0002,
			data_length_indicator: flags & 0x0001 == 0x0001,
		}
	}

	/// Parse the flags from an ID3v2.3 frame
	pub fn parse_id3v23(flags: u16) -> Self {
		FrameFlags {
			tag_alter_preservation: flags & 0x8000 == 0x8000,
			file_alter_preservation: flags & 0x4000 == 0x4000,
			read_only: flags & 0x2000 == 0x2000,
			grouping_identity: flags & 0x0020 == 0x0020,
			compression: flags & 0x0080 == 0x0080,
			encryption: flags & 0x0040 == 0x0040,
			unsynchronisation: false,
			data_length_indicator: false,
		}
	}

	/// Get the ID3v2.4 byte representation of the flags
	pub fn as_id3v24_bytes(&self) -> u16 {
		let mut flags = 0;

		if *self == FrameFlags::default() {
			return flags;
		}

		if self.tag_alter_preservation {
			flags |= 0x4000
		}

		if self.file_alter_preservation {
			flags |= 0x2000
		}

		if self.read_only {
			flags |= 0x1000
		}

		if self.grouping_identity {
			flags |= 0x0040
		}

		if self.compression {
			flags |= 0x0008
		}

		if self.encryption {
			flags |= 0x0004
		}

		if self.unsynchronisation {
			flags |= 0x0002
		}

		if self.data_length_indicator {
			flags |= 0x0001
		}

		flags
	}

	/// Get the ID3v2.3 byte representation of the flags
	///
	/// NOTE: ID3v2.3 has no frame level unsynchronisation or data length indicator
	pub fn as_id3v23_bytes(&self) -> u16 {
		let mut flags = 0;

		if *self == FrameFlags::default() {
			return flags;
		}

		if self.tag_alter_preservation {
			flags |= 0x8000
		}

		if self.file_alter_preservation {
			flags |= 0x4000
		}

		if self.read_only {
			flags |= 0x2000
		}

		if self.grouping_identity {
			flags |= 0x0020
		}

		if self.compression {
			flags |= 0x0080
		}

		if self.encryption {
			flags |= 0x0040
		}

		flags
	}
}

/// Whether `id` is a valid frame ID for `format`
///
/// IDs are made of 'A'..='Z' and '0'..='9'.
pub(crate) fn is_valid_id(id: &[u8], format: FrameHeaderFormat) -> bool {
	id.len() == format.id_len() && id.iter().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// A raw `ID3v2` frame
///
/// The content is kept as-is, use [`Frame::decode`] to interpret it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Frame {
	id: String,
	data: Vec<u8>,
	flags: FrameFlags,
	format: FrameHeaderFormat,
}

impl Frame {
	/// Create a new frame
	///
	/// # Errors
	///
	/// * `id` contains invalid characters (must be 'A'..='Z' and '0'..='9')
	/// * `id` is an invalid length for `format` (3 for obsolete frames, 4 otherwise)
	///
	/// # Examples
	///
	/// ```rust
	/// use mp3meta::id3::v2::{Frame, FrameHeaderFormat};
	///
	/// # fn main() -> mp3meta::error::Result<()> {
	/// let frame = Frame::new("TPE1", b"\0Artist".to_vec(), FrameHeaderFormat::V23)?;
	/// assert_eq!(frame.len(), 17);
	///
	/// assert!(Frame::new("TP1", Vec::new(), FrameHeaderFormat::V24).is_err());
	/// # Ok(()) }
	/// ```
	pub fn new(id: impl Into<String>, data: Vec<u8>, format: FrameHeaderFormat) -> Result<Self> {
		let id = id.into();
		if !is_valid_id(id.as_bytes(), format) {
			err!(InvalidArgument, format!("Not a valid frame ID: {id:?}"));
		}

		Ok(Self {
			id,
			data,
			flags: FrameFlags::default(),
			format,
		})
	}

	/// Read a frame at `offset` in `bytes`
	///
	/// # Errors
	///
	/// * The frame ID is not valid, this is expected when hitting padding
	/// * The header or content extend past the end of `bytes`
	pub(crate) fn parse(bytes: &[u8], offset: usize, format: FrameHeaderFormat) -> Result<Self> {
		let header_len = format.header_len();
		let Some(header) = offset
			.checked_add(header_len)
			.and_then(|end| bytes.get(offset..end))
		else {
			return Err(premature_end(offset + header_len, bytes.len()));
		};

		let id_bytes = &header[..format.id_len()];
		if !is_valid_id(id_bytes, format) {
			return Err(decode_err!(format!(
				"Not a valid frame - invalid tag {}",
				String::from_utf8_lossy(id_bytes)
			)));
		}

		let (size, flags) = match format {
			FrameHeaderFormat::Obsolete => (
				unpack_int(&[0, header[3], header[4], header[5]]),
				FrameFlags::default(),
			),
			FrameHeaderFormat::V23 => (
				unpack_int(&header[4..8]),
				FrameFlags::parse_id3v23(BigEndian::read_u16(&header[8..])),
			),
			FrameHeaderFormat::V24 => (
				unpack_synchsafe([header[4], header[5], header[6], header[7]]),
				FrameFlags::parse_id3v24(BigEndian::read_u16(&header[8..])),
			),
		};

		let start = offset + header_len;
		let end = start + size as usize;
		let Some(data) = bytes.get(start..end) else {
			return Err(premature_end(end, bytes.len()));
		};

		// IDs are validated to be ASCII above
		let id = String::from_utf8_lossy(id_bytes).into_owned();

		log::trace!("Read frame {id} ({size} bytes)");

		Ok(Self {
			id,
			data: data.to_vec(),
			flags,
			format,
		})
	}

	/// The frame ID
	pub fn id(&self) -> &str {
		&self.id
	}

	/// The raw frame content
	pub fn data(&self) -> &[u8] {
		&self.data
	}

	/// Replace the raw frame content
	pub fn set_data(&mut self, data: Vec<u8>) {
		self.data = data;
	}

	/// The frame flags
	pub fn flags(&self) -> FrameFlags {
		self.flags
	}

	/// Set the frame flags
	///
	/// NOTE: Flags are written as-is, the content must already match them.
	pub fn set_flags(&mut self, flags: FrameFlags) {
		self.flags = flags;
	}

	// The data is re-encoded, so the content stays the same
	pub(crate) fn set_unsynchronisation(&mut self, unsynchronisation: bool) {
		if self.flags.unsynchronisation == unsynchronisation {
			return;
		}

		self.data = if unsynchronisation {
			unsynchronise(&self.data).into_owned()
		} else {
			synchronise(&self.data).into_owned()
		};
		self.flags.unsynchronisation = unsynchronisation;
	}

	/// The header format of the frame
	pub fn format(&self) -> FrameHeaderFormat {
		self.format
	}

	// Moving between V23 and V24 only changes how the header is written
	pub(crate) fn set_format(&mut self, format: FrameHeaderFormat) -> Result<()> {
		if self.format == FrameHeaderFormat::Obsolete || !is_valid_id(self.id.as_bytes(), format) {
			err!(
				NotSupported,
				format!("Frame {} cannot be converted to {format:?}", self.id)
			);
		}

		self.format = format;
		Ok(())
	}

	/// Whether the frame is in the obsolete (3 character ID) format
	pub fn is_obsolete(&self) -> bool {
		self.format == FrameHeaderFormat::Obsolete
	}

	/// The size of the frame content
	pub fn data_length(&self) -> usize {
		self.data.len()
	}

	/// The size of the frame, including its header
	pub fn len(&self) -> usize {
		self.format.header_len() + self.data.len()
	}

	/// Whether the frame has no content
	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// Convert the frame to bytes, including its header
	///
	/// # Errors
	///
	/// * The frame is obsolete
	/// * The content is too large for the frame size field
	pub fn as_bytes(&self) -> Result<Vec<u8>> {
		let mut bytes = Vec::with_capacity(self.len());
		self.write_to(&mut bytes)?;
		Ok(bytes)
	}

	pub(crate) fn write_to(&self, writer: &mut Vec<u8>) -> Result<()> {
		let Ok(size) = u32::try_from(self.data.len()) else {
			err!(InvalidData, "Frame content is too large");
		};

		let (size, flags) = match self.format {
			FrameHeaderFormat::Obsolete => {
				err!(NotSupported, "Packing Obsolete frames is not supported")
			},
			FrameHeaderFormat::V23 => (pack_int(size), self.flags.as_id3v23_bytes()),
			FrameHeaderFormat::V24 => (pack_synchsafe(size)?, self.flags.as_id3v24_bytes()),
		};

		writer.extend_from_slice(self.id.as_bytes());
		writer.extend_from_slice(&size);
		writer.extend_from_slice(&flags.to_be_bytes());
		writer.extend_from_slice(&self.data);

		Ok(())
	}

	/// The frame content with frame level flags removed
	///
	/// This undoes (in order) unsynchronisation, the grouping and size prefixes, and compression.
	/// `tag_unsynchronisation` is the ID3v2.4 tag wide setting, which applies to every frame.
	///
	/// The returned `bool` is whether the content still needs to be synchronised by the caller.
	/// It is `false` if synchronisation already had to happen to get to the content.
	///
	/// # Errors
	///
	/// * The frame is encrypted
	/// * The frame is compressed and the `id3v2_compression_support` feature is disabled
	/// * The frame is too short for its flags
	/// * The compressed content is invalid
	pub fn content(&self, tag_unsynchronisation: bool) -> Result<(Cow<'_, [u8]>, bool)> {
		let unsynchronisation = tag_unsynchronisation || self.flags.unsynchronisation;

		if self.flags.encryption {
			err!(
				NotSupported,
				format!("Frame {} is encrypted, unable to decode", self.id)
			);
		}

		let flags = self.flags;
		if !(flags.compression || flags.grouping_identity || flags.data_length_indicator) {
			return Ok((Cow::Borrowed(&self.data), unsynchronisation));
		}

		let data = if unsynchronisation {
			synchronise(&self.data)
		} else {
			Cow::Borrowed(self.data.as_slice())
		};

		let mut prefix_len = 0;
		if flags.grouping_identity {
			log::trace!("Skipping group identifier of frame {}", self.id);
			prefix_len += 1;
		}

		// The ID3v2.3 decompressed size, or the ID3v2.4 data length indicator
		if flags.data_length_indicator
			|| (flags.compression && self.format != FrameHeaderFormat::V24)
		{
			prefix_len += 4;
		}

		if data.len() < prefix_len {
			return Err(decode_err!(format!("Frame {} is too short", self.id)));
		}

		let content = match data {
			Cow::Borrowed(data) => Cow::Borrowed(&data[prefix_len..]),
			Cow::Owned(mut data) => {
				data.drain(..prefix_len);
				Cow::Owned(data)
			},
		};

		if flags.compression {
			return Ok((Cow::Owned(decompress(&content)?), false));
		}

		Ok((content, false))
	}

	/// Decode the frame content
	///
	/// The payload type is chosen by the frame ID:
	///
	/// | ID                       | Payload                       |
	/// |--------------------------|-------------------------------|
	/// | `APIC`                   | [`FrameData::Picture`]         |
	/// | `PIC`                    | [`FrameData::ObsoletePicture`] |
	/// | `COMM`, `COM`            | [`FrameData::Comment`]         |
	/// | `WXXX`, `WXX`            | [`FrameData::Url`]             |
	/// | `CHAP`                   | [`FrameData::Chapter`]         |
	/// | `CTOC`                   | [`FrameData::TableOfContents`] |
	/// | `T...` (excluding `TXXX`/`TXX`) | [`FrameData::Text`]     |
	/// | Anything else            | [`FrameData::Binary`]          |
	///
	/// # Errors
	///
	/// * See [`Frame::content`]
	/// * The payload is malformed
	pub fn decode(&self, tag_unsynchronisation: bool) -> Result<FrameData> {
		let (content, unsynchronisation) = self.content(tag_unsynchronisation)?;
		content::decode_content(&self.id, &content, unsynchronisation)
	}
}

pub(crate) fn premature_end(needed: usize, available: usize) -> Mp3MetaError {
	Mp3MetaError::new(ErrorKind::InvalidData, "Premature end of tag").with_cause(format!(
		"Tried to read up to offset {needed}, but only {available} bytes are available"
	))
}

#[cfg(feature = "id3v2_compression_support")]
fn decompress(content: &[u8]) -> Result<Vec<u8>> {
	use std::io::Read;

	let mut decompressed = Vec::new();
	flate2::read::ZlibDecoder::new(content)
		.read_to_end(&mut decompressed)
		.map_err(|e| decode_err!("Failed to decompress frame").with_cause(e))?;

	Ok(decompressed)
}

#[cfg(not(feature = "id3v2_compression_support"))]
fn decompress(_: &[u8]) -> Result<Vec<u8>> {
	err!(
		NotSupported,
		"Encountered a compressed frame without `id3v2_compression_support`"
	)
}
