use crate::error::Result;
use crate::id3::v2::FrameHeaderFormat;
use crate::id3::v2::util::synchsafe::{pack_synchsafe, unpack_synchsafe};
use crate::macros::{decode_err, err};
use crate::util::buffer::{check_bit, set_bit};

pub(crate) const HEADER_LENGTH: usize = 10;
pub(crate) const FOOTER_LENGTH: usize = 10;
pub(crate) const HEADER_ID: &[u8; 3] = b"ID3";
pub(crate) const FOOTER_ID: &[u8; 3] = b"3DI";

const UNSYNCHRONISATION_BIT: u8 = 7;
const EXTENDED_HEADER_BIT: u8 = 6;
const COMPRESSION_BIT: u8 = 6;
const EXPERIMENTAL_BIT: u8 = 5;
const FOOTER_BIT: u8 = 4;

/// The ID3v2 version
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Id3v2Version {
	/// ID3v2.2
	V2,
	/// ID3v2.3
	V3,
	/// ID3v2.4
	V4,
}

impl Id3v2Version {
	/// The major version byte
	pub fn major(self) -> u8 {
		match self {
			Self::V2 => 2,
			Self::V3 => 3,
			Self::V4 => 4,
		}
	}

	/// Get an `Id3v2Version` from a major version byte
	pub fn from_major(major: u8) -> Option<Self> {
		match major {
			2 => Some(Self::V2),
			3 => Some(Self::V3),
			4 => Some(Self::V4),
			_ => None,
		}
	}

	pub(crate) const fn capabilities(self) -> VersionCapabilities {
		match self {
			Self::V2 => VersionCapabilities {
				compression_flag: true,
				extended_header: false,
				experimental_flag: false,
				footer: false,
				frame_format: FrameHeaderFormat::V23,
				frame_unsynchronisation: false,
			},
			Self::V3 => VersionCapabilities {
				compression_flag: false,
				extended_header: true,
				experimental_flag: true,
				footer: false,
				frame_format: FrameHeaderFormat::V23,
				frame_unsynchronisation: false,
			},
			Self::V4 => VersionCapabilities {
				compression_flag: false,
				extended_header: true,
				experimental_flag: true,
				footer: true,
				frame_format: FrameHeaderFormat::V24,
				frame_unsynchronisation: true,
			},
		}
	}
}

/// What a tag version supports
///
/// All versions share one tag engine, this is the only place they differ.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct VersionCapabilities {
	/// Header bit 6 is the (never specified) ID3v2.2 compression flag
	pub(crate) compression_flag: bool,
	/// Header bit 6 marks an extended header
	pub(crate) extended_header: bool,
	pub(crate) experimental_flag: bool,
	pub(crate) footer: bool,
	/// The format of frames written with 4 character IDs
	pub(crate) frame_format: FrameHeaderFormat,
	/// Unsynchronisation is applied per frame rather than to the whole frame region
	pub(crate) frame_unsynchronisation: bool,
}

/// Flags that apply to the entire tag
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[allow(clippy::struct_excessive_bools)]
pub struct Id3v2TagFlags {
	/// Whether or not the frames are unsynchronised
	///
	/// In ID3v2.2 and ID3v2.3 this applies to the whole frame region, in ID3v2.4 it applies to
	/// every frame individually.
	pub unsynchronisation: bool,
	/// The ID3v2.2 compression flag
	///
	/// No compression scheme was ever defined, this is only kept to be written back.
	pub compression: bool,
	/// Whether the tag has an extended header (ID3v2.3+)
	pub extended_header: bool,
	/// Indicates if the tag is in an experimental stage (ID3v2.3+)
	pub experimental: bool,
	/// Indicates that the tag includes a footer (ID3v2.4)
	pub footer: bool,
}

impl Id3v2TagFlags {
	/// Parse the header flags byte for `version`
	///
	/// Bits the version does not define are ignored.
	pub fn parse(byte: u8, version: Id3v2Version) -> Self {
		let capabilities = version.capabilities();

		Self {
			unsynchronisation: check_bit(byte, UNSYNCHRONISATION_BIT),
			compression: capabilities.compression_flag && check_bit(byte, COMPRESSION_BIT),
			extended_header: capabilities.extended_header && check_bit(byte, EXTENDED_HEADER_BIT),
			experimental: capabilities.experimental_flag && check_bit(byte, EXPERIMENTAL_BIT),
			footer: capabilities.footer && check_bit(byte, FOOTER_BIT),
		}
	}

	/// Get the header flags byte for `version`
	///
	/// Flags the version does not define are not written.
	pub fn as_byte(&self, version: Id3v2Version) -> u8 {
		let capabilities = version.capabilities();

		let mut byte = set_bit(0, UNSYNCHRONISATION_BIT, self.unsynchronisation);
		if capabilities.compression_flag {
			byte = set_bit(byte, COMPRESSION_BIT, self.compression);
		}

		if capabilities.extended_header {
			byte = set_bit(byte, EXTENDED_HEADER_BIT, self.extended_header);
		}

		if capabilities.experimental_flag {
			byte = set_bit(byte, EXPERIMENTAL_BIT, self.experimental);
		}

		if capabilities.footer {
			byte = set_bit(byte, FOOTER_BIT, self.footer);
		}

		byte
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Id3v2Header {
	pub version: Id3v2Version,
	pub revision: u8,
	pub flags: Id3v2TagFlags,
	/// The size of the tag contents (**DOES NOT INCLUDE THE HEADER/FOOTER**)
	pub size: u32,
}

impl Id3v2Header {
	pub(crate) fn parse(bytes: &[u8]) -> Result<Self> {
		log::debug!("Parsing ID3v2 header");

		if bytes.len() < HEADER_LENGTH {
			err!(NoSuchTag, "Buffer too short");
		}

		if &bytes[..3] != HEADER_ID {
			err!(NoSuchTag, "No ID3v2 tag signature");
		}

		let (major, revision) = (bytes[3], bytes[4]);
		let Some(version) = Id3v2Version::from_major(major) else {
			err!(
				UnsupportedVersion,
				format!("Unsupported version {major}.{revision}")
			);
		};

		let flags = bytes[5];
		if flags & 0x0F != 0 {
			err!(UnsupportedVersion, "Unrecognised bits in header");
		}

		let size = unpack_synchsafe([bytes[6], bytes[7], bytes[8], bytes[9]]);
		if size == 0 {
			return Err(decode_err!("Zero size tag"));
		}

		Ok(Self {
			version,
			revision,
			flags: Id3v2TagFlags::parse(flags, version),
			size,
		})
	}

	/// Write the header, or the footer if `id` is [`FOOTER_ID`]
	pub(crate) fn write(&self, id: &[u8; 3], writer: &mut Vec<u8>) -> Result<()> {
		writer.extend_from_slice(id);
		writer.push(self.version.major());
		writer.push(self.revision);
		writer.push(self.flags.as_byte(self.version));
		writer.extend_from_slice(&pack_synchsafe(self.size)?);

		Ok(())
	}
}

/// Get the full size of an ID3v2 tag from its header, without parsing it
///
/// This only checks the signature and version, and returns 0 if the header does not look
/// like an ID3v2 header.
///
/// # Examples
///
/// ```rust
/// use mp3meta::id3::v2::probable_tag_length;
///
/// let header = [b'I', b'D', b'3', 4, 0, 0, 0, 0, 0x02, 0x01];
/// assert_eq!(probable_tag_length(&header), 267);
///
/// assert_eq!(probable_tag_length(&[0xFF, 0xFB, 0x90, 0x64]), 0);
/// ```
pub fn probable_tag_length(header: &[u8]) -> usize {
	let Some(header) = header.get(..HEADER_LENGTH) else {
		return 0;
	};

	if &header[..3] != HEADER_ID || Id3v2Version::from_major(header[3]).is_none() {
		return 0;
	}

	HEADER_LENGTH + unpack_synchsafe([header[6], header[7], header[8], header[9]]) as usize
}
