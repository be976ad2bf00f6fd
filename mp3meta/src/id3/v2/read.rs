use super::frame::premature_end;
use super::header::{FOOTER_ID, FOOTER_LENGTH, HEADER_LENGTH, Id3v2Header, Id3v2Version};
use super::tag::Id3v2Tag;
use super::util::synchsafe::{synchronise, unpack_synchsafe};
use super::{Frame, FrameHeaderFormat};
use crate::error::Result;
use crate::macros::decode_err;
use crate::util::buffer::unpack_int;

use std::borrow::Cow;

/// Read an ID3v2 tag of any supported version
///
/// `bytes` must start with the tag header. An ID3v2.2 tag is first read with 4 character frame
/// IDs, and read again with 3 character IDs if that finds no frames.
///
/// # Errors
///
/// * `bytes` does not start with an ID3v2 header ([`ErrorKind::NoSuchTag`](crate::error::ErrorKind::NoSuchTag))
/// * The major version is not 2, 3, or 4, or reserved header bits are set ([`ErrorKind::UnsupportedVersion`](crate::error::ErrorKind::UnsupportedVersion))
/// * The tag has a size of zero, an invalid footer, or is cut off ([`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData))
///
/// # Examples
///
/// ```rust
/// use mp3meta::id3::v2::{Id3v2Tag, Id3v2Version, create_tag};
///
/// # fn main() -> mp3meta::error::Result<()> {
/// let mut tag = Id3v2Tag::new(Id3v2Version::V4);
/// tag.set_title("Foo title")?;
///
/// let reparsed = create_tag(&tag.to_bytes()?)?;
/// assert_eq!(reparsed.title().as_deref(), Some("Foo title"));
/// assert_eq!(reparsed, tag);
/// # Ok(()) }
/// ```
pub fn create_tag(bytes: &[u8]) -> Result<Id3v2Tag> {
	let header = Id3v2Header::parse(bytes)?;
	let tag = parse_id3v2(bytes, header, false)?;

	if header.version == Id3v2Version::V2 && tag.is_empty() {
		log::debug!("No frames found in ID3v2.2 tag, retrying with 3 character frame IDs");
		return parse_id3v2(bytes, header, true);
	}

	Ok(tag)
}

pub(super) fn parse_id3v2(
	bytes: &[u8],
	header: Id3v2Header,
	obsolete_format: bool,
) -> Result<Id3v2Tag> {
	let content_end = HEADER_LENGTH + header.size as usize;
	let tag_end = content_end + if header.flags.footer { FOOTER_LENGTH } else { 0 };
	if bytes.len() < tag_end {
		return Err(premature_end(tag_end, bytes.len()));
	}

	let mut offset = HEADER_LENGTH;

	let mut extended_header = None;
	if header.flags.extended_header {
		let extended = read_extended_header(&bytes[..content_end], offset, header.version)?;
		offset += extended.len();
		extended_header = Some(extended.to_vec());
	}

	if header.flags.footer && &bytes[content_end..content_end + 3] != FOOTER_ID {
		decode_err!(@BAIL "Invalid footer");
	}

	let capabilities = header.version.capabilities();
	let format = if obsolete_format {
		FrameHeaderFormat::Obsolete
	} else {
		capabilities.frame_format
	};

	// ID3v2.2 and ID3v2.3 unsynchronise the frame region as a whole
	let region = &bytes[offset..content_end];
	let region = if header.flags.unsynchronisation && !capabilities.frame_unsynchronisation {
		synchronise(region)
	} else {
		Cow::Borrowed(region)
	};

	let mut tag = Id3v2Tag::from_parts(
		header.version,
		header.revision,
		header.flags,
		extended_header,
		obsolete_format,
	);

	read_frames(&mut tag, &region, format);
	tag.keep_data_length(header.size as usize);

	log::debug!(
		"Read ID3v{} tag with {} frame sets",
		tag.version(),
		tag.frame_sets().len()
	);

	Ok(tag)
}

// Frames are read until one fails, which is expected when reaching the padding
fn read_frames(tag: &mut Id3v2Tag, region: &[u8], format: FrameHeaderFormat) {
	let mut offset = 0;

	while offset + format.header_len() <= region.len() {
		match Frame::parse(region, offset, format) {
			Ok(frame) => {
				offset += frame.len();
				tag.add_frame(frame, false);
			},
			Err(e) => {
				log::debug!("Stopped reading frames at offset {offset}: {e}");
				break;
			},
		}
	}
}

// The extended header is kept verbatim, including its size field
fn read_extended_header(bytes: &[u8], offset: usize, version: Id3v2Version) -> Result<&[u8]> {
	let Some(size) = bytes.get(offset..offset + 4) else {
		return Err(premature_end(offset + 4, bytes.len()));
	};

	// The ID3v2.3 size excludes itself, the ID3v2.4 size is synchsafe and includes itself
	let len = match version {
		Id3v2Version::V4 => unpack_synchsafe([size[0], size[1], size[2], size[3]]) as usize,
		_ => unpack_int(size) as usize + 4,
	};

	if len < 4 {
		decode_err!(@BAIL "Invalid extended header size");
	}

	match bytes.get(offset..offset + len) {
		Some(extended_header) => Ok(extended_header),
		None => Err(premature_end(offset + len, bytes.len())),
	}
}
