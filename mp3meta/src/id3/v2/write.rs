use super::header::{FOOTER_ID, HEADER_ID, HEADER_LENGTH, Id3v2Header};
use super::tag::Id3v2Tag;
use super::util::synchsafe::unsynchronise;
use crate::error::Result;
use crate::macros::err;

const PICTURE_ID: &str = "APIC";

pub(super) fn dump_tag(tag: &Id3v2Tag) -> Result<Vec<u8>> {
	if tag.is_obsolete_format() {
		err!(NotSupported, "Packing Obsolete frames is not supported");
	}

	let data_length = tag.data_length();
	let Ok(size) = u32::try_from(data_length) else {
		err!(InvalidData, "Tag is too large");
	};

	let mut flags = tag.flags();
	flags.extended_header = tag.extended_header().is_some();

	let header = Id3v2Header {
		version: tag.major_version(),
		revision: tag.revision(),
		flags,
		size,
	};

	let mut bytes = Vec::with_capacity(tag.len());
	header.write(HEADER_ID, &mut bytes)?;

	if let Some(extended_header) = tag.extended_header() {
		bytes.extend_from_slice(extended_header);
	}

	let frames = frame_region(tag)?;
	if tag.tag_unsynchronisation() {
		bytes.extend_from_slice(&unsynchronise(&frames));
	} else {
		bytes.extend_from_slice(&frames);
	}

	let content_end = HEADER_LENGTH + data_length;
	if bytes.len() > content_end {
		err!(InvalidData, "Frames exceed the tag size");
	}

	// Padding, or the leftover space of a tag that was read with a larger size
	bytes.resize(content_end, 0);

	if header.flags.footer {
		header.write(FOOTER_ID, &mut bytes)?;
	}

	log::debug!("Wrote ID3v{} tag ({} bytes)", tag.version(), bytes.len());
	Ok(bytes)
}

// All frames, with pictures last, before any tag level unsynchronisation
pub(super) fn frame_region(tag: &Id3v2Tag) -> Result<Vec<u8>> {
	let mut bytes = Vec::with_capacity(tag.frames_length());

	let (pictures, others): (Vec<_>, Vec<_>) = tag
		.frame_sets()
		.values()
		.partition(|set| set.id() == PICTURE_ID);

	for set in others.into_iter().chain(pictures) {
		for frame in set {
			if frame.is_empty() {
				continue;
			}

			frame.write_to(&mut bytes)?;
		}
	}

	Ok(bytes)
}
