use super::Mp3File;
use super::constants::VBR_MARKER_OFFSETS;
use super::header::{MpegFrame, verify_frame_sync};
use crate::config::ScanOptions;
use crate::error::{ErrorKind, Result};
use crate::id3::v1::{ID3V1_TAG_LENGTH, Id3v1Tag};
use crate::id3::v2::{Id3v2Tag, create_tag, probable_tag_length};
use crate::macros::decode_err;

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};

/// Where the audio frames are, and what they look like
#[derive(Clone, Debug, PartialEq)]
pub(super) struct MpegStream {
	pub(super) xing_offset: Option<u64>,
	pub(super) xing_bitrate: u32,
	pub(super) start_offset: u64,
	/// Offset of the last byte of the last audio frame
	pub(super) end_offset: Option<u64>,
	pub(super) frame_count: u32,
	/// Running mean of the frame bitrates
	pub(super) bitrate: f64,
	pub(super) bitrates: BTreeMap<u32, u32>,
	/// The first audio frame, which every following frame must be consistent with
	pub(super) first_frame: MpegFrame,
}

pub(super) fn read_from<R>(reader: &mut R, options: ScanOptions) -> Result<Mp3File>
where
	R: Read + Seek,
{
	let options = options.validate()?;
	let length = reader.seek(SeekFrom::End(0))?;

	// The trailing ID3v1 tag bounds the audio, so it has to be found first
	let id3v1_tag = read_id3v1(reader, length)?;
	let max_end_offset = match id3v1_tag {
		Some(_) => length - ID3V1_TAG_LENGTH as u64,
		None => length,
	};

	let mut scanner = Scanner::new(options, length, max_end_offset);
	scanner.scan(reader)?;

	let Some(stream) = scanner.finish() else {
		decode_err!(@BAIL "No mpegs frames found");
	};

	log::debug!(
		"MPEG: Audio frames found at {}..={:?} ({} frames)",
		stream.start_offset,
		stream.end_offset,
		stream.frame_count
	);

	let id3v2_tag = read_id3v2(reader, &stream)?;
	let custom_tag = if options.scan_file {
		read_custom_tag(reader, &stream, max_end_offset)?
	} else {
		None
	};

	Ok(Mp3File {
		path: None,
		length,
		last_modified: None,
		options,
		stream,
		id3v1_tag,
		id3v2_tag,
		custom_tag,
	})
}

fn read_id3v1<R>(reader: &mut R, length: u64) -> Result<Option<Id3v1Tag>>
where
	R: Read + Seek,
{
	if length < ID3V1_TAG_LENGTH as u64 {
		return Ok(None);
	}

	reader.seek(SeekFrom::End(-(ID3V1_TAG_LENGTH as i64)))?;

	let mut bytes = [0; ID3V1_TAG_LENGTH];
	reader.read_exact(&mut bytes)?;

	match Id3v1Tag::parse(&bytes) {
		Ok(tag) => Ok(Some(tag)),
		Err(e) if e.kind() == ErrorKind::NoSuchTag => Ok(None),
		Err(e) => Err(e),
	}
}

// Everything before the first frame (VBR info or audio) is assumed to be the ID3v2 tag
fn read_id3v2<R>(reader: &mut R, stream: &MpegStream) -> Result<Option<Id3v2Tag>>
where
	R: Read + Seek,
{
	let tag_end = stream.xing_offset.unwrap_or(stream.start_offset);
	if tag_end == 0 {
		return Ok(None);
	}

	reader.seek(SeekFrom::Start(0))?;

	let mut bytes = Vec::new();
	reader.take(tag_end).read_to_end(&mut bytes)?;
	if (bytes.len() as u64) < tag_end {
		decode_err!(@BAIL "Not enough bytes read");
	}

	match create_tag(&bytes) {
		Ok(tag) => Ok(Some(tag)),
		Err(e) if e.kind() == ErrorKind::NoSuchTag => {
			log::debug!("MPEG: {tag_end} bytes precede the audio, but no ID3v2 tag: {e}");
			Ok(None)
		},
		Err(e) => Err(e),
	}
}

// Whatever sits between the last audio frame and the ID3v1 tag (or EOF)
fn read_custom_tag<R>(
	reader: &mut R,
	stream: &MpegStream,
	max_end_offset: u64,
) -> Result<Option<Vec<u8>>>
where
	R: Read + Seek,
{
	let Some(end_offset) = stream.end_offset else {
		return Ok(None);
	};

	let start = end_offset + 1;
	if start >= max_end_offset {
		return Ok(None);
	}

	let len = max_end_offset - start;
	reader.seek(SeekFrom::Start(start))?;

	let mut custom_tag = Vec::new();
	reader.take(len).read_to_end(&mut custom_tag)?;
	if (custom_tag.len() as u64) < len {
		decode_err!(@BAIL "Not enough bytes read");
	}

	log::debug!("MPEG: Found {len} bytes of trailing data after the audio frames");
	Ok(Some(custom_tag))
}

enum BlockScan {
	/// Continue with the next block, this many bytes further
	Consumed(usize),
	/// The first audio frame was found and the rest of the file should not be scanned
	StartFound,
	/// The audio frames reach the end of the usable area
	Finished,
}

#[derive(Default)]
struct ScanState {
	xing_offset: Option<u64>,
	xing_bitrate: u32,
	start: Option<(u64, MpegFrame)>,
	end_offset: Option<u64>,
	frame_count: u32,
	bitrate: f64,
	bitrates: BTreeMap<u32, u32>,
}

impl ScanState {
	fn add_frame(&mut self, bitrate: u32) {
		self.frame_count += 1;
		*self.bitrates.entry(bitrate).or_insert(0) += 1;

		let count = f64::from(self.frame_count);
		self.bitrate = (self.bitrate * (count - 1.0) + f64::from(bitrate)) / count;
	}
}

/// Block scanner over the audio frames
///
/// The scan searches for the first audio frame (skipping a leading VBR info frame), then
/// follows the frames by their lengths. Until 2 frames are confirmed, a bad frame is taken to
/// mean the start was a false sync, and the search restarts one byte past it. Past that point,
/// a bad frame ends the stream.
struct Scanner {
	block_size: usize,
	scan_file: bool,
	length: u64,
	max_end_offset: u64,
	state: ScanState,
}

impl Scanner {
	fn new(options: ScanOptions, length: u64, max_end_offset: u64) -> Self {
		Self {
			block_size: options.block_size,
			scan_file: options.scan_file,
			length,
			max_end_offset,
			state: ScanState::default(),
		}
	}

	fn scan<R>(&mut self, reader: &mut R) -> Result<()>
	where
		R: Read + Seek,
	{
		let mut block = Vec::with_capacity(self.block_size);
		let mut file_offset = prescan(reader);

		let mut last_block = false;
		while !last_block {
			reader.seek(SeekFrom::Start(file_offset))?;

			block.clear();
			reader
				.by_ref()
				.take(self.block_size as u64)
				.read_to_end(&mut block)?;

			last_block = block.len() < self.block_size;
			if block.len() < ScanOptions::MINIMUM_BLOCK_SIZE {
				continue;
			}

			match self.scan_block(&block, file_offset) {
				Ok(BlockScan::Consumed(consumed)) => file_offset += consumed as u64,
				Ok(BlockScan::StartFound | BlockScan::Finished) => return Ok(()),
				Err(e) if self.state.frame_count >= 2 => {
					log::debug!("MPEG: Ending scan at the last good frame: {e}");
					return Ok(());
				},
				Err(e) => {
					let Some((start_offset, _)) = self.state.start else {
						return Err(
							decode_err!("Valid start of mpeg frames not found").with_cause(e)
						);
					};

					log::debug!("MPEG: Frame at {start_offset} was a false sync, resyncing: {e}");

					self.state = ScanState::default();
					file_offset = start_offset + 1;
					last_block = false;
				},
			}
		}

		Ok(())
	}

	fn finish(self) -> Option<MpegStream> {
		let (start_offset, first_frame) = self.state.start?;

		Some(MpegStream {
			xing_offset: self.state.xing_offset,
			xing_bitrate: self.state.xing_bitrate,
			start_offset,
			end_offset: self.state.end_offset,
			frame_count: self.state.frame_count,
			bitrate: self.state.bitrate,
			bitrates: self.state.bitrates,
			first_frame,
		})
	}

	// The last `MINIMUM_BLOCK_SIZE` bytes of a block are left for the next one, so that a frame
	// header and its VBR marker are always in the same block
	fn scan_block(&mut self, block: &[u8], block_offset: u64) -> Result<BlockScan> {
		let limit = block.len() - ScanOptions::MINIMUM_BLOCK_SIZE;

		let mut offset = 0;
		if self.state.start.is_none() {
			offset = self.scan_for_start(block, block_offset, limit);

			if self.state.start.is_none() {
				return Ok(BlockScan::Consumed(offset));
			}

			if !self.scan_file {
				return Ok(BlockScan::StartFound);
			}
		}

		let Some((_, first_frame)) = self.state.start else {
			return Ok(BlockScan::Consumed(offset));
		};

		while offset < limit {
			let frame = MpegFrame::from_bytes(&block[offset..])?;
			let frame_offset = block_offset + offset as u64;
			let frame_len = u64::from(frame.len());

			if !frame.is_consistent_with(&first_frame) {
				decode_err!(@BAIL "Inconsistent frame header");
			}

			if frame_offset + frame_len > self.length {
				decode_err!(@BAIL "Frame would extend beyond end of file");
			}

			let frame_end = frame_offset + frame_len - 1;
			if frame_end >= self.max_end_offset {
				return Ok(BlockScan::Finished);
			}

			self.state.add_frame(frame.bitrate);
			self.state.end_offset = Some(frame_end);
			offset += frame.len() as usize;
		}

		Ok(BlockScan::Consumed(offset))
	}

	// Returns the offset following the first audio frame, or `limit` if there is none
	fn scan_for_start(&mut self, block: &[u8], block_offset: u64, limit: usize) -> usize {
		let mut offset = 0;
		while offset < limit {
			if !verify_frame_sync([block[offset], block[offset + 1]]) {
				offset += 1;
				continue;
			}

			let Ok(frame) = MpegFrame::from_bytes(&block[offset..]) else {
				offset += 1;
				continue;
			};

			let frame_offset = block_offset + offset as u64;

			if self.state.xing_offset.is_none() && is_vbr_info_frame(&block[offset..]) {
				log::debug!("MPEG: Found VBR info frame at {frame_offset}");

				self.state.xing_offset = Some(frame_offset);
				self.state.xing_bitrate = frame.bitrate;
				offset += frame.len() as usize;
				continue;
			}

			log::debug!("MPEG: Found first audio frame at {frame_offset}");

			self.state.start = Some((frame_offset, frame));
			self.state.add_frame(frame.bitrate);

			let frame_end = frame_offset + u64::from(frame.len()) - 1;
			if frame_end < self.max_end_offset {
				self.state.end_offset = Some(frame_end);
			}

			return offset + frame.len() as usize;
		}

		offset
	}
}

// An ID3v2 tag at the start of the file can be skipped without parsing it
fn prescan<R>(reader: &mut R) -> u64
where
	R: Read + Seek,
{
	let mut header = [0; 10];

	let read = reader
		.seek(SeekFrom::Start(0))
		.and_then(|_| reader.read_exact(&mut header));

	match read {
		Ok(()) => probable_tag_length(&header) as u64,
		Err(_) => 0,
	}
}

fn is_vbr_info_frame(frame: &[u8]) -> bool {
	VBR_MARKER_OFFSETS
		.iter()
		.any(|&offset| matches!(frame.get(offset..offset + 4), Some(b"Xing" | b"Info")))
}
