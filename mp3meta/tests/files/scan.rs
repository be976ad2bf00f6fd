use crate::util::{
	FRAME_128_LEN, FRAME_160_LEN, FRAME_48K_LEN, HEADER_128, HEADER_160, HEADER_48K,
	TRAILING_DATA, frame, frames, full_stream, id3v1_tag, id3v2_tag, info_frame, read, read_with,
};

use mp3meta::config::ScanOptions;
use mp3meta::error::ErrorKind;
use mp3meta::id3::v1::ID3V1_TAG_LENGTH;
use mp3meta::mpeg::{ChannelMode, Emphasis, Layer, ModeExtension, Mp3File, MpegVersion};

use std::io::Cursor;

#[test_log::test]
fn read_full_stream() {
	let stream = full_stream(10);
	let tag_len = id3v2_tag().to_bytes().unwrap().len() as u64;

	let file = read(&stream);

	assert_eq!(file.length(), stream.len() as u64);
	assert_eq!(file.xing_offset(), Some(tag_len));
	assert!(file.has_xing_frame());
	assert_eq!(file.xing_bitrate(), 128);

	let start = tag_len + FRAME_128_LEN as u64;
	assert_eq!(file.start_offset(), start);
	assert_eq!(file.end_offset(), Some(start + 10 * FRAME_128_LEN as u64 - 1));
	assert_eq!(
		file.max_end_offset(),
		(stream.len() - ID3V1_TAG_LENGTH) as u64
	);
	assert_eq!(file.frame_count(), 10);

	assert_eq!(file.version(), MpegVersion::V1);
	assert_eq!(file.layer(), Layer::Layer3);
	assert_eq!(file.sample_rate(), 44100);
	assert_eq!(file.channel_mode(), ChannelMode::JointStereo);
	assert_eq!(file.mode_extension(), ModeExtension::MsStereo);
	assert_eq!(file.emphasis(), Emphasis::None);
	assert!(!file.is_copyright());
	assert!(file.is_original());

	assert_eq!(file.id3v2_tag().unwrap().title().as_deref(), Some("Foo title"));
	assert_eq!(file.id3v1_tag(), Some(&id3v1_tag()));
	assert_eq!(file.custom_tag(), Some(TRAILING_DATA));
}

#[test_log::test]
fn block_size_does_not_change_the_result() {
	let stream = full_stream(10);
	let expected = read(&stream);

	for block_size in [41, 256, 1024, 5000] {
		let file = read_with(&stream, ScanOptions::new().block_size(block_size));

		assert_eq!(file.xing_offset(), expected.xing_offset(), "block size {block_size}");
		assert_eq!(file.start_offset(), expected.start_offset(), "block size {block_size}");
		assert_eq!(file.end_offset(), expected.end_offset(), "block size {block_size}");
		assert_eq!(file.frame_count(), expected.frame_count(), "block size {block_size}");
		assert_eq!(file.bitrates(), expected.bitrates(), "block size {block_size}");
		assert_eq!(file.has_id3v2_tag(), expected.has_id3v2_tag());
		assert_eq!(file.has_id3v1_tag(), expected.has_id3v1_tag());
		assert_eq!(file.custom_tag(), expected.custom_tag());
	}
}

#[test_log::test]
fn block_size_too_small() {
	let stream = full_stream(2);
	let err = Mp3File::read_from(
		&mut Cursor::new(stream),
		ScanOptions::new().block_size(ScanOptions::MINIMUM_BLOCK_SIZE),
	)
	.unwrap_err();

	assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test_log::test]
fn no_frames() {
	let err = Mp3File::read_from(&mut Cursor::new(vec![0; 1000]), ScanOptions::new()).unwrap_err();

	assert_eq!(err.kind(), ErrorKind::InvalidData);
	assert_eq!(err.message(), "No mpegs frames found");
}

#[test_log::test]
fn no_tags() {
	let file = read(&frames(4));

	assert!(!file.has_id3v2_tag());
	assert!(!file.has_id3v1_tag());
	assert!(!file.has_custom_tag());
	assert!(!file.has_xing_frame());
	assert_eq!(file.start_offset(), 0);
	assert_eq!(file.end_offset(), Some(4 * FRAME_128_LEN as u64 - 1));
}

#[test_log::test]
fn leading_junk_is_not_a_tag() {
	let mut stream = vec![b'x'; 100];
	stream.extend(frames(4));

	let file = read(&stream);
	assert!(!file.has_id3v2_tag());
	assert_eq!(file.start_offset(), 100);
	assert_eq!(file.frame_count(), 4);
}

#[test_log::test]
fn resync_after_false_sync() {
	// A lone header that is not followed by another frame
	let mut stream = frame(HEADER_128, FRAME_128_LEN);
	stream.resize(500, 0);
	stream.extend(frames(5));

	for block_size in [41, 300, ScanOptions::DEFAULT_BLOCK_SIZE] {
		let file = read_with(&stream, ScanOptions::new().block_size(block_size));

		assert_eq!(file.start_offset(), 500, "block size {block_size}");
		assert_eq!(file.frame_count(), 5, "block size {block_size}");
		assert_eq!(file.end_offset(), Some(stream.len() as u64 - 1));
	}
}

#[test_log::test]
fn inconsistent_frame_ends_the_stream() {
	let mut stream = frames(4);
	stream.extend(frame(HEADER_48K, FRAME_48K_LEN));
	stream.extend(frames(2));

	let file = read(&stream);
	assert_eq!(file.frame_count(), 4);
	assert_eq!(file.end_offset(), Some(4 * FRAME_128_LEN as u64 - 1));
	assert_eq!(
		file.custom_tag().map(<[u8]>::len),
		Some(FRAME_48K_LEN + 2 * FRAME_128_LEN)
	);
}

#[test_log::test]
fn truncated_frame_ends_the_stream() {
	let mut stream = frames(5);
	stream.extend_from_slice(&frame(HEADER_128, FRAME_128_LEN)[..200]);

	let file = read(&stream);
	assert_eq!(file.frame_count(), 5);
	assert_eq!(file.end_offset(), Some(5 * FRAME_128_LEN as u64 - 1));
	assert_eq!(file.custom_tag().map(<[u8]>::len), Some(200));
}

#[test_log::test]
fn frames_stop_at_the_id3v1_tag() {
	// The last frame fits in the file, but runs into the ID3v1 tag
	let mut stream = frames(5);
	stream.extend_from_slice(&frame(HEADER_128, FRAME_128_LEN)[..300]);
	stream.extend_from_slice(&id3v1_tag().as_bytes());

	for block_size in [41, 1000, ScanOptions::DEFAULT_BLOCK_SIZE] {
		let file = read_with(&stream, ScanOptions::new().block_size(block_size));

		assert_eq!(file.frame_count(), 5, "block size {block_size}");
		assert_eq!(file.end_offset(), Some(5 * FRAME_128_LEN as u64 - 1));
		assert_eq!(file.custom_tag().map(<[u8]>::len), Some(300));
		assert!(file.has_id3v1_tag());
	}
}

#[test_log::test]
fn scan_first_frame_only() {
	let stream = full_stream(10);
	let file = read_with(&stream, ScanOptions::new().scan_file(false));

	let start = file.xing_offset().unwrap() + FRAME_128_LEN as u64;
	assert_eq!(file.start_offset(), start);
	assert_eq!(file.end_offset(), Some(start + FRAME_128_LEN as u64 - 1));
	assert_eq!(file.frame_count(), 1);

	assert!(file.has_id3v2_tag());
	assert!(file.has_id3v1_tag());
	assert!(!file.has_custom_tag());
}

#[test_log::test]
fn variable_bitrate() {
	let mut stream = Vec::new();
	for _ in 0..3 {
		stream.extend(frame(HEADER_128, FRAME_128_LEN));
		stream.extend(frame(HEADER_160, FRAME_160_LEN));
	}

	let file = read(&stream);
	assert!(file.is_vbr());
	assert_eq!(file.frame_count(), 6);
	assert_eq!(file.bitrate(), 144);
	assert_eq!(
		file.bitrates().iter().map(|(k, v)| (*k, *v)).collect::<Vec<_>>(),
		[(128, 3), (160, 3)]
	);

	// 8 * 2816 bits at 144 kbps
	assert_eq!(file.length_in_milliseconds(), 156);
	assert_eq!(file.length_in_seconds(), 0);
}

#[test_log::test]
fn constant_bitrate_duration() {
	let mut stream = info_frame();
	stream.extend(frames(100));

	let file = read(&stream);
	assert!(!file.is_vbr());
	assert_eq!(file.bitrate(), 128);

	// 8 * (100 * 417 - 1) bits at 128 kbps
	assert_eq!(file.length_in_milliseconds(), 2606);
	assert_eq!(file.length_in_seconds(), 3);
}
