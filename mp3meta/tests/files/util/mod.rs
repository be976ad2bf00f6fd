use mp3meta::config::ScanOptions;
use mp3meta::id3::v1::Id3v1Tag;
use mp3meta::id3::v2::{Id3v2Tag, Id3v2Version};
use mp3meta::mpeg::Mp3File;

use std::io::Cursor;
use std::path::Path;

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, joint stereo
pub const HEADER_128: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];
pub const FRAME_128_LEN: usize = 417;

/// MPEG-1 Layer III, 160 kbps, 44.1 kHz, joint stereo
pub const HEADER_160: [u8; 4] = [0xFF, 0xFB, 0xA0, 0x64];
pub const FRAME_160_LEN: usize = 522;

/// MPEG-1 Layer III, 128 kbps, 48 kHz, joint stereo
pub const HEADER_48K: [u8; 4] = [0xFF, 0xFB, 0x94, 0x64];
pub const FRAME_48K_LEN: usize = 384;

pub const TRAILING_DATA: &[u8] = b"LYRICSBEGIN some trailing data LYRICS200";

/// A frame with a silent (zeroed) body
pub fn frame(header: [u8; 4], len: usize) -> Vec<u8> {
	let mut frame = vec![0; len];
	frame[..4].copy_from_slice(&header);
	frame
}

/// `count` consecutive 128 kbps frames
pub fn frames(count: usize) -> Vec<u8> {
	frame(HEADER_128, FRAME_128_LEN).repeat(count)
}

/// A 128 kbps "Info" frame, with the marker after the joint stereo side info
pub fn info_frame() -> Vec<u8> {
	let mut frame = frame(HEADER_128, FRAME_128_LEN);
	frame[36..40].copy_from_slice(b"Info");
	frame
}

pub fn id3v2_tag() -> Id3v2Tag {
	let mut tag = Id3v2Tag::new(Id3v2Version::V3);
	tag.set_title("Foo title").unwrap();
	tag.set_artist("Bar artist").unwrap();
	tag.set_album("Baz album").unwrap();
	tag
}

pub fn id3v1_tag() -> Id3v1Tag {
	Id3v1Tag {
		title: Some(String::from("Foo title")),
		artist: Some(String::from("Bar artist")),
		track_number: Some(1),
		genre: Some(17),
		..Id3v1Tag::default()
	}
}

/// ID3v2 tag, "Info" frame, `count` audio frames, trailing data, ID3v1 tag
pub fn full_stream(count: usize) -> Vec<u8> {
	let mut stream = id3v2_tag().to_bytes().unwrap();
	stream.extend(info_frame());
	stream.extend(frames(count));
	stream.extend_from_slice(TRAILING_DATA);
	stream.extend_from_slice(&id3v1_tag().as_bytes());
	stream
}

pub fn read(stream: &[u8]) -> Mp3File {
	read_with(stream, ScanOptions::new())
}

pub fn read_with(stream: &[u8], options: ScanOptions) -> Mp3File {
	Mp3File::read_from(&mut Cursor::new(stream), options).unwrap()
}

/// Write `stream` to `dir`/`name`, and open it
pub fn write_and_open(dir: &Path, name: &str, stream: &[u8]) -> Mp3File {
	let path = dir.join(name);
	std::fs::write(&path, stream).unwrap();
	Mp3File::open(path).unwrap()
}
