use crate::util::{FRAME_128_LEN, TRAILING_DATA, frames, full_stream, id3v2_tag, read, write_and_open};

use mp3meta::config::ScanOptions;
use mp3meta::error::ErrorKind;
use mp3meta::id3::v2::{Id3v2Tag, Id3v2Version};
use mp3meta::mpeg::Mp3File;

use std::io::Cursor;

#[test_log::test]
fn open_records_the_source() {
	let dir = tempfile::tempdir().unwrap();
	let file = write_and_open(dir.path(), "source.mp3", &full_stream(3));

	assert_eq!(file.path(), Some(dir.path().join("source.mp3").as_path()));
	assert!(file.last_modified().is_some());
	assert_eq!(file.frame_count(), 3);
}

#[test_log::test]
fn unmodified_save_is_identical() {
	let dir = tempfile::tempdir().unwrap();
	let stream = full_stream(10);

	let file = write_and_open(dir.path(), "source.mp3", &stream);
	let out = dir.path().join("out.mp3");
	file.save(&out).unwrap();

	assert_eq!(std::fs::read(out).unwrap(), stream);
}

#[test_log::test]
fn save_modified_tags() {
	let dir = tempfile::tempdir().unwrap();
	let stream = full_stream(10);

	let mut file = write_and_open(dir.path(), "source.mp3", &stream);
	let audio_start = file.xing_offset().unwrap() as usize;
	let audio = &stream[audio_start..=file.end_offset().unwrap() as usize];

	let tag = file.id3v2_tag_mut().unwrap();
	tag.set_title("A much longer title, so that the tag has to grow").unwrap();
	tag.set_genre(17).unwrap();
	assert!(file.remove_id3v1_tag().is_some());

	let out = dir.path().join("out.mp3");
	file.save(&out).unwrap();

	let saved = Mp3File::open(&out).unwrap();
	let tag = saved.id3v2_tag().unwrap();
	assert_eq!(
		tag.title().as_deref(),
		Some("A much longer title, so that the tag has to grow")
	);
	assert_eq!(tag.genre_description().as_deref(), Some("Rock"));
	assert_eq!(tag.artist().as_deref(), Some("Bar artist"));

	assert!(!saved.has_id3v1_tag());
	assert_eq!(saved.custom_tag(), Some(TRAILING_DATA));
	assert_eq!(saved.frame_count(), 10);
	assert!(saved.has_xing_frame());

	let saved_bytes = std::fs::read(&out).unwrap();
	let saved_start = saved.xing_offset().unwrap() as usize;
	assert_eq!(&saved_bytes[saved_start..=saved.end_offset().unwrap() as usize], audio);
}

#[test_log::test]
fn save_to_source_is_rejected() {
	let dir = tempfile::tempdir().unwrap();
	let stream = full_stream(2);

	let file = write_and_open(dir.path(), "source.mp3", &stream);

	let err = file.save(dir.path().join("source.mp3")).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidArgument);

	// Same file, different spelling
	let err = file
		.save(dir.path().join(".").join("source.mp3"))
		.unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidArgument);

	assert_eq!(std::fs::read(dir.path().join("source.mp3")).unwrap(), stream);
}

#[test_log::test]
fn save_requires_a_source_path() {
	let dir = tempfile::tempdir().unwrap();
	let file = read(&full_stream(2));

	let err = file.save(dir.path().join("out.mp3")).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::InvalidArgument);
	assert!(!dir.path().join("out.mp3").exists());
}

#[test_log::test]
fn unwritable_tag_leaves_no_output() {
	let dir = tempfile::tempdir().unwrap();

	// An ID3v2.2 tag with 3 character frame IDs can be read, but not written
	let mut stream = vec![b'I', b'D', b'3', 2, 0, 0, 0, 0, 0, 16];
	stream.extend_from_slice(b"TT2\x00\x00\x04\x00Foo");
	stream.resize(26, 0);
	stream.extend(frames(3));

	let file = write_and_open(dir.path(), "source.mp3", &stream);
	assert_eq!(file.id3v2_tag().unwrap().title().as_deref(), Some("Foo"));

	let err = file.save(dir.path().join("out.mp3")).unwrap_err();
	assert_eq!(err.kind(), ErrorKind::NotSupported);
	assert!(!dir.path().join("out.mp3").exists());
}

#[test_log::test]
fn write_to_stream() {
	let source = frames(4);
	let mut file = read(&source);
	assert!(!file.has_id3v2_tag());

	let mut tag = Id3v2Tag::new(Id3v2Version::V4);
	tag.set_title("Added").unwrap();
	assert!(file.set_id3v2_tag(tag).is_none());
	assert!(file.set_custom_tag(b"trailing".to_vec()).is_none());

	let mut out = Vec::new();
	file.write_to(&mut Cursor::new(&source), &mut out).unwrap();

	let written = Mp3File::read_from(&mut Cursor::new(&out), ScanOptions::new()).unwrap();
	let tag_len = written.id3v2_tag().unwrap().len() as u64;

	assert_eq!(written.id3v2_tag().unwrap().title().as_deref(), Some("Added"));
	assert_eq!(written.start_offset(), tag_len);
	assert_eq!(written.frame_count(), 4);
	assert_eq!(written.custom_tag(), Some(&b"trailing"[..]));
	assert_eq!(out.len(), tag_len as usize + 4 * FRAME_128_LEN + 8);
}

#[test_log::test]
fn remove_every_tag() {
	let source = full_stream(4);
	let mut file = read(&source);

	assert!(file.remove_id3v2_tag().is_some());
	assert!(file.remove_id3v1_tag().is_some());
	assert_eq!(file.remove_custom_tag().as_deref(), Some(TRAILING_DATA));
	assert!(file.remove_id3v2_tag().is_none());

	let mut out = Vec::new();
	file.write_to(&mut Cursor::new(&source), &mut out).unwrap();

	let tag_len = id3v2_tag().to_bytes().unwrap().len();
	assert_eq!(out, &source[tag_len..tag_len + 5 * FRAME_128_LEN]);
}
