//! Fixed-width integers, bit flags, and terminator searches over raw byte buffers

use byteorder::{BigEndian, ByteOrder};

/// Read a plain big-endian `u32` from the first 4 bytes of `bytes`
///
/// Panics if `bytes` is shorter than 4, callers check bounds first.
pub(crate) fn unpack_int(bytes: &[u8]) -> u32 {
	BigEndian::read_u32(bytes)
}

pub(crate) fn pack_int(value: u32) -> [u8; 4] {
	let mut out = [0; 4];
	BigEndian::write_u32(&mut out, value);
	out
}

/// Position 0 is the least significant bit
pub(crate) fn check_bit(byte: u8, position: u8) -> bool {
	(byte >> position) & 1 == 1
}

pub(crate) fn set_bit(byte: u8, position: u8, value: bool) -> u8 {
	if value {
		byte | (1 << position)
	} else {
		byte & !(1 << position)
	}
}

/// Find `width` consecutive zero bytes, only considering positions congruent to `from` modulo `width`
///
/// UTF-16 terminators must be aligned to the start of the string, otherwise the high byte
/// of one character and the low byte of the next could be mistaken for a terminator.
pub(crate) fn index_of_terminator(bytes: &[u8], from: usize, width: usize) -> Option<usize> {
	if width == 0 || from > bytes.len() {
		return None;
	}

	bytes[from..]
		.chunks_exact(width)
		.position(|chunk| chunk.iter().all(|b| *b == 0))
		.map(|index| from + index * width)
}
