// Shorthand for return Err(Mp3MetaError::new(ErrorKind::Foo, message))
//
// Usage:
// - err!(Variant, Message) -> return Err(Mp3MetaError::new(ErrorKind::Variant, Message))
macro_rules! err {
	($variant:ident, $reason:expr) => {
		return Err(crate::error::Mp3MetaError::new(
			crate::error::ErrorKind::$variant,
			$reason,
		))
	};
}

// Shorthand for Mp3MetaError::new(ErrorKind::InvalidData, Message)
//
// Usage:
//
// - decode_err!(Message)
//
// or bail:
//
// - decode_err!(@BAIL Message)
macro_rules! decode_err {
	(@BAIL $reason:expr) => {
		return Err(decode_err!($reason))
	};
	($reason:expr) => {
		crate::error::Mp3MetaError::invalid_data($reason)
	};
}

pub(crate) use {decode_err, err};
