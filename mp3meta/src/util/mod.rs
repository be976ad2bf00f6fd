pub(crate) mod buffer;
pub(crate) mod charset;
pub(crate) mod text;
