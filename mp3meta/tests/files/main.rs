#![allow(missing_docs)]

mod save;
mod scan;
pub(crate) mod util;
