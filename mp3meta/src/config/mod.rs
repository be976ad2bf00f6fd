//! Various configuration options to control mp3meta

mod scan_options;

pub use scan_options::ScanOptions;
