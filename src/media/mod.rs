//! Media type detection.

pub mod sniff;

pub use sniff::{detect_content_type, OCTET_STREAM, SNIFF_LEN, TEXT_PLAIN_UTF8};
