pub mod decode;

pub use crate::decode::{DecodedText, decode_document, sniff_charset};
