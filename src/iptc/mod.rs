//! IPTC keyword segment construction and base64 splicing.
//!
//! This module provides the two halves of the tag-embedding codec:
//!
//! - [`build_segment`] — Encode an ordered tag list into a JPEG APP13
//!   "Photoshop 3.0" resource block containing IPTC keyword records
//! - [`splice_bytes`] / [`splice_base64`] — Patch that segment into an
//!   existing JPEG byte stream right after the SOI marker, keeping the
//!   base64 form of the untouched remainder valid without re-encoding it
//!
//! Both halves are pure functions: no I/O, no retained state, identical
//! output for identical input. Any precondition violation aborts the whole
//! operation with an [`IptcError`]; there is no partial embedding.

mod segment;
mod splice;

pub use segment::{
    build_segment, encode_segment, encode_segment_parameter, encode_tag_element, encode_tag_part,
};
pub use splice::{patch_payload, splice_base64, splice_bytes};

/// Errors produced by the segment builder and the splice codec.
#[derive(Debug, thiserror::Error)]
pub enum IptcError {
    /// A tag contains a non-ASCII character. Truncating or reinterpreting
    /// it would desync the declared length field, so it is rejected.
    #[error("tag {0:?} contains a non-ASCII character")]
    NonAsciiTag(String),

    /// An encoded length no longer fits its big-endian u16 length field.
    #[error("{what} is {len} bytes, which exceeds the 16-bit length field")]
    LengthOverflow { what: &'static str, len: usize },

    /// The source image does not begin with `FF D8 FF` (SOI plus the start
    /// of the next marker), so the fixed 3-byte splice prefix does not apply.
    #[error("image data does not begin with the JPEG SOI marker bytes FF D8 FF")]
    BadSignature,
}
