use super::IptcError;

// The segment nests four fixed-layout levels:
//
//   segment           = APP13 marker || u16 length || segment parameter
//   segment parameter = resource header || u16 length || tag part
//   tag part          = header || tag element * n || footer
//   tag element       = tag marker || u16 length || tag bytes
//
// All length fields are big-endian and count the bytes that follow them,
// except the segment length, which also counts itself (JPEG convention).

/// JPEG APP13 segment marker.
const APP13_MARKER: [u8; 2] = [0xFF, 0xED];

/// "Photoshop 3.0" signature plus the 8BIM IPTC-IIM resource header (type
/// 0x0404, empty pascal name, zeroed size placeholder).
const RESOURCE_HEADER: [u8; 24] = *b"Photoshop 3.0\08BIM\x04\x04\x00\x00\x00\x00";

/// IPTC records preceding the keyword list: envelope record version (1:00),
/// envelope character set (1:90), and application record version (2:00).
const TAG_PART_HEADER: [u8; 22] = [
    0x1C, 0x01, 0x00, 0x00, 0x02, 0x00, 0x04, // 1:00 version
    0x1C, 0x01, 0x5A, 0x00, 0x03, 0x1B, 0x25, 0x47, // 1:90 charset
    0x1C, 0x02, 0x00, 0x00, 0x02, 0x00, 0x04, // 2:00 version
];

/// Trailing application record version (2:00) closing the keyword list.
const TAG_PART_FOOTER: [u8; 7] = [0x1C, 0x02, 0x00, 0x00, 0x02, 0x00, 0x04];

/// IPTC keyword record marker (2:25), one per tag.
const TAG_MARKER: [u8; 3] = [0x1C, 0x02, 0x19];

/// Encode one keyword record: `TAG_MARKER || u16 length || tag bytes`.
///
/// Tags must be ASCII. Anything else is rejected rather than mangled,
/// since a truncated or reinterpreted code point would no longer match
/// the declared length.
pub fn encode_tag_element(tag: &str) -> Result<Vec<u8>, IptcError> {
    if !tag.is_ascii() {
        return Err(IptcError::NonAsciiTag(tag.to_string()));
    }
    let text = tag.as_bytes();

    let len = u16::try_from(text.len()).map_err(|_| IptcError::LengthOverflow {
        what: "tag",
        len: text.len(),
    })?;

    let mut out = Vec::with_capacity(TAG_MARKER.len() + 2 + text.len());
    out.extend_from_slice(&TAG_MARKER);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(text);
    Ok(out)
}

/// Encode the full keyword list: `header || elements || footer`.
///
/// Tags are encoded in input order. An empty list is legal and yields just
/// the header and footer records.
pub fn encode_tag_part<S: AsRef<str>>(tags: &[S]) -> Result<Vec<u8>, IptcError> {
    let mut out = Vec::new();
    out.extend_from_slice(&TAG_PART_HEADER);
    for tag in tags {
        out.extend_from_slice(&encode_tag_element(tag.as_ref())?);
    }
    out.extend_from_slice(&TAG_PART_FOOTER);
    Ok(out)
}

/// Wrap a tag part in the Photoshop resource block:
/// `RESOURCE_HEADER || u16 length || tag part`.
pub fn encode_segment_parameter(tag_part: &[u8]) -> Result<Vec<u8>, IptcError> {
    let len = u16::try_from(tag_part.len()).map_err(|_| IptcError::LengthOverflow {
        what: "tag part",
        len: tag_part.len(),
    })?;

    let mut out = Vec::with_capacity(RESOURCE_HEADER.len() + 2 + tag_part.len());
    out.extend_from_slice(&RESOURCE_HEADER);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(tag_part);
    Ok(out)
}

/// Wrap a segment parameter in the APP13 marker segment:
/// `FF ED || u16 length || parameter`, where the length counts the
/// parameter plus the length field itself but not the marker.
pub fn encode_segment(parameter: &[u8]) -> Result<Vec<u8>, IptcError> {
    let len = u16::try_from(parameter.len() + 2).map_err(|_| IptcError::LengthOverflow {
        what: "segment",
        len: parameter.len() + 2,
    })?;

    let mut out = Vec::with_capacity(APP13_MARKER.len() + 2 + parameter.len());
    out.extend_from_slice(&APP13_MARKER);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(parameter);
    Ok(out)
}

/// Encode an ordered tag list into the complete APP13 segment bytes.
///
/// # Example
///
/// ```rust
/// use downbooru::iptc::build_segment;
///
/// let segment = build_segment(&["landscape", "sky"]).unwrap();
/// assert_eq!(&segment[..2], &[0xFF, 0xED]);
/// ```
pub fn build_segment<S: AsRef<str>>(tags: &[S]) -> Result<Vec<u8>, IptcError> {
    let tag_part = encode_tag_part(tags)?;
    let parameter = encode_segment_parameter(&tag_part)?;
    encode_segment(&parameter)
}
