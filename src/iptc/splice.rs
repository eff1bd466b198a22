use super::IptcError;

/// Every baseline JPEG starts with the SOI marker `FF D8` followed by the
/// `FF` opening the next marker. These are the 3 bytes the splice replaces.
const JPEG_PREFIX: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Base64 encoding of [`JPEG_PREFIX`]: 3 bytes, exactly one base64 group.
const JPEG_PREFIX_B64: &str = "/9j/";

/// Build the patch payload that replaces the first 3 bytes of the image:
/// `FF D8 || segment || fill || FF`.
///
/// Fill bytes are `0xFF`, which JPEG decoders skip as marker padding. They
/// are appended until the payload length is a multiple of 3, so the payload
/// base64-encodes to whole groups and the remainder of an already-encoded
/// stream can be concatenated untouched.
pub fn patch_payload(segment: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(segment.len() + 5);
    payload.extend_from_slice(&[0xFF, 0xD8]);
    payload.extend_from_slice(segment);

    // Round up over the trailing FF that reopens the next marker
    let fill = (3 - (payload.len() + 1) % 3) % 3;
    payload.resize(payload.len() + fill, 0xFF);
    payload.push(0xFF);

    debug_assert_eq!(payload.len() % 3, 0);
    payload
}

/// Insert a built segment into a raw JPEG byte stream.
///
/// The output is `patch_payload(segment) || image[3..]`; the input is never
/// modified. Fails with [`IptcError::BadSignature`] if the image does not
/// begin with `FF D8 FF`.
pub fn splice_bytes(image: &[u8], segment: &[u8]) -> Result<Vec<u8>, IptcError> {
    if image.len() < JPEG_PREFIX.len() || image[..3] != JPEG_PREFIX {
        return Err(IptcError::BadSignature);
    }

    let mut out = patch_payload(segment);
    out.extend_from_slice(&image[3..]);
    Ok(out)
}

/// Insert a built segment into the base64 form of a JPEG without decoding
/// and re-encoding the image.
///
/// Only the patch payload is base64-encoded; the original stream minus its
/// first 4 characters (the encoding of the 3 replaced bytes) is appended
/// as-is. Offset 3 is a multiple of 3, and [`patch_payload`] keeps its own
/// length a multiple of 3, so the group boundaries of the remainder are
/// never disturbed.
pub fn splice_base64(image_b64: &str, segment: &[u8]) -> Result<String, IptcError> {
    let remainder = image_b64
        .strip_prefix(JPEG_PREFIX_B64)
        .ok_or(IptcError::BadSignature)?;

    let payload = patch_payload(segment);
    let mut out = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &payload);
    out.push_str(remainder);
    Ok(out)
}
