use bytes::{BufMut, BytesMut};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::form::{EncodedBody, FileAttachment, FormField, OCTET_STREAM};

/// Every generated boundary starts with this prefix.
pub const BOUNDARY_PREFIX: &str = "----FormBoundary";

const BOUNDARY_TOKEN_LEN: usize = 24;

/// Per-part framing overhead excluding names, values and payloads.
const PART_OVERHEAD: usize = 128;

pub fn generate_boundary() -> String {
    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(BOUNDARY_TOKEN_LEN)
        .map(char::from)
        .collect();
    format!("{BOUNDARY_PREFIX}{token}")
}

/// Encode scalar fields, repeated fields and files into one buffer under a
/// freshly generated boundary.
///
/// Parts are emitted in that order and, within each group, in input order.
/// File payloads are copied verbatim.
pub fn encode(fields: &[FormField], repeated: &[FormField], files: &[FileAttachment]) -> EncodedBody {
    encode_with_boundary(generate_boundary(), fields, repeated, files)
}

/// Same as [`encode`] with a caller-chosen boundary.
///
/// ```
/// use mailcast_multipart::{FormField, encode_with_boundary};
///
/// let body = encode_with_boundary("B", &[FormField::new("subject", "Hi")], &[], &[]);
/// assert_eq!(
///     body.as_bytes(),
///     b"--B\r\nContent-Disposition: form-data; name=\"subject\"\r\n\r\nHi\r\n--B--\r\n"
/// );
/// ```
pub fn encode_with_boundary(
    boundary: impl Into<String>,
    fields: &[FormField],
    repeated: &[FormField],
    files: &[FileAttachment],
) -> EncodedBody {
    let boundary = boundary.into();
    let mut buf = BytesMut::with_capacity(encoded_len_hint(&boundary, fields, repeated, files));

    for field in fields.iter().chain(repeated) {
        put_text_part(&mut buf, &boundary, field);
    }

    for file in files {
        put_file_part(&mut buf, &boundary, file);
    }

    buf.put_slice(b"--");
    buf.put_slice(boundary.as_bytes());
    buf.put_slice(b"--\r\n");

    EncodedBody::new(boundary, buf.freeze())
}

fn put_text_part(buf: &mut BytesMut, boundary: &str, field: &FormField) {
    let head = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
        field.name
    );
    buf.put_slice(head.as_bytes());
    buf.put_slice(field.value.as_bytes());
    buf.put_slice(b"\r\n");
}

fn put_file_part(buf: &mut BytesMut, boundary: &str, file: &FileAttachment) {
    let head = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {OCTET_STREAM}\r\n\r\n",
        file.field, file.filename
    );
    buf.put_slice(head.as_bytes());
    buf.put_slice(&file.data);
    buf.put_slice(b"\r\n");
}

fn encoded_len_hint(
    boundary: &str,
    fields: &[FormField],
    repeated: &[FormField],
    files: &[FileAttachment],
) -> usize {
    let per_part = boundary.len() + PART_OVERHEAD;
    let text: usize = fields
        .iter()
        .chain(repeated)
        .map(|f| per_part + f.name.len() + f.value.len())
        .sum();
    let binary: usize = files
        .iter()
        .map(|f| per_part + f.field.len() + f.filename.len() + f.data.len())
        .sum();
    text + binary + boundary.len() + 6
}
