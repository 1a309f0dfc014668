//! Reference decoder for `multipart/form-data` bodies.
//!
//! Strict about framing: every part must be introduced by `--boundary\r\n`,
//! separated from its body by a blank line and closed by `\r\n--boundary`.
//! The epilogue after the closing marker is ignored.

use bytes::Bytes;

use crate::error::{DecodeError, Result};

/// One decoded part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub name:         String,
    pub filename:     Option<String>,
    pub content_type: Option<String>,
    pub data:         Bytes,
}

impl Part {
    pub fn is_file(&self) -> bool { self.filename.is_some() }

    pub fn text(&self) -> Option<&str> { std::str::from_utf8(&self.data).ok() }
}

pub fn decode(boundary: &str, body: &[u8]) -> Result<Vec<Part>> {
    let delimiter = format!("--{boundary}").into_bytes();
    let separator = format!("\r\n--{boundary}").into_bytes();

    if !body.starts_with(&delimiter) {
        return Err(DecodeError::MissingOpeningBoundary);
    }

    let mut parts = Vec::new();
    let mut pos = delimiter.len();

    loop {
        let rest = &body[pos..];
        if rest.starts_with(b"--") {
            return Ok(parts);
        }
        if !rest.starts_with(b"\r\n") {
            return Err(DecodeError::MalformedDelimiter { offset: pos });
        }
        let start = pos + 2;

        let end = find(body, &separator, start).ok_or(DecodeError::UnterminatedPart { offset: start })?;
        parts.push(parse_part(&body[start..end], start)?);

        pos = end + separator.len();
    }
}

fn parse_part(raw: &[u8], offset: usize) -> Result<Part> {
    let split = find(raw, b"\r\n\r\n", 0).ok_or(DecodeError::MissingHeaderTerminator { offset })?;
    let head = std::str::from_utf8(&raw[..split])
        .map_err(|_| DecodeError::MalformedHeader("headers are not UTF-8".into()))?;

    let mut name = None;
    let mut filename = None;
    let mut content_type = None;

    for line in head.split("\r\n") {
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| DecodeError::MalformedHeader(line.to_string()))?;

        if key.trim().eq_ignore_ascii_case("content-disposition") {
            for param in value.split(';').map(str::trim) {
                if let Some(v) = param.strip_prefix("name=") {
                    name = Some(unquote(v).to_string());
                } else if let Some(v) = param.strip_prefix("filename=") {
                    filename = Some(unquote(v).to_string());
                }
            }
        } else if key.trim().eq_ignore_ascii_case("content-type") {
            content_type = Some(value.trim().to_string());
        }
    }

    Ok(Part {
        name: name.ok_or(DecodeError::MissingName)?,
        filename,
        content_type,
        data: Bytes::copy_from_slice(&raw[split + 4..]),
    })
}

fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s)
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|p| p + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hand_built_body() {
        let body = b"--b\r\n\
Content-Disposition: form-data; name=\"subject\"\r\n\r\n\
Hi\r\n\
--b\r\n\
Content-Disposition: form-data; name=\"f\"; filename=\"x.png\"\r\n\
Content-Type: image/png\r\n\r\n\
\x01\x02\r\n\
--b--\r\n";

        let parts = decode("b", body).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "subject");
        assert_eq!(parts[0].text(), Some("Hi"));
        assert!(!parts[0].is_file());
        assert_eq!(parts[1].filename.as_deref(), Some("x.png"));
        assert_eq!(parts[1].content_type.as_deref(), Some("image/png"));
        assert_eq!(parts[1].data.as_ref(), b"\x01\x02");
    }

    #[test]
    fn test_empty_value() {
        let body = b"--b\r\nContent-Disposition: form-data; name=\"e\"\r\n\r\n\r\n--b--\r\n";
        let parts = decode("b", body).unwrap();
        assert_eq!(parts[0].text(), Some(""));
    }

    #[test]
    fn test_rejects_missing_opening() {
        assert!(matches!(decode("b", b"garbage"), Err(DecodeError::MissingOpeningBoundary)));
    }

    #[test]
    fn test_rejects_unterminated_part() {
        let body = b"--b\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue";
        assert!(matches!(decode("b", body), Err(DecodeError::UnterminatedPart { .. })));
    }

    #[test]
    fn test_rejects_missing_name() {
        let body = b"--b\r\nContent-Disposition: form-data\r\n\r\nv\r\n--b--\r\n";
        assert!(matches!(decode("b", body), Err(DecodeError::MissingName)));
    }

    #[test]
    fn test_rejects_missing_blank_line() {
        let body = b"--b\r\nContent-Disposition: form-data; name=\"a\"\r\nv\r\n--b--\r\n";
        assert!(matches!(decode("b", body), Err(DecodeError::MissingHeaderTerminator { .. })));
    }
}
