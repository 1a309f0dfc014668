use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_native_tls::TlsConnector;
use tracing::debug;
use url::{Host, Url};

use super::{Request, Response, Transport};
use crate::error::{Result, SubmissionError};

/// HTTP/1.1 over a raw TCP stream, TLS-wrapped for `https` URLs.
///
/// Opens one connection per request with `Connection: close` and reads the
/// whole response before returning. Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketTransport;

impl SocketTransport {
    pub fn new() -> Self { Self }
}

impl Transport for SocketTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        let url = Url::parse(&request.url)
            .map_err(|e| SubmissionError::Transport(format!("invalid URL '{}': {e}", request.url)))?;
        let host = url
            .host()
            .ok_or_else(|| SubmissionError::Transport(format!("URL '{}' has no host", request.url)))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| SubmissionError::Transport(format!("URL '{}' has no port", request.url)))?;
        let tls = match url.scheme() {
            "https" => true,
            "http" => false,
            other => return Err(SubmissionError::Transport(format!("unsupported scheme '{other}'"))),
        };

        let head = request_head(&request, &url, &host.to_string());
        let body = request.body.as_ref().map(|b| b.as_bytes()).unwrap_or_default();
        debug!(method = %request.method, url = %request.url, bytes = body.len(), "opening connection");

        // IP literals connect directly; brackets only belong in the Host header
        let (tcp, server_name) = match &host {
            Host::Domain(name) => (TcpStream::connect((*name, port)).await, name.to_string()),
            Host::Ipv4(addr) => (TcpStream::connect((*addr, port)).await, addr.to_string()),
            Host::Ipv6(addr) => (TcpStream::connect((*addr, port)).await, addr.to_string()),
        };
        let tcp = tcp.map_err(|e| SubmissionError::Transport(format!("connect to {host}:{port}: {e}")))?;

        let raw = if tls {
            let connector = native_tls::TlsConnector::new()
                .map(TlsConnector::from)
                .map_err(|e| SubmissionError::Transport(format!("TLS setup: {e}")))?;
            let stream = connector
                .connect(&server_name, tcp)
                .await
                .map_err(|e| SubmissionError::Transport(format!("TLS handshake with {server_name}: {e}")))?;
            exchange(stream, head.as_bytes(), body).await
        } else {
            exchange(tcp, head.as_bytes(), body).await
        }
        .map_err(|e| SubmissionError::Transport(e.to_string()))?;

        let (status, payload) = parse_response(&raw)?;
        debug!(status, bytes = payload.len(), "response received");

        Response::from_text(request.method, status, &String::from_utf8_lossy(&payload))
    }
}

fn request_head(request: &Request, url: &Url, host: &str) -> String {
    let mut target = url.path().to_string();
    if let Some(query) = url.query() {
        target.push('?');
        target.push_str(query);
    }
    let host_header = match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let mut head = format!("{} {target} HTTP/1.1\r\nHost: {host_header}\r\n", request.method);
    for (name, value) in request.headers() {
        head.push_str(&format!("{name}: {value}\r\n"));
    }
    if let Some(body) = &request.body {
        head.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    head.push_str("Connection: close\r\n\r\n");
    head
}

/// Writes the request and reads until the peer closes.
pub(crate) async fn exchange<S>(mut stream: S, head: &[u8], body: &[u8]) -> io::Result<Vec<u8>>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(head).await?;
    stream.write_all(body).await?;
    stream.flush().await?;

    let mut raw = Vec::new();
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => raw.extend_from_slice(&chunk[..n]),
            // servers that skip close_notify
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && !raw.is_empty() => break,
            Err(e) => return Err(e),
        }
    }
    Ok(raw)
}

/// Splits a raw HTTP/1.x response into its final status and decoded body.
///
/// Interim `1xx` responses are skipped. The body is delimited by chunked
/// framing, `Content-Length`, or connection close, in that order.
pub(crate) fn parse_response(raw: &[u8]) -> Result<(u16, Vec<u8>)> {
    let mut rest = raw;
    loop {
        let head_end = find(rest, b"\r\n\r\n")
            .ok_or_else(|| malformed("response ended before the header block was complete"))?;
        let head = String::from_utf8_lossy(&rest[..head_end]);
        let body = &rest[head_end + 4..];

        let mut lines = head.split("\r\n");
        let status_line = lines.next().unwrap_or_default();
        let status = parse_status_line(status_line)?;

        if (100..200).contains(&status) {
            rest = body;
            continue;
        }

        let mut content_length = None;
        let mut chunked = false;
        for line in lines {
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            let (name, value) = (name.trim(), value.trim());
            if name.eq_ignore_ascii_case("content-length") {
                content_length = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| malformed(&format!("bad Content-Length '{value}'")))?,
                );
            } else if name.eq_ignore_ascii_case("transfer-encoding") {
                chunked = value.to_ascii_lowercase().contains("chunked");
            }
        }

        let payload = if chunked {
            decode_chunked(body)?
        } else if let Some(len) = content_length {
            if body.len() < len {
                return Err(malformed(&format!(
                    "body truncated: expected {len} bytes, got {}",
                    body.len()
                )));
            }
            body[..len].to_vec()
        } else {
            body.to_vec()
        };

        return Ok((status, payload));
    }
}

fn parse_status_line(line: &str) -> Result<u16> {
    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next()) {
        (Some(version), Some(code)) if version.starts_with("HTTP/") => code
            .parse::<u16>()
            .map_err(|_| malformed(&format!("bad status line '{line}'"))),
        _ => Err(malformed(&format!("bad status line '{line}'"))),
    }
}

fn decode_chunked(mut body: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let line_end = find(body, b"\r\n").ok_or_else(|| malformed("chunk size line not terminated"))?;
        let line = String::from_utf8_lossy(&body[..line_end]);
        let size_field = line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| malformed(&format!("bad chunk size '{size_field}'")))?;
        body = &body[line_end + 2..];

        if size == 0 {
            return Ok(out);
        }
        let end = size
            .checked_add(2)
            .filter(|end| *end <= body.len())
            .ok_or_else(|| malformed("chunk shorter than its declared size"))?;
        if &body[size..end] != b"\r\n" {
            return Err(malformed("chunk not followed by CRLF"));
        }
        out.extend_from_slice(&body[..size]);
        body = &body[end..];
    }
}

fn malformed(detail: &str) -> SubmissionError { SubmissionError::Transport(format!("malformed HTTP response: {detail}")) }

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> { haystack.windows(needle.len()).position(|w| w == needle) }
