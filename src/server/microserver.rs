//! Blocking HTTP/1.1 request reader and response writer over any
//! `Read + Write` stream.
//!
//! Surface:
//! - One request per connection (no keep-alive)
//! - Chunked transfer encoding is rejected
//! - Bodies need Content-Length
//! - Headers capped at 32 KiB, bodies at 1 MiB (enforced with `Read::take`)

use std::io::{Read, Write};
use thiserror::Error;

/// Maximum header section size (32 KiB)
const MAX_HEADER_SIZE: usize = 32 * 1024;

/// Maximum request body size (1 MiB)
pub const MAX_BODY_SIZE: usize = 1_048_576;

/// Why a request could not be read
#[derive(Error, Debug, PartialEq)]
pub enum RequestError {
    #[error("{0}")]
    Malformed(String),

    #[error("Request body too large")]
    TooLarge,
}

impl RequestError {
    pub fn status(&self) -> u16 {
        match self {
            RequestError::Malformed(_) => 400,
            RequestError::TooLarge => 413,
        }
    }
}

/// Parsed HTTP request
#[derive(Debug)]
pub struct HttpRequest {
    pub method: String,
    /// Request target without the query string
    pub path: String,
    pub body: Vec<u8>,
}

/// HTTP response to write back
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn json(status: u16, value: &impl serde::Serialize) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: serde_json::to_vec(value).unwrap_or_default(),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Read and parse one HTTP request.
///
/// `None` means the peer closed the connection before sending anything.
pub fn read_request(stream: &mut impl Read) -> Option<Result<HttpRequest, RequestError>> {
    let mut header_buf = Vec::with_capacity(4096);
    let mut byte = [0u8; 1];

    loop {
        match stream.read(&mut byte) {
            Ok(0) if header_buf.is_empty() => return None,
            Ok(0) => {
                return Some(Err(RequestError::Malformed(
                    "Connection closed mid-request".to_string(),
                )))
            }
            Ok(_) => {
                header_buf.push(byte[0]);
                if header_buf.len() > MAX_HEADER_SIZE {
                    return Some(Err(RequestError::Malformed("Headers too large".to_string())));
                }
                if header_buf.ends_with(b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) if header_buf.is_empty() => return None,
            Err(e) => return Some(Err(RequestError::Malformed(format!("Read error: {}", e)))),
        }
    }

    let mut parsed_headers = [httparse::EMPTY_HEADER; 64];
    let mut req = httparse::Request::new(&mut parsed_headers);
    match req.parse(&header_buf) {
        Ok(httparse::Status::Complete(_)) => {}
        Ok(httparse::Status::Partial) => {
            return Some(Err(RequestError::Malformed("Incomplete HTTP request".to_string())));
        }
        Err(e) => {
            return Some(Err(RequestError::Malformed(format!("HTTP parse error: {}", e))));
        }
    }

    let method = req.method.unwrap_or("").to_string();
    let target = req.path.unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/").to_string();

    let mut content_length: Option<usize> = None;
    let mut chunked = false;
    for h in req.headers.iter() {
        let value = String::from_utf8_lossy(h.value);
        if h.name.eq_ignore_ascii_case("Content-Length") {
            content_length = value.trim().parse().ok();
        } else if h.name.eq_ignore_ascii_case("Transfer-Encoding")
            && value.to_ascii_lowercase().contains("chunked")
        {
            chunked = true;
        }
    }

    if chunked {
        return Some(Err(RequestError::Malformed(
            "Chunked transfer encoding not supported".to_string(),
        )));
    }

    let body = match (method.as_str(), content_length) {
        ("POST" | "PUT" | "PATCH", None) => {
            return Some(Err(RequestError::Malformed(
                "POST requires Content-Length".to_string(),
            )));
        }
        (_, Some(len)) if len > 0 => {
            if len > MAX_BODY_SIZE {
                return Some(Err(RequestError::TooLarge));
            }
            let mut body = Vec::with_capacity(len);
            if let Err(e) = stream.take(len as u64).read_to_end(&mut body) {
                return Some(Err(RequestError::Malformed(format!("Read error: {}", e))));
            }
            if body.len() < len {
                return Some(Err(RequestError::Malformed(
                    "Connection closed mid-body".to_string(),
                )));
            }
            body
        }
        _ => Vec::new(),
    };

    Some(Ok(HttpRequest {
        method,
        path,
        body,
    }))
}

/// Write a response; write errors are ignored since the client may be gone.
pub fn write_response(stream: &mut impl Write, response: &HttpResponse) {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        response.status,
        reason(response.status),
        response.body.len()
    );
    for (name, value) in &response.headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    let _ = stream.write_all(head.as_bytes());
    if !response.body.is_empty() {
        let _ = stream.write_all(&response.body);
    }
    let _ = stream.flush();
}
