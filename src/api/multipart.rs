/// Minimal `multipart/form-data` encoder for single-file uploads.
///
/// `ureq` 2.x has no multipart support, so the upload body is assembled
/// here: one part per field, CRLF line endings, closed by the terminating
/// boundary. The boundary is derived from the clock and re-rolled until it
/// does not occur anywhere in the payload.
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

static BOUNDARY_SEQ: AtomicU64 = AtomicU64::new(0);

/// An encoded multipart body together with its `Content-Type` header value.
#[derive(Debug)]
pub struct MultipartBody {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Encode a single file part named `field`.
pub fn encode_file(field: &str, file_name: &str, mime: &str, contents: &[u8]) -> MultipartBody {
    let boundary = pick_boundary(contents);

    let mut bytes = Vec::with_capacity(contents.len() + 256);
    bytes.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    bytes.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            escape_quoted(field),
            escape_quoted(file_name)
        )
        .as_bytes(),
    );
    bytes.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    bytes.extend_from_slice(contents);
    bytes.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    MultipartBody {
        content_type: format!("multipart/form-data; boundary={boundary}"),
        bytes,
    }
}

fn pick_boundary(contents: &[u8]) -> String {
    loop {
        let seq = BOUNDARY_SEQ.fetch_add(1, Ordering::Relaxed);
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let candidate = format!("----cloudcost{nanos:x}{seq:04x}");
        if !contains(contents, candidate.as_bytes()) {
            return candidate;
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

/// Quoted-string values in `Content-Disposition` cannot carry raw quotes
/// or line breaks.
fn escape_quoted(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '"' => '\'',
            '\r' | '\n' => ' ',
            other => other,
        })
        .collect()
}
