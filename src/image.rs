//! Image references and URL validation.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{LoopError, Result};

/// Longest URL the input field accepts.
pub const MAX_URL_LENGTH: usize = 2048;

const MAX_DISPLAY_NAME: usize = 30;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique image token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn generate() -> Self {
        let seq = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        ImageId(format!("img-{}", base36(seq)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ImageId {
    fn from(s: &str) -> Self {
        ImageId(s.to_string())
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// An accepted image. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: ImageId,
    pub source_url: Url,
    pub display_name: String,
}

impl ImageRef {
    pub fn new(source_url: Url) -> Self {
        let display_name = display_name_for(&source_url);
        Self {
            id: ImageId::generate(),
            source_url,
            display_name,
        }
    }

    pub fn src(&self) -> &str {
        self.source_url.as_str()
    }
}

/// Trim and validate raw user input into an absolute http(s) URL.
pub fn parse_image_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LoopError::EmptyInput);
    }
    if trimmed.len() > MAX_URL_LENGTH {
        return Err(LoopError::InvalidUrl(format!(
            "URL is longer than {MAX_URL_LENGTH} characters"
        )));
    }
    let url = Url::parse(trimmed).map_err(|e| LoopError::InvalidUrl(format!("{trimmed}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(LoopError::InvalidUrl(format!(
            "{trimmed}: scheme '{other}' is not http or https"
        ))),
    }
}

/// Human-readable name: the file stem of the last path segment, or
/// `<domain>-image` when the path has no usable file name.
pub fn display_name_for(url: &Url) -> String {
    let file = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("");

    let usable = file.len() >= 3 && file.contains('.');
    let name = if usable {
        match file.rfind('.') {
            Some(dot) if dot > 0 => file[..dot].to_string(),
            _ => file.to_string(),
        }
    } else {
        let host = url.host_str().unwrap_or("image");
        let host = host.strip_prefix("www.").unwrap_or(host);
        let domain = host.split('.').next().unwrap_or(host);
        format!("{domain}-image")
    };

    if name.chars().count() > MAX_DISPLAY_NAME {
        let short: String = name.chars().take(MAX_DISPLAY_NAME).collect();
        format!("{short}...")
    } else {
        name
    }
}
