//! Probe-loading: fetch an image URL and decode just enough of it to know
//! it is a real image.

use std::future::Future;
use std::io::Cursor;
use std::time::Duration;

use url::Url;

use crate::error::LoadFailure;

/// Most bytes read from a response. Image headers sit in the first few
/// hundred bytes; the rest of the body is never needed.
pub const MAX_PROBE_BYTES: usize = 256 * 1024;

/// Checks that a URL points at a decodable image.
pub trait ImageProbe {
    fn probe(&self, url: &Url) -> impl Future<Output = Result<(), LoadFailure>> + Send;
}

/// Race `probe` against `limit`. A probe that never answers becomes
/// [`LoadFailure::Timeout`].
pub async fn probe_with_timeout<P: ImageProbe + ?Sized>(
    probe: &P,
    url: &Url,
    limit: Duration,
) -> Result<(), LoadFailure> {
    match tokio::time::timeout(limit, probe.probe(url)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(%url, "image probe timed out after {} ms", limit.as_millis());
            Err(LoadFailure::Timeout(limit))
        }
    }
}

/// Fetches over HTTP(S) and reads the image header.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("loopreel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Read the body chunk by chunk until the header decodes, the body
    /// ends, or [`MAX_PROBE_BYTES`] have arrived.
    async fn read_header(&self, url: &Url) -> Result<(u32, u32), LoadFailure> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| LoadFailure::Decode(format!("request failed: {e}")))?;

        let mut buf = Vec::new();
        loop {
            let chunk = response
                .chunk()
                .await
                .map_err(|e| LoadFailure::Decode(format!("body could not be read: {e}")))?;
            let Some(chunk) = chunk else {
                break;
            };
            let full = append_capped(&mut buf, &chunk, MAX_PROBE_BYTES);
            if let Ok(dims) = decode_dimensions(&buf) {
                return Ok(dims);
            }
            if full {
                tracing::debug!(%url, read = buf.len(), "stopped reading at the byte cap");
                break;
            }
        }
        decode_dimensions(&buf)
    }
}

/// Append as much of `chunk` as fits under `cap`. Returns whether the
/// buffer is now full.
fn append_capped(buf: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(buf.len());
    buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    buf.len() >= cap
}

impl ImageProbe for HttpProbe {
    async fn probe(&self, url: &Url) -> Result<(), LoadFailure> {
        let (width, height) = self.read_header(url).await?;
        tracing::debug!(%url, width, height, "image probe succeeded");
        Ok(())
    }
}

/// Dimensions of an encoded image, rejecting empty ones.
pub fn decode_dimensions(bytes: &[u8]) -> Result<(u32, u32), LoadFailure> {
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LoadFailure::Decode(e.to_string()))?
        .into_dimensions()
        .map_err(|e| LoadFailure::Decode(format!("not a decodable image ({e})")))?;
    if width == 0 || height == 0 {
        return Err(LoadFailure::Decode("image has no pixels".to_string()));
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Never;

    impl ImageProbe for Never {
        async fn probe(&self, _url: &Url) -> Result<(), LoadFailure> {
            std::future::pending().await
        }
    }

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::new(2, 3);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_real_images() {
        assert_eq!(decode_dimensions(&tiny_png()).unwrap(), (2, 3));
    }

    #[test]
    fn rejects_non_images() {
        let err = decode_dimensions(b"<html>not an image</html>").unwrap_err();
        assert!(matches!(err, LoadFailure::Decode(_)));
    }

    #[test]
    fn reads_stop_at_the_cap() {
        let mut buf = Vec::new();
        assert!(!append_capped(&mut buf, &[1; 6], 10));
        assert!(append_capped(&mut buf, &[2; 6], 10));
        assert_eq!(buf.len(), 10);
        assert!(append_capped(&mut buf, &[3; 6], 10));
        assert_eq!(buf, [1, 1, 1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn header_alone_is_enough() {
        // drop the IEND chunk; the dimensions come from IHDR
        let png = tiny_png();
        let head = &png[..png.len() - 12];
        assert_eq!(decode_dimensions(head).unwrap(), (2, 3));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_probe_times_out() {
        let url = Url::parse("https://example.com/a.png").unwrap();
        let outcome = probe_with_timeout(&Never, &url, Duration::from_secs(10)).await;
        assert_eq!(outcome, Err(LoadFailure::Timeout(Duration::from_secs(10))));
    }
}
