use std::time::Duration;

use bytes::BytesMut;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, warn};

use crate::ingest::models::RawDocument;
use crate::ingest::IngestError;

/// Downloads the file at `url`. The whole exchange, body included, is bounded by `timeout`.
///
/// The body is read chunk by chunk and the download is abandoned as soon as it grows
/// past `max_bytes`, so an oversized file is never held in memory.
pub async fn fetch_document(
    client: &Client,
    url: &str,
    timeout: Duration,
    max_bytes: usize,
) -> Result<RawDocument, IngestError> {
    debug!(url, "Fetching resume file");

    let mut response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| {
            warn!(url, timed_out = e.is_timeout(), "Resume fetch failed: {e}");
            IngestError::Fetch(e)
        })?;

    let status = response.status();
    if !status.is_success() {
        warn!(url, status = status.as_u16(), "Resume download returned non-2xx");
        return Err(IngestError::Download {
            status: status.as_u16(),
        });
    }

    if let Some(declared) = response.content_length() {
        let declared = usize::try_from(declared).unwrap_or(usize::MAX);
        if declared > max_bytes {
            warn!(url, size = declared, "Declared resume size exceeds limit");
            return Err(size_limit_error(declared, max_bytes));
        }
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut body = BytesMut::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| {
        warn!(url, timed_out = e.is_timeout(), "Reading resume body failed: {e}");
        IngestError::Fetch(e)
    })? {
        let size = body.len() + chunk.len();
        if size > max_bytes {
            warn!(url, size, "Resume body exceeded size limit, aborting download");
            return Err(size_limit_error(size, max_bytes));
        }
        body.extend_from_slice(&chunk);
    }
    let bytes = body.freeze();

    debug!(url, size = bytes.len(), content_type = %content_type, "Resume file downloaded");

    Ok(RawDocument {
        bytes,
        content_type,
        source_url: url.to_string(),
    })
}

fn size_limit_error(size: usize, max_bytes: usize) -> IngestError {
    IngestError::SizeLimit {
        size,
        limit_mb: max_bytes / (1024 * 1024),
    }
}
