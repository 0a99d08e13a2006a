//! HTTP helpers shared by the synchronous backends.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reelsmith_error::{ProviderError, ProviderErrorKind, ReelsmithResult};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Default timeout for synchronous provider calls.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn http_client() -> ReelsmithResult<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| ProviderError::new(ProviderErrorKind::Transport(e.to_string())).into())
}

pub(crate) fn transport(e: reqwest::Error) -> ProviderError {
    ProviderError::new(ProviderErrorKind::Transport(e.to_string()))
}

/// Map non-2xx responses to `Api` errors carrying the body.
pub(crate) async fn ensure_success(response: Response) -> ReelsmithResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ProviderError::new(ProviderErrorKind::Api {
        status_code: status.as_u16(),
        message,
    })
    .into())
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> ReelsmithResult<T> {
    let response = ensure_success(response).await?;
    response.json::<T>().await.map_err(|e| {
        ProviderError::new(ProviderErrorKind::InvalidResponse(format!(
            "Failed to parse response: {}",
            e
        )))
        .into()
    })
}

pub(crate) async fn read_bytes(response: Response) -> ReelsmithResult<Vec<u8>> {
    let response = ensure_success(response).await?;
    let bytes = response.bytes().await.map_err(transport)?;
    if bytes.is_empty() {
        return Err(ProviderError::new(ProviderErrorKind::EmptyResponse(
            "empty body".to_string(),
        ))
        .into());
    }
    Ok(bytes.to_vec())
}

pub(crate) fn decode_base64(data: &str) -> ReelsmithResult<Vec<u8>> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| ProviderError::new(ProviderErrorKind::Base64Decode(e.to_string())).into())
}

/// Encode bytes as a `data:` URL.
///
/// # Examples
///
/// ```
/// assert_eq!(
///     reelsmith_models::data_url(b"hi", "image/png"),
///     "data:image/png;base64,aGk="
/// );
/// ```
pub fn data_url(data: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(data))
}

/// Guess a MIME type from an output filename.
pub(crate) fn mime_from_filename(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_filename() {
        assert_eq!(mime_from_filename("shot_00001_.PNG"), "image/png");
        assert_eq!(mime_from_filename("clip.mp4"), "video/mp4");
        assert_eq!(mime_from_filename("noext"), "application/octet-stream");
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        assert!(decode_base64("!!!").is_err());
        assert_eq!(decode_base64(" aGk= ").unwrap(), b"hi".to_vec());
    }
}
