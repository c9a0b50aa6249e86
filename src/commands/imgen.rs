//! Text-to-image generation via the Hugging Face inference API.

use super::CommandError;
use tracing::{debug, instrument, warn};

const API_URL: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-xl-base-1.0";

/// Raw image returned by the generation endpoint.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Encoded image data.
    pub bytes: Vec<u8>,
    /// Content type reported by the API ("image/png" etc.).
    pub content_type: String,
}

/// Generates an image from a text prompt.
///
/// The endpoint answers with raw image bytes on success and a JSON error
/// body otherwise; a 200 without an image content type is treated as a
/// failure too.
///
/// # Errors
///
/// Returns [`CommandError`] on network failure, API errors, and non-image
/// responses.
#[instrument(skip(http, api_key, prompt))]
pub async fn generate(
    http: &reqwest::Client,
    api_key: &str,
    prompt: &str,
) -> Result<GeneratedImage, CommandError> {
    debug!("Requesting image generation");
    let response = http
        .post(API_URL)
        .bearer_auth(api_key)
        .json(&serde_json::json!({ "inputs": prompt }))
        .send()
        .await
        .map_err(|e| {
            warn!(error = %e, "Image generation request failed");
            CommandError::new(format!("Image generation request failed: {e}"))
        })?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(%status, "Image generation API error");
        return Err(CommandError::new(format!(
            "Image generation API error {status}: {body}"
        )));
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    if !is_image(&content_type) {
        let body = response.text().await.unwrap_or_default();
        return Err(CommandError::new(format!(
            "Image generation returned no image: {body}"
        )));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| CommandError::new(format!("Failed to read image data: {e}")))?
        .to_vec();
    debug!(len = bytes.len(), "Image generated");
    Ok(GeneratedImage {
        bytes,
        content_type,
    })
}

fn is_image(content_type: &str) -> bool {
    content_type.starts_with("image/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_image_content_types_are_accepted() {
        assert!(is_image("image/png"));
        assert!(is_image("image/jpeg"));
        assert!(!is_image("application/json"));
        assert!(!is_image(""));
    }
}
