//! Random memes and animal pictures.

use super::CommandError;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

const MEME_API_URL: &str = "https://meme-api.com/gimme";
const CAT_API_URL: &str = "https://api.thecatapi.com/v1/images/search";
const DOG_API_URL: &str = "https://dog.ceo/api/breeds/image/random";

/// A fetched meme.
#[derive(Debug, Clone, Deserialize)]
pub struct Meme {
    /// Post title.
    pub title: String,
    /// Direct image URL.
    pub url: String,
    /// Source community.
    pub subreddit: String,
    /// Link to the original post.
    #[serde(rename = "postLink")]
    pub post_link: String,
    /// Whether the post is flagged not-safe-for-work.
    #[serde(default)]
    pub nsfw: bool,
}

/// Fetches a random meme, optionally restricted to one category.
///
/// # Errors
///
/// Returns [`CommandError`] on network or decode failure.
#[instrument(skip(http))]
pub async fn random_meme(
    http: &reqwest::Client,
    category: Option<&str>,
) -> Result<Meme, CommandError> {
    let url = match category {
        Some(category) => format!("{MEME_API_URL}/{category}"),
        None => MEME_API_URL.to_string(),
    };
    debug!(%url, "Fetching meme");

    let response = http.get(&url).send().await.map_err(|e| {
        warn!(error = %e, "Meme request failed");
        CommandError::new(format!("Meme request failed: {e}"))
    })?;
    if !response.status().is_success() {
        return Err(CommandError::new(format!(
            "Meme API error: {}",
            response.status()
        )));
    }

    response.json().await.map_err(|e| {
        warn!(error = %e, "Failed to parse meme response");
        CommandError::new(format!("Failed to parse meme response: {e}"))
    })
}

#[derive(Debug, Deserialize)]
struct CatImage {
    url: String,
}

/// Fetches a random cat picture URL.
///
/// # Errors
///
/// Returns [`CommandError`] on network or decode failure, or an empty
/// result set.
#[instrument(skip(http))]
pub async fn random_cat(http: &reqwest::Client) -> Result<String, CommandError> {
    let images: Vec<CatImage> = http
        .get(CAT_API_URL)
        .send()
        .await
        .map_err(|e| CommandError::new(format!("Cat request failed: {e}")))?
        .json()
        .await
        .map_err(|e| CommandError::new(format!("Failed to parse cat response: {e}")))?;

    images
        .into_iter()
        .next()
        .map(|image| image.url)
        .ok_or_else(|| CommandError::new("Cat API returned no images"))
}

#[derive(Debug, Deserialize)]
struct DogResponse {
    message: String,
    status: String,
}

/// Fetches a random dog picture URL.
///
/// # Errors
///
/// Returns [`CommandError`] on network or decode failure, or an API-level
/// error status.
#[instrument(skip(http))]
pub async fn random_dog(http: &reqwest::Client) -> Result<String, CommandError> {
    let response: DogResponse = http
        .get(DOG_API_URL)
        .send()
        .await
        .map_err(|e| CommandError::new(format!("Dog request failed: {e}")))?
        .json()
        .await
        .map_err(|e| CommandError::new(format!("Failed to parse dog response: {e}")))?;

    if response.status != "success" {
        return Err(CommandError::new(format!(
            "Dog API error status: {}",
            response.status
        )));
    }
    Ok(response.message)
}
