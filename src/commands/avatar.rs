//! Avatar URL size variants.

/// Sizes offered by the avatar viewer, in pixels.
pub const SIZES: [u32; 4] = [128, 256, 512, 1024];

/// Derives size-variant URLs for an avatar image.
///
/// Any existing `size` query parameter is replaced; other query parameters
/// are preserved.
pub fn size_variants(base_url: &str) -> Vec<(u32, String)> {
    SIZES
        .iter()
        .map(|&size| (size, with_size(base_url, size)))
        .collect()
}

/// Returns the URL with the given `size` query parameter.
pub fn with_size(base_url: &str, size: u32) -> String {
    let (path, query) = match base_url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (base_url, ""),
    };

    let mut params: Vec<String> = query
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("size="))
        .map(str::to_string)
        .collect();
    params.push(format!("size={size}"));

    format!("{path}?{}", params.join("&"))
}
