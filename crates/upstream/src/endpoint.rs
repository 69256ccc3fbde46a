//! Joining endpoint paths onto the configured backend base URL.

/// Build the absolute URL for `endpoint`.
///
/// Absolute `http://`/`https://` endpoints are returned unchanged. Otherwise a
/// single `/` separates the base URL from the endpoint, whatever slashes either
/// side already carries.
pub fn api_url(base_url: &str, endpoint: &str) -> String {
    if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
        return endpoint.to_string();
    }

    let base = base_url.strip_suffix('/').unwrap_or(base_url);
    if endpoint.starts_with('/') {
        format!("{base}{endpoint}")
    } else {
        format!("{base}/{endpoint}")
    }
}
