//! Upstream release lookup

use nodectl_errors::{Error, NetworkError};
use semver::Version;
use serde::Deserialize;

use crate::client::NetClient;

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    tag_name: Option<String>,
}

/// Validate a release tag as a semantic version with an optional leading `v`
///
/// Returns the tag as given when it parses.
#[must_use]
pub fn parse_release_tag(tag: &str) -> Option<String> {
    let tag = tag.trim();
    Version::parse(tag.strip_prefix('v').unwrap_or(tag))
        .ok()
        .map(|_| tag.to_string())
}

/// Extract and validate `tag_name` from a releases API body
///
/// # Errors
///
/// Returns [`NetworkError::InvalidResponse`] when the body has no tag or
/// the tag is not a version.
pub fn tag_from_release_body(body: serde_json::Value) -> Result<String, Error> {
    let release: ReleaseResponse = serde_json::from_value(body)
        .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;
    let tag = release
        .tag_name
        .ok_or_else(|| NetworkError::InvalidResponse("release has no tag_name".to_string()))?;
    parse_release_tag(&tag)
        .ok_or_else(|| NetworkError::InvalidResponse(format!("unparseable tag {tag}")).into())
}

/// Fetch the latest release tag from a GitHub-style releases endpoint
///
/// # Errors
///
/// Returns an error if the request fails or the response does not carry a
/// valid version tag.
pub async fn fetch_latest_tag(client: &NetClient, release_url: &str) -> Result<String, Error> {
    url::Url::parse(release_url).map_err(|e| NetworkError::InvalidUrl(e.to_string()))?;
    let body = client.get_json(release_url).await?;
    tag_from_release_body(body)
}
