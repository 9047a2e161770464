use async_trait::async_trait;
use log::{debug, warn};
use selfup_backend::{Asset, FetchError, Release, ReleaseSource};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub assets: Vec<GitHubAsset>,
}

impl From<GitHubRelease> for Release {
    fn from(release: GitHubRelease) -> Self {
        Release::new(
            release.tag_name,
            release.prerelease,
            release
                .assets
                .into_iter()
                .map(|asset| Asset::new(asset.name, asset.browser_download_url))
                .collect(),
        )
    }
}

// The list endpoint returns an array, `/releases/latest` a single object.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReleasePayload {
    Many(Vec<GitHubRelease>),
    One(GitHubRelease),
}

impl ReleasePayload {
    fn into_releases(self) -> Vec<Release> {
        let releases = match self {
            Self::Many(releases) => releases,
            Self::One(release) => vec![release],
        };
        releases
            .into_iter()
            .filter(|release| !release.draft)
            .map(Release::from)
            .collect()
    }
}

/// Reads releases from a GitHub-compatible releases endpoint.
pub struct GitHubReleaseSource {
    client: reqwest::Client,
    releases_url: String,
    app_name: String,
}

impl GitHubReleaseSource {
    #[must_use]
    pub fn new(
        client: reqwest::Client,
        releases_url: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            releases_url: releases_url.into(),
            app_name: app_name.into(),
        }
    }

    fn user_agent(&self, current_version: &str) -> String {
        format!("{}/{current_version}", self.app_name)
    }

    async fn try_fetch(&self, current_version: &str) -> Result<Vec<Release>, FetchError> {
        let response = self
            .client
            .get(&self.releases_url)
            .header("User-Agent", self.user_agent(current_version))
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|error| FetchError::http("release list request failed", error))?;

        if !response.status().is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status(),
            });
        }

        let payload: ReleasePayload = response
            .json()
            .await
            .map_err(|error| FetchError::http("failed to parse release list", error))?;

        Ok(payload.into_releases())
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleaseSource {
    async fn fetch_releases(&self, current_version: &str) -> Vec<Release> {
        debug!("Fetching releases from {}", self.releases_url);
        match self.try_fetch(current_version).await {
            Ok(releases) => {
                debug!("Fetched {} releases", releases.len());
                releases
            }
            Err(error) => {
                warn!("Failed to fetch releases ({}): {error}", self.releases_url);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{GitHubReleaseSource, ReleasePayload};

    #[test]
    fn release_list_maps_to_releases_without_drafts() {
        let value = json!([
            {
                "tag_name": "v1.2.0",
                "prerelease": false,
                "assets": [
                    {
                        "name": "selfup-linux-amd64-v1.2.0.tar.gz",
                        "browser_download_url": "https://example.invalid/linux",
                        "size": 1024
                    }
                ]
            },
            { "tag_name": "v1.3.0-rc.1", "prerelease": true, "assets": [] },
            { "tag_name": "v1.4.0", "draft": true }
        ]);

        let payload: ReleasePayload =
            serde_json::from_value(value).expect("release list should deserialize");
        let releases = payload.into_releases();

        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].tag, "v1.2.0");
        assert_eq!(releases[0].assets[0].url, "https://example.invalid/linux");
        assert!(releases[1].prerelease);
    }

    #[test]
    fn single_release_object_is_accepted() {
        let value = json!({
            "tag_name": "v2.0.0",
            "html_url": "https://example.invalid/releases/v2.0.0",
            "assets": []
        });

        let payload: ReleasePayload =
            serde_json::from_value(value).expect("single release should deserialize");
        let releases = payload.into_releases();

        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].tag, "v2.0.0");
        assert!(!releases[0].prerelease);
    }

    #[test]
    fn user_agent_carries_current_version() {
        let source = GitHubReleaseSource::new(
            reqwest::Client::new(),
            "https://api.github.com/repos/almeidx/selfup/releases",
            "selfup",
        );

        assert_eq!(source.user_agent("v1.0.0"), "selfup/v1.0.0");
    }

    #[tokio::test]
    async fn unreachable_endpoint_yields_empty_list() {
        use selfup_backend::ReleaseSource;

        let source = GitHubReleaseSource::new(
            reqwest::Client::new(),
            "http://127.0.0.1:9/releases",
            "selfup",
        );

        assert!(source.fetch_releases("v1.0.0").await.is_empty());
    }
}
