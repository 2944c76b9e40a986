//! Mock server helpers for registry testing
//!
//! Endpoints mirror the GitHub layout under `/repos/<owner>/<repo>/releases`.

use twine_update::{GitHubReleaseClient, Release, UpdateConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const REPO_OWNER: &str = "twine-sh";
pub const REPO_NAME: &str = "twine";

/// Path of the releases collection
pub fn releases_path() -> String {
    format!("/repos/{}/{}/releases", REPO_OWNER, REPO_NAME)
}

/// Configuration pointing at the mock server
pub fn mock_config(server: &MockServer) -> UpdateConfig {
    UpdateConfig {
        api_url: server.uri(),
        repo_owner: REPO_OWNER.to_string(),
        repo_name: REPO_NAME.to_string(),
        ..UpdateConfig::default()
    }
}

/// Release client pointing at the mock server
pub fn mock_client(server: &MockServer) -> GitHubReleaseClient {
    GitHubReleaseClient::new(&mock_config(server)).expect("client should build")
}

/// Serve `release` as the latest release
pub async fn mock_latest_release(server: &MockServer, release: &Release) {
    Mock::given(method("GET"))
        .and(path(format!("{}/latest", releases_path())))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Serve `release` at its tag
pub async fn mock_tagged_release(server: &MockServer, release: &Release) {
    Mock::given(method("GET"))
        .and(path(format!("{}/tags/{}", releases_path(), release.tag_name)))
        .respond_with(ResponseTemplate::new(200).set_body_json(release))
        .mount(server)
        .await;
}

/// Answer every request under `route` with `status`
pub async fn mock_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Serve `content` at `/download/<name>`
pub async fn mock_download(server: &MockServer, name: &str, content: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{}", name)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

/// Fail the test if anything under `/download/` is requested
pub async fn forbid_downloads(server: &MockServer) {
    Mock::given(method("GET"))
        .and(wiremock::matchers::path_regex("^/download/.*"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
