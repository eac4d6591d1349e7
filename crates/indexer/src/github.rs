use crate::error::{IndexerError, Result};
use crate::source::{decode_utf8, SourceProvider, SourceRef};
use async_trait::async_trait;
use base64::Engine;
use reqwest::{header, Client, Url};
use serde::Deserialize;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("script-index/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeItem>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeItem {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    content: Option<String>,
    encoding: Option<String>,
}

/// Scripts on one branch of a GitHub repository, read through the REST API.
/// Requests are sent one at a time and never retried.
pub struct GitHubSource {
    client: Client,
    api_base: String,
    owner: String,
    name: String,
    branch: String,
    extension: String,
    token: Option<String>,
}

impl GitHubSource {
    /// `repo` is `owner/name`.
    pub fn new(repo: &str, branch: &str, extension: &str, token: Option<String>) -> Result<Self> {
        Self::with_api_base(DEFAULT_API_BASE, repo, branch, extension, token)
    }

    pub fn with_api_base(
        api_base: &str,
        repo: &str,
        branch: &str,
        extension: &str,
        token: Option<String>,
    ) -> Result<Self> {
        let (owner, name) = repo
            .split_once('/')
            .filter(|(owner, name)| !owner.is_empty() && !name.is_empty() && !name.contains('/'))
            .ok_or_else(|| IndexerError::Other(format!("Expected OWNER/NAME, got '{repo}'")))?;

        let token = token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            log::warn!("No GitHub token configured; requests are subject to anonymous rate limits");
        }

        let client = Client::builder().user_agent(USER_AGENT).build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
            branch: branch.to_string(),
            extension: extension.trim_start_matches('.').to_lowercase(),
            token,
        })
    }

    fn endpoint<'a>(&self, tail: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|err| IndexerError::Other(format!("Invalid API base: {err}")))?;
        url.path_segments_mut()
            .map_err(|()| IndexerError::Other(format!("Invalid API base: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.name.as_str()])
            .extend(tail);
        Ok(url)
    }

    fn tree_url(&self) -> Result<Url> {
        let mut url = self.endpoint(["git", "trees", self.branch.as_str()])?;
        url.query_pairs_mut().append_pair("recursive", "1");
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url> {
        let mut url = self.endpoint(std::iter::once("contents").chain(path.split('/')))?;
        url.query_pairs_mut().append_pair("ref", &self.branch);
        Ok(url)
    }

    fn get(&self, url: Url) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.header(header::AUTHORIZATION, format!("token {token}")),
            None => request,
        }
    }
}

#[async_trait]
impl SourceProvider for GitHubSource {
    fn describe(&self) -> String {
        format!("{}/{}@{} (*.{})", self.owner, self.name, self.branch, self.extension)
    }

    async fn list_sources(&self) -> Result<Vec<SourceRef>> {
        let url = self.tree_url()?;
        log::debug!("GET {url}");
        let response = self
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| IndexerError::Listing(err.to_string()))?;
        let tree: TreeResponse = response
            .json()
            .await
            .map_err(|err| IndexerError::Listing(err.to_string()))?;

        if tree.truncated {
            log::warn!(
                "GitHub truncated the tree of {}; some scripts are missing",
                self.describe()
            );
        }
        let sources = filter_tree(tree.tree, &self.extension);
        log::info!("Found {} scripts in {}", sources.len(), self.describe());
        Ok(sources)
    }

    async fn fetch_text(&self, source: &SourceRef) -> Result<String> {
        let url = self.contents_url(&source.path)?;
        log::debug!("GET {url}");
        let response = self
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| IndexerError::source_read(&source.path, err))?;
        let body: ContentResponse = response
            .json()
            .await
            .map_err(|err| IndexerError::source_read(&source.path, err))?;

        if let Some(encoding) = body.encoding.as_deref() {
            if encoding != "base64" {
                return Err(IndexerError::source_read(
                    &source.path,
                    format!("unsupported encoding '{encoding}'"),
                ));
            }
        }
        let content = body
            .content
            .ok_or_else(|| IndexerError::source_read(&source.path, "response has no content"))?;
        decode_content(&source.path, &content)
    }
}

fn filter_tree(items: Vec<TreeItem>, extension: &str) -> Vec<SourceRef> {
    items
        .into_iter()
        .filter(|item| item.kind == "blob")
        .filter(|item| {
            item.path
                .rsplit_once('.')
                .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(extension))
        })
        .map(|item| SourceRef::from_path(item.path))
        .collect()
}

/// Base64 payload of the contents API (wrapped at 60 columns) to text.
fn decode_content(path: &str, content: &str) -> Result<String> {
    let cleaned: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(cleaned)
        .map_err(|err| IndexerError::source_read(path, err))?;
    decode_utf8(path, bytes)
}
