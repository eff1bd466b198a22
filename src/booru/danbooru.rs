use anyhow::{Context, Result};
use reqwest::Client;

use super::{Post, PostSource};

/// Danbooru posts API client.
pub struct DanbooruClient {
    base_url: String,
    client: Client,
}

impl DanbooruClient {
    pub fn new(base_url: String, user_agent: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait::async_trait]
impl PostSource for DanbooruClient {
    fn name(&self) -> &str {
        "danbooru"
    }

    async fn fetch_post(&self, id: u64) -> Result<Post> {
        let url = format!("{}/posts/{id}.json", self.base_url);
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("Post metadata request failed")?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .context("Failed to read post metadata response")?;

        if !status.is_success() {
            anyhow::bail!("Danbooru API error ({status}): {text}");
        }

        serde_json::from_str(&text).context("Failed to parse post metadata JSON")
    }

    async fn fetch_file(&self, post: &Post) -> Result<Vec<u8>> {
        let url = post
            .file_url
            .as_deref()
            .context("Post has no file URL (may require a logged-in account)")?;
        log::debug!("GET {url}");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("Image download failed")?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Image download error ({status}) for {url}");
        }

        let bytes = resp
            .bytes()
            .await
            .context("Failed to read image response body")?;
        Ok(bytes.to_vec())
    }
}
