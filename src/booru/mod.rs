//! Booru post metadata and the source trait.

mod danbooru;

pub use danbooru::DanbooruClient;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Metadata for a single booru post, as returned by the posts JSON API.
///
/// Only the fields the download pipeline needs are kept: the numeric post id,
/// the whitespace-joined tag string, the original file URL, and its extension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub tag_string: String,
    #[serde(default)]
    pub file_url: Option<String>,
    #[serde(default)]
    pub file_ext: String,
}

impl Post {
    /// Split the tag string into individual tags, preserving API order.
    pub fn tags(&self) -> Vec<String> {
        self.tag_string
            .split_whitespace()
            .map(str::to_string)
            .collect()
    }

    /// The name the downloaded file is saved under.
    pub fn file_name(&self) -> String {
        format!("danbooru{}.jpg", self.id)
    }

    /// Whether the post's original file is a format the pipeline handles.
    /// Everything except JPEG and PNG is skipped, as the tag embedding
    /// assumes a raster image that normalizes cleanly to JPEG.
    pub fn is_supported(&self) -> bool {
        matches!(self.file_ext.as_str(), "jpg" | "jpeg" | "png")
    }
}

/// Trait for booru post sources.
///
/// The crate ships one implementation, [`DanbooruClient`]. Implement this
/// trait to target another Danbooru-compatible site or to stub out the
/// network in tests.
#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    /// The display name of this source (e.g., "danbooru").
    fn name(&self) -> &str;
    /// Fetch the metadata of a single post by id.
    async fn fetch_post(&self, id: u64) -> Result<Post>;
    /// Download the post's original file bytes.
    async fn fetch_file(&self, post: &Post) -> Result<Vec<u8>>;
}

/// Parse a post reference from the command line: either a bare numeric id
/// or a post URL such as `https://danbooru.donmai.us/posts/1234?q=...`.
pub fn parse_post_ref(reference: &str) -> Option<u64> {
    if let Ok(id) = reference.parse::<u64>() {
        return Some(id);
    }

    let after = reference.split("/posts/").nth(1)?;
    let digits: String = after.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}
