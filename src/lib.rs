//! # downbooru
//!
//! Danbooru image downloader that embeds each post's tags as IPTC keywords
//! (a Photoshop 3.0 / APP13 resource block) in the saved JPEG, so the tags
//! travel with the file and stay searchable in ordinary photo managers.
//!
//! ## Quick Start
//!
//! The simplest way to use the library is through the pipeline module, which
//! handles the full fetch → normalize → embed → save flow:
//!
//! ```rust,no_run
//! use downbooru::booru::DanbooruClient;
//! use downbooru::config::Config;
//! use downbooru::pipeline::process_post;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let client = DanbooruClient::new(
//!         config.network.base_url.clone(),
//!         &config.network.user_agent,
//!         config.network.timeout_secs,
//!     )?;
//!
//!     for reference in ["4271843", "https://danbooru.donmai.us/posts/99"] {
//!         let result = process_post(&client, reference, &config).await;
//!
//!         if let Some(ref err) = result.error {
//!             eprintln!("Error processing {reference}: {err}");
//!         } else if let Some(ref path) = result.path {
//!             println!("Saved: {}", path.display());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The tag codec is pure and usable on its own. [`iptc::build_segment`]
//! turns an ordered tag list into the APP13 segment bytes, and
//! [`iptc::splice_bytes`] / [`iptc::splice_base64`] patch that segment into
//! an existing JPEG right after the SOI marker. The base64 variant never
//! decodes the image: the patch payload is padded to a 3-byte boundary, so
//! the rest of the base64 stream is reused character-for-character.
//!
//! ```rust
//! use downbooru::iptc::{build_segment, splice_bytes};
//!
//! # fn main() -> anyhow::Result<()> {
//! let jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x02];
//! let segment = build_segment(&["1girl", "solo"])?;
//! let tagged = splice_bytes(&jpeg, &segment)?;
//! assert_eq!(&tagged[2..4], &[0xFF, 0xED]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`booru`] — Post metadata, the [`booru::PostSource`] trait, and the
//!   Danbooru API client
//! - [`config`] — Configuration types and loading/saving
//! - [`iptc`] — The keyword segment builder and the base64 splice codec
//! - [`pipeline`] — High-level download/tag/save pipeline

pub mod booru;
pub mod config;
pub mod iptc;
pub mod pipeline;
