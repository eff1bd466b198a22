use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::booru::{self, Post, PostSource};
use crate::config::Config;
use crate::iptc;

/// The result of processing a single post through the download pipeline.
///
/// Contains the fetched metadata, the tags that were embedded, the output
/// path, and any error encountered. A post that was deliberately not
/// downloaded (unsupported format, existing file) carries a `skipped`
/// reason instead of an error.
#[derive(Debug)]
pub struct ProcessResult {
    /// The post reference as given on the command line.
    pub reference: String,
    pub id: Option<u64>,
    pub tags: Vec<String>,
    pub file_name: Option<String>,
    /// Where the tagged JPEG was written. `None` under dry run or on failure.
    pub path: Option<PathBuf>,
    pub skipped: Option<String>,
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(reference: &str) -> Self {
        Self {
            reference: reference.to_string(),
            id: None,
            tags: Vec::new(),
            file_name: None,
            path: None,
            skipped: None,
            error: None,
        }
    }
}

/// Re-encode arbitrary raster image bytes as a baseline JPEG.
///
/// Transparency is flattened onto a white matte, matching a white-filled
/// canvas, and the result is encoded at quality 100. The output always
/// starts with `FF D8 FF`, which the splice codec requires.
pub fn normalize_to_jpeg(bytes: &[u8]) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes).context("Failed to decode source image")?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut flat = image::RgbImage::new(width, height);
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = px[3] as u16;
        let blend = |c: u8| (((c as u16) * a + 255 * (255 - a)) / 255) as u8;
        flat.put_pixel(x, y, image::Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }

    let mut out = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, 100);
    encoder
        .encode_image(&flat)
        .context("Failed to encode JPEG")?;
    Ok(out)
}

/// Embed a tag list into a JPEG byte stream and return the patched bytes.
///
/// This is the codec composition: build the APP13 keyword segment, then
/// splice it in right after the SOI marker. All-or-nothing: any encoding
/// or signature failure leaves no output.
pub fn embed_tags<S: AsRef<str>>(jpeg: &[u8], tags: &[S]) -> Result<Vec<u8>> {
    let segment = iptc::build_segment(tags).context("Failed to build keyword segment")?;
    let patched = iptc::splice_bytes(jpeg, &segment).context("Failed to splice segment")?;
    Ok(patched)
}

/// Decide the bytes to patch: pass JPEG sources through untouched when
/// re-encoding is disabled, normalize everything else.
fn prepare_jpeg(bytes: Vec<u8>, config: &Config) -> Result<Vec<u8>> {
    let already_jpeg = bytes.starts_with(&[0xFF, 0xD8, 0xFF]);
    if already_jpeg && !config.output.reencode_jpeg {
        return Ok(bytes);
    }
    normalize_to_jpeg(&bytes)
}

/// Process a single post reference through the full pipeline.
///
/// This is the main entry point for the library. It performs the complete
/// flow:
///
/// 1. **Resolve** — Parse the reference (id or post URL) and fetch the
///    post metadata from the booru API
/// 2. **Download** — Fetch the original file and normalize it to JPEG
/// 3. **Embed** — Build the IPTC keyword segment from the post's tags and
///    splice it into the image
/// 4. **Save** — Write `danbooru{id}.jpg` into the output directory
///
/// # Example
///
/// ```rust,no_run
/// use downbooru::booru::DanbooruClient;
/// use downbooru::config::Config;
/// use downbooru::pipeline::process_post;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let client = DanbooruClient::new(
///     config.network.base_url.clone(),
///     &config.network.user_agent,
///     config.network.timeout_secs,
/// )?;
///
/// let result = process_post(&client, "4271843", &config).await;
/// if let Some(ref path) = result.path {
///     println!("Saved {} with {} tags", path.display(), result.tags.len());
/// }
/// # Ok(())
/// # }
/// ```
pub async fn process_post(
    source: &dyn PostSource,
    reference: &str,
    config: &Config,
) -> ProcessResult {
    let mut result = ProcessResult::new(reference);

    let id = match booru::parse_post_ref(reference) {
        Some(id) => id,
        None => {
            result.error = Some(format!("Not a post id or post URL: {reference}"));
            return result;
        }
    };
    result.id = Some(id);

    let post = match source.fetch_post(id).await {
        Ok(post) => post,
        Err(e) => {
            result.error = Some(format!("Failed to fetch post metadata: {e}"));
            return result;
        }
    };
    result.tags = post.tags();
    result.file_name = Some(post.file_name());

    if !post.is_supported() {
        result.skipped = Some(format!("unsupported file type .{}", post.file_ext));
        log::info!("  Skipping post {id}: {}", result.skipped.as_deref().unwrap());
        return result;
    }

    let out_path = config.output_dir().join(post.file_name());
    if out_path.exists() && !config.output.overwrite_existing {
        result.skipped = Some(format!("{} already exists", out_path.display()));
        log::info!("  Skipping post {id}: {}", result.skipped.as_deref().unwrap());
        return result;
    }

    if config.output.dry_run {
        log::info!(
            "  Would save {} with {} tag(s)",
            out_path.display(),
            result.tags.len()
        );
        return result;
    }

    match download_and_embed(source, &post, config).await {
        Ok(bytes) => {
            if let Err(e) = save_file(&out_path, &bytes) {
                result.error = Some(format!("Failed to write {}: {e}", out_path.display()));
            } else {
                log::debug!("  Wrote {} bytes to {}", bytes.len(), out_path.display());
                result.path = Some(out_path);
            }
        }
        Err(e) => {
            result.error = Some(format!("{e:#}"));
        }
    }

    result
}

/// Write the tagged bytes, creating the output directory if needed.
fn save_file(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)
}

/// Fetch the post's file and return the tagged JPEG bytes.
async fn download_and_embed(
    source: &dyn PostSource,
    post: &Post,
    config: &Config,
) -> Result<Vec<u8>> {
    let raw = source.fetch_file(post).await?;
    log::debug!("  Downloaded {} bytes", raw.len());

    let jpeg = prepare_jpeg(raw, config)?;
    embed_tags(&jpeg, &post.tags())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// In-memory post source serving one fixed post.
    struct FixtureSource {
        post: Post,
        bytes: Vec<u8>,
    }

    #[async_trait::async_trait]
    impl PostSource for FixtureSource {
        fn name(&self) -> &str {
            "fixture"
        }

        async fn fetch_post(&self, _id: u64) -> Result<Post> {
            Ok(self.post.clone())
        }

        async fn fetch_file(&self, _post: &Post) -> Result<Vec<u8>> {
            Ok(self.bytes.clone())
        }
    }

    fn sample_png_with_alpha() -> Vec<u8> {
        let mut img = image::RgbaImage::new(4, 4);
        for (x, _, px) in img.enumerate_pixels_mut() {
            // left half opaque red, right half fully transparent
            *px = if x < 2 {
                image::Rgba([200, 0, 0, 255])
            } else {
                image::Rgba([0, 0, 0, 0])
            };
        }
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    // ── normalize_to_jpeg ────────────────────────────────────────────

    #[test]
    fn normalize_produces_jpeg_signature() {
        let jpeg = normalize_to_jpeg(&sample_png_with_alpha()).unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn normalize_flattens_transparency_to_white() {
        let jpeg = normalize_to_jpeg(&sample_png_with_alpha()).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap().to_rgb8();
        let px = decoded.get_pixel(3, 3);
        // JPEG is lossy, so near-white is close enough
        assert!(px[0] > 240 && px[1] > 240 && px[2] > 240, "got {px:?}");
    }

    #[test]
    fn normalize_rejects_non_image_bytes() {
        assert!(normalize_to_jpeg(b"definitely not an image").is_err());
    }

    // ── embed_tags ───────────────────────────────────────────────────

    #[test]
    fn embed_places_segment_after_soi() {
        let jpeg = normalize_to_jpeg(&sample_png_with_alpha()).unwrap();
        let tagged = embed_tags(&jpeg, &["1girl", "solo"]).unwrap();

        assert_eq!(&tagged[..2], &[0xFF, 0xD8]);
        // APP13 marker sits immediately after SOI
        assert_eq!(&tagged[2..4], &[0xFF, 0xED]);
        // the original stream minus its 3-byte prefix survives unchanged
        assert!(tagged.ends_with(&jpeg[3..]));
    }

    #[test]
    fn embed_fails_on_non_jpeg_input() {
        let err = embed_tags(&sample_png_with_alpha(), &["tag"]).unwrap_err();
        assert!(format!("{err:#}").contains("splice"));
    }

    #[test]
    fn embed_fails_on_unencodable_tag() {
        let jpeg = normalize_to_jpeg(&sample_png_with_alpha()).unwrap();
        assert!(embed_tags(&jpeg, &["東方"]).is_err());
    }

    // ── prepare_jpeg ─────────────────────────────────────────────────

    #[test]
    fn prepare_passes_jpeg_through_when_reencode_disabled() {
        let jpeg = normalize_to_jpeg(&sample_png_with_alpha()).unwrap();
        let mut config = Config::default();
        config.output.reencode_jpeg = false;

        let out = prepare_jpeg(jpeg.clone(), &config).unwrap();
        assert_eq!(out, jpeg);
    }

    #[test]
    fn prepare_reencodes_png_regardless() {
        let mut config = Config::default();
        config.output.reencode_jpeg = false;

        let out = prepare_jpeg(sample_png_with_alpha(), &config).unwrap();
        assert!(out.starts_with(&[0xFF, 0xD8, 0xFF]));
    }

    // ── process_post ─────────────────────────────────────────────────

    #[tokio::test]
    async fn process_post_creates_missing_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("booru").join("saved");
        assert!(!nested.exists());

        let source = FixtureSource {
            post: Post {
                id: 123,
                tag_string: "1girl solo".to_string(),
                file_url: Some("https://example.invalid/abcd.png".to_string()),
                file_ext: "png".to_string(),
            },
            bytes: sample_png_with_alpha(),
        };

        let mut config = Config::default();
        config.output.dir = Some(nested.display().to_string());

        let result = process_post(&source, "123", &config).await;
        assert!(result.error.is_none(), "error: {:?}", result.error);

        let path = result.path.expect("file should have been saved");
        assert_eq!(path, nested.join("danbooru123.jpg"));
        let saved = std::fs::read(&path).unwrap();
        assert_eq!(&saved[2..4], &[0xFF, 0xED]);
    }

    #[tokio::test]
    async fn process_post_skips_unsupported_format() {
        let source = FixtureSource {
            post: Post {
                id: 7,
                tag_string: "animated".to_string(),
                file_url: Some("https://example.invalid/x.gif".to_string()),
                file_ext: "gif".to_string(),
            },
            bytes: Vec::new(),
        };

        let result = process_post(&source, "7", &Config::default()).await;
        assert!(result.error.is_none());
        assert!(result.path.is_none());
        assert!(result.skipped.unwrap().contains(".gif"));
    }
}
