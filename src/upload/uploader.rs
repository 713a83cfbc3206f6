use super::acf::{build_acf, SOURCE_URL_FIELD};
use super::client::{ContentApi, ImageSource, UploadedMedia};
use super::content::build_content;
use super::dataset::{clean_value, load_dataset};
use super::images::{check_dimensions, media_file_name, Dimensions};
use crate::config::{PayloadShape, UploadConfig};
use crate::error::UploadError;
use crate::models::DatasetRow;
use anyhow::Result;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const DEFAULT_MIME: &str = "image/jpeg";

/// Titles and source links already published on the remote site
#[derive(Debug, Default)]
pub struct ExistingIndex {
    titles: HashSet<String>,
    links: HashSet<String>,
}

impl ExistingIndex {
    pub fn add_post(&mut self, post: &Value) {
        if let Some(title) = post.pointer("/title/rendered").and_then(Value::as_str) {
            self.titles.insert(title.trim().to_lowercase());
        }
        // `acf` comes back as an empty array when a post has no fields set
        if let Some(acf) = post.get("acf").and_then(Value::as_object) {
            if let Some(link) = acf.get(SOURCE_URL_FIELD).and_then(Value::as_str) {
                if !link.is_empty() {
                    self.links.insert(link.to_lowercase());
                }
            }
        }
    }

    pub fn insert(&mut self, title: &str, link: &str) {
        self.titles.insert(title.trim().to_lowercase());
        self.links.insert(link.to_lowercase());
    }

    pub fn contains(&self, title: &str, link: &str) -> bool {
        self.titles.contains(&title.trim().to_lowercase())
            || self.links.contains(&link.to_lowercase())
    }

    pub fn known_titles(&self) -> usize {
        self.titles.len()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UploadSummary {
    pub success: usize,
    pub skipped: usize,
    pub failed: usize,
    pub images_uploaded: usize,
    pub images_failed: usize,
}

impl UploadSummary {
    pub fn average_images(&self) -> f64 {
        match self.success {
            0 => 0.0,
            n => self.images_uploaded as f64 / n as f64,
        }
    }

    pub fn log(&self) {
        info!("==========================================");
        info!("📊 FINAL SUMMARY");
        info!("✅ Successfully uploaded: {} properties", self.success);
        info!("🖼 Total images uploaded: {}", self.images_uploaded);
        info!("⚠ Images failed: {}", self.images_failed);
        if self.success > 0 {
            info!("📊 Average images per property: {:.1}", self.average_images());
        }
        info!("⏭ Skipped (duplicates): {}", self.skipped);
        info!("❌ Failed: {}", self.failed);
        info!("==========================================");
    }
}

enum Outcome {
    Created,
    Skipped,
    Failed,
}

/// Publishes dataset rows one at a time
pub struct Uploader {
    api: Arc<dyn ContentApi>,
    images: Arc<dyn ImageSource>,
    config: UploadConfig,
}

impl Uploader {
    pub fn new(
        api: Arc<dyn ContentApi>,
        images: Arc<dyn ImageSource>,
        config: UploadConfig,
    ) -> Self {
        Self { api, images, config }
    }

    /// Load the configured partition and publish it
    pub async fn run(&self) -> Result<UploadSummary> {
        let rows = load_dataset(&self.config.dataset)?;
        if rows.is_empty() {
            warn!("⚠ No listings found in CSV");
            return Ok(UploadSummary::default());
        }

        let mut index = self.load_index().await;
        let summary = self.publish(&rows, &mut index).await;
        summary.log();
        Ok(summary)
    }

    /// Page through existing records until an empty page or an error
    pub async fn load_index(&self) -> ExistingIndex {
        info!("🔍 Fetching existing properties...");
        let mut index = ExistingIndex::default();
        let mut posts = 0;

        for page in 1.. {
            match self.api.list_records(page).await {
                Ok(page_posts) if page_posts.is_empty() => break,
                Ok(page_posts) => {
                    posts += page_posts.len();
                    page_posts.iter().for_each(|post| index.add_post(post));
                }
                Err(e) => {
                    debug!(page, error = %e, "Stopped listing existing records");
                    break;
                }
            }
        }

        info!("📦 Found {} existing property posts", posts);
        debug!(titles = index.known_titles(), "Existing-record index built");
        index
    }

    pub async fn publish(&self, rows: &[DatasetRow], index: &mut ExistingIndex) -> UploadSummary {
        let mut summary = UploadSummary::default();
        let total = rows.len().min(self.config.max_uploads);

        for (i, row) in rows.iter().take(total).enumerate() {
            let title = clean_value(&row.title);
            info!("[{}/{}] {}", i + 1, total, title.chars().take(60).collect::<String>());

            let link = clean_value(&row.link);
            if title.is_empty() || link.is_empty() {
                warn!("⚠ Missing title or link, skipping");
                summary.skipped += 1;
                continue;
            }
            if index.contains(title, link) {
                info!("⏭ Already exists, skipping");
                summary.skipped += 1;
                continue;
            }

            let urls = row.image_urls();
            let uploaded = self.upload_images(&urls).await;
            summary.images_uploaded += uploaded.len();
            summary.images_failed += urls.len() - uploaded.len();

            match self.create(row, title, &uploaded).await {
                Outcome::Created => {
                    summary.success += 1;
                    index.insert(title, link);
                }
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Failed => summary.failed += 1,
            }

            tokio::time::sleep(self.config.record_delay).await;
        }

        summary
    }

    async fn create(&self, row: &DatasetRow, title: &str, images: &[UploadedMedia]) -> Outcome {
        let shape = self.config.shape;
        let payload = build_payload(shape, title, &build_content(row, images), row, images.first());

        match self.api.create_record(shape, &payload).await {
            Ok(id) => {
                info!(
                    "✅ SUCCESS! (ID: {}) {} | {}bd | {}ba | {} images",
                    id.map(|id| id.to_string()).unwrap_or_else(|| "?".to_string()),
                    row.city,
                    row.bedrooms,
                    row.bathrooms,
                    images.len()
                );
                Outcome::Created
            }
            Err(UploadError::Api { status: 400, message })
                if shape == PayloadShape::Core && message.to_lowercase().contains("existing") =>
            {
                warn!("⚠ Duplicate detected by remote site");
                Outcome::Skipped
            }
            Err(e) => {
                error!(error = %e, "❌ Failed to create record");
                Outcome::Failed
            }
        }
    }

    async fn upload_images(&self, urls: &[&str]) -> Vec<UploadedMedia> {
        if urls.is_empty() {
            info!("ℹ No images available");
            return Vec::new();
        }
        info!("🖼 Found {} images to upload", urls.len());

        let mut uploaded = Vec::new();
        for (i, url) in urls.iter().enumerate() {
            match self.upload_image(url, i + 1).await {
                Ok(Some(media)) => {
                    debug!(id = media.id, "Uploaded image");
                    uploaded.push(media);
                }
                Ok(None) => {}
                Err(e) => warn!(url, error = %e, "Image upload failed"),
            }
            tokio::time::sleep(self.config.image_delay).await;
        }
        uploaded
    }

    /// `Ok(None)` when the image was rejected before upload
    async fn upload_image(
        &self,
        url: &str,
        index: usize,
    ) -> Result<Option<UploadedMedia>, UploadError> {
        let image = self.images.download(url).await?;
        if image.bytes.is_empty() {
            warn!(url, "Empty image content");
            return Ok(None);
        }
        if image.bytes.len() < self.config.small_image_bytes {
            warn!(url, bytes = image.bytes.len(), "Small file, uploading anyway");
        }

        let (min_width, min_height) = (self.config.min_image_width, self.config.min_image_height);
        match check_dimensions(&image.bytes, min_width, min_height) {
            Dimensions::TooSmall { width, height } => {
                warn!(url, width, height, "Image too small");
                return Ok(None);
            }
            Dimensions::Accepted { width, height } => {
                debug!(url, width, height, "Image dimensions")
            }
            Dimensions::Unknown => warn!(url, "Could not read dimensions, uploading anyway"),
        }

        let mime = image.content_type.as_deref().unwrap_or(DEFAULT_MIME);
        if !mime.starts_with("image/") {
            warn!(url, mime, "Invalid MIME type");
            return Ok(None);
        }

        let file_name = media_file_name(url, mime, index);
        let media = self.api.upload_media(&file_name, mime, image.bytes).await?;
        Ok(Some(media))
    }
}

/// Request body for the record creation endpoint of `shape`
pub fn build_payload(
    shape: PayloadShape,
    title: &str,
    content: &str,
    row: &DatasetRow,
    featured: Option<&UploadedMedia>,
) -> Value {
    let acf = Value::Object(build_acf(row, shape));
    let featured = featured.map(|media| media.id);

    match shape {
        PayloadShape::Core => {
            let mut payload = json!({
                "title": title,
                "status": "publish",
                "content": content,
                "acf": acf,
            });
            if let Some(id) = featured {
                payload["featured_media"] = json!(id);
            }
            payload
        }
        PayloadShape::Custom => json!({
            "title": title,
            "content": content,
            "featured_media": featured,
            "acf": acf,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::client::DownloadedImage;
    use crate::upload::images::png_header;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct StubApi {
        existing: Vec<Value>,
        created: Mutex<Vec<Value>>,
        media_names: Mutex<Vec<String>>,
        next_id: AtomicU64,
        reject_with: Option<(u16, &'static str)>,
    }

    #[async_trait::async_trait]
    impl ContentApi for StubApi {
        async fn list_records(&self, page: u32) -> Result<Vec<Value>, UploadError> {
            match page {
                1 => Ok(self.existing.clone()),
                _ => Ok(Vec::new()),
            }
        }

        async fn upload_media(
            &self,
            file_name: &str,
            _mime: &str,
            _bytes: Vec<u8>,
        ) -> Result<UploadedMedia, UploadError> {
            self.media_names.lock().unwrap().push(file_name.to_string());
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 100;
            Ok(UploadedMedia {
                id,
                url: format!("https://cms.test/uploads/{id}.jpg"),
            })
        }

        async fn create_record(
            &self,
            _shape: PayloadShape,
            payload: &Value,
        ) -> Result<Option<u64>, UploadError> {
            if let Some((status, message)) = self.reject_with {
                return Err(UploadError::Api {
                    status,
                    message: message.to_string(),
                });
            }
            self.created.lock().unwrap().push(payload.clone());
            Ok(Some(7))
        }
    }

    /// Large PNG for `/big` URLs, tiny PNG for `/small`, 404 otherwise
    struct StubImages;

    #[async_trait::async_trait]
    impl ImageSource for StubImages {
        async fn download(&self, url: &str) -> Result<DownloadedImage, UploadError> {
            let bytes = if url.contains("/big") {
                png_header(1024, 768)
            } else if url.contains("/small") {
                png_header(64, 64)
            } else {
                return Err(UploadError::Api {
                    status: 404,
                    message: format!("download failed for {url}"),
                });
            };
            Ok(DownloadedImage {
                bytes,
                content_type: Some("image/png".to_string()),
            })
        }
    }

    fn config() -> UploadConfig {
        UploadConfig {
            record_delay: Duration::ZERO,
            image_delay: Duration::ZERO,
            ..UploadConfig::default()
        }
    }

    fn row(title: &str, link: &str, images: &str) -> DatasetRow {
        DatasetRow {
            title: title.to_string(),
            link: link.to_string(),
            price: "£250,000".to_string(),
            category: "For Sale".to_string(),
            image_urls_str: images.to_string(),
            ..DatasetRow::default()
        }
    }

    #[tokio::test]
    async fn existing_index_ignores_non_object_acf() {
        let api = StubApi {
            existing: vec![
                json!({
                    "id": 1,
                    "title": {"rendered": " Flat One "},
                    "acf": {"property_source_url": "HTTPS://A.TEST/1"}
                }),
                json!({"id": 2, "title": {"rendered": "Flat Two"}, "acf": []}),
            ],
            ..StubApi::default()
        };
        let uploader = Uploader::new(Arc::new(api), Arc::new(StubImages), config());

        let index = uploader.load_index().await;
        assert_eq!(index.known_titles(), 2);
        assert!(index.contains("flat one", "https://other.test"));
        assert!(index.contains("New", "https://a.test/1"));
        assert!(!index.contains("New", "https://a.test/2"));
    }

    #[tokio::test]
    async fn publishes_new_rows_and_skips_duplicates() {
        let api = Arc::new(StubApi {
            existing: vec![json!({"title": {"rendered": "Old house for sale"}, "acf": {}})],
            ..StubApi::default()
        });
        let uploader = Uploader::new(api.clone(), Arc::new(StubImages), config());
        let rows = vec![
            row(
                "New house for sale",
                "https://a.test/1",
                "https://img.test/big/1.jpg|https://img.test/small/2.jpg|https://img.test/big/3.webp",
            ),
            row("Old house for sale", "https://a.test/2", ""),
            row("Same link again", "https://a.test/1", ""),
            row("N/A", "https://a.test/4", ""),
            row("Broken images", "https://a.test/5", "https://img.test/missing.jpg"),
        ];

        let mut index = uploader.load_index().await;
        let summary = uploader.publish(&rows, &mut index).await;

        assert_eq!(
            summary,
            UploadSummary {
                success: 2,
                skipped: 3,
                failed: 0,
                images_uploaded: 2,
                images_failed: 2,
            }
        );
        assert_eq!(*api.media_names.lock().unwrap(), vec!["1.png", "3.png"]);

        let created = api.created.lock().unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0]["featured_media"], json!(100));
        assert_eq!(created[0]["status"], json!("publish"));
        assert_eq!(created[0]["acf"]["property_source_url"], json!("https://a.test/1"));
        assert!(created[0]["content"].as_str().unwrap().contains("uploads/101.jpg"));
        assert!(created[1].get("featured_media").is_none());
    }

    #[tokio::test]
    async fn remote_duplicate_counts_as_skipped() {
        let api = StubApi {
            reject_with: Some((400, "A post with an existing slug")),
            ..StubApi::default()
        };
        let uploader = Uploader::new(Arc::new(api), Arc::new(StubImages), config());
        let mut index = ExistingIndex::default();

        let summary = uploader
            .publish(&[row("House for sale", "https://a.test/9", "")], &mut index)
            .await;
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 0);
    }

    #[tokio::test]
    async fn custom_shape_rejection_is_a_failure() {
        let api = StubApi {
            reject_with: Some((400, "existing record")),
            ..StubApi::default()
        };
        let config = UploadConfig {
            shape: PayloadShape::Custom,
            ..config()
        };
        let uploader = Uploader::new(Arc::new(api), Arc::new(StubImages), config);
        let mut index = ExistingIndex::default();

        let summary = uploader
            .publish(&[row("House for sale", "https://a.test/9", "")], &mut index)
            .await;
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn respects_max_uploads() {
        let api = Arc::new(StubApi::default());
        let config = UploadConfig {
            max_uploads: 2,
            ..config()
        };
        let uploader = Uploader::new(api.clone(), Arc::new(StubImages), config);
        let rows: Vec<_> = (0..5)
            .map(|i| row(&format!("House {i} for sale"), &format!("https://a.test/{i}"), ""))
            .collect();
        let mut index = ExistingIndex::default();

        let summary = uploader.publish(&rows, &mut index).await;
        assert_eq!(summary.success, 2);
        assert_eq!(api.created.lock().unwrap().len(), 2);
    }

    #[test]
    fn custom_payload_always_carries_featured_media() {
        let sample = row("T", "https://a.test/1", "");
        let payload = build_payload(PayloadShape::Custom, "T", "<p>c</p>", &sample, None);
        assert_eq!(payload["featured_media"], Value::Null);
        assert!(payload.get("status").is_none());
        assert_eq!(payload["acf"]["_ere_property_price"], json!("£250,000"));
    }
}
