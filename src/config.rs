use crate::extract::images::DEFAULT_MAX_IMAGES;
use crate::extract::listings::DEFAULT_LISTINGS_PER_PAGE;
use crate::scrapers::sites::AGENT_SITES;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Detail pages fetched at once for a single site
pub const DETAIL_WORKERS: usize = 8;

#[derive(Debug, Clone, Args)]
pub struct ScrapeArgs {
    /// Sites processed at once
    #[arg(long, env = "SITE_CONCURRENCY", default_value_t = 10,
          value_parser = clap::value_parser!(u16).range(2..=15))]
    pub site_concurrency: u16,

    /// Detail pages fetched per site
    #[arg(long, env = "DETAIL_FETCH_LIMIT", default_value_t = 30,
          value_parser = clap::value_parser!(u16).range(10..=50))]
    pub detail_fetch_limit: u16,

    /// Images kept per property
    #[arg(long, env = "MAX_IMAGES", default_value_t = DEFAULT_MAX_IMAGES as u16,
          value_parser = clap::value_parser!(u16).range(1..=10))]
    pub max_images: u16,

    /// Listings read from one search page
    #[arg(long, env = "LISTINGS_PER_PAGE", default_value_t = DEFAULT_LISTINGS_PER_PAGE as u64,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub listings_per_page: u64,

    /// Request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10,
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Show the Chrome window instead of running headless
    #[arg(long, default_value_t = false)]
    pub headed: bool,

    /// Directory the CSV partitions are written to
    #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Override the built-in site list (repeatable)
    #[arg(long = "site")]
    pub sites: Vec<String>,
}

/// Immutable settings for one scrape run
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub site_concurrency: usize,
    pub detail_fetch_limit: usize,
    pub detail_workers: usize,
    pub max_images: usize,
    pub listings_per_page: usize,
    pub request_timeout: Duration,
    pub headless: bool,
    pub output_dir: PathBuf,
    pub sites: Vec<String>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            site_concurrency: 10,
            detail_fetch_limit: 30,
            detail_workers: DETAIL_WORKERS,
            max_images: DEFAULT_MAX_IMAGES,
            listings_per_page: DEFAULT_LISTINGS_PER_PAGE,
            request_timeout: Duration::from_secs(10),
            headless: true,
            output_dir: PathBuf::from("."),
            sites: AGENT_SITES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<&ScrapeArgs> for ScrapeConfig {
    fn from(args: &ScrapeArgs) -> Self {
        let sites = if args.sites.is_empty() {
            AGENT_SITES.iter().map(|s| s.to_string()).collect()
        } else {
            args.sites
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Self {
            site_concurrency: args.site_concurrency as usize,
            detail_fetch_limit: args.detail_fetch_limit as usize,
            detail_workers: DETAIL_WORKERS,
            max_images: args.max_images as usize,
            listings_per_page: args.listings_per_page as usize,
            request_timeout: Duration::from_secs(args.timeout_secs),
            headless: !args.headed,
            output_dir: args.output_dir.clone(),
            sites,
        }
    }
}

/// Which scraped CSV partition to publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Partition {
    All,
    Sale,
    Rent,
}

impl Partition {
    pub fn file_name(&self) -> &'static str {
        match self {
            Partition::All => "property_listings_all.csv",
            Partition::Sale => "property_listings_sale.csv",
            Partition::Rent => "property_listings_rent.csv",
        }
    }
}

/// Remote endpoint flavour used to create records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadShape {
    /// Core REST post type endpoint, custom fields under `acf`
    Core,
    /// Site-specific import endpoint
    Custom,
}

#[derive(Debug, Clone, Args)]
pub struct UploadArgs {
    /// Dataset partition to read
    #[arg(long, value_enum, default_value_t = Partition::Sale)]
    pub partition: Partition,

    /// Directory holding the CSV partitions
    #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Record creation endpoint flavour
    #[arg(long, value_enum, default_value_t = PayloadShape::Core)]
    pub shape: PayloadShape,

    /// Rows published per run
    #[arg(long, env = "MAX_UPLOADS", default_value_t = 50)]
    pub max_uploads: usize,

    /// Pause between records, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub record_delay_ms: u64,

    /// Pause between images of one record, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub image_delay_ms: u64,
}

/// Credentials and endpoints of the remote content site
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub site_url: String,
    pub username: String,
    pub app_password: String,
    pub import_path: String,
}

impl RemoteConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            site_url: std::env::var("WP_SITE_URL")
                .context("WP_SITE_URL not set")?
                .trim_end_matches('/')
                .to_string(),
            username: std::env::var("WP_USERNAME").context("WP_USERNAME not set")?,
            app_password: std::env::var("WP_APP_PASSWORD")
                .context("WP_APP_PASSWORD not found. Please create a .env file.")?,
            import_path: std::env::var("WP_IMPORT_PATH")
                .unwrap_or_else(|_| "/wp-json/eggs/v1/import-property".to_string()),
        };

        tracing::info!("Remote config loaded:");
        tracing::info!("  WP_SITE_URL: {}", config.site_url);
        tracing::info!("  WP_USERNAME: {}", config.username);
        tracing::info!("  WP_APP_PASSWORD: <{} chars>", config.app_password.len());
        Ok(config)
    }

    pub fn records_url(&self) -> String {
        format!("{}/wp-json/wp/v2/property", self.site_url)
    }

    pub fn media_url(&self) -> String {
        format!("{}/wp-json/wp/v2/media", self.site_url)
    }

    pub fn import_url(&self) -> String {
        format!("{}/{}", self.site_url, self.import_path.trim_start_matches('/'))
    }
}

/// Settings for one upload run
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dataset: PathBuf,
    pub shape: PayloadShape,
    pub max_uploads: usize,
    pub record_delay: Duration,
    pub image_delay: Duration,
    pub min_image_width: usize,
    pub min_image_height: usize,
    /// Smaller downloads are logged but still uploaded
    pub small_image_bytes: usize,
}

impl From<&UploadArgs> for UploadConfig {
    fn from(args: &UploadArgs) -> Self {
        Self {
            dataset: args.input_dir.join(args.partition.file_name()),
            shape: args.shape,
            max_uploads: args.max_uploads,
            record_delay: Duration::from_millis(args.record_delay_ms),
            image_delay: Duration::from_millis(args.image_delay_ms),
            ..Self::default()
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from(Partition::Sale.file_name()),
            shape: PayloadShape::Core,
            max_uploads: 50,
            record_delay: Duration::from_secs(2),
            image_delay: Duration::from_millis(500),
            min_image_width: 200,
            min_image_height: 150,
            small_image_bytes: 5000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_site_override_uses_builtin_list() {
        let args = ScrapeArgs {
            site_concurrency: 4,
            detail_fetch_limit: 12,
            max_images: 3,
            listings_per_page: 60,
            timeout_secs: 10,
            headed: false,
            output_dir: PathBuf::from("out"),
            sites: vec![],
        };
        let config = ScrapeConfig::from(&args);
        assert_eq!(config.sites.len(), AGENT_SITES.len());
        assert_eq!(config.detail_workers, DETAIL_WORKERS);
        assert!(config.headless);

        let args = ScrapeArgs {
            sites: vec![" https://a.example/ ".to_string(), "".to_string()],
            ..args
        };
        assert_eq!(ScrapeConfig::from(&args).sites, vec!["https://a.example/"]);
    }

    #[test]
    fn zero_page_size_and_timeout_are_rejected() {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            scrape: ScrapeArgs,
        }

        assert!(Harness::try_parse_from(["scout", "--listings-per-page", "0"]).is_err());
        assert!(Harness::try_parse_from(["scout", "--timeout-secs", "0"]).is_err());

        let parsed = Harness::try_parse_from(["scout", "--listings-per-page", "25"]).unwrap();
        let config = ScrapeConfig::from(&parsed.scrape);
        assert_eq!(config.listings_per_page, 25);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn remote_urls() {
        let remote = RemoteConfig {
            site_url: "https://cms.example.com".to_string(),
            username: "u".to_string(),
            app_password: "p".to_string(),
            import_path: "/wp-json/acme/v1/import".to_string(),
        };
        assert_eq!(remote.records_url(), "https://cms.example.com/wp-json/wp/v2/property");
        assert_eq!(remote.media_url(), "https://cms.example.com/wp-json/wp/v2/media");
        assert_eq!(remote.import_url(), "https://cms.example.com/wp-json/acme/v1/import");
    }

    #[test]
    fn partition_files() {
        let args = UploadArgs {
            partition: Partition::Rent,
            input_dir: PathBuf::from("data"),
            shape: PayloadShape::Custom,
            max_uploads: 5,
            record_delay_ms: 0,
            image_delay_ms: 0,
        };
        let config = UploadConfig::from(&args);
        assert_eq!(config.dataset, PathBuf::from("data/property_listings_rent.csv"));
        assert_eq!(config.min_image_width, 200);
        assert_eq!(config.record_delay, Duration::ZERO);
    }
}
