use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for any field the scraper could not determine
pub const NOT_AVAILABLE: &str = "N/A";
/// Description of a listing whose detail page has not been merged yet
pub const DESCRIPTION_PENDING: &str = "Pending";
/// Description of a listing beyond the per-site detail fetch limit
pub const DESCRIPTION_NOT_FETCHED: &str = "Not fetched (limit reached)";
/// Description used when no extraction strategy found any text
pub const DESCRIPTION_MISSING: &str = "No description available";

/// Whether a listing is offered for sale or to let
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Category {
    #[serde(rename = "For Sale")]
    ForSale,
    #[serde(rename = "For Rent")]
    ForRent,
    #[default]
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ForSale => "For Sale",
            Category::ForRent => "For Rent",
            Category::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One listing found on a site's search page
#[derive(Debug, Clone, PartialEq)]
pub struct ListingCandidate {
    pub title: String,
    /// Raw display price, e.g. "£1,250 pcm"
    pub price: String,
    /// Absolute URL of the detail page
    pub link: String,
    pub category: Category,
    /// Site the candidate was discovered on
    pub source: String,
}

/// Fields extracted from a listing's detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDetail {
    pub description: String,
    /// First entry is the featured image
    pub images: Vec<String>,
    pub address: String,
    pub agent: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub city: String,
}

impl Default for PropertyDetail {
    fn default() -> Self {
        Self {
            description: DESCRIPTION_MISSING.to_string(),
            images: Vec::new(),
            address: NOT_AVAILABLE.to_string(),
            agent: NOT_AVAILABLE.to_string(),
            bedrooms: NOT_AVAILABLE.to_string(),
            bathrooms: NOT_AVAILABLE.to_string(),
            city: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Final row of the scraped dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub price: String,
    pub link: String,
    pub description: String,
    pub images: Vec<String>,
    pub address: String,
    pub agent: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub city: String,
    pub source: String,
    pub published: String,
    pub category: Category,
}

impl ListingRecord {
    /// Row as it leaves the search page, before any detail is known
    pub fn pending(candidate: ListingCandidate) -> Self {
        Self {
            title: candidate.title,
            price: candidate.price,
            link: candidate.link,
            description: DESCRIPTION_PENDING.to_string(),
            images: Vec::new(),
            address: NOT_AVAILABLE.to_string(),
            agent: NOT_AVAILABLE.to_string(),
            bedrooms: NOT_AVAILABLE.to_string(),
            bathrooms: NOT_AVAILABLE.to_string(),
            city: NOT_AVAILABLE.to_string(),
            source: candidate.source,
            published: NOT_AVAILABLE.to_string(),
            category: candidate.category,
        }
    }

    pub fn merge_detail(&mut self, detail: PropertyDetail) {
        self.description = detail.description;
        self.images = detail.images;
        self.address = detail.address;
        self.agent = detail.agent;
        self.bedrooms = detail.bedrooms;
        self.bathrooms = detail.bathrooms;
        self.city = detail.city;
    }
}

/// Row layout of the CSV dataset, shared by the scraper and the uploader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetRow {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub bedrooms: String,
    #[serde(default)]
    pub bathrooms: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub published: String,
    #[serde(default)]
    pub category: String,
    /// Image URLs joined with `|`
    #[serde(default)]
    pub image_urls_str: String,

    // Financial metrics are produced upstream and only passed through
    #[serde(default, skip_serializing)]
    pub price_numeric: String,
    #[serde(default, skip_serializing)]
    pub price_frequency: String,
    #[serde(default, skip_serializing)]
    pub estimated_property_value: String,
    #[serde(default, skip_serializing)]
    pub annual_rental_income: String,
    #[serde(default, skip_serializing)]
    pub gross_rental_yield: String,
    #[serde(default, skip_serializing)]
    pub roi_percentage: String,
    #[serde(default, skip_serializing)]
    pub estimated_monthly_rent: String,
    #[serde(default, skip_serializing)]
    pub metric_status: String,
}

impl DatasetRow {
    /// Look a column up by its CSV header name
    pub fn column(&self, name: &str) -> Option<&str> {
        let value = match name {
            "title" => &self.title,
            "price" => &self.price,
            "link" => &self.link,
            "description" => &self.description,
            "address" => &self.address,
            "agent" => &self.agent,
            "bedrooms" => &self.bedrooms,
            "bathrooms" => &self.bathrooms,
            "city" => &self.city,
            "source" => &self.source,
            "published" => &self.published,
            "category" => &self.category,
            "image_urls_str" => &self.image_urls_str,
            "price_numeric" => &self.price_numeric,
            "price_frequency" => &self.price_frequency,
            "estimated_property_value" => &self.estimated_property_value,
            "annual_rental_income" => &self.annual_rental_income,
            "gross_rental_yield" => &self.gross_rental_yield,
            "roi_percentage" => &self.roi_percentage,
            "estimated_monthly_rent" => &self.estimated_monthly_rent,
            "metric_status" => &self.metric_status,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn image_urls(&self) -> Vec<&str> {
        self.image_urls_str
            .split('|')
            .map(str::trim)
            .filter(|url| !url.is_empty() && !url.eq_ignore_ascii_case(NOT_AVAILABLE))
            .collect()
    }
}

impl From<&ListingRecord> for DatasetRow {
    fn from(record: &ListingRecord) -> Self {
        Self {
            title: record.title.clone(),
            price: record.price.clone(),
            link: record.link.clone(),
            description: record.description.clone(),
            address: record.address.clone(),
            agent: record.agent.clone(),
            bedrooms: record.bedrooms.clone(),
            bathrooms: record.bathrooms.clone(),
            city: record.city.clone(),
            source: record.source.clone(),
            published: record.published.clone(),
            category: record.category.to_string(),
            image_urls_str: record.images.join("|"),
            ..Self::default()
        }
    }
}

/// Outcome of one scrape run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sites: usize,
    pub records: Vec<ListingRecord>,
}

impl RunReport {
    pub fn with_images(&self) -> usize {
        self.records.iter().filter(|r| !r.images.is_empty()).count()
    }

    pub fn total_images(&self) -> usize {
        self.records.iter().map(|r| r.images.len()).sum()
    }

    pub fn average_images(&self) -> f64 {
        match self.with_images() {
            0 => 0.0,
            n => self.total_images() as f64 / n as f64,
        }
    }
}
