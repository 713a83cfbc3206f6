//! Mapping of dataset columns onto the remote custom-field schema.

use super::dataset::clean_value;
use crate::config::PayloadShape;
use crate::models::DatasetRow;
use serde_json::{Map, Value};

/// `(remote field, dataset column)` pairs shared by both endpoint shapes
const COMMON_FIELDS: &[(&str, &str)] = &[
    ("property_category", "category"),
    ("_ere_property_address", "address"),
    ("property_city", "city"),
    ("property_agent", "agent"),
    ("property_source_url", "link"),
    ("property_source_site", "source"),
    ("property_published_date", "published"),
    ("price_numeric", "price_numeric"),
    ("price_frequency", "price_frequency"),
    ("estimated_property_value", "estimated_property_value"),
    ("annual_rental_income", "annual_rental_income"),
    ("gross_rental_yield", "gross_rental_yield"),
    ("roi_percentage", "roi_percentage"),
    ("estimated_monthly_rent", "estimated_monthly_rent"),
    ("metric_status", "metric_status"),
];

const CORE_FIELDS: &[(&str, &str)] = &[
    ("ere_single_property_header_price_location", "price"),
    ("ere_property_bedrooms", "bedrooms"),
    ("ere_property_bathrooms", "bathrooms"),
];

const CUSTOM_FIELDS: &[(&str, &str)] = &[
    ("_ere_property_price", "price"),
    ("_ere_property_bedrooms", "bedrooms"),
    ("_ere_property_bathrooms", "bathrooms"),
];

/// Columns sent as JSON numbers whenever they parse
pub const NUMERIC_COLUMNS: &[&str] = &[
    "price_numeric",
    "estimated_property_value",
    "annual_rental_income",
    "estimated_monthly_rent",
    "gross_rental_yield",
    "roi_percentage",
];

pub const SOURCE_URL_FIELD: &str = "property_source_url";

/// Every `(remote field, dataset column)` pair for `shape`
pub fn field_map(
    shape: PayloadShape,
) -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    let specific = match shape {
        PayloadShape::Core => CORE_FIELDS,
        PayloadShape::Custom => CUSTOM_FIELDS,
    };
    specific.iter().chain(COMMON_FIELDS)
}

/// Parse `value` as a number, ignoring a `%` sign
pub fn coerce_number(value: &str) -> Option<f64> {
    value
        .replace('%', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn field_value(column: &str, value: &str) -> Value {
    if NUMERIC_COLUMNS.contains(&column) {
        if let Some(number) = coerce_number(value) {
            return Value::from(number);
        }
    }
    Value::String(value.to_string())
}

pub fn build_acf(row: &DatasetRow, shape: PayloadShape) -> Map<String, Value> {
    field_map(shape)
        .map(|(field, column)| {
            let value = clean_value(row.column(column).unwrap_or_default());
            (field.to_string(), field_value(column, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row() -> DatasetRow {
        DatasetRow {
            title: "2 bed flat to rent".to_string(),
            price: "£1,100 pcm".to_string(),
            link: "https://a.test/7".to_string(),
            bedrooms: "2".to_string(),
            bathrooms: "N/A".to_string(),
            gross_rental_yield: "5.25%".to_string(),
            price_numeric: "1100".to_string(),
            estimated_monthly_rent: "unknown".to_string(),
            metric_status: "Estimated".to_string(),
            ..DatasetRow::default()
        }
    }

    #[test]
    fn core_shape_fields() {
        let acf = build_acf(&row(), PayloadShape::Core);
        assert_eq!(acf.len(), CORE_FIELDS.len() + COMMON_FIELDS.len());
        assert_eq!(acf["ere_single_property_header_price_location"], json!("£1,100 pcm"));
        assert_eq!(acf["ere_property_bedrooms"], json!("2"));
        assert_eq!(acf["ere_property_bathrooms"], json!(""));
        assert_eq!(acf[SOURCE_URL_FIELD], json!("https://a.test/7"));
        assert!(!acf.contains_key("_ere_property_price"));
    }

    #[test]
    fn custom_shape_renames_price_and_rooms() {
        let acf = build_acf(&row(), PayloadShape::Custom);
        assert_eq!(acf["_ere_property_price"], json!("£1,100 pcm"));
        assert_eq!(acf["_ere_property_bedrooms"], json!("2"));
        assert!(!acf.contains_key("ere_property_bedrooms"));
    }

    #[test]
    fn numeric_columns_become_numbers() {
        let acf = build_acf(&row(), PayloadShape::Core);
        assert_eq!(acf["gross_rental_yield"], json!(5.25));
        assert_eq!(acf["price_numeric"], json!(1100.0));
        assert_eq!(acf["estimated_monthly_rent"], json!("unknown"));
        assert_eq!(acf["estimated_property_value"], json!(""));
        assert_eq!(acf["metric_status"], json!("Estimated"));
    }

    #[test]
    fn coerce() {
        assert_eq!(coerce_number(" 7.5 % "), Some(7.5));
        assert_eq!(coerce_number("NaN"), None);
        assert_eq!(coerce_number(""), None);
    }
}
