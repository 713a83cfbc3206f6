//! HTML body of a published record.

use super::acf::coerce_number;
use super::client::UploadedMedia;
use super::dataset::clean_value;
use crate::models::{
    Category, DatasetRow, DESCRIPTION_MISSING, DESCRIPTION_NOT_FETCHED, DESCRIPTION_PENDING,
};
use std::fmt::Write;
use url::Url;

const NO_DESCRIPTION: &str = "No description available for this property.";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

/// `£1,234,567.89`
pub fn format_pounds(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}£{grouped}.{cents}")
}

fn money(value: &str) -> String {
    let value = clean_value(value);
    match coerce_number(value) {
        Some(amount) => format_pounds(amount),
        None => value.to_string(),
    }
}

fn row_html(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(
        out,
        r#"<tr style="border: 1px solid #ddd;"><td style="padding: 8px; font-weight: bold; width: 40%;">{label}:</td><td style="padding: 8px;">{}</td></tr>"#,
        escape(value)
    );
}

fn info_table(row: &DatasetRow) -> String {
    let mut html = String::from(
        "<h3>📋 Property Information</h3>\n<table style=\"width:100%; border-collapse: collapse;\">\n",
    );
    row_html(&mut html, "Price", or_default(clean_value(&row.price), "Contact for price"));
    row_html(
        &mut html,
        "Category",
        or_default(clean_value(&row.category), Category::Unknown.as_str()),
    );
    row_html(&mut html, "Location", or_default(clean_value(&row.city), "Not specified"));
    row_html(&mut html, "Address", or_default(clean_value(&row.address), "Not available"));
    row_html(&mut html, "Bedrooms", or_default(clean_value(&row.bedrooms), "Not specified"));
    row_html(&mut html, "Bathrooms", or_default(clean_value(&row.bathrooms), "Not specified"));
    row_html(&mut html, "Agent/Publisher", or_default(clean_value(&row.agent), "Not specified"));
    html.push_str("</table>\n");
    html
}

/// Investment metrics table, or nothing when no metric is present
fn metrics_table(row: &DatasetRow) -> String {
    let estimated_value = money(&row.estimated_property_value);
    let annual_rent = money(&row.annual_rental_income);
    let monthly_rent = money(&row.estimated_monthly_rent);
    let rental_yield = clean_value(&row.gross_rental_yield);
    let roi = clean_value(&row.roi_percentage);
    let status = clean_value(&row.metric_status);

    if [estimated_value.as_str(), annual_rent.as_str(), monthly_rent.as_str(), rental_yield, roi]
        .iter()
        .all(|v| v.is_empty())
    {
        return String::new();
    }

    let mut html = String::from(
        "<div class=\"property-financials\">\n<h3>💰 Investment Metrics</h3>\n<table style=\"width:100%; border-collapse: collapse;\">\n",
    );
    let price = clean_value(&row.price);

    if clean_value(&row.category) == Category::ForRent.as_str() {
        row_html(&mut html, "Monthly Rent", price);
        if !annual_rent.is_empty() {
            row_html(&mut html, "Annual Rental Income", &annual_rent);
        }
        if !estimated_value.is_empty() {
            row_html(&mut html, "Estimated Property Value", &estimated_value);
        }
    } else {
        row_html(&mut html, "Asking Price", price);
        if !monthly_rent.is_empty() {
            row_html(&mut html, "Estimated Monthly Rent", &monthly_rent);
        }
        if !annual_rent.is_empty() {
            row_html(&mut html, "Estimated Annual Income", &annual_rent);
        }
    }

    let extras = [
        ("Gross Rental Yield", rental_yield),
        ("ROI", roi),
        ("Calculation Method", status),
    ];
    for (label, value) in extras {
        if !value.is_empty() {
            row_html(&mut html, label, value);
        }
    }

    html.push_str(
        "</table>\n<p><em>💡 Note: Investment metrics are estimates based on market averages and should be verified independently.</em></p>\n</div>\n",
    );
    html
}

/// Gallery of every uploaded image after the featured one
fn gallery(images: &[UploadedMedia]) -> String {
    if images.len() <= 1 {
        return String::new();
    }

    let mut html = String::from(
        "<div class=\"property-gallery\">\n<h3>📸 Property Gallery</h3>\n<div style=\"display: grid; grid-template-columns: repeat(auto-fill, minmax(250px, 1fr)); gap: 15px;\">\n",
    );
    for image in &images[1..] {
        let _ = writeln!(
            html,
            r#"<div><img src="{}" alt="Property Image" style="width: 100%; height: 200px; object-fit: cover;" loading="lazy" /></div>"#,
            escape(&image.url)
        );
    }
    html.push_str("</div>\n</div>\n");
    html
}

/// Description paragraphs, split on blank lines
pub fn description_html(description: &str) -> String {
    let description = clean_value(description);
    let is_sentinel = [DESCRIPTION_MISSING, DESCRIPTION_NOT_FETCHED, DESCRIPTION_PENDING]
        .iter()
        .any(|s| description.eq_ignore_ascii_case(s));
    if description.is_empty() || is_sentinel {
        return format!("<p>{NO_DESCRIPTION}</p>");
    }

    description
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>\n", escape(p)))
        .collect()
}

/// Host named in the "View on ..." link
fn source_host(source: &str) -> String {
    Url::parse(source)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| source.to_string())
}

pub fn build_content(row: &DatasetRow, images: &[UploadedMedia]) -> String {
    let link = clean_value(&row.link);
    let host = source_host(clean_value(&row.source));

    let mut html = String::from("<div class=\"property-details\">\n");
    html.push_str(&info_table(row));
    html.push_str(&metrics_table(row));
    html.push_str(&gallery(images));
    html.push_str("<hr>\n<h3>🏠 Property Description</h3>\n");
    html.push_str(&description_html(&row.description));
    let _ = writeln!(
        html,
        r#"<hr>
<p><strong>🔗 Original Listing:</strong> <a href="{}" target="_blank" rel="noopener">View on {}</a></p>"#,
        escape(link),
        escape(&host)
    );
    html.push_str("</div>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(id: u64) -> UploadedMedia {
        UploadedMedia {
            id,
            url: format!("https://cms.test/uploads/{id}.jpg"),
        }
    }

    #[test]
    fn pounds_are_grouped() {
        assert_eq!(format_pounds(1234567.891), "£1,234,567.89");
        assert_eq!(format_pounds(950.0), "£950.00");
        assert_eq!(format_pounds(100000.0), "£100,000.00");
    }

    #[test]
    fn description_paragraphs() {
        assert_eq!(
            description_html("One.\n\nTwo & three."),
            "<p>One.</p>\n<p>Two &amp; three.</p>\n"
        );
        assert_eq!(
            description_html("Not fetched (limit reached)"),
            format!("<p>{NO_DESCRIPTION}</p>")
        );
        assert_eq!(description_html("N/A"), format!("<p>{NO_DESCRIPTION}</p>"));
    }

    #[test]
    fn content_sections() {
        let row = DatasetRow {
            title: "3 bed house for sale".to_string(),
            price: "N/A".to_string(),
            link: "https://www.agents.test/sale/3".to_string(),
            source: "https://www.agents.test/".to_string(),
            category: "For Sale".to_string(),
            description: "A lovely home.".to_string(),
            ..DatasetRow::default()
        };

        let html = build_content(&row, &[media(1), media(2), media(3)]);
        assert!(html.contains("Contact for price"));
        assert!(html.contains("View on www.agents.test"));
        assert!(!html.contains("uploads/1.jpg"));
        assert!(html.contains("uploads/2.jpg"));
        assert!(html.contains("uploads/3.jpg"));
        assert!(!html.contains("Investment Metrics"));

        let html = build_content(&row, &[media(1)]);
        assert!(!html.contains("Property Gallery"));
    }

    #[test]
    fn metrics_follow_category() {
        let row = DatasetRow {
            price: "£1,000 pcm".to_string(),
            category: "For Rent".to_string(),
            annual_rental_income: "12000".to_string(),
            gross_rental_yield: "4.8%".to_string(),
            ..DatasetRow::default()
        };
        let html = metrics_table(&row);
        assert!(html.contains("Monthly Rent"));
        assert!(html.contains("£12,000.00"));
        assert!(html.contains("4.8%"));
        assert!(!html.contains("Asking Price"));
    }
}
