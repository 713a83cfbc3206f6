//! Checks and naming for images before they are re-uploaded.

use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimensions {
    Accepted { width: usize, height: usize },
    TooSmall { width: usize, height: usize },
    /// Format not recognised; such images are uploaded anyway
    Unknown,
}

/// Compare the image's pixel size against the minimum
pub fn check_dimensions(bytes: &[u8], min_width: usize, min_height: usize) -> Dimensions {
    match imagesize::blob_size(bytes) {
        Ok(size) if size.width < min_width || size.height < min_height => Dimensions::TooSmall {
            width: size.width,
            height: size.height,
        },
        Ok(size) => Dimensions::Accepted {
            width: size.width,
            height: size.height,
        },
        Err(_) => Dimensions::Unknown,
    }
}

/// `scheme://host[:port]` of an image URL, sent as the download's Referer
pub fn origin(image_url: &str) -> Option<String> {
    let url = Url::parse(image_url).ok()?;
    url.host_str()?;
    Some(url.origin().ascii_serialization())
}

/// File name for the media upload: last path segment with its extension
/// matched to the MIME type, or `property-image-N`
pub fn media_file_name(image_url: &str, mime: &str, index: usize) -> String {
    let segment = image_url
        .split('?')
        .next()
        .and_then(|path| path.rsplit('/').next())
        .unwrap_or_default();
    let name = if segment.is_empty() {
        format!("property-image-{index}")
    } else {
        segment.to_string()
    };

    let mime = mime.to_lowercase();
    let (extension, accepted): (&str, &[&str]) = if mime.contains("webp") {
        ("webp", &[".webp"])
    } else if mime.contains("png") {
        ("png", &[".png"])
    } else if mime.contains("jpeg") || mime.contains("jpg") {
        ("jpg", &[".jpg", ".jpeg"])
    } else {
        return name;
    };

    if accepted.iter().any(|ext| name.ends_with(ext)) {
        return name;
    }
    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(&name);
    format!("{stem}.{extension}")
}

#[cfg(test)]
pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR".to_vec();
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes.extend_from_slice(&[8, 2, 0, 0, 0, 0, 0, 0, 0]);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions() {
        assert_eq!(
            check_dimensions(&png_header(800, 600), 200, 150),
            Dimensions::Accepted { width: 800, height: 600 }
        );
        assert_eq!(
            check_dimensions(&png_header(120, 600), 200, 150),
            Dimensions::TooSmall { width: 120, height: 600 }
        );
        assert_eq!(check_dimensions(b"not an image", 200, 150), Dimensions::Unknown);
    }

    #[test]
    fn origin_of_image() {
        assert_eq!(
            origin("https://media.agents.test/photos/1.jpg?w=800").as_deref(),
            Some("https://media.agents.test")
        );
        assert_eq!(origin("not a url"), None);
    }

    #[test]
    fn file_names() {
        assert_eq!(
            media_file_name("https://a.test/p/front.jpeg?w=1", "image/jpeg", 1),
            "front.jpeg"
        );
        assert_eq!(media_file_name("https://a.test/p/front.jpg", "image/webp", 1), "front.webp");
        assert_eq!(media_file_name("https://a.test/p/photo", "image/png", 2), "photo.png");
        assert_eq!(media_file_name("https://a.test/p/", "image/jpeg", 3), "property-image-3.jpg");
        assert_eq!(media_file_name("https://a.test/p/x.gif", "image/gif", 1), "x.gif");
    }
}
