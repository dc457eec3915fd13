//! Hosted race image URLs.
//!
//! Race images live on Cloudinary and are stored as opaque public IDs. The
//! helpers here only format delivery URLs; nothing is uploaded or validated.

use url::Url;

const CLOUDINARY_HOST: &str = "res.cloudinary.com";

/// Delivery transformations: device pixel ratio, format and quality picked
/// automatically by the CDN.
const TRANSFORMATIONS: &str = "dpr_auto,f_auto,q_auto";

const PLACEHOLDER_IDS: [&str; 3] = ["sample", "default", "placeholder"];

/// Returns true when the stored image reference is not a real upload.
#[must_use]
pub fn is_placeholder(public_id: Option<&str>) -> bool {
    match public_id.map(str::trim) {
        None | Some("") => true,
        Some(id) => {
            id.to_lowercase().contains("placeholder") || PLACEHOLDER_IDS.contains(&id)
        }
    }
}

/// Build an HTTPS delivery URL for a public ID.
#[must_use]
pub fn secure_image_url(public_id: &str, cloud_name: &str) -> String {
    format!(
        "https://{CLOUDINARY_HOST}/{cloud_name}/image/upload/{TRANSFORMATIONS}/{}",
        public_id.trim_start_matches('/')
    )
}

/// Add the optimization query parameters to an existing Cloudinary URL.
///
/// URLs on other hosts, and strings that do not parse, are returned as-is.
#[must_use]
pub fn optimize_image_url(image_url: &str) -> String {
    let Ok(mut url) = Url::parse(image_url) else {
        return image_url.to_string();
    };

    if url.host_str() != Some(CLOUDINARY_HOST) {
        return image_url.to_string();
    }

    url.query_pairs_mut()
        .append_pair("dpr_auto", "true")
        .append_pair("f_auto", "true")
        .append_pair("q_auto", "true");

    url.to_string()
}

/// Formats race image references for API responses.
#[derive(Debug, Clone, Default)]
pub struct ImageFormatter {
    cloud_name: Option<String>,
}

impl ImageFormatter {
    /// Create a formatter for the given Cloudinary cloud.
    #[must_use]
    pub const fn new(cloud_name: Option<String>) -> Self {
        Self { cloud_name }
    }

    /// Resolve a stored image reference into a delivery URL.
    ///
    /// Returns `None` for placeholders or when no cloud is configured, in which
    /// case clients fall back to their default artwork.
    #[must_use]
    pub fn url_for(&self, image: Option<&str>) -> Option<String> {
        if is_placeholder(image) {
            return None;
        }
        let image = image?.trim();

        if image.starts_with("https://") || image.starts_with("http://") {
            return Some(optimize_image_url(image));
        }

        self.cloud_name
            .as_deref()
            .map(|cloud| secure_image_url(image, cloud))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder(None));
        assert!(is_placeholder(Some("")));
        assert!(is_placeholder(Some("placeholder")));
        assert!(is_placeholder(Some("races/Placeholder_v2")));
        assert!(is_placeholder(Some("sample")));
        assert!(is_placeholder(Some("default")));
        assert!(!is_placeholder(Some("races/midnight-10k")));
    }

    #[test]
    fn test_secure_image_url() {
        assert_eq!(
            secure_image_url("races/midnight-10k", "demo"),
            "https://res.cloudinary.com/demo/image/upload/dpr_auto,f_auto,q_auto/races/midnight-10k"
        );
    }

    #[test]
    fn test_optimize_image_url_appends_params() {
        assert_eq!(
            optimize_image_url("https://res.cloudinary.com/demo/image/upload/run.jpg"),
            "https://res.cloudinary.com/demo/image/upload/run.jpg?dpr_auto=true&f_auto=true&q_auto=true"
        );
        assert_eq!(
            optimize_image_url("https://res.cloudinary.com/demo/image/upload/run.jpg?v=2"),
            "https://res.cloudinary.com/demo/image/upload/run.jpg?v=2&dpr_auto=true&f_auto=true&q_auto=true"
        );
    }

    #[test]
    fn test_optimize_image_url_leaves_other_hosts() {
        let other = "https://images.example.com/run.jpg";
        assert_eq!(optimize_image_url(other), other);
        assert_eq!(optimize_image_url("not a url"), "not a url");
    }

    #[test]
    fn test_formatter() {
        let formatter = ImageFormatter::new(Some("demo".to_string()));
        assert_eq!(formatter.url_for(Some("placeholder")), None);
        assert_eq!(
            formatter.url_for(Some("races/ultra")).as_deref(),
            Some("https://res.cloudinary.com/demo/image/upload/dpr_auto,f_auto,q_auto/races/ultra")
        );

        let unconfigured = ImageFormatter::default();
        assert_eq!(unconfigured.url_for(Some("races/ultra")), None);
    }
}
