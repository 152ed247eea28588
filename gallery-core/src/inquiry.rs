//! Purchase inquiry: the "Ask for Price" control and its messaging deep link.

use serde::{Deserialize, Serialize};

use crate::painting::{Painting, PaintingStatus};

/// Contact number used when none is configured.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "919663608903";

const MESSAGING_BASE_URL: &str = "https://wa.me";

/// State of the purchase control shown next to a painting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct PurchaseControl {
    pub enabled: bool,
    pub label: String,
    /// Deep link into the messaging app; absent when disabled.
    pub inquiry_url: Option<String>,
}

impl PurchaseControl {
    pub fn for_painting(painting: &Painting, phone: &str) -> Self {
        let enabled = painting.status.accepts_inquiries();
        Self {
            enabled,
            label: purchase_label(painting.status).to_string(),
            inquiry_url: enabled.then(|| inquiry_link(phone, &painting.title)),
        }
    }
}

pub fn purchase_label(status: PaintingStatus) -> &'static str {
    match status {
        PaintingStatus::Sold => "Sold",
        PaintingStatus::NotForSale => "Not for sale",
        _ => "Ask for Price",
    }
}

pub fn inquiry_message(title: &str) -> String {
    format!(
        "Hi, I am interested in the painting '{}'. Please share the price and availability.",
        title
    )
}

/// Build `https://wa.me/<phone>?text=<message>` with the message percent-encoded.
pub fn inquiry_link(phone: &str, title: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    let phone = if digits.is_empty() {
        DEFAULT_WHATSAPP_NUMBER
    } else {
        digits.as_str()
    };
    format!(
        "{}/{}?text={}",
        MESSAGING_BASE_URL,
        phone,
        urlencoding::encode(&inquiry_message(title))
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn painting(title: &str, status: PaintingStatus) -> Painting {
        Painting {
            id: Uuid::nil(),
            slug: "s".to_string(),
            title: title.to_string(),
            medium: "OIL".to_string(),
            dimensions: String::new(),
            year: None,
            description: String::new(),
            status,
            price: Some(50000.0),
            main_image_url: "m".to_string(),
            additional_image_urls: vec![],
            is_featured_home: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_inquiry_link_encodes_title() {
        let link = inquiry_link("919663608903", "Blue Hour");
        assert!(link.starts_with("https://wa.me/919663608903?text="));
        assert!(link.contains("Blue%20Hour"));
        assert!(!link.contains(' '));
    }

    #[test]
    fn test_inquiry_link_normalises_phone() {
        let link = inquiry_link("+91 96636-08903", "X");
        assert!(link.starts_with("https://wa.me/919663608903?"));

        let fallback = inquiry_link("", "X");
        assert!(fallback.starts_with(&format!("https://wa.me/{}?", DEFAULT_WHATSAPP_NUMBER)));
    }

    #[test]
    fn test_available_and_reserved_are_enabled() {
        for status in [PaintingStatus::Available, PaintingStatus::Reserved] {
            let control = PurchaseControl::for_painting(&painting("Dusk", status), "1");
            assert!(control.enabled);
            assert_eq!(control.label, "Ask for Price");
            assert!(control
                .inquiry_url
                .as_deref()
                .is_some_and(|url| url.contains("Dusk")));
        }
    }

    #[test]
    fn test_sold_and_not_for_sale_are_disabled() {
        let sold = PurchaseControl::for_painting(&painting("Dusk", PaintingStatus::Sold), "1");
        assert!(!sold.enabled);
        assert_eq!(sold.label, "Sold");
        assert_eq!(sold.inquiry_url, None);

        let nfs = PurchaseControl::for_painting(&painting("Dusk", PaintingStatus::NotForSale), "1");
        assert!(!nfs.enabled);
        assert_eq!(nfs.label, "Not for sale");
    }
}
