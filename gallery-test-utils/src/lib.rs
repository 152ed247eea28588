//! Gallery Test Utilities
//!
//! Shared test infrastructure for the gallery workspace:
//! - Proptest generators for paintings and their parts
//! - Painting fixtures for common scenarios
//! - Assertions over `GalleryResult`

pub use gallery_core::{
    GalleryError, GalleryResult, Painting, PaintingDraft, PaintingStatus, StorageError,
    Timestamp, ValidationError,
};

pub use fixtures::{draft, painting, painting_created_at};

use chrono::{Duration, TimeZone, Utc};
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for gallery types.

    use super::*;
    use proptest::prelude::*;

    pub fn arb_status() -> impl Strategy<Value = PaintingStatus> {
        prop_oneof![
            Just(PaintingStatus::Available),
            Just(PaintingStatus::Sold),
            Just(PaintingStatus::NotForSale),
            Just(PaintingStatus::Reserved),
        ]
    }

    /// Timestamps between 2020 and 2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
        })
    }

    pub fn arb_slug() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,30}"
    }

    /// Image URL lists that may contain empty entries.
    pub fn arb_image_urls() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec(
            prop_oneof![
                3 => "[a-z]{1,8}".prop_map(|s| format!("https://cdn.test/{}.jpg", s)),
                1 => Just(String::new()),
            ],
            0..6,
        )
    }

    pub fn arb_price() -> impl Strategy<Value = Option<f64>> {
        prop::option::of((1u32..5_000_000u32).prop_map(f64::from))
    }

    pub fn arb_painting() -> impl Strategy<Value = Painting> {
        (
            arb_slug(),
            "[A-Za-z ]{1,40}",
            arb_status(),
            arb_price(),
            arb_image_urls(),
            any::<bool>(),
            arb_timestamp(),
        )
            .prop_map(
                |(slug, title, status, price, additional_image_urls, featured, created_at)| {
                    Painting {
                        id: Uuid::now_v7(),
                        main_image_url: format!("https://cdn.test/{}.jpg", slug),
                        slug,
                        title,
                        medium: "OIL ON CANVAS".to_string(),
                        dimensions: "60x90 cm".to_string(),
                        year: Some(2024),
                        description: String::new(),
                        status,
                        price,
                        additional_image_urls,
                        is_featured_home: featured,
                        created_at,
                        updated_at: created_at,
                    }
                },
            )
    }

    /// A catalog with unique slugs.
    pub fn arb_catalog(max: usize) -> impl Strategy<Value = Vec<Painting>> {
        prop::collection::vec(arb_painting(), 0..max).prop_map(|mut paintings| {
            for (i, p) in paintings.iter_mut().enumerate() {
                p.slug = format!("{}-{}", p.slug, i);
            }
            paintings
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built paintings for common scenarios.

    use super::*;

    /// A valid draft for an available painting priced at 50,000.
    pub fn draft(slug: &str) -> PaintingDraft {
        PaintingDraft {
            slug: slug.to_string(),
            title: format!("Painting {}", slug),
            medium: "OIL ON CANVAS".to_string(),
            dimensions: "80x100 cm".to_string(),
            year: Some(2024),
            description: "Test painting".to_string(),
            status: PaintingStatus::Available,
            price: Some(50000.0),
            main_image_url: format!("https://cdn.test/{}-main.jpg", slug),
            additional_image_urls: vec![],
            is_featured_home: false,
        }
    }

    pub fn painting(slug: &str) -> Painting {
        painting_created_at(slug, 0)
    }

    /// A painting created `minutes` after 2025-01-01T00:00:00Z.
    pub fn painting_created_at(slug: &str, minutes: i64) -> Painting {
        let base = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let created_at = base + Duration::minutes(minutes);
        let d = draft(slug);
        Painting {
            id: Uuid::now_v7(),
            slug: d.slug,
            title: d.title,
            medium: d.medium,
            dimensions: d.dimensions,
            year: d.year,
            description: d.description,
            status: d.status,
            price: d.price,
            main_image_url: d.main_image_url,
            additional_image_urls: d.additional_image_urls,
            is_featured_home: d.is_featured_home,
            created_at,
            updated_at: created_at,
        }
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions over gallery results.

    use super::*;

    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &GalleryResult<T>) {
        match result {
            Err(GalleryError::Storage(StorageError::NotFound { .. })) => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    /// Assert paintings are ordered newest first.
    #[track_caller]
    pub fn assert_newest_first(paintings: &[Painting]) {
        for pair in paintings.windows(2) {
            assert!(
                pair[0].created_at >= pair[1].created_at,
                "{} ({}) listed before newer {} ({})",
                pair[0].slug,
                pair[0].created_at,
                pair[1].slug,
                pair[1].created_at
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixture_draft_is_valid() {
        assert!(draft("x").validate().is_ok());
    }

    #[test]
    fn test_painting_created_at_offsets() {
        let a = painting_created_at("a", 0);
        let b = painting_created_at("b", 5);
        assert_eq!((b.created_at - a.created_at).num_minutes(), 5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_catalog_slugs_unique(catalog in generators::arb_catalog(10)) {
            let mut slugs: Vec<_> = catalog.iter().map(|p| p.slug.clone()).collect();
            slugs.sort();
            slugs.dedup();
            prop_assert_eq!(slugs.len(), catalog.len());
        }
    }
}
