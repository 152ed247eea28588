//! Selection rules over a catalog snapshot.

use crate::painting::Painting;

/// Maximum number of paintings shown in the home featured section.
pub const HOME_FEATURED_LIMIT: usize = 2;

/// Order paintings newest first. Stable, so equal timestamps keep store order.
pub fn sort_newest_first(paintings: &mut [Painting]) {
    paintings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// Featured paintings for the home page, in catalog order.
pub fn featured_for_home(paintings: &[Painting]) -> Vec<&Painting> {
    paintings
        .iter()
        .filter(|p| p.is_featured_home)
        .take(HOME_FEATURED_LIMIT)
        .collect()
}

pub fn find_by_slug<'a>(paintings: &'a [Painting], slug: &str) -> Option<&'a Painting> {
    paintings.iter().find(|p| p.slug == slug)
}
