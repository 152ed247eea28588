//! Painting detail navigation: inline image selection plus a lightbox.
//!
//! The inline selection and the lightbox index are independent. Opening the
//! lightbox copies the current selection; moving inside the lightbox never
//! touches the inline selection and closing it leaves the inline state alone.

use serde::{Deserialize, Serialize};

use crate::error::NavigationError;
use crate::painting::{Painting, PLACEHOLDER_IMAGE};

// ============================================================================
// IMAGE SET
// ============================================================================

/// Ordered, non-empty list of image URLs for one painting.
///
/// The main image is always first, followed by the additional images in
/// display order. Empty entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ImageSet {
    urls: Vec<String>,
}

impl ImageSet {
    pub fn new(main_image_url: &str, additional_image_urls: &[String]) -> Self {
        let main = if main_image_url.trim().is_empty() {
            PLACEHOLDER_IMAGE.to_string()
        } else {
            main_image_url.to_string()
        };

        let mut urls = Vec::with_capacity(additional_image_urls.len() + 1);
        urls.push(main);
        urls.extend(
            additional_image_urls
                .iter()
                .filter(|url| !url.trim().is_empty())
                .cloned(),
        );

        Self { urls }
    }

    pub fn from_painting(painting: &Painting) -> Self {
        Self::new(&painting.main_image_url, &painting.additional_image_urls)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.urls.get(index).map(String::as_str)
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Whether thumbnails and arrows should be shown at all.
    pub fn has_multiple(&self) -> bool {
        self.urls.len() > 1
    }

    fn wrap_next(&self, index: usize) -> usize {
        (index + 1) % self.urls.len()
    }

    fn wrap_previous(&self, index: usize) -> usize {
        (index + self.urls.len() - 1) % self.urls.len()
    }
}

// ============================================================================
// LIGHTBOX
// ============================================================================

/// How the lightbox was dismissed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Button,
    Backdrop,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lightbox {
    pub open: bool,
    pub index: usize,
}

// ============================================================================
// GALLERY STATE
// ============================================================================

/// Navigation state for one painting's detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryState {
    images: ImageSet,
    selected: usize,
    lightbox: Lightbox,
}

impl GalleryState {
    pub fn new(images: ImageSet) -> Self {
        Self {
            images,
            selected: 0,
            lightbox: Lightbox::default(),
        }
    }

    pub fn for_painting(painting: &Painting) -> Self {
        Self::new(ImageSet::from_painting(painting))
    }

    pub fn images(&self) -> &ImageSet {
        &self.images
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_url(&self) -> &str {
        self.images.get(self.selected).unwrap_or(PLACEHOLDER_IMAGE)
    }

    pub fn lightbox(&self) -> Lightbox {
        self.lightbox
    }

    /// URL shown in the lightbox, if it is open.
    pub fn lightbox_url(&self) -> Option<&str> {
        if self.lightbox.open {
            self.images.get(self.lightbox.index)
        } else {
            None
        }
    }

    pub fn select_thumbnail(&mut self, index: usize) -> Result<(), NavigationError> {
        if index >= self.images.len() {
            return Err(NavigationError::OutOfRange {
                index,
                len: self.images.len(),
            });
        }
        self.selected = index;
        Ok(())
    }

    pub fn next(&mut self) {
        self.selected = self.images.wrap_next(self.selected);
    }

    pub fn previous(&mut self) {
        self.selected = self.images.wrap_previous(self.selected);
    }

    pub fn open_lightbox(&mut self) {
        self.lightbox = Lightbox {
            open: true,
            index: self.selected,
        };
    }

    /// No-op when the lightbox is closed.
    pub fn lightbox_next(&mut self) {
        if self.lightbox.open {
            self.lightbox.index = self.images.wrap_next(self.lightbox.index);
        }
    }

    /// No-op when the lightbox is closed.
    pub fn lightbox_previous(&mut self) {
        if self.lightbox.open {
            self.lightbox.index = self.images.wrap_previous(self.lightbox.index);
        }
    }

    pub fn close_lightbox(&mut self, _reason: CloseReason) {
        self.lightbox.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_image_set_main_first_then_additional() {
        let set = ImageSet::new("m", &urls(&["a", "b"]));
        assert_eq!(set.urls(), &urls(&["m", "a", "b"])[..]);
        assert!(set.has_multiple());
    }

    #[test]
    fn test_image_set_drops_empty_entries() {
        let set = ImageSet::new("m", &urls(&["", "a", "  "]));
        assert_eq!(set.urls(), &urls(&["m", "a"])[..]);
    }

    #[test]
    fn test_image_set_empty_main_uses_placeholder() {
        let set = ImageSet::new("", &[]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(0), Some(PLACEHOLDER_IMAGE));
        assert!(!set.has_multiple());
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let mut state = GalleryState::new(ImageSet::new("m", &urls(&["a", "b"])));

        state.previous();
        assert_eq!(state.selected(), 2);
        assert_eq!(state.selected_url(), "b");

        state.next();
        assert_eq!(state.selected(), 0);
        state.next();
        assert_eq!(state.selected_url(), "a");
    }

    #[test]
    fn test_select_thumbnail_out_of_range() {
        let mut state = GalleryState::new(ImageSet::new("m", &urls(&["a"])));
        assert!(state.select_thumbnail(1).is_ok());
        assert_eq!(
            state.select_thumbnail(2),
            Err(NavigationError::OutOfRange { index: 2, len: 2 })
        );
        assert_eq!(state.selected(), 1);
    }

    #[test]
    fn test_lightbox_is_independent_of_inline_selection() {
        let mut state = GalleryState::new(ImageSet::new("m", &urls(&["a", "b"])));
        state.select_thumbnail(1).unwrap();

        state.open_lightbox();
        assert_eq!(state.lightbox(), Lightbox { open: true, index: 1 });

        state.lightbox_next();
        state.lightbox_next();
        assert_eq!(state.lightbox().index, 0);
        assert_eq!(state.lightbox_url(), Some("m"));
        assert_eq!(state.selected(), 1);

        state.close_lightbox(CloseReason::Escape);
        assert!(!state.lightbox().open);
        assert_eq!(state.lightbox_url(), None);
        assert_eq!(state.selected(), 1);
    }

    #[test]
    fn test_lightbox_moves_ignored_while_closed() {
        let mut state = GalleryState::new(ImageSet::new("m", &urls(&["a"])));
        state.lightbox_next();
        state.lightbox_previous();
        assert_eq!(state.lightbox(), Lightbox::default());
    }

    #[test]
    fn test_every_close_reason_closes() {
        for reason in [CloseReason::Button, CloseReason::Backdrop, CloseReason::Escape] {
            let mut state = GalleryState::new(ImageSet::new("m", &[]));
            state.open_lightbox();
            state.close_lightbox(reason);
            assert!(!state.lightbox().open);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// len calls to next return to the starting image.
        #[test]
        fn prop_next_cycles_back(extra in 0usize..8, start in 0usize..9) {
            let additional: Vec<String> = (0..extra).map(|i| format!("img-{}", i)).collect();
            let mut state = GalleryState::new(ImageSet::new("main", &additional));
            let len = state.images().len();
            let start = start % len;
            state.select_thumbnail(start).unwrap();

            for _ in 0..len {
                state.next();
            }
            prop_assert_eq!(state.selected(), start);
        }

        /// previous undoes next from any position.
        #[test]
        fn prop_previous_inverts_next(extra in 0usize..8, start in 0usize..9) {
            let additional: Vec<String> = (0..extra).map(|i| format!("img-{}", i)).collect();
            let mut state = GalleryState::new(ImageSet::new("main", &additional));
            let start = start % state.images().len();
            state.select_thumbnail(start).unwrap();

            state.next();
            state.previous();
            prop_assert_eq!(state.selected(), start);

            state.open_lightbox();
            state.lightbox_previous();
            state.lightbox_next();
            prop_assert_eq!(state.lightbox().index, start);
        }
    }
}
