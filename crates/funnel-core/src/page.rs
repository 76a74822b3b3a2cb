//! # Page Contract
//!
//! The funnel never owns the page. Everything it does to the page goes
//! through the [`Page`] trait: class toggles, inline styles, text, and the
//! final navigation.
//!
//! [`MemoryPage`] is an in-memory page used by tests and by the CLI
//! simulator. It records every navigation instead of leaving.

use crate::{ElementRef, FunnelError, QuizStage};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// CLASS NAMES & STYLES
// =============================================================================

/// Class that starts a panel's exit animation.
pub const CLASS_FADE_OUT: &str = "fade-out";

/// Class that removes a panel from view.
pub const CLASS_HIDDEN: &str = "hidden";

/// Class that shows the preloader.
pub const CLASS_ACTIVE: &str = "active";

/// Class carried by answer controls.
pub const CLASS_OPTION_BUTTON: &str = "option-button";

// =============================================================================
// PAGE TRAIT
// =============================================================================

/// Everything the funnel needs from the host page.
///
/// Mutating methods return `FunnelError::MissingElement` when the element is
/// not on the page, and `FunnelError::Page` for any other failure.
pub trait Page {
    /// Whether the element is on the page.
    fn exists(&self, element: &ElementRef) -> bool;

    /// Add a class to the element's class list. Adding twice is a no-op.
    fn add_class(&mut self, element: &ElementRef, class: &str) -> Result<(), FunnelError>;

    /// Remove a class from the element's class list.
    fn remove_class(&mut self, element: &ElementRef, class: &str) -> Result<(), FunnelError>;

    /// Set an inline style property.
    fn set_style(
        &mut self,
        element: &ElementRef,
        property: &str,
        value: &str,
    ) -> Result<(), FunnelError>;

    /// Replace the element's text content.
    fn set_text(&mut self, element: &ElementRef, text: &str) -> Result<(), FunnelError>;

    /// The current page URL (`location.href`).
    fn location(&self) -> &str;

    /// Send the browser to `url`.
    fn navigate(&mut self, url: &str);
}

// =============================================================================
// IN-MEMORY PAGE
// =============================================================================

/// State of one element in a [`MemoryPage`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub classes: BTreeSet<String>,
    pub styles: BTreeMap<String, String>,
    pub text: String,
}

impl Element {
    /// Element with the given classes.
    #[must_use]
    pub fn with_classes(classes: &[&str]) -> Self {
        Self {
            classes: classes.iter().map(|c| (*c).to_string()).collect(),
            ..Self::default()
        }
    }

    /// Check for a class.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

/// In-memory page with deterministic ordering.
#[derive(Debug, Clone, Default)]
pub struct MemoryPage {
    location: String,
    elements: BTreeMap<ElementRef, Element>,
    navigations: Vec<String>,
}

impl MemoryPage {
    /// Empty page at `location`.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            elements: BTreeMap::new(),
            navigations: Vec::new(),
        }
    }

    /// The page the quiz ships with: step1 showing, step2 hidden, progress at
    /// 50% / "1", preloader idle.
    #[must_use]
    pub fn quiz_layout(location: impl Into<String>) -> Self {
        let mut page = Self::new(location);
        page.insert(ElementRef::Step1, Element::default());
        page.insert(ElementRef::Step2, Element::with_classes(&[CLASS_HIDDEN]));
        page.insert(ElementRef::ProgressContainer, Element::default());

        let mut bar = Element::default();
        bar.styles.insert("width".to_string(), "50%".to_string());
        page.insert(ElementRef::ProgressBar, bar);

        let counter = Element {
            text: "1".to_string(),
            ..Element::default()
        };
        page.insert(ElementRef::CurrentStep, counter);

        page.insert(ElementRef::Preloader, Element::default());
        page
    }

    /// Add an `.option-button` control with the given id.
    pub fn add_option(&mut self, id: impl Into<String>) -> ElementRef {
        let element = ElementRef::OptionButton(id.into());
        self.insert(element.clone(), Element::with_classes(&[CLASS_OPTION_BUTTON]));
        element
    }

    /// Insert or replace an element.
    pub fn insert(&mut self, element: ElementRef, state: Element) {
        self.elements.insert(element, state);
    }

    /// Remove an element, returning its last state.
    pub fn remove(&mut self, element: &ElementRef) -> Option<Element> {
        self.elements.remove(element)
    }

    /// Look up an element.
    #[must_use]
    pub fn element(&self, element: &ElementRef) -> Option<&Element> {
        self.elements.get(element)
    }

    /// Check a class on an element; absent elements have no classes.
    #[must_use]
    pub fn has_class(&self, element: &ElementRef, class: &str) -> bool {
        self.element(element).is_some_and(|e| e.has_class(class))
    }

    /// Read an inline style property.
    #[must_use]
    pub fn style(&self, element: &ElementRef, property: &str) -> Option<&str> {
        self.element(element)
            .and_then(|e| e.styles.get(property))
            .map(String::as_str)
    }

    /// Read text content.
    #[must_use]
    pub fn text(&self, element: &ElementRef) -> Option<&str> {
        self.element(element).map(|e| e.text.as_str())
    }

    /// Every URL the page was sent to, in order.
    #[must_use]
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    /// The most recent navigation, if any.
    #[must_use]
    pub fn last_navigation(&self) -> Option<&str> {
        self.navigations.last().map(String::as_str)
    }

    /// Which stage the page is showing, judged from classes alone.
    ///
    /// Returns `None` when the page does not show exactly one panel. Used to
    /// check that the page follows the engine's stage.
    #[must_use]
    pub fn displayed_stage(&self) -> Option<QuizStage> {
        if !self.navigations.is_empty() {
            return Some(QuizStage::Redirected);
        }

        let shown = |el: &ElementRef| self.exists(el) && !self.has_class(el, CLASS_HIDDEN);
        let candidates = [
            (shown(&ElementRef::Step1), QuizStage::Step1),
            (shown(&ElementRef::Step2), QuizStage::Step2),
            (
                self.has_class(&ElementRef::Preloader, CLASS_ACTIVE),
                QuizStage::Preloader,
            ),
        ];

        let mut visible = candidates.iter().filter(|(on, _)| *on).map(|(_, s)| *s);
        match (visible.next(), visible.next()) {
            (Some(stage), None) => Some(stage),
            _ => None,
        }
    }

    fn element_mut(&mut self, element: &ElementRef) -> Result<&mut Element, FunnelError> {
        self.elements
            .get_mut(element)
            .ok_or_else(|| FunnelError::MissingElement(element.clone()))
    }
}

impl Page for MemoryPage {
    fn exists(&self, element: &ElementRef) -> bool {
        self.elements.contains_key(element)
    }

    fn add_class(&mut self, element: &ElementRef, class: &str) -> Result<(), FunnelError> {
        self.element_mut(element)?.classes.insert(class.to_string());
        Ok(())
    }

    fn remove_class(&mut self, element: &ElementRef, class: &str) -> Result<(), FunnelError> {
        self.element_mut(element)?.classes.remove(class);
        Ok(())
    }

    fn set_style(
        &mut self,
        element: &ElementRef,
        property: &str,
        value: &str,
    ) -> Result<(), FunnelError> {
        self.element_mut(element)?
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn set_text(&mut self, element: &ElementRef, text: &str) -> Result<(), FunnelError> {
        self.element_mut(element)?.text = text.to_string();
        Ok(())
    }

    fn location(&self) -> &str {
        &self.location
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_layout_shows_step1() {
        let page = MemoryPage::quiz_layout("https://site/");
        assert_eq!(page.displayed_stage(), Some(QuizStage::Step1));
        assert_eq!(page.style(&ElementRef::ProgressBar, "width"), Some("50%"));
        assert_eq!(page.text(&ElementRef::CurrentStep), Some("1"));
    }

    #[test]
    fn missing_element_is_reported() {
        let mut page = MemoryPage::new("https://site/");
        let result = page.add_class(&ElementRef::Step1, CLASS_HIDDEN);
        assert_eq!(result, Err(FunnelError::MissingElement(ElementRef::Step1)));
    }

    #[test]
    fn class_toggling_is_idempotent() {
        let mut page = MemoryPage::quiz_layout("https://site/");
        page.add_class(&ElementRef::Step1, CLASS_FADE_OUT).expect("add");
        page.add_class(&ElementRef::Step1, CLASS_FADE_OUT).expect("add");
        let classes = &page.element(&ElementRef::Step1).expect("step1").classes;
        assert_eq!(classes.len(), 1);

        page.remove_class(&ElementRef::Step2, CLASS_HIDDEN).expect("remove");
        page.remove_class(&ElementRef::Step2, CLASS_HIDDEN).expect("remove");
        assert!(!page.has_class(&ElementRef::Step2, CLASS_HIDDEN));
    }

    #[test]
    fn two_visible_panels_have_no_stage() {
        let mut page = MemoryPage::quiz_layout("https://site/");
        page.remove_class(&ElementRef::Step2, CLASS_HIDDEN).expect("remove");
        assert_eq!(page.displayed_stage(), None);
    }

    #[test]
    fn navigation_is_recorded() {
        let mut page = MemoryPage::quiz_layout("https://site/?a=1");
        assert_eq!(page.location(), "https://site/?a=1");
        page.navigate("https://dest/");
        assert_eq!(page.last_navigation(), Some("https://dest/"));
        assert_eq!(page.displayed_stage(), Some(QuizStage::Redirected));
    }

    #[test]
    fn option_buttons_carry_their_class() {
        let mut page = MemoryPage::new("https://site/");
        let button = page.add_option("step1_premium");
        assert!(page.has_class(&button, CLASS_OPTION_BUTTON));
    }
}
