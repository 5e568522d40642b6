//! Selector matching over an element's lineage.
//!
//! The classifier and selector only ever ask one question of the DOM
//! tree: "does this element, or any ancestor, match one of these simple
//! selectors?" -- the equivalent of `Element.closest()` with a selector
//! list. Each [`SimpleSelector`] is a single compound-free test, which is
//! all the heuristics need.

use crate::types::ElementNode;

/// A single simple selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimpleSelector {
    /// `tag`
    Tag(&'static str),
    /// `.class`
    Class(&'static str),
    /// `[class*="fragment"]`
    ClassContains(&'static str),
    /// `[role="value"]`
    Role(&'static str),
}

impl SimpleSelector {
    /// Whether `node` matches this selector.
    #[must_use]
    pub fn matches(self, node: &ElementNode) -> bool {
        match self {
            Self::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
            Self::Class(class) => node.class_tokens().any(|c| c == class),
            Self::ClassContains(fragment) => node.class.contains(fragment),
            Self::Role(role) => node.role.as_deref() == Some(role),
        }
    }
}

/// Page chrome: headers, navigation bars, menus.
pub const CHROME: &[SimpleSelector] = &[
    SimpleSelector::Tag("header"),
    SimpleSelector::Tag("nav"),
    SimpleSelector::Class("header"),
    SimpleSelector::Class("nav"),
    SimpleSelector::Class("navbar"),
    SimpleSelector::Class("navigation"),
    SimpleSelector::Class("menu"),
];

/// Main content regions.
pub const CONTENT: &[SimpleSelector] = &[
    SimpleSelector::Tag("main"),
    SimpleSelector::Tag("article"),
    SimpleSelector::Tag("section"),
    SimpleSelector::Class("content"),
    SimpleSelector::Class("post"),
    SimpleSelector::Class("product"),
    SimpleSelector::Class("gallery"),
    SimpleSelector::Class("hero"),
    SimpleSelector::Role("main"),
];

/// Hero and banner containers.
pub const BANNER: &[SimpleSelector] = &[
    SimpleSelector::Class("hero"),
    SimpleSelector::Class("banner"),
    SimpleSelector::Class("header-image"),
    SimpleSelector::Class("cover"),
    SimpleSelector::Class("featured-image"),
    SimpleSelector::Class("hero-section"),
    SimpleSelector::Class("banner-section"),
    SimpleSelector::Class("jumbotron"),
    SimpleSelector::Class("masthead"),
    SimpleSelector::ClassContains("hero"),
    SimpleSelector::ClassContains("banner"),
    SimpleSelector::ClassContains("cover"),
];

/// Return the innermost node of `lineage` that matches any of `selectors`.
///
/// `lineage[0]` is the element itself, so -- like `closest()` -- the
/// element can match its own selector list.
#[must_use]
pub fn closest<'a>(
    lineage: &'a [ElementNode],
    selectors: &[SimpleSelector],
) -> Option<&'a ElementNode> {
    lineage
        .iter()
        .find(|node| selectors.iter().any(|s| s.matches(node)))
}
