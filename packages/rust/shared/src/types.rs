//! Core domain types for bookmark documents.

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

// ---------------------------------------------------------------------------
// BookmarkDocument
// ---------------------------------------------------------------------------

/// The whole bookmark list: an ordered sequence of categories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkDocument(pub Vec<Category>);

impl BookmarkDocument {
    /// Number of items across every category.
    pub fn total_items(&self) -> usize {
        self.0.iter().map(|c| c.items.len()).sum()
    }

    /// Find the item a revise entry points at.
    ///
    /// Only the first category named `category` is searched, and within it
    /// the first item named `name` wins.
    pub fn find_item_mut(&mut self, category: &str, name: &str) -> Option<&mut Item> {
        self.0
            .iter_mut()
            .find(|c| c.category == category)?
            .items
            .iter_mut()
            .find(|i| i.name == name)
    }

    /// Shared-reference counterpart of [`BookmarkDocument::find_item_mut`].
    pub fn find_item(&self, category: &str, name: &str) -> Option<&Item> {
        self.0
            .iter()
            .find(|c| c.category == category)?
            .items
            .iter()
            .find(|i| i.name == name)
    }
}

// ---------------------------------------------------------------------------
// Category / Item
// ---------------------------------------------------------------------------

/// A named group of bookmarks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Display name of the group.
    pub category: String,
    /// Bookmarks in input order.
    #[serde(default)]
    pub items: Vec<Item>,
    /// Any other keys from the input, carried through unchanged.
    #[serde(flatten, default, skip_serializing_if = "Mapping::is_empty")]
    pub extra: Mapping,
}

impl Category {
    pub fn new(category: impl Into<String>, items: Vec<Item>) -> Self {
        Self {
            category: category.into(),
            items,
            extra: Mapping::new(),
        }
    }
}

/// One bookmark.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub link: String,
    /// Favicon URL derived from the link host.
    #[serde(default)]
    pub image: String,
    /// Site description; empty until enriched or revised.
    #[serde(default)]
    pub description: String,
    /// Any other keys from the input, carried through unchanged.
    #[serde(flatten, default, skip_serializing_if = "Mapping::is_empty")]
    pub extra: Mapping,
}

impl Item {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// ReviseEntry
// ---------------------------------------------------------------------------

/// An item whose description must be supplied by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviseEntry {
    pub name: String,
    pub link: String,
    /// Name of the owning category.
    pub category: String,
}

impl ReviseEntry {
    pub fn for_item(item: &Item, category: &str) -> Self {
        Self {
            name: item.name.clone(),
            link: item.link.clone(),
            category: category.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BookmarkDocument {
        BookmarkDocument(vec![
            Category::new(
                "Tools",
                vec![
                    Item::new("GitHub", "https://github.com"),
                    Item::new("GitHub", "https://github.com/explore"),
                ],
            ),
            Category::new("Docs", vec![Item::new("Rust", "https://doc.rust-lang.org")]),
            Category::new("Tools", vec![Item::new("Crates", "https://crates.io")]),
        ])
    }

    #[test]
    fn input_shape_deserializes_with_empty_metadata() {
        let yaml = r#"
- category: Tools
  items:
    - name: GitHub
      link: https://github.com
- category: Empty
"#;
        let doc: BookmarkDocument = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(doc.0.len(), 2);
        assert_eq!(doc.total_items(), 1);
        assert_eq!(doc.0[0].items[0].image, "");
        assert_eq!(doc.0[0].items[0].description, "");
        assert!(doc.0[1].items.is_empty());
    }

    #[test]
    fn unknown_keys_are_kept() {
        let yaml = r#"
- category: Tools
  icon: wrench
  items:
    - name: GitHub
      link: https://github.com
      tags: [code, git]
      pinned: true
"#;
        let doc: BookmarkDocument = serde_yaml::from_str(yaml).expect("parse");
        let category = &doc.0[0];
        assert_eq!(category.extra.get("icon").and_then(|v| v.as_str()), Some("wrench"));
        assert!(!category.extra.contains_key("items"));

        let item = &category.items[0];
        assert_eq!(item.name, "GitHub");
        assert_eq!(item.extra.len(), 2);
        assert_eq!(item.extra.get("pinned").and_then(|v| v.as_bool()), Some(true));
        assert!(item.extra.get("tags").is_some_and(|v| v.is_sequence()));
    }

    #[test]
    fn find_item_returns_first_match() {
        let mut doc = sample();
        let item = doc.find_item_mut("Tools", "GitHub").expect("match");
        assert_eq!(item.link, "https://github.com");
    }

    #[test]
    fn find_item_only_searches_first_category_with_name() {
        let mut doc = sample();
        // "Crates" lives in the second "Tools" category, which is never scanned.
        assert!(doc.find_item_mut("Tools", "Crates").is_none());
        assert!(doc.find_item_mut("Missing", "Rust").is_none());
        assert!(doc.find_item("Docs", "Rust").is_some());
    }

    #[test]
    fn revise_entry_for_item() {
        let item = Item::new("Rust", "https://rust-lang.org");
        let entry = ReviseEntry::for_item(&item, "Docs");
        assert_eq!(entry.name, "Rust");
        assert_eq!(entry.link, "https://rust-lang.org");
        assert_eq!(entry.category, "Docs");
    }
}
