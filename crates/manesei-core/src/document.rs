//! Documents and the document map
//!
//! A [`Document`] is one node of the note forest. The [`DocumentMap`] holds
//! every document of one resolver pass keyed by slug, with the synthetic
//! root stored under the empty slug.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::header::ParsedNote;

/// Slug of the root document
pub const ROOT_SLUG: &str = "";

/// Title shown for the root document
pub const ROOT_TITLE: &str = "🌱";

/// Body of the root document
pub const ROOT_CONTENT: &str = "# Manesei";

/// A node in the note forest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Document {
    /// Store identifier; empty for the root and for placeholders
    pub id: String,
    /// Slug of the parent document
    pub host: String,
    /// Unique key within the map
    pub slug: String,
    /// Display title
    pub title: String,
    /// `KEY: VALUE` headers
    pub headers: BTreeMap<String, String>,
    /// Markup body
    pub content: String,
    /// Child slugs, sorted after linking
    pub children: Vec<String>,
    /// Another note already claimed this slug
    pub is_duplicate: bool,
    /// The slug originally claimed by a duplicate
    pub duplicate_of: String,
}

impl Document {
    /// The synthetic root document
    pub fn root() -> Self {
        Self {
            title: ROOT_TITLE.to_string(),
            content: ROOT_CONTENT.to_string(),
            ..Self::default()
        }
    }

    /// A stand-in for a host that no note defines
    pub fn placeholder(slug: &str) -> Self {
        let title = title_case(slug);
        Self {
            slug: slug.to_string(),
            content: format!("# {}", title),
            title,
            ..Self::default()
        }
    }

    /// Build a document from a parsed note file
    pub fn from_note(id: &str, note: ParsedNote) -> Self {
        Self {
            id: id.to_string(),
            host: note.host,
            slug: note.slug,
            title: note.title,
            headers: note.headers,
            content: note.content,
            ..Self::default()
        }
    }

    /// Whether this is the root document
    pub fn is_root(&self) -> bool {
        self.slug == ROOT_SLUG
    }

    /// Whether this document was fabricated for a missing host
    pub fn is_placeholder(&self) -> bool {
        self.id.is_empty() && !self.is_root()
    }

    /// Title to show: the title, else the slug, else the title-cased host
    pub fn display_title(&self) -> String {
        if !self.title.is_empty() {
            self.title.clone()
        } else if !self.slug.is_empty() {
            self.slug.clone()
        } else {
            title_case(&self.host)
        }
    }

    /// Add a child slug unless it is already present
    pub fn add_child(&mut self, slug: &str) {
        if !self.children.iter().any(|child| child == slug) {
            self.children.push(slug.to_string());
        }
    }
}

/// Uppercase the first character, keep the rest as is
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// All documents of one resolver pass, keyed by slug
///
/// The root is always present under [`ROOT_SLUG`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMap {
    documents: BTreeMap<String, Document>,
}

impl Default for DocumentMap {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentMap {
    /// A map holding only the root
    pub fn new() -> Self {
        let mut documents = BTreeMap::new();
        documents.insert(ROOT_SLUG.to_string(), Document::root());
        Self { documents }
    }

    /// Look up a document by slug
    pub fn get(&self, slug: &str) -> Option<&Document> {
        self.documents.get(slug)
    }

    /// The root document
    pub fn root(&self) -> &Document {
        &self.documents[ROOT_SLUG]
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.documents.contains_key(slug)
    }

    /// Number of documents, root included
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false: the root is always present
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Iterate documents in slug order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Document)> {
        self.documents.iter()
    }

    /// Find the document stored under a store identifier
    pub fn find_by_id(&self, id: &str) -> Option<&Document> {
        if id.is_empty() {
            return None;
        }
        self.documents.values().find(|doc| doc.id == id)
    }

    /// Slugs from the root's child down to `slug`, root excluded
    ///
    /// A slug missing from the map resolves to just itself. The walk stops
    /// if it ever revisits a slug, so it terminates on any map.
    pub fn location(&self, slug: &str) -> Vec<String> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        let mut current = slug;

        while current != ROOT_SLUG && visited.insert(current) {
            path.push(current.to_string());
            current = self.documents.get(current).map_or(ROOT_SLUG, |doc| doc.host.as_str());
        }

        path.reverse();
        path
    }

    pub(crate) fn insert(&mut self, document: Document) {
        self.documents.insert(document.slug.clone(), document);
    }

    pub(crate) fn get_mut(&mut self, slug: &str) -> Option<&mut Document> {
        self.documents.get_mut(slug)
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Document> {
        self.documents.values_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(host: &str, slug: &str) -> Document {
        Document {
            id: format!("id-{}", slug),
            host: host.to_string(),
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            ..Document::default()
        }
    }

    #[test]
    fn test_new_map_has_root() {
        let map = DocumentMap::new();

        assert_eq!(map.len(), 1);
        assert_eq!(map.root().title, "🌱");
        assert_eq!(map.root().content, "# Manesei");
        assert!(map.root().is_root());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("ghost"), "Ghost");
        assert_eq!(title_case("Ghost"), "Ghost");
        assert_eq!(title_case("élan vital"), "Élan vital");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_placeholder() {
        let placeholder = Document::placeholder("ghost");

        assert_eq!(placeholder.slug, "ghost");
        assert_eq!(placeholder.title, "Ghost");
        assert_eq!(placeholder.content, "# Ghost");
        assert!(placeholder.id.is_empty());
        assert!(placeholder.is_placeholder());
    }

    #[test]
    fn test_display_title_fallbacks() {
        let mut d = doc("parent", "child");
        assert_eq!(d.display_title(), "CHILD");

        d.title.clear();
        assert_eq!(d.display_title(), "child");

        d.slug.clear();
        assert_eq!(d.display_title(), "Parent");
    }

    #[test]
    fn test_add_child_dedupes() {
        let mut d = doc("", "a");
        d.add_child("x");
        d.add_child("x");
        d.add_child("y");
        assert_eq!(d.children, vec!["x", "y"]);
    }

    #[test]
    fn test_location() {
        let mut map = DocumentMap::new();
        map.insert(doc("", "root"));
        map.insert(doc("root", "child"));
        map.insert(doc("child", "grandchild"));

        assert_eq!(map.location("grandchild"), vec!["root", "child", "grandchild"]);
        assert_eq!(map.location("root"), vec!["root"]);
        assert!(map.location("").is_empty());
    }

    #[test]
    fn test_location_of_missing_slug() {
        let map = DocumentMap::new();
        assert_eq!(map.location("nowhere"), vec!["nowhere"]);
    }

    #[test]
    fn test_location_terminates_on_cycle() {
        let mut map = DocumentMap::new();
        map.insert(doc("b", "a"));
        map.insert(doc("a", "b"));

        assert_eq!(map.location("a"), vec!["b", "a"]);
    }

    #[test]
    fn test_find_by_id() {
        let mut map = DocumentMap::new();
        map.insert(doc("", "root"));

        assert_eq!(map.find_by_id("id-root").unwrap().slug, "root");
        assert!(map.find_by_id("").is_none());
        assert!(map.find_by_id("unknown").is_none());
    }
}
