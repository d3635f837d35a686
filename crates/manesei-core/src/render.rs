//! HTML fragments for the viewer pages
//!
//! Everything here returns a [`Viewer`]: the page title plus the markup
//! that goes inside the page shell. The shell itself belongs to the server.
//!
//! Titles and slugs are escaped by maud. Note bodies go through
//! [`parse_document`] and are inserted as-is.

use maud::{html, Markup, PreEscaped};

use crate::document::{Document, DocumentMap, ROOT_TITLE};
use crate::header::parse_note;
use crate::markup::parse_document;

/// Prefix of every page title
pub const TITLE_PREFIX: &str = "Manesei: ";

/// A rendered page body and its title
#[derive(Debug, Clone)]
pub struct Viewer {
    /// Document title, without the site prefix
    pub title: String,
    /// False when the requested document is unknown
    pub exists: bool,
    pub content: Markup,
}

impl Viewer {
    /// The full `<title>` of the page
    pub fn page_title(&self) -> String {
        format!("{}{}", TITLE_PREFIX, self.title)
    }
}

/// URL of the viewer for `slug`
///
/// Each path segment is percent-encoded; the `/` separators are kept.
pub fn note_href(slug: &str) -> String {
    let encoded: Vec<String> = slug
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/n/{}", encoded.join("/"))
}

/// Render the viewer for `slug`
///
/// Unknown slugs still get the breadcrumb bar and a "does not exist" body.
pub fn render_viewer(documents: &DocumentMap, slug: &str) -> Viewer {
    let path = documents.location(slug);

    let Some(doc) = documents.get(slug) else {
        return Viewer {
            title: slug.to_string(),
            exists: false,
            content: html! {
                (breadcrumbs(documents, &path))
                (actions(slug, ""))
                main { h2 { "This document does not exist." } }
            },
        };
    };

    let (leaves, branches): (Vec<&Document>, Vec<&Document>) = children_of(documents, doc)
        .into_iter()
        .partition(|child| child.children.is_empty());

    let content = html! {
        (breadcrumbs(documents, &path))
        (actions(&doc.slug, &doc.id))
        main { (PreEscaped(parse_document(&doc.content))) }
        ul.links {
            @for leaf in &leaves {
                li { a.file href=(note_href(&leaf.slug)) { (leaf.display_title()) } }
            }
        }
        @for branch in &branches {
            a.file href=(note_href(&branch.slug)) { (branch.display_title()) }
            ul.links {
                @for grandchild in children_of(documents, branch) {
                    li { a.file href=(note_href(&grandchild.slug)) { (grandchild.display_title()) } }
                }
            }
        }
        @if doc.is_duplicate {
            p.duplicate {
                "Another note already uses the slug "
                a href=(note_href(&doc.duplicate_of)) { (doc.duplicate_of) }
                ", so this one lives at " code { (doc.slug) } "."
            }
        }
        @if !doc.id.is_empty() {
            footer.id { (doc.id) }
        }
    };

    Viewer {
        title: doc.title.clone(),
        exists: true,
        content,
    }
}

/// Render a historic generation of the note stored under `id`
///
/// The breadcrumb follows the note's place in the current map, falling back
/// to the slug recorded in the historic file.
pub fn render_revision(documents: &DocumentMap, id: &str, generation: u64, raw: &str) -> Viewer {
    let note = parse_note(id, raw);
    let slug = documents
        .find_by_id(id)
        .map_or_else(|| note.slug.clone(), |doc| doc.slug.clone());
    let path = documents.location(&slug);
    let title = if note.title.is_empty() {
        note.slug.clone()
    } else {
        note.title.clone()
    };

    let content = html! {
        (breadcrumbs(documents, &path))
        p.revision {
            "Revision " (generation) " of this note. "
            a href=(format!("/edit/{}?v={}", id, generation)) { "Restore" }
            " "
            a href=(format!("/history/{}", id)) { "All revisions" }
        }
        main { (PreEscaped(parse_document(&note.content))) }
        footer.id { (id) }
    };

    Viewer {
        title: format!("{} (revision {})", title, generation),
        exists: true,
        content,
    }
}

/// Render the list of historic generations of a note, newest first
pub fn render_history(documents: &DocumentMap, id: &str, generations: &[u64]) -> Viewer {
    let current = documents.find_by_id(id);
    let path = current.map(|doc| documents.location(&doc.slug)).unwrap_or_default();
    let title = current.map_or_else(|| id.to_string(), Document::display_title);

    let content = html! {
        (breadcrumbs(documents, &path))
        main {
            h2 { "History of " (title) }
            @if generations.is_empty() {
                p { "There are no earlier revisions." }
            } @else {
                ul.links {
                    @for generation in generations.iter().rev() {
                        li {
                            a.file href=(format!("/history/{}/{}", id, generation)) {
                                "Revision " (generation)
                            }
                        }
                    }
                }
            }
        }
        footer.id { (id) }
    };

    Viewer {
        title: format!("{} (history)", title),
        exists: current.is_some(),
        content,
    }
}

fn children_of<'a>(documents: &'a DocumentMap, doc: &Document) -> Vec<&'a Document> {
    doc.children
        .iter()
        .filter_map(|slug| documents.get(slug))
        .collect()
}

fn breadcrumbs(documents: &DocumentMap, path: &[String]) -> Markup {
    html! {
        div.path {
            a.root href="/n/" { (ROOT_TITLE) }
            @for slug in path {
                " / "
                a href=(note_href(slug)) {
                    (documents.get(slug).map_or_else(|| slug.clone(), Document::display_title))
                }
            }
        }
    }
}

fn actions(slug: &str, id: &str) -> Markup {
    html! {
        nav.actions {
            @if !id.is_empty() {
                a href=(format!("/edit/{}", id)) { "Edit" }
                " "
                a href=(format!("/history/{}", id)) { "History" }
                " "
            }
            a href=(format!("/new/{}", slug)) { "New child" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{resolve, DocFile};
    use pretty_assertions::assert_eq;

    fn sample() -> DocumentMap {
        resolve(&[
            DocFile::new("a", ":root Root\n\nHi"),
            DocFile::new("b", "root:child Child\n\nHello"),
            DocFile::new("c", "root:branch Branch\n\n"),
            DocFile::new("d", "branch:leaf Leaf\n\n"),
            DocFile::new("e", ":empty Empty\n\n"),
        ])
    }

    #[test]
    fn test_breadcrumb_bar() {
        let viewer = render_viewer(&sample(), "child");
        assert_eq!(viewer.title, "Child");
        assert_eq!(viewer.page_title(), "Manesei: Child");

        let html = viewer.content.into_string();
        assert!(html.starts_with(
            "<div class=\"path\"><a class=\"root\" href=\"/n/\">🌱</a> / \
             <a href=\"/n/root\">Root</a> / <a href=\"/n/child\">Child</a></div>"
        ));
    }

    #[test]
    fn test_body_is_rendered_markup() {
        let html = render_viewer(&sample(), "root").content.into_string();
        assert!(html.contains("<main>Hi</main>"));
    }

    #[test]
    fn test_empty_body() {
        let html = render_viewer(&sample(), "empty").content.into_string();
        assert!(html.contains("<main></main>"));
    }

    #[test]
    fn test_leaf_and_branch_children() {
        let html = render_viewer(&sample(), "root").content.into_string();

        assert!(html.contains(
            "<ul class=\"links\"><li><a class=\"file\" href=\"/n/child\">Child</a></li></ul>"
        ));
        assert!(html.contains(
            "<a class=\"file\" href=\"/n/branch\">Branch</a><ul class=\"links\">\
             <li><a class=\"file\" href=\"/n/leaf\">Leaf</a></li></ul>"
        ));
    }

    #[test]
    fn test_missing_document() {
        let viewer = render_viewer(&sample(), "nowhere");
        let html = viewer.content.into_string();

        assert!(!viewer.exists);
        assert!(html.contains("<a href=\"/n/nowhere\">nowhere</a>"));
        assert!(html.contains("<main><h2>This document does not exist.</h2></main>"));
    }

    #[test]
    fn test_id_footer() {
        let map = sample();

        let html = render_viewer(&map, "root").content.into_string();
        assert!(html.contains("<footer class=\"id\">a</footer>"));
        assert!(html.contains("href=\"/edit/a\""));

        let html = render_viewer(&map, "").content.into_string();
        assert!(!html.contains("<footer"));
        assert!(!html.contains("/edit/"));
        assert!(html.contains("<main><h1>Manesei</h1></main>"));
    }

    #[test]
    fn test_duplicate_hint() {
        let map = resolve(&[
            DocFile::new("1", ":foo Foo\n\n"),
            DocFile::new("2", ":foo Foo\n\n"),
        ]);

        let html = render_viewer(&map, "foo-duplicate").content.into_string();
        assert!(html.contains("<p class=\"duplicate\">"));
        assert!(html.contains("<a href=\"/n/foo\">foo</a>"));

        let html = render_viewer(&map, "foo").content.into_string();
        assert!(!html.contains("duplicate"));
    }

    #[test]
    fn test_note_href_encodes_segments() {
        assert_eq!(note_href(""), "/n/");
        assert_eq!(note_href("child"), "/n/child");
        assert_eq!(note_href("a b/ü"), "/n/a%20b/%C3%BC");
        assert_eq!(note_href("q?#%"), "/n/q%3F%23%25");
    }

    #[test]
    fn test_child_links_are_encoded() {
        let map = resolve(&[
            DocFile::new("a", ":root Root\n\n"),
            DocFile::new("b", "root:what? What\n\n"),
        ]);
        let html = render_viewer(&map, "what?").content.into_string();
        assert!(html.contains("<a href=\"/n/what%3F\">What</a>"));

        let html = render_viewer(&map, "root").content.into_string();
        assert!(html.contains("href=\"/n/what%3F\""));
    }

    #[test]
    fn test_titles_are_escaped() {
        let map = resolve(&[DocFile::new("x", ":tricky <b>&</b>\n\n")]);
        let html = render_viewer(&map, "tricky").content.into_string();

        assert!(html.contains("&lt;b&gt;&amp;&lt;/b&gt;"));
    }

    #[test]
    fn test_revision() {
        let viewer = render_revision(&sample(), "b", 2, "root:child Old child\n\n# Before");
        let html = viewer.content.into_string();

        assert_eq!(viewer.title, "Old child (revision 2)");
        assert!(html.contains("<a href=\"/n/child\">Child</a>"));
        assert!(html.contains("<main><h1>Before</h1></main>"));
        assert!(html.contains("href=\"/edit/b?v=2\""));
    }

    #[test]
    fn test_history_list() {
        let viewer = render_history(&sample(), "b", &[1, 2]);
        let html = viewer.content.into_string();

        assert!(viewer.exists);
        let newest = html.find("/history/b/2").unwrap();
        let oldest = html.find("/history/b/1").unwrap();
        assert!(newest < oldest);

        let html = render_history(&sample(), "b", &[]).content.into_string();
        assert!(html.contains("There are no earlier revisions."));
    }
}
