//! Note file header
//!
//! A note file looks like this:
//!
//! ```text
//! HOST:SLUG TITLE
//! KEY1: VALUE1
//! KEY2: VALUE2
//!
//! BODY...
//! ```
//!
//! The first line names the parent (`HOST`), the note's own key (`SLUG`)
//! and its title. The header block ends at the first blank line or the first
//! line without a `:`. Malformed headers never fail; they just end the
//! header block early.

use std::collections::BTreeMap;

/// The pieces of a single note file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedNote {
    /// Slug of the parent note
    pub host: String,
    /// The note's own slug
    pub slug: String,
    /// Display title
    pub title: String,
    /// `KEY: VALUE` headers
    pub headers: BTreeMap<String, String>,
    /// Everything after the header block, verbatim
    pub content: String,
}

/// Parse the raw text of a note stored under `id`
///
/// A missing or empty slug falls back to `id`; a missing title falls back to
/// the slug.
pub fn parse_note(id: &str, raw: &str) -> ParsedNote {
    let mut lines = raw.split('\n');
    let first = lines.next().unwrap_or_default();

    let (head, title) = match first.split_once(' ') {
        Some((head, title)) => (head, Some(title)),
        None => (first, None),
    };
    let (host, slug) = head.split_once(':').unwrap_or((head, ""));
    let slug = if slug.is_empty() { id } else { slug };
    let title = title.unwrap_or(slug);

    let rest: Vec<&str> = lines.collect();
    let mut headers = BTreeMap::new();
    let mut body_start = rest.len();

    for (index, line) in rest.iter().enumerate() {
        if line.trim().is_empty() {
            // The blank separator belongs to the header block
            body_start = index + 1;
            break;
        }
        match line.split_once(':') {
            Some((key, value)) => {
                headers.insert(key.trim().to_string(), value.trim().to_string());
            }
            None => {
                body_start = index;
                break;
            }
        }
    }

    ParsedNote {
        host: host.to_string(),
        slug: slug.to_string(),
        title: title.to_string(),
        headers,
        content: rest[body_start..].join("\n"),
    }
}

/// Serialize a note into the on-disk file format
///
/// Headers are written in key order, followed by the blank separator line.
pub fn serialize_note(
    host: &str,
    slug: &str,
    title: &str,
    headers: &BTreeMap<String, String>,
    body: &str,
) -> String {
    let mut file = format!("{}:{} {}\n", host, slug, title);
    for (key, value) in headers {
        file.push_str(key);
        file.push_str(": ");
        file.push_str(value);
        file.push('\n');
    }
    file.push('\n');
    file.push_str(body);
    file
}

impl ParsedNote {
    /// Serialize back into the on-disk file format
    pub fn to_file(&self) -> String {
        serialize_note(
            &self.host,
            &self.slug,
            &self.title,
            &self.headers,
            &self.content,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_first_line() {
        let note = parse_note("id-1", "root:child Child Title\n\nHello");

        assert_eq!(note.host, "root");
        assert_eq!(note.slug, "child");
        assert_eq!(note.title, "Child Title");
        assert_eq!(note.content, "Hello");
        assert!(note.headers.is_empty());
    }

    #[test]
    fn test_missing_title_uses_slug() {
        let note = parse_note("id-1", "root:child\n\nHello");
        assert_eq!(note.title, "child");
    }

    #[test]
    fn test_empty_title_is_kept() {
        let note = parse_note("id-1", "root:child \n\nHello");
        assert_eq!(note.title, "");
    }

    #[test]
    fn test_title_whitespace_preserved() {
        let note = parse_note("id-1", ":x  padded title \n\n");
        assert_eq!(note.title, " padded title ");
    }

    #[test]
    fn test_missing_colon_uses_id_as_slug() {
        let note = parse_note("3f2a", "lonely Some Title\n\nBody");

        assert_eq!(note.host, "lonely");
        assert_eq!(note.slug, "3f2a");
        assert_eq!(note.title, "Some Title");
    }

    #[test]
    fn test_empty_file() {
        let note = parse_note("3f2a", "");

        assert_eq!(note.host, "");
        assert_eq!(note.slug, "3f2a");
        assert_eq!(note.title, "3f2a");
        assert_eq!(note.content, "");
    }

    #[test]
    fn test_headers_trimmed_and_last_wins() {
        let note = parse_note(
            "id",
            ":x X\n  tags :  a, b  \nstatus: draft\nstatus: done\n\nBody: not a header",
        );

        assert_eq!(note.headers.len(), 2);
        assert_eq!(note.headers["tags"], "a, b");
        assert_eq!(note.headers["status"], "done");
        assert_eq!(note.content, "Body: not a header");
    }

    #[test]
    fn test_header_value_keeps_later_colons() {
        let note = parse_note("id", ":x X\nsource: https://example.com\n\n");
        assert_eq!(note.headers["source"], "https://example.com");
    }

    #[test]
    fn test_line_without_colon_ends_headers_and_starts_body() {
        let note = parse_note("id", ":x X\nkey: value\nplain text\nmore");

        assert_eq!(note.headers.len(), 1);
        assert_eq!(note.content, "plain text\nmore");
    }

    #[test]
    fn test_whitespace_only_line_ends_headers() {
        let note = parse_note("id", ":x X\nkey: value\n  \t\nnext: line");

        assert_eq!(note.headers.len(), 1);
        assert_eq!(note.content, "next: line");
    }

    #[test]
    fn test_body_leading_blank_lines_preserved() {
        let note = parse_note("id", ":x X\n\n\n\nBody\n");
        assert_eq!(note.content, "\n\nBody\n");
    }

    #[test]
    fn test_header_block_until_eof() {
        let note = parse_note("id", ":x X\na: 1\nb: 2");

        assert_eq!(note.headers.len(), 2);
        assert_eq!(note.content, "");
    }

    #[test]
    fn test_serialize_then_parse() {
        let mut headers = BTreeMap::new();
        headers.insert("b".to_string(), "2".to_string());
        headers.insert("a".to_string(), "1".to_string());

        let file = serialize_note("host", "slug", "A Title", &headers, "\n# Body\ntext");
        assert_eq!(file, "host:slug A Title\na: 1\nb: 2\n\n\n# Body\ntext");

        let parsed = parse_note("id", &file);
        assert_eq!(parsed.host, "host");
        assert_eq!(parsed.slug, "slug");
        assert_eq!(parsed.title, "A Title");
        assert_eq!(parsed.headers, headers);
        assert_eq!(parsed.content, "\n# Body\ntext");
        assert_eq!(parsed.to_file(), file);
    }
}
