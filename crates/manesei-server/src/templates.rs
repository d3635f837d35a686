//! Page templates
//!
//! Built with maud. The page shell wraps every response body, including the
//! error page.

use axum::http::StatusCode;
use maud::{html, Markup, PreEscaped, DOCTYPE};

use manesei_core::DocumentForm;

const STYLE: &str = r#"
@font-face { font-family: "Manesei"; src: url("/fonts/regular.woff2") format("woff2"); }
body { font-family: "Manesei", sans-serif; max-width: 48rem; margin: 0 auto; padding: 1rem; }
.path { margin-bottom: 1rem; }
.path a, .links a { text-decoration: none; }
.actions { float: right; font-size: 0.9em; }
main { white-space: pre-wrap; }
ul.links { list-style: none; padding-left: 1rem; }
footer.id, .duplicate, .revision { color: #777; font-size: 0.8em; }
form label { display: block; margin-top: 0.5rem; }
form input, form textarea { width: 100%; box-sizing: border-box; }
form textarea[name="Body"] { min-height: 24rem; font-family: monospace; }
"#;

/// Wrap `body` in the HTML page shell
pub fn page(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body { (body) }
        }
    }
}

/// The editor form
///
/// Posts back to the URL it was served from.
pub fn editor(form: &DocumentForm) -> Markup {
    html! {
        form method="post" {
            input type="hidden" name="Id" value=(form.id);
            label { "Host " input type="text" name="Host" value=(form.host); }
            label { "Slug " input type="text" name="Slug" value=(form.slug) required; }
            label { "Title " input type="text" name="Title" value=(form.title); }
            label { "Headers " input type="text" name="Headers" value=(form.headers) placeholder="{\"key\": \"value\"}"; }
            // Browsers drop one newline right after <textarea>
            label { "Body " textarea name="Body" { "\n" (form.body) } }
            button type="submit" { "Save" }
        }
    }
}

/// Body of an error response
pub fn error_page(
    status: StatusCode,
    description: &str,
    hint: Option<&str>,
    correlation: Option<&str>,
) -> Markup {
    let body = html! {
        div.path { a.root href="/n/" { "🌱" } }
        main {
            h2 { (description) }
            @if let Some(hint) = hint {
                p { (hint) }
            }
            @if let Some(id) = correlation {
                p { "Error reference: " code { (id) } }
            }
        }
    };
    page(&format!("Manesei: {}", status), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_shell() {
        let html = page("Manesei: Home", html! { p { "hi" } }).into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Manesei: Home</title>"));
        assert!(html.contains("<body><p>hi</p></body>"));
    }

    #[test]
    fn test_editor_fields() {
        let form = DocumentForm {
            id: "abc".to_string(),
            host: "root".to_string(),
            slug: "child".to_string(),
            title: "A \"quoted\" title".to_string(),
            headers: r#"{"k":"v"}"#.to_string(),
            body: "</textarea><b>".to_string(),
        };
        let html = editor(&form).into_string();

        for name in ["Id", "Host", "Slug", "Title", "Headers", "Body"] {
            assert!(html.contains(&format!("name=\"{}\"", name)), "missing {name}");
        }
        assert!(html.contains("value=\"A &quot;quoted&quot; title\""));
        assert!(html.contains("&lt;/textarea&gt;&lt;b&gt;"));
    }

    #[test]
    fn test_editor_keeps_leading_newline_of_body() {
        let form = DocumentForm {
            body: "\nafter a blank line".to_string(),
            ..DocumentForm::default()
        };
        let html = editor(&form).into_string();

        assert!(html.contains("name=\"Body\">\n\nafter a blank line</textarea>"));
    }

    #[test]
    fn test_error_page_correlation() {
        let html =
            error_page(StatusCode::INTERNAL_SERVER_ERROR, "Unknown error", None, Some("42"))
                .into_string();

        assert!(html.contains("<h2>Unknown error</h2>"));
        assert!(html.contains("<code>42</code>"));

        let html = error_page(StatusCode::NOT_FOUND, "Gone", Some("Try again."), None)
            .into_string();
        assert!(!html.contains("Error reference"));
        assert!(html.contains("<p>Try again.</p>"));
    }
}
