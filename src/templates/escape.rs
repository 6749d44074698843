//! Escaping for interpolated template values.

use minijinja::{AutoEscape, Error, Output, State, Value};

/// Escape mode for the markdown templates.
pub(crate) const MARKDOWN: &str = "markdown";

/// Escape HTML special characters.
///
/// Slashes are left alone so URL-shaped values (`host/repo`) come out
/// byte-identical to their input.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        push_html(&mut result, c);
    }
    result
}

/// Escape a value for use inside markdown source.
///
/// HTML specials become entities, which the markdown parser decodes back to
/// text. Punctuation that could open a link, image, emphasis, code span or
/// table cell is backslash-escaped. Characters common in module paths
/// (`/ . : -`) pass through.
#[must_use]
pub fn escape_markdown(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '(' | ')' | '{' | '}' | '|' | '!' | '#'
            | '+' | '~' => {
                result.push('\\');
                result.push(c);
            }
            _ => push_html(&mut result, c),
        }
    }
    result
}

fn push_html(out: &mut String, c: char) {
    match c {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#x27;"),
        _ => out.push(c),
    }
}

/// Formatter installed on every template environment.
///
/// Values not marked safe are escaped for the template's mode: HTML for
/// `.html` templates, markdown for `.md` ones.
pub(crate) fn formatter(out: &mut Output<'_>, state: &State<'_, '_>, value: &Value) -> Result<(), Error> {
    match state.auto_escape() {
        AutoEscape::Html if !value.is_safe() => {
            if let Some(s) = value.as_str() {
                out.write_str(&escape_html(s))?;
                return Ok(());
            }
        }
        AutoEscape::Custom(MARKDOWN) => {
            if value.is_undefined() || value.is_none() {
                return Ok(());
            }
            let text = value.to_string();
            if value.is_safe() {
                out.write_str(&text)?;
            } else {
                out.write_str(&escape_markdown(&text))?;
            }
            return Ok(());
        }
        _ => {}
    }
    minijinja::escape_formatter(out, state, value)
}

/// Pick the escape mode from the template name.
pub(crate) fn auto_escape(name: &str) -> AutoEscape {
    if name.ends_with(".md") {
        AutoEscape::Custom(MARKDOWN)
    } else {
        AutoEscape::Html
    }
}
