//! Lightweight scanner for stylesheet import directives.
//!
//! This is not a full parser: it strips comments, splits the source into
//! statements and reads the quoted specifiers of `@import`, `@use` and
//! `@forward`. Imports that the compiler would leave in the CSS output
//! (remote URLs, `url(...)`, `.css` files pulled in with `@import`) and
//! built-in `sass:` modules are skipped.

use oxistyle_core::Syntax;

const DIRECTIVES: &[&str] = &["@import", "@use", "@forward"];

/// Removes `/* */` and `//` comments, leaving string literals intact.
fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();
    let mut quote: Option<char> = None;

    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else if c == q || c == '\n' {
                quote = None;
            }
            continue;
        }

        match (c, chars.peek().copied()) {
            ('"' | '\'', _) => {
                quote = Some(c);
                out.push(c);
            }
            ('/', Some('/')) => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            ('/', Some('*')) => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        out.push('\n');
                    }
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// The contents of a string literal at the start of `text`.
fn leading_quoted(text: &str) -> Option<&str> {
    let quote = text.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let rest = &text[1..];
    rest.find(quote).map(|end| &rest[..end])
}

/// Splits on commas outside string literals and parentheses.
fn split_arguments(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut quote: Option<char> = None;
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn is_remote(specifier: &str) -> bool {
    specifier.starts_with("http://")
        || specifier.starts_with("https://")
        || specifier.starts_with("//")
}

/// Import specifiers in `source`, in source order.
pub fn scan_imports(source: &str, syntax: Syntax) -> Vec<String> {
    let source = strip_comments(source);
    let separators: &[char] = match syntax {
        Syntax::Indented => &[';', '\n'],
        Syntax::Scss | Syntax::Css => &[';'],
    };

    let mut specs = Vec::new();
    for statement in source.split(separators) {
        // A directive can follow a block opening or closing brace
        let statement = statement.rsplit(['{', '}']).next().unwrap_or(statement).trim();

        let Some((directive, rest)) = DIRECTIVES
            .iter()
            .find_map(|d| statement.strip_prefix(d).map(|rest| (*d, rest)))
        else {
            continue;
        };
        if !rest.starts_with(|c: char| c.is_whitespace() || c == '"' || c == '\'') {
            continue;
        }

        let arguments = if directive == "@import" { split_arguments(rest) } else { vec![rest] };
        for argument in arguments {
            let Some(specifier) = leading_quoted(argument.trim()) else {
                continue;
            };
            if is_remote(specifier) || specifier.starts_with("sass:") {
                continue;
            }
            if directive == "@import" && specifier.ends_with(".css") {
                continue;
            }
            specs.push(specifier.to_string());
        }
    }
    specs
}
