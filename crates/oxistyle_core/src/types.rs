use std::path::{Path, PathBuf};

use crate::constants::{CSS_EXTENSION, SASS_EXTENSION};

/// Source syntax of a stylesheet, derived from its extension only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Syntax {
    Scss,
    Indented,
    Css,
}

impl Syntax {
    /// Anything that is not `.sass` or `.css` is treated as SCSS.
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            SASS_EXTENSION => Syntax::Indented,
            CSS_EXTENSION => Syntax::Css,
            _ => Syntax::Scss,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Syntax::from_extension)
            .unwrap_or(Syntax::Scss)
    }
}

/// A diagnostic reported by the compiler during a successful compile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    Message(String),
    Located(LocatedWarning),
}

impl Warning {
    pub fn text(&self) -> &str {
        match self {
            Warning::Message(text) => text,
            Warning::Located(located) => &located.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedWarning {
    pub text: String,
    pub file: PathBuf,
    /// 1-based
    pub line: usize,
    /// 0-based
    pub column: usize,
    /// The source line the warning points at
    pub line_text: String,
    pub detail: WarningDetail,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarningDetail {
    pub deprecation: bool,
    /// Import chain as formatted by the compiler
    pub stack: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_from_path() {
        assert_eq!(Syntax::from_path(Path::new("/a/b.scss")), Syntax::Scss);
        assert_eq!(Syntax::from_path(Path::new("/a/_b.sass")), Syntax::Indented);
        assert_eq!(Syntax::from_path(Path::new("/a/b.css")), Syntax::Css);
        assert_eq!(Syntax::from_path(Path::new("/a/b")), Syntax::Scss);
    }
}
