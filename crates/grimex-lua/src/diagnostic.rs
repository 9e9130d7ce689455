use std::fmt;

/// 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A problem found while scanning a script.
///
/// Carries no file identity; callers attach one when merging results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Position in the outermost script, if the problem has one.
    pub position: Option<Position>,
    pub message: String,
    /// Source text of the offending node.
    pub snippet: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            position: None,
            message: message.into(),
            snippet: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(snippet) = &self.snippet {
            for line in snippet.lines() {
                write!(f, "\n        {line}")?;
            }
        }
        Ok(())
    }
}

/// Where a script's text starts inside the outermost file.
///
/// Embedded scripts are string literals of their parent, so positions reported
/// inside them are shifted by the literal's own (already shifted) position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Origin(Option<Position>);

impl Origin {
    pub fn root() -> Self {
        Self(None)
    }

    pub fn embedded_at(literal: Position) -> Self {
        Self(Some(literal))
    }

    pub fn locate(&self, local: Position) -> Position {
        match self.0 {
            None => local,
            Some(origin) if local.line <= 1 => {
                Position::new(origin.line, origin.column + local.column)
            }
            Some(origin) => Position::new(origin.line + local.line - 1, local.column),
        }
    }
}
