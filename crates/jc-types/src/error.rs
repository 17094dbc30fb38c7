use crate::{SourceFile, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage that produced an error, determined by error code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    Semantic,
    Schema,
}

/// Numeric error code (E100–E499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Lexical errors (E100–E199) ──
    pub const UNEXPECTED_CHARACTER: Self = Self(100);
    pub const UNTERMINATED_STRING: Self = Self(101);
    pub const INVALID_ESCAPE: Self = Self(102);
    pub const INVALID_NUMBER: Self = Self(103);

    // ── Syntax errors (E200–E299) ──
    pub const UNEXPECTED_TOKEN: Self = Self(200);
    pub const MIXED_OPERATORS: Self = Self(201);

    // ── Semantic errors (E300–E399) ──
    pub const NAME_NOT_EXPORTED: Self = Self(300);
    pub const NAME_COLLISION: Self = Self(301);
    pub const MODULE_NOT_FOUND: Self = Self(302);
    pub const CIRCULAR_IMPORT: Self = Self(303);

    // ── Schema errors (E400–E499) ──
    pub const DUPLICATE_NAME: Self = Self(400);
    pub const UNRESOLVED_REFERENCE: Self = Self(401);
    pub const DUPLICATE_EXPORT: Self = Self(402);
    pub const DUPLICATE_FIELD: Self = Self(403);
    pub const UNKNOWN_EXPORT: Self = Self(404);
    pub const LINK_NOT_EXPORTED: Self = Self(405);
    pub const UNKNOWN_MODULE: Self = Self(406);
    pub const UNGUARDED_CYCLE: Self = Self(407);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            100..=199 => ErrorCategory::Lexical,
            200..=299 => ErrorCategory::Syntax,
            300..=399 => ErrorCategory::Semantic,
            _ => ErrorCategory::Schema,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lexical => write!(f, "lexical"),
            Self::Syntax => write!(f, "syntax"),
            Self::Semantic => write!(f, "semantic"),
            Self::Schema => write!(f, "schema"),
        }
    }
}

/// A structured compiler error.
///
/// Every compiler stage stops at its first error and returns it; there is
/// no recovery or aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompileError {
    /// Id of the module the error was found in.
    pub module_id: String,
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    pub message: String,
    /// Source location. Schema errors found on the IR carry none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// The exact source line for context.
    pub source_line: String,
    /// Second location involved in the error (e.g. the earlier declaration
    /// in a name collision).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<Span>,
    /// Source text of the offending AST fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl CompileError {
    /// Create a located error, pulling the source line from `source`.
    pub fn new(
        source: &SourceFile,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            module_id: source.name.clone(),
            code,
            category: code.category(),
            message: message.into(),
            span: Some(span),
            source_line: source.line(span.line).unwrap_or("").to_string(),
            related: None,
            fragment: None,
        }
    }

    /// Create an error with no source location (schema checks, unreadable
    /// entry modules).
    pub fn unlocated(module_id: impl Into<String>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            module_id: module_id.into(),
            code,
            category: code.category(),
            message: message.into(),
            span: None,
            source_line: String::new(),
            related: None,
            fragment: None,
        }
    }

    /// Attach the second location involved in the error.
    pub fn with_related(mut self, span: Span) -> Self {
        self.related = Some(span);
        self
    }

    /// Attach the offending source fragment.
    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.span {
            Some(span) => write!(
                f,
                "{}:{}: {} [{}] {}",
                self.module_id, span, self.code, self.category, self.message
            )?,
            None => write!(
                f,
                "{}: {} [{}] {}",
                self.module_id, self.code, self.category, self.message
            )?,
        }
        if let Some(related) = self.related {
            write!(f, " (see {related})")?;
        }
        Ok(())
    }
}

impl std::error::Error for CompileError {}
