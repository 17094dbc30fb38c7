//! Document and statement parsing.
//!
//! Handles the five top-level statements (`type`, `derive`, `call`,
//! `import`, `export`) and the comment blocks that describe them.

use jc_lexer::TokenKind;
use jc_types::ast::*;
use jc_types::{Result, Span};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a whole document.
    ///
    /// ```ebnf
    /// Document  = { Statement } EOF ;
    /// Statement = { COMMENT } ( TypeDecl | DeriveDecl | CallDecl
    ///                         | ImportStmt | ExportStmt ) ;
    /// ```
    pub fn parse_document(&mut self) -> Result<Document> {
        let mut statements = Vec::new();
        loop {
            let description = self.take_description()?;
            let token = self.peek()?;
            let statement = match token.kind {
                TokenKind::Eof => break,
                TokenKind::Type => Statement::Type(self.parse_type_decl(description)?),
                TokenKind::Derive => Statement::Derive(self.parse_derive_decl(description)?),
                TokenKind::Call => Statement::Call(self.parse_call_decl(description)?),
                TokenKind::Import => Statement::Import(self.parse_import(description)?),
                TokenKind::Export => Statement::Export(self.parse_export(description)?),
                _ => {
                    return Err(self.unexpected(
                        &token,
                        "'type', 'derive', 'call', 'import' or 'export'",
                    ))
                }
            };
            statements.push(statement);
        }

        let end = self.source_file().source.len();
        let span = Span::new(0, end, 1, 1);
        Ok(Document { statements, span })
    }

    // ── Declarations ──────────────────────────────────────────────────────────

    /// `TypeDecl = "type" NAME "=" Type ;`
    fn parse_type_decl(&mut self, description: Option<String>) -> Result<TypeDecl> {
        let start = self.expect(&TokenKind::Type)?.span;
        let name = self.expect_name()?;
        self.expect(&TokenKind::Eq)?;
        let ty = self.parse_type()?;
        Ok(TypeDecl {
            name,
            ty,
            description,
            span: start.merge(self.previous_span()),
        })
    }

    /// `DeriveDecl = "derive" NAME "from" Type ;`
    fn parse_derive_decl(&mut self, description: Option<String>) -> Result<DeriveDecl> {
        let start = self.expect(&TokenKind::Derive)?.span;
        let name = self.expect_name()?;
        self.expect(&TokenKind::From)?;
        let from = self.parse_type()?;
        Ok(DeriveDecl {
            name,
            from,
            description,
            span: start.merge(self.previous_span()),
        })
    }

    /// `CallDecl = "call" NAME ":" Type "=>" Type ;`
    fn parse_call_decl(&mut self, description: Option<String>) -> Result<CallDecl> {
        let start = self.expect(&TokenKind::Call)?.span;
        let name = self.expect_name()?;
        self.expect(&TokenKind::Colon)?;
        let input = self.parse_type()?;
        self.expect(&TokenKind::FatArrow)?;
        let output = self.parse_type()?;
        Ok(CallDecl {
            name,
            input,
            output,
            description,
            span: start.merge(self.previous_span()),
        })
    }

    // ── Module Statements ─────────────────────────────────────────────────────

    /// `ImportStmt = "import" "{" { NAME [ "as" NAME ] [ "," ] } "}" "from" STRING ;`
    fn parse_import(&mut self, description: Option<String>) -> Result<ImportStmt> {
        let start = self.expect(&TokenKind::Import)?.span;
        self.expect(&TokenKind::LBrace)?;

        let mut items = Vec::new();
        while !self.eat(&TokenKind::RBrace)? {
            let name = self.expect_name()?;
            let alias = if self.eat(&TokenKind::As)? {
                Some(self.expect_name()?)
            } else {
                None
            };
            let span = name.span.merge(self.previous_span());
            items.push(ImportItem { name, alias, span });
            self.eat_comma()?;
        }

        self.expect(&TokenKind::From)?;
        let (specifier, specifier_span) = self.expect_string()?;
        Ok(ImportStmt {
            items,
            specifier,
            specifier_span,
            description,
            span: start.merge(specifier_span),
        })
    }

    /// `ExportStmt = "export" "{" { NAME [ "," ] } "}" ;`
    fn parse_export(&mut self, description: Option<String>) -> Result<ExportStmt> {
        let start = self.expect(&TokenKind::Export)?.span;
        self.expect(&TokenKind::LBrace)?;

        let mut names = Vec::new();
        while !self.eat(&TokenKind::RBrace)? {
            names.push(self.expect_name()?);
            self.eat_comma()?;
        }

        Ok(ExportStmt {
            names,
            description,
            span: start.merge(self.previous_span()),
        })
    }
}
