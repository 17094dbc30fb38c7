//! Type expression parsing.

use jc_lexer::TokenKind;
use jc_types::ast::*;
use jc_types::{ErrorCode, Result};

use crate::parser::Parser;

impl<'src> Parser<'src> {
    /// Parse a full type expression.
    ///
    /// ```ebnf
    /// Type      = Simple { "|" Simple } | Simple { "&" Simple } ;
    /// ```
    ///
    /// Chains are kept flat, including a parenthesized chain of the same
    /// operator: `a | (b | c)` has three members. Mixing `|` and `&` at the
    /// same nesting level is rejected; parenthesize one side instead.
    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr> {
        let first = self.parse_simple_type()?;
        let (operator, other) = match self.peek_kind()? {
            TokenKind::Pipe => (TokenKind::Pipe, TokenKind::Amp),
            TokenKind::Amp => (TokenKind::Amp, TokenKind::Pipe),
            _ => return Ok(first),
        };

        let start = first.span;
        let mut members = Vec::new();
        splice_member(&mut members, &operator, first);
        while self.eat(&operator)? {
            let member = self.parse_simple_type()?;
            splice_member(&mut members, &operator, member);
        }

        let next = self.peek()?;
        if next.kind == other {
            return Err(self.error_at(
                ErrorCode::MIXED_OPERATORS,
                format!("cannot mix '{operator}' and '{other}' without parentheses"),
                next.span,
            ));
        }

        let span = start.merge(self.previous_span());
        let kind = match operator {
            TokenKind::Pipe => TypeExprKind::Union(members),
            _ => TypeExprKind::Intersection(members),
        };
        Ok(TypeExpr::new(kind, span))
    }

    /// Parse a type expression without a top-level `|` or `&` chain.
    ///
    /// ```ebnf
    /// Simple = "number" | "string" | "null" | "boolean" | "any" | "none"
    ///        | STRING | NUMBER | "true" | "false"
    ///        | "[" Type "]"
    ///        | "{" { { COMMENT } Field [ "," ] } "}"
    ///        | "(" Type ")"
    ///        | "(" Type "," [ Type { "," Type } [ "," ] ] ")"
    ///        | "<" Type ">"
    ///        | NAME ;
    /// ```
    fn parse_simple_type(&mut self) -> Result<TypeExpr> {
        let token = self.peek()?;
        let start = token.span;

        let kind = match token.kind.clone() {
            TokenKind::KwNumber => self.primitive(PrimitiveName::Number)?,
            TokenKind::KwString => self.primitive(PrimitiveName::String)?,
            TokenKind::KwNull => self.primitive(PrimitiveName::Null)?,
            TokenKind::KwBoolean => self.primitive(PrimitiveName::Boolean)?,
            TokenKind::KwAny => {
                self.advance()?;
                TypeExprKind::Special(SpecialName::Any)
            }
            TokenKind::KwNone => {
                self.advance()?;
                TypeExprKind::Special(SpecialName::None)
            }

            TokenKind::String(value) => {
                self.advance()?;
                TypeExprKind::Literal(LiteralValue::String(value))
            }
            TokenKind::Number(value) => {
                self.advance()?;
                TypeExprKind::Literal(LiteralValue::Number(value))
            }
            TokenKind::True => {
                self.advance()?;
                TypeExprKind::Literal(LiteralValue::Boolean(true))
            }
            TokenKind::False => {
                self.advance()?;
                TypeExprKind::Literal(LiteralValue::Boolean(false))
            }

            TokenKind::LBracket => {
                self.advance()?;
                let item = self.parse_type()?;
                self.expect(&TokenKind::RBracket)?;
                TypeExprKind::List(Box::new(item))
            }
            TokenKind::Less => {
                self.advance()?;
                let item = self.parse_type()?;
                self.expect(&TokenKind::Greater)?;
                TypeExprKind::Record(Box::new(item))
            }
            TokenKind::LBrace => {
                self.advance()?;
                TypeExprKind::Object(self.parse_object_fields()?)
            }
            TokenKind::LParen => {
                self.advance()?;
                let first = self.parse_type()?;
                if !self.eat_comma()? {
                    // Plain grouping: `(a | b)` is the inner type.
                    self.expect(&TokenKind::RParen)?;
                    return Ok(TypeExpr::new(first.kind, start.merge(self.previous_span())));
                }
                let mut items = vec![first];
                while !self.check(&TokenKind::RParen)? {
                    items.push(self.parse_type()?);
                    if !self.eat_comma()? {
                        break;
                    }
                }
                self.expect(&TokenKind::RParen)?;
                TypeExprKind::Tuple(items)
            }

            TokenKind::Name(name) => {
                self.advance()?;
                TypeExprKind::Name(Ident::new(name, start))
            }

            _ => return Err(self.unexpected(&token, "type")),
        };

        Ok(TypeExpr::new(kind, start.merge(self.previous_span())))
    }

    fn primitive(&mut self, name: PrimitiveName) -> Result<TypeExprKind> {
        self.advance()?;
        Ok(TypeExprKind::Primitive(name))
    }

    /// Parse object fields after the opening `{`, through the closing `}`.
    ///
    /// Separator commas are optional. Each field may be preceded by
    /// comments, which become its description.
    fn parse_object_fields(&mut self) -> Result<Vec<ObjectField>> {
        let mut fields = Vec::new();
        loop {
            let description = self.take_description()?;
            if self.eat(&TokenKind::RBrace)? {
                return Ok(fields);
            }

            let name = self.expect_field_name()?;
            self.expect(&TokenKind::Colon)?;
            let ty = self.parse_type()?;
            let span = name.span.merge(ty.span);
            fields.push(ObjectField {
                name,
                ty,
                description,
                span,
            });

            self.eat_comma()?;
        }
    }
}

/// Add `member` to a chain joined by `operator`, inlining a grouped chain
/// of the same operator.
fn splice_member(members: &mut Vec<TypeExpr>, operator: &TokenKind, member: TypeExpr) {
    match (operator, member.kind) {
        (TokenKind::Pipe, TypeExprKind::Union(inner))
        | (TokenKind::Amp, TypeExprKind::Intersection(inner)) => members.extend(inner),
        (_, kind) => members.push(TypeExpr::new(kind, member.span)),
    }
}
