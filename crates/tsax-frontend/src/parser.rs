//! Recursive-descent parser for the declaration subset.
//!
//! Only exported type declarations and exported function signatures matter
//! to extraction; everything else in a module is skipped brace-balanced.
//! Type expressions the subset does not model (generics other than
//! `Array<T>`, intersections, type operators) lower to opaque types
//! carrying their raw source text, which the serializer renders verbatim
//! as its fallback.

use std::fmt;

use tsax_common::limits::MAX_TYPE_NESTING_DEPTH;
use tsax_extract::actions::{FunctionDecl, ParameterDecl};

use crate::scanner::{ScanError, Token, TokenKind, cook_string, scan};
use crate::types::{IntrinsicKind, PropertyInfo, TypeId, TypeKey, TypeTable};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclKind {
    TypeAlias,
    Interface,
}

/// A named type declaration recorded for the project namespace.
#[derive(Clone, Debug)]
pub struct TypeDeclRecord {
    pub name: String,
    pub kind: DeclKind,
    pub type_id: TypeId,
    pub exported: bool,
}

/// Everything extraction needs from one source file.
#[derive(Debug, Default)]
pub struct ParsedModule {
    pub types: Vec<TypeDeclRecord>,
    /// Exported functions with their leading comments, declaration order.
    pub functions: Vec<FunctionDecl<TypeId>>,
}

#[derive(Clone, Debug)]
pub struct ParseError {
    pub message: String,
    pub pos: u32,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.pos)
    }
}

impl From<ScanError> for ParseError {
    fn from(err: ScanError) -> Self {
        ParseError {
            message: err.message,
            pos: err.pos,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Parse one module's declarations, lowering type expressions into `table`.
pub fn parse_module(
    table: &mut TypeTable,
    source: &str,
    file: &str,
) -> ParseResult<ParsedModule> {
    let tokens = scan(source)?;
    let mut parser = Parser {
        tokens,
        source,
        table,
        file,
        pos: 0,
        depth: 0,
    };
    parser.parse()
}

struct Parser<'a> {
    tokens: Vec<Token>,
    source: &'a str,
    table: &'a mut TypeTable,
    file: &'a str,
    pos: usize,
    depth: u32,
}

impl<'a> Parser<'a> {
    fn parse(&mut self) -> ParseResult<ParsedModule> {
        let mut module = ParsedModule::default();
        while !self.at_eof() {
            let decl_start = self.pos;
            let mut exported = false;
            loop {
                match self.ident_text() {
                    Some("export") => {
                        exported = true;
                        self.bump();
                    }
                    Some("declare") | Some("default") | Some("async") => {
                        self.bump();
                    }
                    _ => break,
                }
            }

            match self.ident_text() {
                Some("interface") => {
                    let decl = self.parse_interface(exported)?;
                    module.types.push(decl);
                }
                Some("type") if self.peek_kind_at(1) == TokenKind::Ident => {
                    let decl = self.parse_type_alias(exported)?;
                    module.types.push(decl);
                }
                Some("function") => {
                    let leading = self.leading_comment_text(decl_start);
                    if let Some(function) = self.parse_function(leading)? {
                        if exported {
                            module.functions.push(function);
                        }
                    }
                }
                _ => self.skip_statement(),
            }
        }
        Ok(module)
    }

    // ---- token helpers -----------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn kind(&self) -> TokenKind {
        self.tokens[self.pos].kind
    }

    fn peek_kind_at(&self, offset: usize) -> TokenKind {
        self.tokens
            .get(self.pos + offset)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    fn at_eof(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    fn bump(&mut self) {
        if !self.at_eof() {
            self.pos += 1;
        }
    }

    fn text_at(&self, index: usize) -> &'a str {
        self.tokens[index].span.text(self.source)
    }

    fn token_text(&self) -> &'a str {
        self.text_at(self.pos)
    }

    fn ident_text(&self) -> Option<&'a str> {
        if self.kind() == TokenKind::Ident {
            Some(self.token_text())
        } else {
            None
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError {
            message: message.into(),
            pos: self.peek().span.start,
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> ParseResult<usize> {
        if self.kind() != kind {
            return Err(self.error(format!("expected {what}")));
        }
        let index = self.pos;
        self.bump();
        Ok(index)
    }

    fn expect_ident(&mut self, what: &str) -> ParseResult<String> {
        if self.kind() != TokenKind::Ident {
            return Err(self.error(format!("expected {what}")));
        }
        let text = self.token_text().to_string();
        self.bump();
        Ok(text)
    }

    /// Raw source text from token `start` through the last consumed token.
    fn raw_since(&self, start: usize) -> String {
        let from = self.tokens[start].span.start as usize;
        let to = self.tokens[self.pos.saturating_sub(1).max(start)].span.end as usize;
        self.source[from..to].trim().to_string()
    }

    /// The comment block attached to the token at `index`: trailing
    /// comments of its leading trivia that sit adjacent to the declaration
    /// (no blank line in between).
    fn leading_comment_text(&self, index: usize) -> Option<String> {
        let token = &self.tokens[index];
        let comments = &token.leading_comments;
        if comments.is_empty() {
            return None;
        }
        let mut first = comments.len() - 1;
        while first > 0 {
            let gap_start = comments[first - 1].end as usize;
            let gap_end = comments[first].pos as usize;
            if is_adjacent_gap(&self.source[gap_start..gap_end]) {
                first -= 1;
            } else {
                break;
            }
        }
        let gap_start = comments.last().map(|c| c.end as usize)?;
        if !is_adjacent_gap(&self.source[gap_start..token.span.start as usize]) {
            return None;
        }
        let text = comments[first..]
            .iter()
            .map(|c| c.get_text(self.source))
            .collect::<Vec<_>>()
            .join("\n");
        Some(text)
    }

    // ---- declarations ------------------------------------------------

    fn parse_interface(&mut self, exported: bool) -> ParseResult<TypeDeclRecord> {
        self.bump(); // interface
        let name = self.expect_ident("interface name")?;
        // skip type parameters and extends clause up to the body
        while self.kind() != TokenKind::LBrace {
            if self.at_eof() {
                return Err(self.error("unexpected end of file in interface header"));
            }
            self.bump();
        }
        let properties = self.parse_object_body()?;
        let type_id = self.table.object(properties);
        Ok(TypeDeclRecord {
            name,
            kind: DeclKind::Interface,
            type_id,
            exported,
        })
    }

    fn parse_type_alias(&mut self, exported: bool) -> ParseResult<TypeDeclRecord> {
        self.bump(); // type
        let name = self.expect_ident("type alias name")?;
        if self.kind() == TokenKind::LAngle {
            // generic alias: lower the whole right side opaquely
            self.skip_balanced_angles()?;
        }
        self.expect(TokenKind::Eq, "`=` in type alias")?;
        let type_id = self.parse_type()?;
        if self.kind() == TokenKind::Semicolon {
            self.bump();
        }
        Ok(TypeDeclRecord {
            name,
            kind: DeclKind::TypeAlias,
            type_id,
            exported,
        })
    }

    fn parse_function(
        &mut self,
        leading_comment: Option<String>,
    ) -> ParseResult<Option<FunctionDecl<TypeId>>> {
        self.bump(); // function
        if self.kind() == TokenKind::Other && self.token_text() == "*" {
            self.bump(); // generator
        }
        if self.kind() != TokenKind::Ident {
            // anonymous default export; nothing to extract
            self.skip_statement();
            return Ok(None);
        }
        let name = self.expect_ident("function name")?;
        if self.kind() == TokenKind::LAngle {
            self.skip_balanced_angles()?;
        }
        self.expect(TokenKind::LParen, "`(` in function signature")?;

        let mut params = Vec::new();
        while self.kind() != TokenKind::RParen {
            if self.at_eof() {
                return Err(self.error("unexpected end of file in parameter list"));
            }
            if self.kind() == TokenKind::Comma {
                self.bump();
                continue;
            }
            params.push(self.parse_parameter(params.len())?);
        }
        self.expect(TokenKind::RParen, "`)` after parameters")?;

        if self.kind() == TokenKind::Colon {
            self.bump();
            self.parse_type()?; // return type; extraction ignores it
        }
        if self.kind() == TokenKind::LBrace {
            self.skip_balanced_braces();
        } else if self.kind() == TokenKind::Semicolon {
            self.bump();
        }

        Ok(Some(FunctionDecl {
            name,
            leading_comment,
            params,
            source_file: self.file.to_string(),
        }))
    }

    fn parse_parameter(&mut self, index: usize) -> ParseResult<ParameterDecl<TypeId>> {
        if self.kind() == TokenKind::Ellipsis {
            self.bump();
        }
        let name = match self.kind() {
            TokenKind::Ident => {
                let text = self.token_text().to_string();
                self.bump();
                text
            }
            // Destructuring patterns keep their raw text as the name.
            TokenKind::LBrace => {
                let start = self.pos;
                self.skip_balanced_braces();
                self.raw_since(start)
            }
            TokenKind::LBracket => {
                let start = self.pos;
                self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket);
                self.raw_since(start)
            }
            _ => return Err(self.error(format!("expected parameter {index}"))),
        };
        if self.kind() == TokenKind::Question {
            self.bump();
        }

        let mut type_name = None;
        let mut handle = None;
        if self.kind() == TokenKind::Colon {
            self.bump();
            let type_id = self.parse_type()?;
            if let TypeKey::Ref(ref_name) = self.table.lookup(type_id) {
                type_name = Some(ref_name.clone());
            }
            handle = Some(type_id);
        }

        if self.kind() == TokenKind::Eq {
            self.bump();
            self.skip_default_value();
        }

        Ok(ParameterDecl {
            name,
            type_name,
            handle,
        })
    }

    fn parse_object_body(&mut self) -> ParseResult<Vec<PropertyInfo>> {
        self.expect(TokenKind::LBrace, "`{` to open object type")?;
        let mut properties = Vec::new();

        while self.kind() != TokenKind::RBrace {
            if self.at_eof() {
                return Err(self.error("unexpected end of file in object type"));
            }
            if matches!(self.kind(), TokenKind::Semicolon | TokenKind::Comma) {
                self.bump();
                continue;
            }
            if self.ident_text() == Some("readonly")
                && matches!(self.peek_kind_at(1), TokenKind::Ident | TokenKind::StringLit)
            {
                self.bump();
            }

            // index signatures are not data properties
            if self.kind() == TokenKind::LBracket {
                self.skip_balanced(TokenKind::LBracket, TokenKind::RBracket);
                if self.kind() == TokenKind::Colon {
                    self.bump();
                    self.parse_type()?;
                }
                continue;
            }

            let member_start = self.pos;
            let name = match self.kind() {
                TokenKind::Ident => {
                    let text = self.token_text().to_string();
                    self.bump();
                    text
                }
                TokenKind::StringLit => {
                    let text = cook_string(self.token_text());
                    self.bump();
                    text
                }
                _ => return Err(self.error("expected property name")),
            };
            if self.kind() == TokenKind::Question {
                self.bump();
            }

            if self.kind() == TokenKind::LParen || self.kind() == TokenKind::LAngle {
                // method shorthand: name(...): T
                if self.kind() == TokenKind::LAngle {
                    self.skip_balanced_angles()?;
                }
                self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
                if self.kind() == TokenKind::Colon {
                    self.bump();
                    self.parse_type()?;
                }
                let signature = self.raw_since(member_start);
                let type_id = self.table.function(signature);
                properties.push(PropertyInfo::method(name, type_id));
                continue;
            }

            self.expect(TokenKind::Colon, "`:` after property name")?;
            let type_id = self.parse_type()?;
            properties.push(PropertyInfo::new(name, type_id));
        }
        self.expect(TokenKind::RBrace, "`}` to close object type")?;
        Ok(properties)
    }

    // ---- type expressions ----------------------------------------------

    fn parse_type(&mut self) -> ParseResult<TypeId> {
        self.depth += 1;
        if self.depth > MAX_TYPE_NESTING_DEPTH {
            return Err(self.error("type expression nests too deeply"));
        }
        let result = self.parse_union_type();
        self.depth -= 1;
        result
    }

    fn parse_union_type(&mut self) -> ParseResult<TypeId> {
        let start = self.pos;
        if self.kind() == TokenKind::Pipe {
            self.bump(); // leading `|` in multi-line unions
        }
        let first = self.parse_postfix_type()?;
        if self.kind() == TokenKind::Amp {
            // intersections fall outside the subset; keep the raw text
            self.skip_type_tail();
            return Ok(self.table.opaque(self.raw_since(start)));
        }
        if self.kind() != TokenKind::Pipe {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.kind() == TokenKind::Pipe {
            self.bump();
            members.push(self.parse_postfix_type()?);
        }
        if self.kind() == TokenKind::Amp {
            self.skip_type_tail();
            return Ok(self.table.opaque(self.raw_since(start)));
        }
        Ok(self.table.union(members))
    }

    fn parse_postfix_type(&mut self) -> ParseResult<TypeId> {
        let mut ty = self.parse_primary_type()?;
        while self.kind() == TokenKind::LBracket && self.peek_kind_at(1) == TokenKind::RBracket {
            self.bump();
            self.bump();
            ty = self.table.array(ty);
        }
        Ok(ty)
    }

    fn parse_primary_type(&mut self) -> ParseResult<TypeId> {
        match self.kind() {
            TokenKind::LParen => {
                if self.paren_starts_function_type() {
                    return self.parse_function_type();
                }
                self.bump();
                let inner = self.parse_type()?;
                self.expect(TokenKind::RParen, "`)` to close type group")?;
                Ok(inner)
            }
            TokenKind::LBrace => {
                let properties = self.parse_object_body()?;
                Ok(self.table.object(properties))
            }
            TokenKind::StringLit => {
                let value = cook_string(self.token_text());
                self.bump();
                Ok(self.table.literal_string(value))
            }
            TokenKind::NumberLit => {
                let value = self.parse_number(self.token_text())?;
                self.bump();
                Ok(self.table.literal_number(value))
            }
            TokenKind::Other if self.token_text() == "-" && self.peek_kind_at(1) == TokenKind::NumberLit =>
            {
                self.bump();
                let value = self.parse_number(self.token_text())?;
                self.bump();
                Ok(self.table.literal_number(-value))
            }
            TokenKind::Ident => self.parse_named_type(),
            _ => Err(self.error("expected a type")),
        }
    }

    fn parse_named_type(&mut self) -> ParseResult<TypeId> {
        let start = self.pos;
        let word = self.token_text();

        if let Some(kind) = IntrinsicKind::from_keyword(word) {
            self.bump();
            return Ok(self.table.intern(TypeKey::Intrinsic(kind)));
        }
        match word {
            "true" => {
                self.bump();
                return Ok(self.table.literal_boolean(true));
            }
            "false" => {
                self.bump();
                return Ok(self.table.literal_boolean(false));
            }
            // type operators outside the subset: swallow the operand
            "keyof" | "typeof" | "readonly" | "infer" | "unique" => {
                self.bump();
                self.parse_type()?;
                return Ok(self.table.opaque(self.raw_since(start)));
            }
            _ => {}
        }

        self.bump(); // the name itself
        // qualified names (ns.Type) are outside the subset
        let mut qualified = false;
        while self.kind() == TokenKind::Dot && self.peek_kind_at(1) == TokenKind::Ident {
            self.bump();
            self.bump();
            qualified = true;
        }

        if self.kind() == TokenKind::LAngle {
            if !qualified && self.text_at(start) == "Array" {
                self.bump();
                let element = self.parse_type()?;
                self.expect(TokenKind::RAngle, "`>` to close Array element type")?;
                return Ok(self.table.array(element));
            }
            self.skip_balanced_angles()?;
            return Ok(self.table.opaque(self.raw_since(start)));
        }
        if qualified {
            return Ok(self.table.opaque(self.raw_since(start)));
        }
        Ok(self.table.reference(self.text_at(start)))
    }

    fn parse_function_type(&mut self) -> ParseResult<TypeId> {
        let start = self.pos;
        self.skip_balanced(TokenKind::LParen, TokenKind::RParen);
        self.expect(TokenKind::Arrow, "`=>` in function type")?;
        self.parse_type()?;
        Ok(self.table.function(self.raw_since(start)))
    }

    fn paren_starts_function_type(&self) -> bool {
        // look past the matching `)` for a `=>`
        let mut depth = 0usize;
        let mut index = self.pos;
        while index < self.tokens.len() {
            match self.tokens[index].kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self
                            .tokens
                            .get(index + 1)
                            .is_some_and(|t| t.kind == TokenKind::Arrow);
                    }
                }
                TokenKind::Eof => return false,
                _ => {}
            }
            index += 1;
        }
        false
    }

    fn parse_number(&self, raw: &str) -> ParseResult<f64> {
        let cleaned = raw.replace('_', "");
        let value = if let Some(hex) = cleaned.strip_prefix("0x").or(cleaned.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).map(|v| v as f64).ok()
        } else if let Some(oct) = cleaned.strip_prefix("0o").or(cleaned.strip_prefix("0O")) {
            i64::from_str_radix(oct, 8).map(|v| v as f64).ok()
        } else if let Some(bin) = cleaned.strip_prefix("0b").or(cleaned.strip_prefix("0B")) {
            i64::from_str_radix(bin, 2).map(|v| v as f64).ok()
        } else {
            cleaned.parse::<f64>().ok()
        };
        value.ok_or_else(|| self.error(format!("malformed number literal `{raw}`")))
    }

    // ---- skipping --------------------------------------------------------

    /// Skip a statement the extractor has no interest in. Stops after a
    /// top-level `;` or a balanced top-level `{...}` block, or before a
    /// token that starts a new declaration at depth zero — semicolons are
    /// optional in the source, and a semicolon-less statement must not
    /// swallow the declarations that follow it.
    fn skip_statement(&mut self) {
        let mut depth = 0usize;
        let mut consumed = false;
        while !self.at_eof() {
            if consumed && depth == 0 && self.starts_declaration() {
                return;
            }
            let kind = self.kind();
            self.bump();
            consumed = true;
            match kind {
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                TokenKind::RParen | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::Semicolon if depth == 0 => return,
                _ => {}
            }
        }
    }

    /// Whether the current token begins a top-level declaration. Member
    /// accesses like `obj.type` do not count.
    fn starts_declaration(&self) -> bool {
        if self.kind() != TokenKind::Ident {
            return false;
        }
        if self.pos > 0 && self.tokens[self.pos - 1].kind == TokenKind::Dot {
            return false;
        }
        matches!(
            self.token_text(),
            "export"
                | "declare"
                | "import"
                | "interface"
                | "type"
                | "function"
                | "const"
                | "let"
                | "var"
                | "class"
                | "enum"
        )
    }

    fn skip_balanced(&mut self, open: TokenKind, close: TokenKind) {
        debug_assert_eq!(self.kind(), open);
        let mut depth = 0usize;
        while !self.at_eof() {
            let kind = self.kind();
            self.bump();
            if kind == open {
                depth += 1;
            } else if kind == close {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
        }
    }

    fn skip_balanced_braces(&mut self) {
        self.skip_balanced(TokenKind::LBrace, TokenKind::RBrace);
    }

    fn skip_balanced_angles(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let mut depth = 0usize;
        while !self.at_eof() {
            let kind = self.kind();
            self.bump();
            match kind {
                TokenKind::LAngle => depth += 1,
                TokenKind::RAngle => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(ParseError {
            message: "unbalanced type argument list".to_string(),
            pos: self.tokens[start].span.start,
        })
    }

    /// Skip the remainder of a type expression: everything up to a
    /// terminator at bracket depth zero.
    fn skip_type_tail(&mut self) {
        let mut depth = 0usize;
        loop {
            let kind = self.kind();
            match kind {
                TokenKind::Eof => return,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket | TokenKind::LAngle => {
                    depth += 1
                }
                TokenKind::RBrace | TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::RAngle => depth = depth.saturating_sub(1),
                TokenKind::Semicolon | TokenKind::Comma | TokenKind::Eq if depth == 0 => return,
                _ => {}
            }
            self.bump();
        }
    }

    /// Skip a parameter default value up to `,` or `)` at depth zero.
    fn skip_default_value(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.kind() {
                TokenKind::Eof => return,
                TokenKind::LBrace | TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket => depth = depth.saturating_sub(1),
                TokenKind::RParen => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                TokenKind::Comma if depth == 0 => return,
                _ => {}
            }
            self.bump();
        }
    }
}

fn is_adjacent_gap(gap: &str) -> bool {
    gap.chars().all(|c| c.is_whitespace()) && gap.matches('\n').count() <= 1
}
