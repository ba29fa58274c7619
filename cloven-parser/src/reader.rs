// cloven-parser - The Lisp reader
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Character-level reader with macro-character dispatch.
//!
//! Reads one form at a time, tracking line, column and byte position.
//! Whitespace includes `,`. Comments read as the `Void` sentinel, which
//! collections strip and callers skip. A clean end of input reads as
//! `None`; end of input inside an open structure is an error carrying
//! the source position.
//!
//! `::keyword` resolution against the current namespace happens at parse
//! time; the runtime supplies the namespace name through
//! [`Reader::set_current_ns`] rather than the reader reaching into the
//! namespace registry.

use im::{OrdMap, OrdSet};

use cloven_vm::error::{Error, Result};
use cloven_vm::keyword::Keyword;
use cloven_vm::symbol::Symbol;
use cloven_vm::value::{ClovenRegex, ClovenVal, Meta};

use crate::syntax_quote;
use crate::tokens::{Token, TokenKind};

/// Reads forms from a source string.
pub struct Reader {
    source_name: String,
    chars: Vec<char>,
    index: usize,
    pos: usize,
    line: u32,
    column: u32,
    current_ns: Option<String>,
    tokens: Vec<Token>,
}

impl Reader {
    /// Create a reader over the given source.
    #[must_use]
    pub fn new(source: &str, source_name: &str) -> Self {
        Reader {
            source_name: source_name.to_string(),
            chars: source.chars().collect(),
            index: 0,
            pos: 0,
            line: 1,
            column: 1,
            current_ns: None,
            tokens: Vec::new(),
        }
    }

    /// Set the namespace `::keyword` resolves against.
    pub fn set_current_ns(&mut self, ns: &str) {
        self.current_ns = Some(ns.to_string());
    }

    /// Builder-style variant of [`set_current_ns`](Self::set_current_ns).
    #[must_use]
    pub fn with_current_ns(mut self, ns: &str) -> Self {
        self.set_current_ns(ns);
        self
    }

    /// The advisory tokens recorded so far.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Read the next form. `Ok(None)` on clean end of input. Comments
    /// read as `ClovenVal::Void`.
    pub fn read(&mut self) -> Result<Option<ClovenVal>> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Ok(None);
        }
        self.read_form().map(Some)
    }

    /// Read every remaining form, skipping `Void`s.
    pub fn read_all(&mut self) -> Result<Vec<ClovenVal>> {
        let mut forms = Vec::new();
        while let Some(form) = self.read()? {
            if !matches!(form, ClovenVal::Void) {
                forms.push(form);
            }
        }
        Ok(forms)
    }

    // ========================================================================
    // Character stream
    // ========================================================================

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.get(self.index + 1).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.index).copied()?;
        self.index += 1;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::reader(
            self.source_name.as_str(),
            self.line,
            self.column,
            self.pos,
            message,
        )
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn token(&mut self, start: usize, kind: TokenKind) {
        self.tokens.push(Token::new(start, self.pos, kind));
    }

    /// Characters that end a symbol or number token.
    fn is_terminating(c: char) -> bool {
        matches!(
            c,
            '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\\' | '@' | '`' | '~' | ';' | '^'
        )
    }

    // ========================================================================
    // Form dispatch
    // ========================================================================

    fn read_form(&mut self) -> Result<ClovenVal> {
        self.skip_whitespace();
        let c = self
            .peek()
            .ok_or_else(|| self.error("unexpected EOF while reading a form"))?;

        match c {
            '0'..='9' => self.read_number(),
            '+' | '-' if self.peek_second().map_or(false, |c| c.is_ascii_digit()) => {
                self.read_number()
            }
            '(' => {
                self.open_delim();
                let items = self.read_until(')')?;
                Ok(ClovenVal::list(items))
            }
            '[' => {
                self.open_delim();
                let items = self.read_until(']')?;
                Ok(ClovenVal::vector(items))
            }
            '{' => {
                self.open_delim();
                let items = self.read_until('}')?;
                self.build_map(items)
            }
            ')' | ']' | '}' => Err(self.error(format!("unmatched delimiter {}", c))),
            '"' => self.read_string(),
            '\\' => self.read_char_literal(),
            '\'' => {
                self.macro_prefix();
                self.read_wrapped("quote")
            }
            '@' => {
                self.macro_prefix();
                self.read_wrapped("deref")
            }
            '`' => {
                self.macro_prefix();
                let template = self.read_form()?;
                syntax_quote::expand(&template)
                    .map_err(|e| self.error("in syntax-quote").caused_by(e))
            }
            '~' => {
                self.macro_prefix();
                if self.peek() == Some('@') {
                    self.next_char();
                    self.read_wrapped("unquote-splicing")
                } else {
                    self.read_wrapped("unquote")
                }
            }
            ';' => self.read_line_comment(),
            '^' => {
                self.macro_prefix();
                self.read_meta()
            }
            '#' => self.read_dispatch(),
            _ => {
                let start = self.pos;
                let token = self.read_token_text()?;
                self.interpret_token(&token, start)
            }
        }
    }

    fn open_delim(&mut self) {
        let start = self.pos;
        self.next_char();
        self.token(start, TokenKind::Open);
    }

    fn macro_prefix(&mut self) {
        let start = self.pos;
        self.next_char();
        self.token(start, TokenKind::Macro);
    }

    /// Read forms until the closing delimiter, stripping `Void`s.
    fn read_until(&mut self, close: char) -> Result<Vec<ClovenVal>> {
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => {
                    return Err(self.error(format!("unexpected EOF, expected {}", close)));
                }
                Some(c) if c == close => {
                    let start = self.pos;
                    self.next_char();
                    self.token(start, TokenKind::Close);
                    return Ok(items);
                }
                _ => {
                    let form = self.read_form()?;
                    if !matches!(form, ClovenVal::Void) {
                        items.push(form);
                    }
                }
            }
        }
    }

    fn build_map(&self, items: Vec<ClovenVal>) -> Result<ClovenVal> {
        if items.len() % 2 != 0 {
            return Err(self.error("map literal must contain an even number of forms"));
        }
        let mut map = OrdMap::new();
        for pair in items.chunks(2) {
            map.insert(pair[0].clone(), pair[1].clone());
        }
        Ok(ClovenVal::map(map))
    }

    fn read_wrapped(&mut self, head: &str) -> Result<ClovenVal> {
        let form = self.read_form()?;
        Ok(ClovenVal::list(vec![
            ClovenVal::symbol(Symbol::new(head)),
            form,
        ]))
    }

    // ========================================================================
    // Tokens, numbers, symbols, keywords
    // ========================================================================

    fn read_token_text(&mut self) -> Result<String> {
        let mut text = String::new();
        match self.next_char() {
            Some(c) => text.push(c),
            None => return Err(self.error("unexpected EOF while reading a token")),
        }
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' || Self::is_terminating(c) {
                break;
            }
            text.push(c);
            self.next_char();
        }
        Ok(text)
    }

    fn interpret_token(&mut self, text: &str, start: usize) -> Result<ClovenVal> {
        if let Some(rest) = text.strip_prefix("::") {
            if rest.is_empty() {
                return Err(self.error("invalid token ::"));
            }
            let ns = self.current_ns.clone().unwrap_or_else(|| "user".to_string());
            self.token(start, TokenKind::Keyword);
            return Ok(ClovenVal::keyword(Keyword::with_namespace(&ns, rest)));
        }
        if let Some(rest) = text.strip_prefix(':') {
            if rest.is_empty() {
                return Err(self.error("invalid token :"));
            }
            self.token(start, TokenKind::Keyword);
            return Ok(ClovenVal::keyword(Keyword::parse(rest)));
        }
        let value = match text {
            "nil" => ClovenVal::Nil,
            "true" => ClovenVal::bool(true),
            "false" => ClovenVal::bool(false),
            _ => ClovenVal::symbol(Symbol::parse(text)),
        };
        self.token(start, TokenKind::Symbol);
        Ok(value)
    }

    fn read_number(&mut self) -> Result<ClovenVal> {
        let start = self.pos;
        let text = self.read_token_text()?;
        let n: i64 = text
            .parse()
            .map_err(|_| self.error(format!("invalid number literal {}", text)))?;
        self.token(start, TokenKind::Number);
        Ok(ClovenVal::int(n))
    }

    // ========================================================================
    // Strings, chars, regexes
    // ========================================================================

    fn read_string(&mut self) -> Result<ClovenVal> {
        let start = self.pos;
        self.next_char(); // opening quote
        let mut text = String::new();
        loop {
            let c = self
                .next_char()
                .ok_or_else(|| self.error("unexpected EOF while reading a string"))?;
            match c {
                '"' => break,
                '\\' => {
                    let esc = self
                        .next_char()
                        .ok_or_else(|| self.error("unexpected EOF in string escape"))?;
                    match esc {
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        'n' => text.push('\n'),
                        'b' => text.push('\u{8}'),
                        'f' => text.push('\u{c}'),
                        '\\' => text.push('\\'),
                        '"' => text.push('"'),
                        'u' => text.push(self.read_unicode_escape()?),
                        other => {
                            return Err(
                                self.error(format!("unknown escape sequence \\{}", other))
                            )
                        }
                    }
                }
                other => text.push(other),
            }
        }
        self.token(start, TokenKind::String);
        Ok(ClovenVal::string(text))
    }

    fn read_unicode_escape(&mut self) -> Result<char> {
        let mut hex = String::with_capacity(4);
        for _ in 0..4 {
            let c = self
                .next_char()
                .ok_or_else(|| self.error("unexpected EOF in unicode escape"))?;
            hex.push(c);
        }
        let code = u32::from_str_radix(&hex, 16)
            .map_err(|_| self.error(format!("invalid unicode escape \\u{}", hex)))?;
        char::from_u32(code).ok_or_else(|| self.error(format!("invalid unicode escape \\u{}", hex)))
    }

    fn read_char_literal(&mut self) -> Result<ClovenVal> {
        let start = self.pos;
        self.next_char(); // backslash
        let first = self
            .next_char()
            .ok_or_else(|| self.error("unexpected EOF while reading a character"))?;
        let mut text = String::new();
        text.push(first);
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ',' || Self::is_terminating(c) {
                break;
            }
            text.push(c);
            self.next_char();
        }

        let value = if text.chars().count() == 1 {
            ClovenVal::char(first)
        } else {
            match text.as_str() {
                "space" => ClovenVal::char(' '),
                "tab" => ClovenVal::char('\t'),
                "backspace" => ClovenVal::char('\u{8}'),
                "newline" => ClovenVal::char('\n'),
                "formfeed" => ClovenVal::char('\u{c}'),
                "return" => ClovenVal::char('\r'),
                _ if text.starts_with('u') => {
                    let hex = &text[1..];
                    if hex.len() != 4 {
                        return Err(self.error(format!("invalid char constant \\{}", text)));
                    }
                    let code = u32::from_str_radix(hex, 16)
                        .map_err(|_| self.error(format!("invalid char constant \\{}", text)))?;
                    if (0xD800..=0xDFFF).contains(&code) {
                        return Err(self.error(format!("invalid char constant \\{}", text)));
                    }
                    char::from_u32(code)
                        .map(ClovenVal::char)
                        .ok_or_else(|| self.error(format!("invalid char constant \\{}", text)))?
                }
                _ if text.starts_with('o') => {
                    let oct = &text[1..];
                    if oct.is_empty() || oct.len() > 3 {
                        return Err(self.error(format!("invalid char constant \\{}", text)));
                    }
                    let code = u32::from_str_radix(oct, 8)
                        .map_err(|_| self.error(format!("invalid char constant \\{}", text)))?;
                    if code > 0o377 {
                        return Err(self.error(format!("invalid char constant \\{}", text)));
                    }
                    char::from_u32(code)
                        .map(ClovenVal::char)
                        .ok_or_else(|| self.error(format!("invalid char constant \\{}", text)))?
                }
                _ => return Err(self.error(format!("invalid char constant \\{}", text))),
            }
        };
        self.token(start, TokenKind::Char);
        Ok(value)
    }

    fn read_regex(&mut self) -> Result<ClovenVal> {
        let start = self.pos;
        self.next_char(); // opening quote
        let mut pattern = String::new();
        loop {
            let c = self
                .next_char()
                .ok_or_else(|| self.error("unexpected EOF while reading a regex"))?;
            match c {
                '"' => break,
                '\\' => {
                    let esc = self
                        .next_char()
                        .ok_or_else(|| self.error("unexpected EOF in regex escape"))?;
                    if esc == '"' {
                        pattern.push('"');
                    } else {
                        // Backslashes pass through to the regex engine
                        pattern.push('\\');
                        pattern.push(esc);
                    }
                }
                other => pattern.push(other),
            }
        }
        let regex = ClovenRegex::compile(&pattern)
            .map_err(|e| self.error("invalid regex literal").caused_by(e))?;
        self.token(start, TokenKind::Regex);
        Ok(ClovenVal::Regex(regex))
    }

    // ========================================================================
    // Comments and metadata
    // ========================================================================

    fn read_line_comment(&mut self) -> Result<ClovenVal> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.next_char();
        }
        self.token(start, TokenKind::Comment);
        Ok(ClovenVal::Void)
    }

    fn read_meta(&mut self) -> Result<ClovenVal> {
        let meta_form = self.read_form()?;
        let meta = self.normalize_meta(meta_form)?;
        let target = self.read_form()?;

        // Merge across repeated ^ prefixes: the leftmost prefix wins on
        // conflicting keys
        if let ClovenVal::List(list, _) = &target {
            let items = list.to_vec();
            let is_with_meta = matches!(
                items.first(),
                Some(ClovenVal::Symbol(head, _)) if head.name() == "with-meta"
            );
            if is_with_meta && items.len() == 3 {
                if let ClovenVal::Map(inner, _) = &items[2] {
                    let mut merged = inner.clone();
                    for (k, v) in meta.iter() {
                        merged.insert(k.clone(), v.clone());
                    }
                    return Ok(ClovenVal::list(vec![
                        items[0].clone(),
                        items[1].clone(),
                        ClovenVal::Map(merged, None),
                    ]));
                }
            }
        }

        Ok(ClovenVal::list(vec![
            ClovenVal::symbol(Symbol::new("with-meta")),
            target,
            ClovenVal::Map(meta, None),
        ]))
    }

    fn normalize_meta(&self, form: ClovenVal) -> Result<Meta> {
        match form {
            ClovenVal::Keyword(_) => {
                let mut map = Meta::new();
                map.insert(form, ClovenVal::bool(true));
                Ok(map)
            }
            ClovenVal::Symbol(..) => {
                let mut map = Meta::new();
                map.insert(
                    ClovenVal::keyword(Keyword::new("tag")),
                    form,
                );
                Ok(map)
            }
            ClovenVal::Map(map, _) => Ok(map),
            other => Err(self.error(format!(
                "metadata must be a keyword, symbol or map, got {}",
                other.type_name()
            ))),
        }
    }

    // ========================================================================
    // Dispatch (#) macros
    // ========================================================================

    fn read_dispatch(&mut self) -> Result<ClovenVal> {
        self.macro_prefix(); // the #
        match self.peek() {
            Some('\'') => {
                self.next_char();
                let form = self.read_form()?;
                match form {
                    ClovenVal::Symbol(..) => Ok(ClovenVal::list(vec![
                        ClovenVal::symbol(Symbol::new("var")),
                        form,
                    ])),
                    _ => Err(self.error("invalid var quote")),
                }
            }
            Some('"') => self.read_regex(),
            Some('{') => {
                self.open_delim();
                let items = self.read_until('}')?;
                let mut set = OrdSet::new();
                for item in items {
                    set.insert(item);
                }
                Ok(ClovenVal::set(set))
            }
            Some('(') => {
                self.open_delim();
                let items = self.read_until(')')?;
                Ok(build_short_fn(items))
            }
            Some('_') => {
                self.next_char();
                // Read and discard the next form
                self.read_form()?;
                Ok(ClovenVal::Void)
            }
            Some(other) => Err(self.error(format!("invalid dispatch macro #{}", other))),
            None => Err(self.error("unexpected EOF after #")),
        }
    }
}

// ============================================================================
// Short-form functions
// ============================================================================

/// Rewrite `#(...)` into `(fn* [%1 ... %N] (...))`, tracking the highest
/// `%N` referenced. A bare `%` reads as `%1`.
fn build_short_fn(items: Vec<ClovenVal>) -> ClovenVal {
    let mut max_arg = 0usize;
    let body = rewrite_percents(ClovenVal::list(items), &mut max_arg);
    let params: Vec<ClovenVal> = (1..=max_arg)
        .map(|i| ClovenVal::symbol(Symbol::new(&format!("%{}", i))))
        .collect();
    ClovenVal::list(vec![
        ClovenVal::symbol(Symbol::new("fn*")),
        ClovenVal::vector(params),
        body,
    ])
}

fn rewrite_percents(form: ClovenVal, max_arg: &mut usize) -> ClovenVal {
    match form {
        ClovenVal::Symbol(sym, meta) if !sym.has_namespace() => {
            if sym.name() == "%" {
                *max_arg = (*max_arg).max(1);
                return ClovenVal::Symbol(Symbol::new("%1"), meta);
            }
            if let Some(digits) = sym.name().strip_prefix('%') {
                if let Ok(n) = digits.parse::<usize>() {
                    if n >= 1 {
                        *max_arg = (*max_arg).max(n);
                    }
                }
            }
            ClovenVal::Symbol(sym, meta)
        }
        ClovenVal::List(list, meta) => {
            let items: Vec<ClovenVal> = list
                .iter()
                .map(|item| rewrite_percents(item.clone(), max_arg))
                .collect();
            ClovenVal::List(items.into_iter().collect(), meta)
        }
        ClovenVal::Vector(items, meta) => {
            let items: im::Vector<ClovenVal> = items
                .iter()
                .map(|item| rewrite_percents(item.clone(), max_arg))
                .collect();
            ClovenVal::Vector(items, meta)
        }
        ClovenVal::Map(map, meta) => {
            let mut out = OrdMap::new();
            for (k, v) in map.iter() {
                out.insert(
                    rewrite_percents(k.clone(), max_arg),
                    rewrite_percents(v.clone(), max_arg),
                );
            }
            ClovenVal::Map(out, meta)
        }
        ClovenVal::Set(set, meta) => {
            let mut out = OrdSet::new();
            for item in set.iter() {
                out.insert(rewrite_percents(item.clone(), max_arg));
            }
            ClovenVal::Set(out, meta)
        }
        other => other,
    }
}
