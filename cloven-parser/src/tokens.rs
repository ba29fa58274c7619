// cloven-parser - Advisory token stream
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Advisory tokens for editor syntax highlighting.
//!
//! The reader records byte spans as it consumes input. Tokens never
//! affect the parsed output; a highlighting adaptor may read them after
//! each `read` call.

/// What a highlighted span is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Opening delimiter of a collection.
    Open,
    /// Closing delimiter of a collection.
    Close,
    /// String literal.
    String,
    /// Number literal.
    Number,
    /// Keyword.
    Keyword,
    /// Symbol.
    Symbol,
    /// Character literal.
    Char,
    /// Line or form comment.
    Comment,
    /// Regex literal.
    Regex,
    /// Reader macro prefix (quote, deref, syntax-quote, unquote, meta).
    Macro,
}

/// A highlighted span: byte positions into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub end: usize,
    pub kind: TokenKind,
}

impl Token {
    /// Create a token over `[start, end)`.
    #[must_use]
    pub fn new(start: usize, end: usize, kind: TokenKind) -> Self {
        Token { start, end, kind }
    }
}
