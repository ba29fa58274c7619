// cloven-vm - Error types for the Cloven interpreter
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Errors for reading, compiling and executing Cloven code.
//!
//! Four kinds compose through a uniform cause chain: reader errors (with
//! source position), compile errors, type errors and execution errors.
//! Each layer prints as a single line; layers are joined by "caused by".
//!
//! # Examples
//!
//! ```
//! use cloven_vm::Error;
//!
//! let err = Error::execution("invoke failed")
//!     .caused_by(Error::type_mismatch("string", "is not a function"));
//! let printed = err.to_string();
//! assert!(printed.contains("invoke failed"));
//! assert!(printed.contains("caused by"));
//! ```

use std::fmt;

/// Result type for Cloven operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An error raised while reading, compiling or executing Cloven code.
#[derive(Debug, Clone)]
pub enum Error {
    /// Reader error with source position.
    Reader {
        source_name: String,
        line: u32,
        column: u32,
        pos: usize,
        message: String,
        cause: Option<Box<Error>>,
    },
    /// Compile error.
    Compile {
        message: String,
        cause: Option<Box<Error>>,
    },
    /// Type error - an operation saw a value of the wrong type.
    Type {
        got: String,
        expected: Option<String>,
        message: String,
        cause: Option<Box<Error>>,
    },
    /// Execution error raised by the VM or a native function.
    Execution {
        message: String,
        cause: Option<Box<Error>>,
    },
}

impl Error {
    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Error::Execution {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a compile error.
    pub fn compile(message: impl Into<String>) -> Self {
        Error::Compile {
            message: message.into(),
            cause: None,
        }
    }

    /// Create a type error: the observed type and what went wrong.
    pub fn type_mismatch(got: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Type {
            got: got.into(),
            expected: None,
            message: message.into(),
            cause: None,
        }
    }

    /// Create a type error with an expected type.
    pub fn type_expected(
        got: impl Into<String>,
        message: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Error::Type {
            got: got.into(),
            expected: Some(expected.into()),
            message: message.into(),
            cause: None,
        }
    }

    /// Create a reader error with source position.
    pub fn reader(
        source_name: impl Into<String>,
        line: u32,
        column: u32,
        pos: usize,
        message: impl Into<String>,
    ) -> Self {
        Error::Reader {
            source_name: source_name.into(),
            line,
            column,
            pos,
            message: message.into(),
            cause: None,
        }
    }

    /// Create an arity error for a named callable.
    pub fn arity_named(name: &str, expected: usize, got: usize) -> Self {
        Error::execution(format!(
            "wrong number of arguments to '{}': expected {}, got {}",
            name, expected, got
        ))
    }

    /// Create an arity error for a callable expecting at least n arguments.
    pub fn arity_at_least(name: &str, expected: usize, got: usize) -> Self {
        Error::execution(format!(
            "wrong number of arguments to '{}': expected at least {}, got {}",
            name, expected, got
        ))
    }

    /// Attach a cause to this error, returning the wrapped error.
    #[must_use]
    pub fn caused_by(mut self, inner: Error) -> Self {
        match &mut self {
            Error::Reader { cause, .. }
            | Error::Compile { cause, .. }
            | Error::Type { cause, .. }
            | Error::Execution { cause, .. } => *cause = Some(Box::new(inner)),
        }
        self
    }

    /// The cause of this error, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Error> {
        match self {
            Error::Reader { cause, .. }
            | Error::Compile { cause, .. }
            | Error::Type { cause, .. }
            | Error::Execution { cause, .. } => cause.as_deref(),
        }
    }

    /// Format this error's own layer, without the cause chain.
    fn fmt_layer(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Reader {
                source_name,
                line,
                column,
                pos,
                message,
                ..
            } => write!(
                f,
                "ReaderError: {}:{}:{} (pos {}): {}",
                source_name, line, column, pos, message
            ),
            Error::Compile { message, .. } => write!(f, "CompileError: {}", message),
            Error::Type {
                got,
                expected,
                message,
                ..
            } => {
                write!(f, "TypeError: {} {}", got, message)?;
                if let Some(expected) = expected {
                    write!(f, " {}", expected)?;
                }
                Ok(())
            }
            Error::Execution { message, .. } => write!(f, "ExecutionError: {}", message),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_layer(f)?;
        let mut cause = self.cause();
        while let Some(e) = cause {
            write!(f, "\n\tcaused by ")?;
            e.fmt_layer(f)?;
            cause = e.cause();
        }
        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ============================================================================
// Tests
// ============================================================================
