//! Error types for encoding and decoding.
//!
//! Every fatal condition aborts the whole call: an encode that fails returns
//! no text, a decode that fails returns no partial graph.
//!
//! ## Error Categories
//!
//! - **Encode**: [`Error::UnsupportedType`], [`Error::DepthLimitExceeded`]
//! - **Decode**: [`Error::UnknownTypeMarker`], [`Error::UnknownReference`],
//!   [`Error::InvalidLiteral`], [`Error::InvalidBase64`] (strict mode only)
//! - **Notation**: [`Error::Syntax`] with line and column information,
//!   [`Error::Notation`] for other parser rejections
//! - **Bridge**: [`Error::CyclicGraph`] when a graph cannot become a tree type
//!
//! ## Examples
//!
//! ```rust
//! use lino_codec::{decode, Error};
//!
//! let err = decode("(bogus 1)").unwrap_err();
//! assert!(matches!(err, Error::UnknownTypeMarker(ref tag) if tag == "bogus"));
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised by the codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// Malformed notation text
    #[error("Syntax error at line {line}, column {col}: {msg}")]
    Syntax { line: usize, col: usize, msg: String },

    /// The links notation parser rejected the text
    #[error("Links notation error: {0}")]
    Notation(String),

    /// A native value has no counterpart in the value model
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// A link carries a type tag the decoder does not know
    #[error("Unknown type marker: {0}")]
    UnknownTypeMarker(String),

    /// A `ref` link names an id that was never registered
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    /// The payload of an `int` or `float` link does not parse
    #[error("Invalid {tag} literal: {token:?}")]
    InvalidLiteral { tag: String, token: String },

    /// The payload of a `str` link is not base64-encoded UTF-8
    #[error("Invalid base64 string payload: {0:?}")]
    InvalidBase64(String),

    /// Nesting went past the configured `max_depth`
    #[error("Nesting depth exceeds the configured limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// A cyclic graph was handed to a consumer that needs a tree
    #[error("Cyclic value graph cannot be converted: {0}")]
    CyclicGraph(String),

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

impl Error {
    /// Creates a syntax error with line and column information.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_codec::Error;
    ///
    /// let err = Error::syntax(10, 5, "unexpected ')'");
    /// assert!(err.to_string().contains("line 10"));
    /// ```
    pub fn syntax(line: usize, col: usize, msg: &str) -> Self {
        Error::Syntax {
            line,
            col,
            msg: msg.to_string(),
        }
    }

    /// Creates an unsupported type error for values the model cannot carry.
    pub fn unsupported_type(msg: &str) -> Self {
        Error::UnsupportedType(msg.to_string())
    }

    pub fn unknown_type_marker(tag: &str) -> Self {
        Error::UnknownTypeMarker(tag.to_string())
    }

    pub fn unknown_reference(id: &str) -> Self {
        Error::UnknownReference(id.to_string())
    }

    /// Creates an error for an `int`/`float` payload that does not parse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_codec::Error;
    ///
    /// let err = Error::invalid_literal("int", "12x");
    /// assert!(err.to_string().contains("int"));
    /// ```
    pub fn invalid_literal(tag: &str, token: &str) -> Self {
        Error::InvalidLiteral {
            tag: tag.to_string(),
            token: token.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    pub fn notation<T: fmt::Display>(msg: T) -> Self {
        Error::Notation(msg.to_string())
    }

    /// Creates an I/O error for reading/writing failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::unknown_type_marker("bogus").to_string(),
            "Unknown type marker: bogus"
        );
        assert_eq!(
            Error::unknown_reference("obj_7").to_string(),
            "Unknown reference: obj_7"
        );
        assert_eq!(
            Error::invalid_literal("float", "1.2.3").to_string(),
            "Invalid float literal: \"1.2.3\""
        );
        assert_eq!(
            Error::DepthLimitExceeded { limit: 4 }.to_string(),
            "Nesting depth exceeds the configured limit of 4"
        );
    }

    #[test]
    fn test_serde_custom() {
        let err = <Error as serde::de::Error>::custom("boom");
        assert_eq!(err, Error::Custom("boom".to_string()));
    }
}
