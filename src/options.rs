//! Configuration options for the codec.
//!
//! ## Examples
//!
//! ```rust
//! use lino_codec::{CodecOptions, ObjectCodec, Value};
//!
//! // Refuse graphs nested deeper than 64 containers
//! let codec = ObjectCodec::with_options(CodecOptions::new().with_max_depth(64));
//! let text = codec.encode(&Value::list(vec![Value::from(1)])).unwrap();
//!
//! // Treat malformed string payloads as errors
//! let strict = ObjectCodec::with_options(CodecOptions::new().with_strict_strings(true));
//! assert!(strict.decode("(str %%%)").is_err());
//! ```

/// Configuration options for encoding and decoding.
///
/// The defaults reproduce the reference behavior: unbounded nesting and the
/// lenient string fallback.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodecOptions {
    /// Deepest container nesting accepted, `None` for no limit.
    pub max_depth: Option<usize>,
    /// Reject `str` payloads that are not base64-encoded UTF-8 instead of
    /// returning the raw token.
    pub strict_strings: bool,
}

impl CodecOptions {
    /// Creates default options (no depth limit, lenient strings).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_codec::CodecOptions;
    ///
    /// let options = CodecOptions::new();
    /// assert_eq!(options.max_depth, None);
    /// assert!(!options.strict_strings);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum container nesting depth.
    ///
    /// The outermost container is at depth 1; scalars do not count.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    #[must_use]
    pub fn with_strict_strings(mut self, strict: bool) -> Self {
        self.strict_strings = strict;
        self
    }
}
