//! The object codec: value graph to notation text and back.

use crate::decode::Decoder;
use crate::encode::Encoder;
use crate::link::{self, Link};
use crate::{CodecOptions, Result, Value};
use tracing::debug;

/// Encodes and decodes value graphs as links notation.
///
/// The codec itself holds only options. Reference ids are scoped to a single
/// call, so one codec can be shared freely between unrelated graphs.
///
/// # Examples
///
/// ```rust
/// use lino_codec::{ObjectCodec, Value};
///
/// let codec = ObjectCodec::new();
/// let shared = Value::list(vec![Value::from(1)]);
/// let graph = Value::list(vec![shared.clone(), shared]);
///
/// let text = codec.encode(&graph).unwrap();
/// assert_eq!(text, "(list obj_0 (list obj_1 (int 1)) (ref obj_1))");
///
/// let back = codec.decode(&text).unwrap();
/// let items = back.as_list().unwrap().borrow();
/// assert!(items[0].ptr_eq(&items[1]));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ObjectCodec {
    options: CodecOptions,
}

impl ObjectCodec {
    /// Creates a codec with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: CodecOptions) -> Self {
        ObjectCodec { options }
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Encodes a value graph to a single line of notation.
    ///
    /// # Errors
    ///
    /// [`Error::DepthLimitExceeded`](crate::Error::DepthLimitExceeded) when the
    /// graph nests deeper than the configured limit.
    pub fn encode(&self, value: &Value) -> Result<String> {
        let link = self.encode_link(value)?;
        Ok(link::format_links(std::slice::from_ref(&link)))
    }

    /// Encodes a value graph to its link tree without formatting it.
    pub fn encode_link(&self, value: &Value) -> Result<Link> {
        let (link, assigned) = Encoder::new(&self.options).encode(value)?;
        debug!(kind = value.type_name(), assigned, "encoded value graph");
        Ok(link)
    }

    /// Decodes notation text back into a value graph.
    ///
    /// Only the first top-level link is decoded. Blank input decodes to
    /// [`Value::None`].
    ///
    /// # Errors
    ///
    /// Syntax errors in the text, unknown type markers, references to ids
    /// that were never defined and unparseable numeric literals. With
    /// `max_depth` set, text nested too deeply for that many containers is
    /// refused before it is parsed.
    pub fn decode(&self, text: &str) -> Result<Value> {
        let links = link::parse_bounded(text, self.options.max_depth)?;
        match links.first() {
            Some(first) => {
                if links.len() > 1 {
                    debug!(ignored = links.len() - 1, "decoding first top-level link only");
                }
                self.decode_link(first)
            }
            None => Ok(Value::None),
        }
    }

    /// Decodes an already parsed link tree.
    pub fn decode_link(&self, link: &Link) -> Result<Value> {
        let (value, registered) = Decoder::new(&self.options).decode(link)?;
        debug!(kind = value.type_name(), registered, "decoded value graph");
        Ok(value)
    }
}
