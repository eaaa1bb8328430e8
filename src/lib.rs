//! # lino_codec
//!
//! Encode and decode object graphs as Links Notation (LiNo).
//!
//! ## What is encoded?
//!
//! A [`Value`] graph built from `None`, booleans, 64-bit integers, floats,
//! strings, lists and dicts. Lists and dicts are reference-counted handles, so
//! one container can appear in several places, or inside itself. The encoder
//! writes such a container once, names it `obj_N` and refers back to it with
//! `(ref obj_N)`; the decoder rebuilds the same sharing and the same cycles.
//!
//! ## Key Features
//!
//! - **Identity preserving**: shared sub-objects stay shared, cycles stay cycles
//! - **Text safe strings**: every string travels as base64 of its UTF-8 bytes
//! - **Exact floats**: shortest round-trip formatting, plus `NaN` and infinities
//! - **Serde bridge**: any `T: Serialize` encodes, any `T: Deserialize` decodes
//!
//! ## Quick Start
//!
//! ```rust
//! use lino_codec::{decode, encode, lino};
//!
//! let value = lino!({ "name": "Alice", "scores": [1, 2.5] });
//! let text = encode(&value).unwrap();
//! assert_eq!(
//!     text,
//!     "(dict obj_0 ((str bmFtZQ==) (str QWxpY2U=)) ((str c2NvcmVz) (list obj_1 (int 1) (float 2.5))))"
//! );
//! assert_eq!(decode(&text).unwrap(), value);
//! ```
//!
//! ### Shared and cyclic graphs
//!
//! ```rust
//! use lino_codec::{decode, encode, Value};
//!
//! let node = Value::list(vec![Value::from(1)]);
//! node.as_list().unwrap().borrow_mut().push(node.clone());
//!
//! let text = encode(&node).unwrap();
//! assert_eq!(text, "(list obj_0 (int 1) (ref obj_0))");
//!
//! let back = decode(&text).unwrap();
//! let second = back.as_list().unwrap().borrow()[1].clone();
//! assert!(second.ptr_eq(&back));
//! # back.as_list().unwrap().borrow_mut().clear();
//! # node.as_list().unwrap().borrow_mut().clear();
//! ```
//!
//! ### Rust types
//!
//! ```rust
//! use lino_codec::{from_str, to_string};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Point { x: i32, y: i32 }
//!
//! let text = to_string(&Point { x: 1, y: 2 }).unwrap();
//! let back: Point = from_str(&text).unwrap();
//! assert_eq!(back, Point { x: 1, y: 2 });
//! ```
//!
//! ## Memory
//!
//! Containers are `Rc<RefCell<..>>`. A decoded cycle is a reference cycle and
//! will not be freed until one of its edges is removed.

mod codec;
pub mod de;
mod decode;
mod encode;
pub mod error;
pub mod link;
pub mod macros;
pub mod map;
pub mod options;
pub mod registry;
pub mod ser;
pub mod tag;
pub mod value;

pub use codec::ObjectCodec;
pub use de::{from_value, ValueDeserializer};
pub use error::{Error, Result};
pub use link::Link;
pub use map::{LinoMap, MapKey};
pub use options::CodecOptions;
pub use ser::ValueSerializer;
pub use tag::TypeTag;
pub use value::{Dict, List, Value};

use serde::{de::DeserializeOwned, Serialize};
use std::io;

/// Encodes a value graph with default options.
///
/// # Examples
///
/// ```rust
/// use lino_codec::{encode, Value};
///
/// assert_eq!(encode(&Value::from(true)).unwrap(), "(bool True)");
/// ```
///
/// # Errors
///
/// Never fails with default options; see [`ObjectCodec::encode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn encode(value: &Value) -> Result<String> {
    ObjectCodec::new().encode(value)
}

/// Decodes notation text with default options.
///
/// # Errors
///
/// See [`ObjectCodec::decode`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn decode(text: &str) -> Result<Value> {
    ObjectCodec::new().decode(text)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use lino_codec::{to_value, Value};
///
/// let value = to_value(&vec![1, 2]).unwrap();
/// assert_eq!(value, Value::list(vec![Value::Int(1), Value::Int(2)]));
/// ```
///
/// # Errors
///
/// [`Error::UnsupportedType`] for byte buffers and integers outside `i64`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer)
}

/// Serialize any `T: Serialize` to notation text.
///
/// # Errors
///
/// Returns an error if the value cannot be represented, see [`to_value`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    encode(&to_value(value)?)
}

/// Serialize any `T: Serialize` to a writer as notation text.
///
/// # Examples
///
/// ```rust
/// use lino_codec::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &Some(7)).unwrap();
/// assert_eq!(buffer, b"(int 7)");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string(value)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from notation text.
///
/// # Examples
///
/// ```rust
/// use lino_codec::from_str;
///
/// let words: Vec<String> = from_str("(list obj_0 (str aGk=) (str eW8=))").unwrap();
/// assert_eq!(words, vec!["hi", "yo"]);
/// ```
///
/// # Errors
///
/// Any decode error, [`Error::CyclicGraph`] for self-referencing input, or a
/// shape mismatch with `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T>(s: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_value(decode(s)?)
}

/// Deserialize an instance of type `T` from bytes of notation text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, or as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T>(v: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Deserialize an instance of type `T` from an I/O stream of notation text.
///
/// # Errors
///
/// Returns an error if reading from the reader fails, or as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}
