//! Link tree to value graph.
//!
//! Containers are registered under their reference id before any child is
//! decoded, so a `(ref obj_N)` inside `obj_N` itself resolves to the container
//! still being filled. That is what rebuilds cycles.

use crate::link::Link;
use crate::registry::DecodeRegistry;
use crate::tag::TypeTag;
use crate::{CodecOptions, Error, LinoMap, Result, Value};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{trace, warn};

pub(crate) struct Decoder<'o> {
    registry: DecodeRegistry,
    options: &'o CodecOptions,
    depth: usize,
}

impl<'o> Decoder<'o> {
    pub(crate) fn new(options: &'o CodecOptions) -> Self {
        Decoder {
            registry: DecodeRegistry::new(),
            options,
            depth: 0,
        }
    }

    /// Decodes one tree, consuming the decoder so its registry dies with the call.
    pub(crate) fn decode(mut self, link: &Link) -> Result<(Value, usize)> {
        let value = self.decode_link(link)?;
        Ok((value, self.registry.len()))
    }

    fn decode_link(&mut self, link: &Link) -> Result<Value> {
        if link.values.is_empty() {
            // A bare identifier stands for itself
            return Ok(link.id.clone().map_or(Value::None, Value::Str));
        }

        let Some(marker) = link.first_id().filter(|m| !m.is_empty()) else {
            return Ok(Value::None);
        };
        let tag = TypeTag::parse(marker).ok_or_else(|| Error::unknown_type_marker(marker))?;

        match tag {
            TypeTag::None => Ok(Value::None),
            TypeTag::Bool => Ok(Value::Bool(link.child_id(1) == Some("True"))),
            TypeTag::Int => match payload(link, tag)? {
                Some(token) => token
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| Error::invalid_literal(tag.as_str(), token)),
                None => Ok(Value::Int(0)),
            },
            TypeTag::Float => match payload(link, tag)? {
                Some(token) => parse_float(token).map(Value::Float),
                None => Ok(Value::Float(0.0)),
            },
            TypeTag::Str => match link.values.get(1) {
                Some(child) => self.decode_str(child),
                None => Ok(Value::Str(String::new())),
            },
            TypeTag::Ref => {
                let id = link.child_id(1).unwrap_or_default();
                let target = self.registry.resolve(id)?;
                trace!(id, "resolved reference");
                Ok(target)
            }
            TypeTag::List => self.decode_list(link),
            TypeTag::Dict => self.decode_dict(link),
        }
    }

    fn decode_str(&self, child: &Link) -> Result<Value> {
        let token = child.id.as_deref();
        let text = token
            .and_then(|t| BASE64.decode(t).ok())
            .and_then(|bytes| String::from_utf8(bytes).ok());

        match (text, token) {
            (Some(text), _) => Ok(Value::Str(text)),
            (None, token) if self.options.strict_strings => {
                Err(Error::InvalidBase64(token.unwrap_or_default().to_string()))
            }
            (None, Some(token)) => {
                warn!(token, "str payload is not base64 UTF-8, keeping the raw token");
                Ok(Value::Str(token.to_string()))
            }
            (None, None) => {
                warn!("str payload is a group, decoding as None");
                Ok(Value::None)
            }
        }
    }

    fn decode_list(&mut self, link: &Link) -> Result<Value> {
        let handle = Rc::new(RefCell::new(Vec::new()));
        let list = Value::List(handle.clone());
        if link.values.len() < 2 {
            return Ok(list);
        }

        self.open()?;
        self.register(link, &list);
        for child in &link.values[2..] {
            let item = self.decode_link(child)?;
            handle.borrow_mut().push(item);
        }
        self.close();
        Ok(list)
    }

    fn decode_dict(&mut self, link: &Link) -> Result<Value> {
        let handle = Rc::new(RefCell::new(LinoMap::new()));
        let dict = Value::Dict(handle.clone());
        if link.values.len() < 2 {
            return Ok(dict);
        }

        self.open()?;
        self.register(link, &dict);
        for entry in &link.values[2..] {
            // entries that are not (key value) pairs are skipped
            if entry.values.len() < 2 {
                continue;
            }
            let key = self.decode_link(&entry.values[0])?;
            let value = self.decode_link(&entry.values[1])?;
            handle.borrow_mut().insert(key, value);
        }
        self.close();
        Ok(dict)
    }

    fn register(&mut self, link: &Link, container: &Value) {
        if let Some(id) = link.child_id(1).filter(|id| !id.is_empty()) {
            self.registry.register(id, container);
        }
    }

    fn open(&mut self) -> Result<()> {
        if let Some(limit) = self.options.max_depth {
            if self.depth >= limit {
                return Err(Error::DepthLimitExceeded { limit });
            }
        }
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.depth -= 1;
    }
}

/// The identifier of the second child; a group there is not a literal.
fn payload(link: &Link, tag: TypeTag) -> Result<Option<&str>> {
    match link.values.get(1) {
        None => Ok(None),
        Some(child) => match &child.id {
            Some(token) if child.is_leaf() => Ok(Some(token.as_str())),
            _ => Err(Error::invalid_literal(tag.as_str(), "<group>")),
        },
    }
}

fn parse_float(token: &str) -> Result<f64> {
    match token {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => token
            .parse::<f64>()
            .map_err(|_| Error::invalid_literal(TypeTag::Float.as_str(), token)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::parse;

    fn decode_text(text: &str) -> Result<Value> {
        let options = CodecOptions::default();
        let links = parse(text)?;
        Decoder::new(&options).decode(&links[0]).map(|(value, _)| value)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode_text("(None)").unwrap(), Value::None);
        assert_eq!(decode_text("(bool True)").unwrap(), Value::Bool(true));
        assert_eq!(decode_text("(bool yes)").unwrap(), Value::Bool(false));
        assert_eq!(decode_text("(int -5)").unwrap(), Value::Int(-5));
        assert_eq!(decode_text("(float 1e3)").unwrap(), Value::Float(1000.0));
        assert_eq!(decode_text("(str aGk=)").unwrap(), Value::from("hi"));
    }

    #[test]
    fn test_missing_payload_defaults() {
        assert_eq!(decode_text("(bool)").unwrap(), Value::Bool(false));
        assert_eq!(decode_text("(int)").unwrap(), Value::Int(0));
        assert_eq!(decode_text("(float)").unwrap(), Value::Float(0.0));
        assert_eq!(decode_text("(str)").unwrap(), Value::from(""));
        assert_eq!(decode_text("(list)").unwrap(), Value::list(vec![]));
        assert_eq!(decode_text("(dict)").unwrap(), Value::dict(LinoMap::new()));
    }

    #[test]
    fn test_bare_and_empty_links() {
        assert_eq!(decode_text("hello").unwrap(), Value::from("hello"));
        assert_eq!(decode_text("()").unwrap(), Value::None);
        assert_eq!(decode_text("((int 1) 2)").unwrap(), Value::None);
    }

    #[test]
    fn test_invalid_literals() {
        assert_eq!(
            decode_text("(int 1.5)").unwrap_err(),
            Error::invalid_literal("int", "1.5")
        );
        assert_eq!(
            decode_text("(float abc)").unwrap_err(),
            Error::invalid_literal("float", "abc")
        );
        assert!(matches!(
            decode_text("(int (1))"),
            Err(Error::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_string_fallback_keeps_raw_token() {
        assert_eq!(decode_text("(str not-base64!)").unwrap(), Value::from("not-base64!"));
        // valid base64, but the bytes are not UTF-8
        assert_eq!(decode_text("(str //79)").unwrap(), Value::from("//79"));
    }

    #[test]
    fn test_strict_strings() {
        let options = CodecOptions::new().with_strict_strings(true);
        let links = parse("(str not-base64!)").unwrap();
        assert_eq!(
            Decoder::new(&options).decode(&links[0]).unwrap_err(),
            Error::InvalidBase64("not-base64!".to_string())
        );
    }

    #[test]
    fn test_forward_reference_into_open_container() {
        let value = decode_text("(list obj_0 (int 1) (ref obj_0))").unwrap();
        let items = value.as_list().unwrap().borrow().clone();
        assert_eq!(items.len(), 2);
        assert!(items[1].ptr_eq(&value));
        value.as_list().unwrap().borrow_mut().clear();
    }

    #[test]
    fn test_unknown_reference() {
        assert_eq!(
            decode_text("(list obj_0 (ref obj_1))").unwrap_err(),
            Error::UnknownReference("obj_1".to_string())
        );
        assert_eq!(
            decode_text("(ref)").unwrap_err(),
            Error::UnknownReference(String::new())
        );
    }

    #[test]
    fn test_dict_skips_malformed_entries() {
        let value = decode_text("(dict obj_0 ((str YQ==) (int 1)) lonely ((str Yg==)))").unwrap();
        let dict = value.as_dict().unwrap().borrow();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get_str("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_decode_depth_limit() {
        let options = CodecOptions::new().with_max_depth(1);
        let links = parse("(list obj_0 (list obj_1))").unwrap();
        assert_eq!(
            Decoder::new(&options).decode(&links[0]).unwrap_err(),
            Error::DepthLimitExceeded { limit: 1 }
        );
    }
}
