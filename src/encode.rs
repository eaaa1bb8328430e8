//! Value graph to link tree.
//!
//! The walk is pre-order. Each container gets its reference id the first time
//! it is met; any later meeting, whether through sharing or through a cycle,
//! becomes a `(ref obj_N)` link instead of a second copy.
//!
//! | Value | Link |
//! |---|---|
//! | `None` | `(None)` |
//! | `Bool` | `(bool True)` / `(bool False)` |
//! | `Int` | `(int 42)` |
//! | `Float` | `(float 2.5)`, `(float NaN)`, `(float Infinity)`, `(float -Infinity)` |
//! | `Str` | `(str <base64 of UTF-8>)`, or `(str)` when empty |
//! | `List` | `(list obj_N item...)` |
//! | `Dict` | `(dict obj_N (key value)...)` |
//! | seen container | `(ref obj_N)` |

use crate::link::Link;
use crate::registry::EncodeRegistry;
use crate::tag::TypeTag;
use crate::value::identity_of;
use crate::{CodecOptions, Error, Result, Value};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::trace;

pub(crate) struct Encoder<'o> {
    registry: EncodeRegistry,
    options: &'o CodecOptions,
    depth: usize,
}

impl<'o> Encoder<'o> {
    pub(crate) fn new(options: &'o CodecOptions) -> Self {
        Encoder {
            registry: EncodeRegistry::new(),
            options,
            depth: 0,
        }
    }

    /// Encodes one graph, consuming the encoder so its registry dies with the call.
    pub(crate) fn encode(mut self, value: &Value) -> Result<(Link, usize)> {
        let link = self.encode_value(value)?;
        Ok((link, self.registry.assigned()))
    }

    fn encode_value(&mut self, value: &Value) -> Result<Link> {
        match value {
            Value::None => Ok(Link::group(vec![tag(TypeTag::None)])),
            Value::Bool(b) => Ok(scalar(TypeTag::Bool, if *b { "True" } else { "False" })),
            Value::Int(i) => Ok(scalar(TypeTag::Int, &i.to_string())),
            Value::Float(f) => Ok(scalar(TypeTag::Float, &format_float(*f))),
            // an empty payload has no bare token, and a missing one decodes to ""
            Value::Str(s) if s.is_empty() => Ok(Link::group(vec![tag(TypeTag::Str)])),
            Value::Str(s) => Ok(scalar(TypeTag::Str, &BASE64.encode(s.as_bytes()))),
            Value::List(list) => {
                let identity = identity_of(list);
                if let Some(link) = self.back_reference(identity) {
                    return Ok(link);
                }
                let id = self.open(identity)?;
                let items = list.borrow();
                let mut values = Vec::with_capacity(items.len() + 2);
                values.push(tag(TypeTag::List));
                values.push(Link::leaf(id));
                for item in items.iter() {
                    values.push(self.encode_value(item)?);
                }
                self.close(identity);
                Ok(Link::group(values))
            }
            Value::Dict(dict) => {
                let identity = identity_of(dict);
                if let Some(link) = self.back_reference(identity) {
                    return Ok(link);
                }
                let id = self.open(identity)?;
                let entries = dict.borrow();
                let mut values = Vec::with_capacity(entries.len() + 2);
                values.push(tag(TypeTag::Dict));
                values.push(Link::leaf(id));
                for (key, item) in entries.iter() {
                    let key = self.encode_value(key)?;
                    let item = self.encode_value(item)?;
                    values.push(Link::group(vec![key, item]));
                }
                self.close(identity);
                Ok(Link::group(values))
            }
        }
    }

    /// A `ref` link for a container met before in this call, if it was.
    fn back_reference(&self, identity: usize) -> Option<Link> {
        let id = self.registry.lookup(identity)?;
        if self.registry.on_path(identity) {
            trace!(id, "cycle through open container, emitting reference");
        } else {
            trace!(id, "shared container, emitting reference");
        }
        Some(scalar(TypeTag::Ref, id))
    }

    fn open(&mut self, identity: usize) -> Result<String> {
        if let Some(limit) = self.options.max_depth {
            if self.depth >= limit {
                return Err(Error::DepthLimitExceeded { limit });
            }
        }
        self.depth += 1;
        let id = self.registry.assign(identity);
        self.registry.enter(identity);
        Ok(id)
    }

    fn close(&mut self, identity: usize) {
        self.registry.leave(identity);
        self.depth -= 1;
    }
}

#[inline]
fn tag(tag: TypeTag) -> Link {
    Link::leaf(tag.as_str())
}

#[inline]
fn scalar(type_tag: TypeTag, payload: &str) -> Link {
    Link::group(vec![tag(type_tag), Link::leaf(payload)])
}

/// Shortest round-trip form, always with a `.` or exponent; specials by name.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{:?}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::format_link;
    use crate::LinoMap;

    fn encode_text(value: &Value) -> String {
        let options = CodecOptions::default();
        let (link, _) = Encoder::new(&options).encode(value).unwrap();
        format_link(&link)
    }

    #[test]
    fn test_scalar_shapes() {
        assert_eq!(encode_text(&Value::None), "(None)");
        assert_eq!(encode_text(&Value::from(true)), "(bool True)");
        assert_eq!(encode_text(&Value::from(false)), "(bool False)");
        assert_eq!(encode_text(&Value::from(-17)), "(int -17)");
        assert_eq!(encode_text(&Value::from(2.5)), "(float 2.5)");
        assert_eq!(encode_text(&Value::from("a")), "(str YQ==)");
        assert_eq!(encode_text(&Value::from("")), "(str)");
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(1e20), "1e20");
        assert_eq!(format_float(f64::NAN), "NaN");
        assert_eq!(format_float(f64::INFINITY), "Infinity");
        assert_eq!(format_float(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_container_ids_follow_preorder() {
        let inner = Value::list(vec![Value::from(1)]);
        let mut map = LinoMap::new();
        map.insert(Value::from("a"), inner);
        map.insert(Value::from("b"), Value::list(vec![]));

        assert_eq!(
            encode_text(&Value::dict(map)),
            "(dict obj_0 ((str YQ==) (list obj_1 (int 1))) ((str Yg==) (list obj_2)))"
        );
    }

    #[test]
    fn test_shared_container_becomes_reference() {
        let shared = Value::list(vec![Value::from(1), Value::from(2)]);
        let outer = Value::list(vec![shared.clone(), shared]);
        assert_eq!(
            encode_text(&outer),
            "(list obj_0 (list obj_1 (int 1) (int 2)) (ref obj_1))"
        );
    }

    #[test]
    fn test_self_cycle_terminates() {
        let a = Value::list(vec![]);
        a.as_list().unwrap().borrow_mut().push(a.clone());
        assert_eq!(encode_text(&a), "(list obj_0 (ref obj_0))");
        a.as_list().unwrap().borrow_mut().clear();
    }

    #[test]
    fn test_counter_reports_assigned_ids() {
        let options = CodecOptions::default();
        let value = Value::list(vec![Value::list(vec![]), Value::from(1)]);
        let (_, assigned) = Encoder::new(&options).encode(&value).unwrap();
        assert_eq!(assigned, 2);
    }

    #[test]
    fn test_depth_limit() {
        let options = CodecOptions::new().with_max_depth(2);
        let nested = Value::list(vec![Value::list(vec![Value::list(vec![])])]);
        assert_eq!(
            Encoder::new(&options).encode(&nested).unwrap_err(),
            Error::DepthLimitExceeded { limit: 2 }
        );

        let shallow = Value::list(vec![Value::list(vec![Value::from(1)])]);
        assert!(Encoder::new(&options).encode(&shallow).is_ok());
    }
}
