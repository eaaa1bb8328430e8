//! Serde bridge into [`Value`].
//!
//! [`ValueSerializer`] turns any `T: Serialize` into a value tree that the
//! object codec can encode. The mapping is:
//!
//! - `bool`, integers that fit in `i64`, floats, `char` and strings map to
//!   the matching scalar.
//! - `Option::None`, `()` and unit structs become [`Value::None`].
//! - Sequences, tuples and tuple structs become lists.
//! - Maps and structs become dicts; map keys may be any value.
//! - Unit variants become their name as a string. Newtype, tuple and struct
//!   variants become a single-entry dict `{variant: payload}`.
//!
//! Byte buffers and integers outside the `i64` range have no counterpart in
//! the value model and fail with [`Error::UnsupportedType`].
//!
//! ```rust
//! use lino_codec::{to_value, Value};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! enum Shape { Circle(f64) }
//!
//! let value = to_value(&Shape::Circle(1.5)).unwrap();
//! let dict = value.as_dict().unwrap().borrow();
//! assert_eq!(dict.get_str("Circle"), Some(&Value::Float(1.5)));
//! ```

use crate::{Error, LinoMap, Result, Value};
use serde::{ser, Serialize};

/// Serializer whose output is a [`Value`] tree.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
}

pub struct SerializeTupleVariant {
    name: &'static str,
    vec: Vec<Value>,
}

pub struct SerializeMap {
    map: LinoMap,
    next_key: Option<Value>,
}

pub struct SerializeStructVariant {
    name: &'static str,
    map: LinoMap,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| Error::unsupported_type(&format!("integer {} is outside the i64 range", v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Int(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| Error::unsupported_type(&format!("integer {} is outside the i64 range", v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value> {
        i64::try_from(v)
            .map(Value::Int)
            .map_err(|_| Error::unsupported_type(&format!("integer {} is outside the i64 range", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Err(Error::unsupported_type(&format!("byte buffer of length {}", v.len())))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::None)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::None)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::None)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::Str(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(single_entry(variant, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            name: variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            name: variant,
            map: LinoMap::with_capacity(len),
        })
    }
}

impl SerializeVec {
    fn new(capacity: usize) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
        }
    }
}

impl SerializeMap {
    fn new(capacity: usize) -> Self {
        SerializeMap {
            map: LinoMap::with_capacity(capacity),
            next_key: None,
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::list(self.vec))
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(single_entry(self.name, Value::list(self.vec)))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.next_key = Some(to_value(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::dict(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(Value::from(key), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(Value::dict(self.map))
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(Value::from(key), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        Ok(single_entry(self.name, Value::dict(self.map)))
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

fn single_entry(variant: &str, payload: Value) -> Value {
    let mut map = LinoMap::with_capacity(1);
    map.insert(Value::from(variant), payload);
    Value::dict(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct User {
        id: u32,
        name: String,
        tags: Vec<String>,
        manager: Option<String>,
    }

    #[derive(Serialize)]
    enum Event {
        Ping,
        Move(i32, i32),
        Rename { from: String, to: String },
    }

    #[test]
    fn test_struct_becomes_dict() {
        let user = User {
            id: 7,
            name: "Ada".to_string(),
            tags: vec!["admin".to_string()],
            manager: None,
        };
        let value = to_value(&user).unwrap();
        let dict = value.as_dict().unwrap().borrow();

        let keys: Vec<_> = dict.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["id", "name", "tags", "manager"]);
        assert_eq!(dict.get_str("id"), Some(&Value::Int(7)));
        assert_eq!(dict.get_str("manager"), Some(&Value::None));
        assert_eq!(
            dict.get_str("tags"),
            Some(&Value::list(vec![Value::from("admin")]))
        );
    }

    #[test]
    fn test_enum_variants() {
        assert_eq!(to_value(&Event::Ping).unwrap(), Value::from("Ping"));

        let moved = to_value(&Event::Move(1, -2)).unwrap();
        let dict = moved.as_dict().unwrap().borrow();
        assert_eq!(dict.len(), 1);
        assert_eq!(
            dict.get_str("Move"),
            Some(&Value::list(vec![Value::Int(1), Value::Int(-2)]))
        );
        drop(dict);

        let renamed = to_value(&Event::Rename {
            from: "a".to_string(),
            to: "b".to_string(),
        })
        .unwrap();
        let inner = renamed.as_dict().unwrap().borrow().get_str("Rename").cloned();
        let inner = inner.unwrap();
        assert_eq!(
            inner.as_dict().unwrap().borrow().get_str("to"),
            Some(&Value::from("b"))
        );
    }

    #[test]
    fn test_non_string_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(1, "one");
        map.insert(2, "two");
        let value = to_value(&map).unwrap();
        let dict = value.as_dict().unwrap().borrow();
        assert_eq!(dict.get(&Value::Int(2)), Some(&Value::from("two")));
    }

    #[test]
    fn test_unsupported_types() {
        assert!(matches!(
            to_value(&u64::MAX),
            Err(Error::UnsupportedType(_))
        ));
        assert!(matches!(
            to_value(&i128::MIN),
            Err(Error::UnsupportedType(_))
        ));
        assert_eq!(to_value(&42u128).unwrap(), Value::Int(42));

        struct Blob;
        impl Serialize for Blob {
            fn serialize<S: ser::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
                s.serialize_bytes(&[1, 2, 3])
            }
        }
        assert_eq!(
            to_value(&Blob).unwrap_err(),
            Error::UnsupportedType("byte buffer of length 3".to_string())
        );
    }
}
