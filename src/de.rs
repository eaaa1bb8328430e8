//! Serde bridge out of [`Value`].
//!
//! [`ValueDeserializer`] drives any `T: Deserialize` from a decoded value
//! graph. It mirrors the mapping used by [`ValueSerializer`](crate::ser::ValueSerializer):
//! lists feed sequences, dicts feed maps and structs, strings name unit
//! variants and single-entry dicts carry data-bearing variants.
//!
//! Rust data types are trees, so shared containers are copied once per
//! occurrence and cyclic graphs are refused up front with
//! [`Error::CyclicGraph`].
//!
//! ```rust
//! use lino_codec::{decode, from_value};
//!
//! let value = decode("(list obj_0 (int 1) (int 2))").unwrap();
//! let numbers: Vec<u8> = from_value(value).unwrap();
//! assert_eq!(numbers, vec![1, 2]);
//! ```

use crate::{Error, LinoMap, Result, Value};
use serde::de;
use serde::forward_to_deserialize_any;

/// Deserializer reading from an owned [`Value`].
pub struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub fn new(value: Value) -> Self {
        ValueDeserializer { value }
    }
}

/// Deserializes `T` from a value graph.
///
/// # Errors
///
/// [`Error::CyclicGraph`] if some container reaches itself, otherwise any
/// shape mismatch reported by `T`'s `Deserialize` impl.
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: de::DeserializeOwned,
{
    if value.is_cyclic() {
        return Err(Error::CyclicGraph(format!(
            "{} contains a reference back to itself",
            value.type_name()
        )));
    }
    T::deserialize(ValueDeserializer::new(value))
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::None => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Int(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::Str(s) => visitor.visit_string(s),
            Value::List(list) => {
                let items = list.borrow().clone();
                visitor.visit_seq(SeqDeserializer::new(items))
            }
            Value::Dict(dict) => {
                let map = dict.borrow().clone();
                visitor.visit_map(MapDeserializer::new(map))
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::None => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Str(variant) => visitor.visit_enum(EnumDeserializer::new(variant, None)),
            Value::Dict(dict) => {
                let map = dict.borrow().clone();
                if map.len() != 1 {
                    return Err(Error::custom(format!(
                        "enum {} expects a dict with exactly one entry, found {}",
                        name,
                        map.len()
                    )));
                }
                let mut entries = map.into_iter();
                match entries.next() {
                    Some((Value::Str(variant), payload)) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, Some(payload)))
                    }
                    Some((key, _)) => Err(Error::custom(format!(
                        "enum {} variant name must be a str, found {}",
                        name,
                        key.type_name()
                    ))),
                    None => Err(Error::custom("empty enum dict")),
                }
            }
            other => Err(Error::custom(format!(
                "enum {} cannot be read from {}",
                name,
                other.type_name()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: <LinoMap as IntoIterator>::IntoIter,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(map: LinoMap) -> Self {
        MapDeserializer {
            iter: map.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(ValueDeserializer::new(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<Value>,
}

impl EnumDeserializer {
    fn new(variant: String, value: Option<Value>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::Str(self.variant)))?;
        let visitor = VariantDeserializer { value: self.value };
        Ok((variant, visitor))
    }
}

struct VariantDeserializer {
    value: Option<Value>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(Value::None) | None => Ok(()),
            _ => Err(Error::custom("Expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("Expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::List(list)) => {
                let items = list.borrow().clone();
                visitor.visit_seq(SeqDeserializer::new(items))
            }
            _ => Err(Error::custom("Expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(Value::Dict(dict)) => {
                let map = dict.borrow().clone();
                visitor.visit_map(MapDeserializer::new(map))
            }
            _ => Err(Error::custom("Expected struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Event {
        Ping,
        Move(i32, i32),
        Rename { from: String, to: String },
        Wrap(Option<u8>),
    }

    fn point(x: i64, y: i64) -> Value {
        let mut map = LinoMap::new();
        map.insert(Value::from("x"), Value::Int(x));
        map.insert(Value::from("y"), Value::Int(y));
        Value::dict(map)
    }

    fn variant(name: &str, payload: Value) -> Value {
        let mut map = LinoMap::new();
        map.insert(Value::from(name), payload);
        Value::dict(map)
    }

    #[test]
    fn test_struct_from_dict() {
        let p: Point = from_value(point(1, -2)).unwrap();
        assert_eq!(p, Point { x: 1, y: -2 });
    }

    #[test]
    fn test_option() {
        let none: Option<i32> = from_value(Value::None).unwrap();
        assert_eq!(none, None);
        let some: Option<i32> = from_value(Value::Int(3)).unwrap();
        assert_eq!(some, Some(3));
    }

    #[test]
    fn test_enums() {
        assert_eq!(from_value::<Event>(Value::from("Ping")).unwrap(), Event::Ping);
        assert_eq!(
            from_value::<Event>(variant("Move", Value::list(vec![Value::Int(1), Value::Int(2)])))
                .unwrap(),
            Event::Move(1, 2)
        );

        let mut fields = LinoMap::new();
        fields.insert(Value::from("from"), Value::from("a"));
        fields.insert(Value::from("to"), Value::from("b"));
        assert_eq!(
            from_value::<Event>(variant("Rename", Value::dict(fields))).unwrap(),
            Event::Rename {
                from: "a".to_string(),
                to: "b".to_string()
            }
        );
        assert_eq!(
            from_value::<Event>(variant("Wrap", Value::None)).unwrap(),
            Event::Wrap(None)
        );
        assert!(from_value::<Event>(Value::Int(1)).is_err());
    }

    #[test]
    fn test_shared_container_is_copied() {
        let shared = point(0, 0);
        let both = Value::list(vec![shared.clone(), shared]);
        let points: Vec<Point> = from_value(both).unwrap();
        assert_eq!(points, vec![Point { x: 0, y: 0 }, Point { x: 0, y: 0 }]);
    }

    #[test]
    fn test_cycle_is_refused() {
        let a = Value::list(vec![]);
        a.as_list().unwrap().borrow_mut().push(a.clone());
        let result: Result<Vec<Value>> = from_value(a.clone());
        assert!(matches!(result, Err(Error::CyclicGraph(_))));
        a.as_list().unwrap().borrow_mut().clear();
    }

    #[test]
    fn test_non_string_keys() {
        let mut map = LinoMap::new();
        map.insert(Value::Int(1), Value::from("one"));
        let decoded: HashMap<i64, String> = from_value(Value::dict(map)).unwrap();
        assert_eq!(decoded.get(&1).map(String::as_str), Some("one"));
    }
}
