//! Dynamic value graph.
//!
//! This module provides the [`Value`] enum, the in-memory form of everything
//! the codec can encode: `None`, booleans, integers, floats, strings, lists and
//! dicts.
//!
//! ## Shared and Cyclic Graphs
//!
//! Lists and dicts are reference-counted handles (`Rc<RefCell<..>>`). Cloning a
//! container value clones the handle, not the contents, so the same list can
//! appear in several places, or inside itself:
//!
//! ```rust
//! use lino_codec::Value;
//!
//! let shared = Value::list(vec![Value::from(1), Value::from(2)]);
//! let outer = Value::list(vec![shared.clone(), shared.clone()]);
//!
//! let items = outer.as_list().unwrap().borrow();
//! assert!(items[0].ptr_eq(&items[1]));
//! ```
//!
//! `Rc` cycles are never collected. A graph that points back into itself stays
//! alive until one of its containers is cleared.
//!
//! ## Equality
//!
//! `==` is structural and terminates on cyclic graphs: a pair of containers
//! already under comparison is assumed equal. Floats follow IEEE rules, so a
//! `NaN` is not equal to itself unless both sides are the same container.

use crate::LinoMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// Shared, mutable handle to an ordered sequence.
pub type List = Rc<RefCell<Vec<Value>>>;

/// Shared, mutable handle to an insertion-ordered mapping.
pub type Dict = Rc<RefCell<LinoMap>>;

/// Address of a container allocation, its identity for the length of a call.
pub(crate) fn identity_of<T>(handle: &Rc<RefCell<T>>) -> usize {
    Rc::as_ptr(handle) as *const () as usize
}

/// Any value the codec can encode.
///
/// # Examples
///
/// ```rust
/// use lino_codec::{LinoMap, Value};
///
/// let mut user = LinoMap::new();
/// user.insert(Value::from("name"), Value::from("Alice"));
/// user.insert(Value::from("age"), Value::from(30));
///
/// let value = Value::dict(user);
/// assert!(value.is_dict());
/// assert_eq!(value.type_name(), "dict");
/// ```
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(List),
    Dict(Dict),
}

impl Value {
    /// Wraps items in a fresh list handle.
    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Rc::new(RefCell::new(items)))
    }

    /// Wraps a map in a fresh dict handle.
    #[must_use]
    pub fn dict(map: LinoMap) -> Self {
        Value::Dict(Rc::new(RefCell::new(map)))
    }

    #[inline]
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    /// Returns `true` for lists and dicts, the only values with identity.
    #[inline]
    #[must_use]
    pub const fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Dict(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as an `f64`, widening integers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_codec::Value;
    ///
    /// assert_eq!(Value::from(2).as_f64(), Some(2.0));
    /// assert_eq!(Value::from(2.5).as_f64(), Some(2.5));
    /// assert_eq!(Value::from("2.5").as_f64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// The type tag this value is written under.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::None => "None",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::List(_) => "list",
            Value::Dict(_) => "dict",
        }
    }

    /// Address of the container allocation, `None` for scalars.
    ///
    /// Two values share an address exactly when they are the same object.
    #[must_use]
    pub fn container_addr(&self) -> Option<usize> {
        match self {
            Value::List(list) => Some(identity_of(list)),
            Value::Dict(dict) => Some(identity_of(dict)),
            _ => None,
        }
    }

    /// Returns `true` if both values are the same container object.
    ///
    /// Scalars have no identity and never compare identical.
    #[must_use]
    pub fn ptr_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Dict(a), Value::Dict(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Returns `true` if some container is reachable from itself.
    ///
    /// Shared but acyclic sub-objects do not count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use lino_codec::Value;
    ///
    /// let a = Value::list(vec![]);
    /// assert!(!a.is_cyclic());
    ///
    /// a.as_list().unwrap().borrow_mut().push(a.clone());
    /// assert!(a.is_cyclic());
    /// # a.as_list().unwrap().borrow_mut().clear();
    /// ```
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        fn visit(value: &Value, path: &mut Vec<usize>, finished: &mut HashSet<usize>) -> bool {
            let Some(addr) = value.container_addr() else {
                return false;
            };
            if path.contains(&addr) {
                return true;
            }
            if !finished.insert(addr) {
                return false;
            }
            path.push(addr);
            let cyclic = match value {
                Value::List(list) => list.borrow().iter().any(|v| visit(v, path, finished)),
                Value::Dict(dict) => dict
                    .borrow()
                    .iter()
                    .any(|(k, v)| visit(k, path, finished) || visit(v, path, finished)),
                _ => false,
            };
            path.pop();
            cyclic
        }

        visit(self, &mut Vec::new(), &mut HashSet::new())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        graph_eq(self, other, &mut Vec::new())
    }
}

impl PartialEq for LinoMap {
    fn eq(&self, other: &Self) -> bool {
        maps_eq(self, other, &mut Vec::new())
    }
}

/// Records a container pair as under comparison. Returns `false` if it already was.
fn assume_equal(a: &Value, b: &Value, assumed: &mut Vec<(usize, usize)>) -> bool {
    let pair = (a.container_addr(), b.container_addr());
    if let (Some(x), Some(y)) = pair {
        if assumed.contains(&(x, y)) {
            return false;
        }
        assumed.push((x, y));
    }
    true
}

fn graph_eq(a: &Value, b: &Value, assumed: &mut Vec<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::None, Value::None) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Int(x), Value::Int(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            if Rc::ptr_eq(x, y) || !assume_equal(a, b, assumed) {
                return true;
            }
            let (xs, ys) = (x.borrow(), y.borrow());
            if xs.len() != ys.len() {
                return false;
            }
            for (p, q) in xs.iter().zip(ys.iter()) {
                if !graph_eq(p, q, assumed) {
                    return false;
                }
            }
            true
        }
        (Value::Dict(x), Value::Dict(y)) => {
            if Rc::ptr_eq(x, y) || !assume_equal(a, b, assumed) {
                return true;
            }
            maps_eq(&x.borrow(), &y.borrow(), assumed)
        }
        _ => false,
    }
}

fn maps_eq(x: &LinoMap, y: &LinoMap, assumed: &mut Vec<(usize, usize)>) -> bool {
    if x.len() != y.len() {
        return false;
    }
    for (key, value) in x.iter() {
        let matched = if key.is_container() {
            // identity lookup cannot match across two separate graphs
            y.iter().any(|(other_key, other_value)| {
                let mark = assumed.len();
                let same = graph_eq(key, other_key, assumed)
                    && graph_eq(value, other_value, assumed);
                if !same {
                    // a rejected candidate must not leave its pairs assumed equal
                    assumed.truncate(mark);
                }
                same
            })
        } else {
            y.get(key).map_or(false, |other| graph_eq(value, other, assumed))
        };
        if !matched {
            return false;
        }
    }
    true
}

/// A value paired with the containers open above it, for walks that must
/// not loop on cycles.
struct Tracked<'a> {
    value: &'a Value,
    path: &'a RefCell<Vec<usize>>,
}

impl<'a> Tracked<'a> {
    fn child(&self, value: &'a Value) -> Tracked<'a> {
        Tracked {
            value,
            path: self.path,
        }
    }

    /// Pushes the container onto the path; `false` if it is already open.
    fn enter(&self) -> bool {
        match self.value.container_addr() {
            Some(addr) if self.path.borrow().contains(&addr) => false,
            Some(addr) => {
                self.path.borrow_mut().push(addr);
                true
            }
            None => true,
        }
    }

    fn leave(&self) {
        self.path.borrow_mut().pop();
    }
}

impl fmt::Debug for Tracked<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "{:?}", b),
            Value::Int(i) => write!(f, "{:?}", i),
            Value::Float(fl) => write!(f, "{:?}", fl),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(list) => {
                if !self.enter() {
                    return f.write_str("[...]");
                }
                let result = match list.try_borrow() {
                    Ok(items) => f
                        .debug_list()
                        .entries(items.iter().map(|v| self.child(v)))
                        .finish(),
                    Err(_) => f.write_str("[<borrowed>]"),
                };
                self.leave();
                result
            }
            Value::Dict(dict) => {
                if !self.enter() {
                    return f.write_str("{...}");
                }
                let result = match dict.try_borrow() {
                    Ok(map) => f
                        .debug_map()
                        .entries(map.iter().map(|(k, v)| (self.child(k), self.child(v))))
                        .finish(),
                    Err(_) => f.write_str("{<borrowed>}"),
                };
                self.leave();
                result
            }
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = RefCell::new(Vec::new());
        fmt::Debug::fmt(&Tracked { value: self, path: &path }, f)
    }
}

impl fmt::Debug for LinoMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = RefCell::new(Vec::new());
        f.debug_map()
            .entries(self.iter().map(|(k, v)| {
                (
                    Tracked { value: k, path: &path },
                    Tracked { value: v, path: &path },
                )
            }))
            .finish()
    }
}

impl Serialize for Tracked<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{Error, SerializeMap, SerializeSeq};

        match self.value {
            Value::None => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(list) => {
                if !self.enter() {
                    return Err(S::Error::custom("cyclic value graph"));
                }
                let items = list.borrow();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(&self.child(item))?;
                }
                self.leave();
                seq.end()
            }
            Value::Dict(dict) => {
                if !self.enter() {
                    return Err(S::Error::custom("cyclic value graph"));
                }
                let entries = dict.borrow();
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries.iter() {
                    map.serialize_entry(&self.child(k), &self.child(v))?;
                }
                self.leave();
                map.end()
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let path = RefCell::new(Vec::new());
        Tracked { value: self, path: &path }.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any encodable value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Value, E> {
                Ok(Value::Int(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Value, E>
            where
                E: de::Error,
            {
                i64::try_from(value)
                    .map(Value::Int)
                    .map_err(|_| E::custom(format!("integer {} exceeds i64 range", value)))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Value, E> {
                Ok(Value::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Value, E> {
                Ok(Value::Str(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Value, E> {
                Ok(Value::Str(value))
            }

            fn visit_unit<E>(self) -> Result<Value, E> {
                Ok(Value::None)
            }

            fn visit_none<E>(self) -> Result<Value, E> {
                Ok(Value::None)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::list(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut entries = LinoMap::new();
                while let Some((key, value)) = map.next_entry::<Value, Value>()? {
                    entries.insert(key, value);
                }
                Ok(Value::dict(entries))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            _ => Err(crate::Error::custom(format!(
                "expected int, found {}",
                value.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value.as_f64().ok_or_else(|| {
            crate::Error::custom(format!("expected float, found {}", value.type_name()))
        })
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(crate::Error::custom(format!(
                "expected bool, found {}",
                value.type_name()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            _ => Err(crate::Error::custom(format!(
                "expected str, found {}",
                value.type_name()
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i8> for Value {
    fn from(value: i8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i16> for Value {
    fn from(value: i16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u16> for Value {
    fn from(value: u16) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::list(value)
    }
}

impl From<LinoMap> for Value {
    fn from(value: LinoMap) -> Self {
        Value::dict(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}
