//! Property-based tests for the round-trip and identity guarantees.

use lino_codec::{decode, encode, from_str, to_string, LinoMap, Value};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

/// Acyclic value trees with finite floats.
fn value_tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::None),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(Value::Float),
        any::<String>().prop_map(Value::Str),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::list),
            prop::collection::vec((any::<String>(), inner), 0..6).prop_map(|entries| {
                let map: LinoMap = entries
                    .into_iter()
                    .map(|(k, v)| (Value::Str(k), v))
                    .collect();
                Value::dict(map)
            }),
        ]
    })
}

proptest! {
    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u32(n in any::<u32>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        prop_assert!(roundtrip(&b));
    }

    #[test]
    fn prop_string(s in any::<String>()) {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_finite_f64(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
        let back = decode(&encode(&Value::Float(f)).unwrap()).unwrap();
        prop_assert_eq!(back.as_f64().map(f64::to_bits), Some(f.to_bits()));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        prop_assert!(roundtrip(&t));
    }

    #[test]
    fn prop_value_tree_round_trip(value in value_tree()) {
        let text = encode(&value).unwrap();
        prop_assert!(!text.contains('\n'));
        prop_assert_eq!(decode(&text).unwrap(), value);
    }

    #[test]
    fn prop_encoding_is_deterministic(value in value_tree()) {
        prop_assert_eq!(encode(&value).unwrap(), encode(&value).unwrap());
    }

    #[test]
    fn prop_sharing_survives(items in prop::collection::vec(any::<i64>(), 0..5), copies in 2usize..5) {
        let shared = Value::list(items.into_iter().map(Value::Int).collect());
        let outer = Value::list(vec![shared; copies]);

        let back = decode(&encode(&outer).unwrap()).unwrap();
        let decoded = back.as_list().unwrap().borrow();
        prop_assert_eq!(decoded.len(), copies);
        for item in decoded.iter().skip(1) {
            prop_assert!(item.ptr_eq(&decoded[0]));
        }
    }
}
