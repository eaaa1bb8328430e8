/// Builds a [`Value`](crate::Value) tree from JSON-like syntax.
///
/// `null` stands for `None`. Every `[...]` and `{...}` creates a fresh
/// container, so the result never shares sub-objects; build sharing by
/// cloning a handle instead. Keys may be any value, not just strings.
///
/// ```rust
/// use lino_codec::{lino, Value};
///
/// let config = lino!({
///     "name": "Alice",
///     "tags": ["rust", "lino"],
///     1: null
/// });
/// let dict = config.as_dict().unwrap().borrow();
/// assert_eq!(dict.get_str("name"), Some(&Value::from("Alice")));
/// assert_eq!(dict.get(&Value::Int(1)), Some(&Value::None));
/// ```
#[macro_export]
macro_rules! lino {
    // Elements are munched token by token so `-1` and other multi-token
    // expressions work; a `,` ends the current element.
    (@array [$($done:expr,)*] []) => {
        vec![$($done,)*]
    };

    (@array [$($done:expr,)*] [$($elem:tt)+]) => {
        vec![$($done,)* $crate::lino!($($elem)+)]
    };

    (@array [$($done:expr,)*] [$($elem:tt)+] , $($rest:tt)*) => {
        $crate::lino!(@array [$($done,)* $crate::lino!($($elem)+),] [] $($rest)*)
    };

    (@array [$($done:expr,)*] [$($elem:tt)*] $next:tt $($rest:tt)*) => {
        $crate::lino!(@array [$($done,)*] [$($elem)* $next] $($rest)*)
    };

    // Keys run up to `:`, values up to `,`.
    (@object $map:ident [] ()) => {};

    (@object $map:ident [$($key:tt)+] (: $($rest:tt)*)) => {
        $crate::lino!(@value $map [$($key)+] [] $($rest)*);
    };

    (@object $map:ident [$($key:tt)*] ($next:tt $($rest:tt)*)) => {
        $crate::lino!(@object $map [$($key)* $next] ($($rest)*));
    };

    (@value $map:ident [$($key:tt)+] [$($value:tt)+]) => {
        $map.insert($crate::lino!($($key)+), $crate::lino!($($value)+));
    };

    (@value $map:ident [$($key:tt)+] [$($value:tt)+] , $($rest:tt)*) => {
        $map.insert($crate::lino!($($key)+), $crate::lino!($($value)+));
        $crate::lino!(@object $map [] ($($rest)*));
    };

    (@value $map:ident [$($key:tt)+] [$($value:tt)*] $next:tt $($rest:tt)*) => {
        $crate::lino!(@value $map [$($key)+] [$($value)* $next] $($rest)*);
    };

    (null) => {
        $crate::Value::None
    };

    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::list(vec![])
    };

    ([ $($tt:tt)+ ]) => {
        $crate::Value::list($crate::lino!(@array [] [] $($tt)+))
    };

    ({}) => {
        $crate::Value::dict($crate::LinoMap::new())
    };

    ({ $($tt:tt)+ }) => {{
        let mut map = $crate::LinoMap::new();
        $crate::lino!(@object map [] ($($tt)+));
        $crate::Value::dict(map)
    }};

    // Anything else goes through `From`
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
