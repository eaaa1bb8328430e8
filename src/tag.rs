//! Type tags: the leading identifier of every encoded link.

use std::fmt;

/// The fixed set of tags the codec reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    None,
    Bool,
    Int,
    Float,
    Str,
    List,
    Dict,
    Ref,
}

impl TypeTag {
    pub const ALL: [TypeTag; 8] = [
        TypeTag::None,
        TypeTag::Bool,
        TypeTag::Int,
        TypeTag::Float,
        TypeTag::Str,
        TypeTag::List,
        TypeTag::Dict,
        TypeTag::Ref,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TypeTag::None => "None",
            TypeTag::Bool => "bool",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
            TypeTag::List => "list",
            TypeTag::Dict => "dict",
            TypeTag::Ref => "ref",
        }
    }

    /// Looks a tag up by its exact (case-sensitive) spelling.
    #[must_use]
    pub fn parse(tag: &str) -> Option<TypeTag> {
        TypeTag::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
