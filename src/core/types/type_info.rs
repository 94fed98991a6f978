//! Normalized view of an inspected value's static type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural kind of a type in the inspected process
///
/// Hosts report every type as one of these kinds. Typedef and
/// Reference are wrapper kinds; they are stripped by the host's
/// basic-type resolution before traversal branches on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Pointer,
    Reference,
    Array,
    Struct,
    Union,
    Typedef,
    Primitive,
    Other,
}

impl TypeKind {
    /// Whether a member of this kind can transitively own heap memory
    ///
    /// Scalar kinds are pruned during struct expansion; only these
    /// kinds are worth descending into.
    pub const fn may_own_heap(&self) -> bool {
        matches!(
            self,
            TypeKind::Pointer
                | TypeKind::Reference
                | TypeKind::Array
                | TypeKind::Struct
                | TypeKind::Union
                | TypeKind::Typedef
        )
    }

    /// Whether this kind has ordered fields
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, TypeKind::Struct | TypeKind::Union)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeKind::Pointer => "pointer",
            TypeKind::Reference => "reference",
            TypeKind::Array => "array",
            TypeKind::Struct => "struct",
            TypeKind::Union => "union",
            TypeKind::Typedef => "typedef",
            TypeKind::Primitive => "primitive",
            TypeKind::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// One member of a struct or union type
///
/// The name is empty for anonymous subobjects. Base-class
/// subobjects of polymorphic objects carry `is_base_class` and are
/// accessed by reinterpreting the containing value as the base
/// type, not by field name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field<T> {
    pub name: String,
    pub ty: T,
    pub is_base_class: bool,
}

impl<T> Field<T> {
    /// Creates a named data member
    pub fn named(name: impl Into<String>, ty: T) -> Self {
        Field {
            name: name.into(),
            ty,
            is_base_class: false,
        }
    }

    /// Creates an inherited base-class subobject
    pub fn base(name: impl Into<String>, ty: T) -> Self {
        Field {
            name: name.into(),
            ty,
            is_base_class: true,
        }
    }

    /// Whether the member has a usable name
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}
