//! Type descriptors consumed by the generator and the converter.
//!
//! # Design
//! Rust has no runtime reflection, so the shape of a type is described as
//! data: a closed `TypeDesc` variant that code dispatches on with `match`.
//! Descriptors are `Eq + Hash` because they key the generator and converter
//! registries. Records have nominal identity: two `RecordType`s with the same
//! name are the same type, whatever their field lists say.
//!
//! Rust types opt in through `Describe`.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::value::Value;

/// Scalar kinds with a fixed JSON representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Int,
    Float,
    Str,
    DateTime,
}

/// Shape of a type as seen by the generator and the converter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// The "no value" type, used as an alternative of optional unions.
    Null,
    Primitive(Primitive),
    /// A nominal leaf type with no structure of its own, such as a newtype
    /// over a string or a bare container. Only resolvable through a
    /// registered hook.
    Named(String),
    Record(RecordType),
    /// One of several alternatives. Empty means unparameterized.
    Union(Vec<TypeDesc>),
    /// Fixed-size tuple. Empty means unparameterized.
    Tuple(Vec<TypeDesc>),
    /// Homogeneous list.
    Sequence(Box<TypeDesc>),
}

impl TypeDesc {
    pub const BOOL: TypeDesc = TypeDesc::Primitive(Primitive::Bool);
    pub const INT: TypeDesc = TypeDesc::Primitive(Primitive::Int);
    pub const FLOAT: TypeDesc = TypeDesc::Primitive(Primitive::Float);
    pub const STR: TypeDesc = TypeDesc::Primitive(Primitive::Str);
    pub const DATETIME: TypeDesc = TypeDesc::Primitive(Primitive::DateTime);

    pub fn named(name: impl Into<String>) -> Self {
        TypeDesc::Named(name.into())
    }

    pub fn list(element: TypeDesc) -> Self {
        TypeDesc::Sequence(Box::new(element))
    }

    pub fn tuple(items: impl IntoIterator<Item = TypeDesc>) -> Self {
        TypeDesc::Tuple(items.into_iter().collect())
    }

    pub fn union(alternatives: impl IntoIterator<Item = TypeDesc>) -> Self {
        TypeDesc::Union(alternatives.into_iter().collect())
    }

    /// `Union[inner, Null]`.
    pub fn optional(inner: TypeDesc) -> Self {
        TypeDesc::Union(vec![inner, TypeDesc::Null])
    }

    pub fn is_record(&self) -> bool {
        matches!(self, TypeDesc::Record(_))
    }

    pub fn as_record(&self) -> Option<&RecordType> {
        match self {
            TypeDesc::Record(record) => Some(record),
            _ => None,
        }
    }
}

impl From<RecordType> for TypeDesc {
    fn from(record: RecordType) -> Self {
        TypeDesc::Record(record)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Str => "str",
            Primitive::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Null => f.write_str("None"),
            TypeDesc::Primitive(p) => write!(f, "{p}"),
            TypeDesc::Named(name) => f.write_str(name),
            TypeDesc::Record(record) => f.write_str(record.name()),
            TypeDesc::Union(alts) => write_args(f, "Union", alts),
            TypeDesc::Tuple(items) => write_args(f, "Tuple", items),
            TypeDesc::Sequence(element) => write!(f, "List[{element}]"),
        }
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, head: &str, args: &[TypeDesc]) -> fmt::Result {
    f.write_str(head)?;
    if args.is_empty() {
        return Ok(());
    }
    f.write_str("[")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str("]")
}

/// A single declared field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDesc,
    /// `Some` when the field declares a default. The default itself may be
    /// `Value::Null`.
    pub default: Option<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
        }
    }

    pub fn with_default(name: impl Into<String>, ty: TypeDesc, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            ty,
            default: Some(default.into()),
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

#[derive(Debug)]
struct RecordInner {
    name: String,
    fields: Vec<Field>,
}

/// A struct-like type: a name plus an ordered list of fields.
///
/// Cheap to clone. Equality and hashing only look at the name.
#[derive(Debug, Clone)]
pub struct RecordType {
    inner: Arc<RecordInner>,
}

impl RecordType {
    pub fn new(name: impl Into<String>, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            inner: Arc::new(RecordInner {
                name: name.into(),
                fields: fields.into_iter().collect(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.inner.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.inner.fields.iter().find(|f| f.name == name)
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

/// Rust types that can describe their own shape.
///
/// Structs implement this by returning a `TypeDesc::Record` whose field
/// names match their serde field names, so generated values deserialize
/// back into the struct.
pub trait Describe {
    fn describe() -> TypeDesc;
}

macro_rules! describe_as {
    ($desc:expr => $($t:ty),+) => {
        $(impl Describe for $t {
            fn describe() -> TypeDesc {
                $desc
            }
        })+
    };
}

describe_as!(TypeDesc::BOOL => bool);
describe_as!(TypeDesc::INT => i8, i16, i32, i64, u8, u16, u32, u64, usize);
describe_as!(TypeDesc::FLOAT => f32, f64);
describe_as!(TypeDesc::STR => String);
describe_as!(TypeDesc::DATETIME => DateTime<FixedOffset>);

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDesc {
        TypeDesc::list(T::describe())
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDesc {
        TypeDesc::optional(T::describe())
    }
}

impl<T: Describe> Describe for (T,) {
    fn describe() -> TypeDesc {
        TypeDesc::tuple([T::describe()])
    }
}
