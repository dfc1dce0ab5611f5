use std::fmt;
use std::rc::Rc;
use static_assertions::const_assert;

use crate::language::{IntType, FloatType, VectorType};
use crate::runtime::function::{Function, NativeFunction};
use crate::runtime::class::{Class, Instance, BoundMethod};


// Fundamental data value type
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(IntType),
    Number(FloatType),
    Vector2([VectorType; 2]),
    Vector3([VectorType; 3]),
    Vector4([VectorType; 4]),

    String(Rc<str>),

    Function(Rc<Function>),
    Class(Rc<Class>),
    Instance(Rc<Instance>),
    BoundMethod(Rc<BoundMethod>),
    NativeFunction(Rc<NativeFunction>),
}

// Rc<str> is a fat pointer, so this is the biggest the enum is allowed to get
const_assert!(core::mem::size_of::<Value>() <= 24);

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(..) => "bool",
            Self::Int(..) => "int",
            Self::Number(..) => "number",
            Self::Vector2(..) => "vec2",
            Self::Vector3(..) => "vec3",
            Self::Vector4(..) => "vec4",
            Self::String(..) => "string",
            Self::Function(..) => "function",
            Self::Class(..) => "class",
            Self::Instance(..) => "instance",
            Self::BoundMethod(..) => "bound method",
            Self::NativeFunction(..) => "native function",
        }
    }

    /// Only `nil` and `false` are falsey.
    pub fn is_falsey(&self) -> bool {
        matches!(self, Self::Nil | Self::Bool(false))
    }

    pub fn is_nil(&self) -> bool { matches!(self, Self::Nil) }

    pub fn as_number(&self) -> Option<FloatType> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Int(value) => Some(*value as FloatType),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Rc<Class>> {
        match self {
            Self::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Rc<Instance>> {
        match self {
            Self::Instance(instance) => Some(instance),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self { Self::Nil }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self { Self::Bool(value) }
}

impl From<IntType> for Value {
    fn from(value: IntType) -> Self { Self::Int(value) }
}

impl From<FloatType> for Value {
    fn from(value: FloatType) -> Self { Self::Number(value) }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self { Self::String(Rc::from(value)) }
}

impl From<String> for Value {
    fn from(value: String) -> Self { Self::String(Rc::from(value)) }
}

impl From<Rc<Function>> for Value {
    fn from(function: Rc<Function>) -> Self { Self::Function(function) }
}

impl From<Rc<NativeFunction>> for Value {
    fn from(native: Rc<NativeFunction>) -> Self { Self::NativeFunction(native) }
}


fn fmt_vector(fmt: &mut fmt::Formatter<'_>, components: &[VectorType]) -> fmt::Result {
    fmt.write_str("(")?;
    for (idx, component) in components.iter().enumerate() {
        if idx > 0 {
            fmt.write_str(", ")?;
        }
        write!(fmt, "{}", component)?;
    }
    fmt.write_str(")")
}

// what `print` writes
impl fmt::Display for Value {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => fmt.write_str("nil"),
            Self::Bool(value) => write!(fmt, "{}", value),
            Self::Int(value) => write!(fmt, "{}", value),
            Self::Number(value) => write!(fmt, "{}", value),
            Self::Vector2(vector) => fmt_vector(fmt, vector),
            Self::Vector3(vector) => fmt_vector(fmt, vector),
            Self::Vector4(vector) => fmt_vector(fmt, vector),
            Self::String(string) => fmt.write_str(string),
            Self::Function(function) => write!(fmt, "{}", function),
            Self::Class(class) => fmt.write_str(class.name()),
            Self::Instance(instance) => write!(fmt, "<{} instance>", instance.class().name()),
            Self::BoundMethod(bound) => write!(fmt, "{}", bound.method()),
            Self::NativeFunction(native) => write!(fmt, "{}", native),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(string) => write!(fmt, "{:?}", string),
            _ => write!(fmt, "{}", self),
        }
    }
}
