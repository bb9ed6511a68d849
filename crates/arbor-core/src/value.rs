use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque handle to a host-side object (entity, scene node, asset...).
///
/// The runtime never dereferences it; hosts map it back to their own storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectRef(pub u64);

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Type tag of a blackboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum KeyType {
    Bool,
    Int,
    Float,
    Double,
    String,
    Vector2,
    Vector3,
    Object,
}

impl KeyType {
    pub const ALL: [KeyType; 8] = [
        KeyType::Bool,
        KeyType::Int,
        KeyType::Float,
        KeyType::Double,
        KeyType::String,
        KeyType::Vector2,
        KeyType::Vector3,
        KeyType::Object,
    ];

    pub fn default_value(self) -> BlackboardValue {
        match self {
            KeyType::Bool => BlackboardValue::Bool(false),
            KeyType::Int => BlackboardValue::Int(0),
            KeyType::Float => BlackboardValue::Float(0.0),
            KeyType::Double => BlackboardValue::Double(0.0),
            KeyType::String => BlackboardValue::String(String::new()),
            KeyType::Vector2 => BlackboardValue::Vector2(Vec2::default()),
            KeyType::Vector3 => BlackboardValue::Vector3(Vec3::default()),
            KeyType::Object => BlackboardValue::Object(None),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KeyType::Bool => "bool",
            KeyType::Int => "int",
            KeyType::Float => "float",
            KeyType::Double => "double",
            KeyType::String => "string",
            KeyType::Vector2 => "vector2",
            KeyType::Vector3 => "vector3",
            KeyType::Object => "object",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A typed value slot stored under a blackboard key.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BlackboardValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    String(String),
    Vector2(Vec2),
    Vector3(Vec3),
    Object(Option<ObjectRef>),
}

impl BlackboardValue {
    pub fn key_type(&self) -> KeyType {
        match self {
            BlackboardValue::Bool(_) => KeyType::Bool,
            BlackboardValue::Int(_) => KeyType::Int,
            BlackboardValue::Float(_) => KeyType::Float,
            BlackboardValue::Double(_) => KeyType::Double,
            BlackboardValue::String(_) => KeyType::String,
            BlackboardValue::Vector2(_) => KeyType::Vector2,
            BlackboardValue::Vector3(_) => KeyType::Vector3,
            BlackboardValue::Object(_) => KeyType::Object,
        }
    }
}

impl fmt::Display for BlackboardValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlackboardValue::Bool(v) => write!(f, "{v}"),
            BlackboardValue::Int(v) => write!(f, "{v}"),
            BlackboardValue::Float(v) => write!(f, "{v}"),
            BlackboardValue::Double(v) => write!(f, "{v}"),
            BlackboardValue::String(v) => f.write_str(v),
            BlackboardValue::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            BlackboardValue::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            BlackboardValue::Object(Some(r)) => write!(f, "object#{}", r.0),
            BlackboardValue::Object(None) => f.write_str("null"),
        }
    }
}

/// Rust types that can be read from and written to a blackboard slot.
///
/// Conversions are exact: an `Int` key is never read as `f32` or vice versa.
pub trait BlackboardType: Sized {
    const KEY_TYPE: KeyType;

    fn from_value(value: &BlackboardValue) -> Option<Self>;

    fn into_value(self) -> BlackboardValue;
}

macro_rules! blackboard_type {
    ($ty:ty, $variant:ident, $key:ident) => {
        impl BlackboardType for $ty {
            const KEY_TYPE: KeyType = KeyType::$key;

            fn from_value(value: &BlackboardValue) -> Option<Self> {
                match value {
                    BlackboardValue::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn into_value(self) -> BlackboardValue {
                BlackboardValue::$variant(self)
            }
        }

        impl From<$ty> for BlackboardValue {
            fn from(value: $ty) -> Self {
                BlackboardValue::$variant(value)
            }
        }
    };
}

blackboard_type!(bool, Bool, Bool);
blackboard_type!(i32, Int, Int);
blackboard_type!(f32, Float, Float);
blackboard_type!(f64, Double, Double);
blackboard_type!(String, String, String);
blackboard_type!(Vec2, Vector2, Vector2);
blackboard_type!(Vec3, Vector3, Vector3);
blackboard_type!(Option<ObjectRef>, Object, Object);

impl From<&str> for BlackboardValue {
    fn from(value: &str) -> Self {
        BlackboardValue::String(value.to_string())
    }
}
