use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Handle to a live in-world object, as produced by a [`crate::Resolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(pub u64);

/// Declared type of a variable slot. `Nil` means untyped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum VarType {
    #[default]
    Nil,
    Bool,
    Int,
    Float,
    String,
    Vector2,
    Vector3,
    /// A stored reference to an in-world object, resolved through a [`crate::Resolver`].
    Path,
    Object,
    List,
}

impl VarType {
    pub fn is_untyped(self) -> bool {
        self == VarType::Nil
    }

    /// Whether a slot declared with this type may hold `value`.
    ///
    /// Empty values fit every slot. `Float` slots take `Int` (widened on write) and `Path`
    /// slots take the `Object` they resolve to.
    pub fn accepts(self, value: &Value) -> bool {
        let actual = value.var_type();
        self == VarType::Nil
            || actual == VarType::Nil
            || actual == self
            || (self == VarType::Float && actual == VarType::Int)
            || (self == VarType::Path && actual == VarType::Object)
    }

    /// Default value for a freshly declared slot of this type.
    pub fn default_value(self) -> Value {
        match self {
            VarType::Nil | VarType::Object => Value::Nil,
            VarType::Bool => Value::Bool(false),
            VarType::Int => Value::Int(0),
            VarType::Float => Value::Float(0.0),
            VarType::String => Value::String(String::new()),
            VarType::Vector2 => Value::Vector2([0.0; 2]),
            VarType::Vector3 => Value::Vector3([0.0; 3]),
            VarType::Path => Value::Path(String::new()),
            VarType::List => Value::List(Vec::new()),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarType::Nil => "nil",
            VarType::Bool => "bool",
            VarType::Int => "int",
            VarType::Float => "float",
            VarType::String => "string",
            VarType::Vector2 => "vector2",
            VarType::Vector3 => "vector3",
            VarType::Path => "path",
            VarType::Object => "object",
            VarType::List => "list",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vector2([f32; 2]),
    Vector3([f32; 3]),
    Path(String),
    Object(ObjectId),
    List(Vec<Value>),
}

impl Value {
    pub fn var_type(&self) -> VarType {
        match self {
            Value::Nil => VarType::Nil,
            Value::Bool(_) => VarType::Bool,
            Value::Int(_) => VarType::Int,
            Value::Float(_) => VarType::Float,
            Value::String(_) => VarType::String,
            Value::Vector2(_) => VarType::Vector2,
            Value::Vector3(_) => VarType::Vector3,
            Value::Path(_) => VarType::Path,
            Value::Object(_) => VarType::Object,
            Value::List(_) => VarType::List,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats, and ints widened to float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Path(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Adjust a value for storage in a slot declared as `ty`, if it needs adjusting.
    pub(crate) fn coerced_for(self, ty: VarType) -> Value {
        match (ty, self) {
            (VarType::Float, Value::Int(i)) => Value::Float(i as f64),
            (_, v) => v,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<ObjectId> for Value {
    fn from(value: ObjectId) -> Self {
        Value::Object(value)
    }
}

impl From<[f32; 2]> for Value {
    fn from(value: [f32; 2]) -> Self {
        Value::Vector2(value)
    }
}

impl From<[f32; 3]> for Value {
    fn from(value: [f32; 3]) -> Self {
        Value::Vector3(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum HintKind {
    #[default]
    None,
    Range,
    Enum,
    Flags,
    File,
    Multiline,
    Placeholder,
}

/// Editing hint for external inspectors. Never interpreted by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hint {
    pub kind: HintKind,
    pub hint_string: String,
}

impl Hint {
    pub fn new(kind: HintKind, hint_string: impl Into<String>) -> Self {
        Self {
            kind,
            hint_string: hint_string.into(),
        }
    }
}

/// One typed value cell.
///
/// The name is owned by the collection holding the variable, not by the variable.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Variable {
    var_type: VarType,
    value: Value,
    hint: Hint,
    #[cfg_attr(feature = "serde", serde(default))]
    overridden: bool,
}

impl Variable {
    pub fn new(var_type: VarType) -> Self {
        Self {
            var_type,
            value: var_type.default_value(),
            hint: Hint::default(),
            overridden: false,
        }
    }

    /// A variable with the given type and initial value. The value is not marked as overridden.
    pub fn with_value(var_type: VarType, value: impl Into<Value>) -> Self {
        let value = value.into().coerced_for(var_type);
        Self {
            var_type,
            value,
            hint: Hint::default(),
            overridden: false,
        }
    }

    /// An untyped variable, as created by writes to undeclared names.
    pub fn untyped(value: impl Into<Value>) -> Self {
        Self::with_value(VarType::Nil, value)
    }

    pub fn hinted(mut self, hint: Hint) -> Self {
        self.hint = hint;
        self
    }

    pub fn var_type(&self) -> VarType {
        self.var_type
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn hint(&self) -> &Hint {
        &self.hint
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Store a value and mark it as explicitly set. No type check; see [`Variable::try_set`].
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.value = value.into().coerced_for(self.var_type);
        self.overridden = true;
    }

    /// Store a value after checking it against the declared type.
    pub fn try_set(&mut self, value: Value) -> Result<(), VarType> {
        if !self.var_type.accepts(&value) {
            return Err(value.var_type());
        }
        self.set_value(value);
        Ok(())
    }

    pub fn clear_overridden(&mut self) {
        self.overridden = false;
    }

    /// Change the declared type. A value the new type rejects is replaced by its default.
    pub fn set_type(&mut self, var_type: VarType) {
        self.var_type = var_type;
        if var_type.accepts(&self.value) {
            self.value = std::mem::take(&mut self.value).coerced_for(var_type);
        } else {
            self.reset_value(var_type.default_value());
        }
    }

    pub fn set_hint(&mut self, hint: Hint) {
        self.hint = hint;
    }

    /// Type and hint are equal. Values are not compared.
    pub fn same_prop_info(&self, other: &Variable) -> bool {
        self.var_type == other.var_type && self.hint == other.hint
    }

    pub fn copy_prop_info(&mut self, other: &Variable) {
        self.var_type = other.var_type;
        self.hint = other.hint.clone();
    }

    /// The value's own type is exactly the declared type (always true when untyped).
    pub fn value_matches_type(&self) -> bool {
        self.var_type.is_untyped() || self.value.var_type() == self.var_type
    }

    /// Replace the value and clear the override mark.
    pub fn reset_value(&mut self, value: Value) {
        self.value = value;
        self.overridden = false;
    }

    /// Copy intended for another collection: same metadata and value, fresh override state.
    pub fn duplicate(&self) -> Self {
        Self {
            var_type: self.var_type,
            value: self.value.clone(),
            hint: self.hint.clone(),
            overridden: false,
        }
    }
}
