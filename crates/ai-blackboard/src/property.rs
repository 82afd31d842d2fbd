//! Flat, path-addressed view of a [`Plan`] for external editors and serializers.
//!
//! Paths:
//! - `<name>`: editor view of a variable's value. Aliased variables read as
//!   [`Property::Mapped`] and cannot be written here.
//! - `mapping/<name>`: the variable's alias target (empty when not aliased).
//! - `var/<name>/<field>`: storage fields `name`, `type`, `value`, `hint`, `hint_string`.
//!   Writing `var/<name>/name` for an unknown name declares the variable.

use crate::{Hint, HintKind, Plan, PlanError, Value, VarType, Variable};

pub const MAPPING_PREFIX: &str = "mapping/";
pub const STORAGE_PREFIX: &str = "var/";
pub const MAPPING_GROUP: &str = "Mapping";

#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Value(Value),
    /// Read-only stand-in for the value of an aliased variable.
    Mapped(String),
    Name(String),
    Type(VarType),
    Hint(HintKind),
    HintString(String),
    Alias(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyUsage {
    /// Shown to editors, not persisted.
    Editor,
    /// Shown to editors as read-only, not persisted.
    ReadOnly,
    /// Persisted, hidden from editors.
    Storage,
    /// Shown and persisted.
    Default,
    /// Starts a group of properties sharing a path prefix.
    Group,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyInfo {
    pub path: String,
    pub var_type: VarType,
    pub hint: Hint,
    pub usage: PropertyUsage,
}

impl PropertyInfo {
    fn new(path: impl Into<String>, var_type: VarType, usage: PropertyUsage) -> Self {
        Self {
            path: path.into(),
            var_type,
            hint: Hint::default(),
            usage,
        }
    }
}

fn kind_error(path: &str, expected: &'static str) -> PlanError {
    PlanError::PropertyKind {
        path: path.to_string(),
        expected,
    }
}

fn split_storage_path(path: &str) -> Option<(&str, &str)> {
    path.strip_prefix(STORAGE_PREFIX)?.split_once('/')
}

impl Plan {
    /// Whether a derived plan's variable carries an override worth persisting: explicitly
    /// set and different from the base's current value.
    pub fn stores_override(&self, name: &str) -> bool {
        let Some(var) = self.variable(name) else {
            return false;
        };
        let Some(base) = self.base() else {
            return true;
        };
        var.is_overridden() && base.variable(name).map(Variable::value) != Some(var.value())
    }

    pub fn get_property(&self, path: &str) -> Result<Property, PlanError> {
        if let Some(var) = self.variable(path) {
            return Ok(match self.alias(path) {
                Some(target) => Property::Mapped(target.to_string()),
                None => Property::Value(var.value().clone()),
            });
        }

        if let Some(name) = path.strip_prefix(MAPPING_PREFIX) {
            if name.is_empty() {
                return Err(PlanError::UnknownProperty(path.to_string()));
            }
            return Ok(Property::Alias(
                self.alias(name).unwrap_or_default().to_string(),
            ));
        }

        let (name, field) = split_storage_path(path)
            .ok_or_else(|| PlanError::UnknownProperty(path.to_string()))?;
        let var = self
            .variable(name)
            .ok_or_else(|| PlanError::NotFound(name.to_string()))?;
        match field {
            "name" => Ok(Property::Name(name.to_string())),
            "type" => Ok(Property::Type(var.var_type())),
            "value" => Ok(Property::Value(var.value().clone())),
            "hint" => Ok(Property::Hint(var.hint().kind)),
            "hint_string" => Ok(Property::HintString(var.hint().hint_string.clone())),
            _ => Err(PlanError::UnknownProperty(path.to_string())),
        }
    }

    pub fn set_property(&mut self, path: &str, property: Property) -> Result<(), PlanError> {
        if self.has_variable(path) {
            if self.alias(path).is_some() {
                return Err(PlanError::ReadOnly(path.to_string()));
            }
            let Property::Value(value) = property else {
                return Err(kind_error(path, "value"));
            };
            return self.set_value(path, value);
        }

        if let Some(name) = path.strip_prefix(MAPPING_PREFIX) {
            let Property::Alias(target) = property else {
                return Err(kind_error(path, "alias"));
            };
            return self.set_alias(name, target);
        }

        let (name, field) = split_storage_path(path)
            .ok_or_else(|| PlanError::UnknownProperty(path.to_string()))?;
        if field == "name" {
            // The name lives in the path; the value only confirms the declaration.
            let Property::Name(_) = property else {
                return Err(kind_error(path, "name"));
            };
            if !self.has_variable(name) {
                self.add_variable(name, Variable::default())?;
            }
            return Ok(());
        }
        if field == "value" {
            let Property::Value(value) = property else {
                return Err(kind_error(path, "value"));
            };
            return self.set_value(name, value);
        }
        let var = self
            .variable_mut(name)
            .ok_or_else(|| PlanError::NotFound(name.to_string()))?;

        match (field, property) {
            ("type", Property::Type(var_type)) => var.set_type(var_type),
            ("hint", Property::Hint(kind)) => {
                let hint_string = var.hint().hint_string.clone();
                var.set_hint(Hint::new(kind, hint_string));
            }
            ("hint_string", Property::HintString(s)) => {
                let kind = var.hint().kind;
                var.set_hint(Hint::new(kind, s));
            }
            ("type", _) => return Err(kind_error(path, "type")),
            ("hint", _) => return Err(kind_error(path, "hint")),
            ("hint_string", _) => return Err(kind_error(path, "hint string")),
            _ => return Err(PlanError::UnknownProperty(path.to_string())),
        }
        Ok(())
    }

    /// The full property surface, in stable order.
    ///
    /// Per variable: the editor entry, then the storage entries. A derived plan emits storage
    /// entries only for variables that carry an override. Mapping entries follow as one group;
    /// only non-empty aliases are persisted.
    pub fn property_list(&self) -> Vec<PropertyInfo> {
        let mut list = Vec::new();
        let derived = self.is_derived();

        for (name, var) in self.variables() {
            if !var.var_type().is_untyped() && (!derived || !name.starts_with('_')) {
                if self.alias(name).is_some() {
                    list.push(PropertyInfo::new(
                        name,
                        VarType::String,
                        PropertyUsage::ReadOnly,
                    ));
                } else {
                    list.push(PropertyInfo {
                        path: name.to_string(),
                        var_type: var.var_type(),
                        hint: var.hint().clone(),
                        usage: PropertyUsage::Editor,
                    });
                }
            }

            if derived && !self.stores_override(name) {
                continue;
            }
            let prefix = format!("{STORAGE_PREFIX}{name}/");
            for (field, var_type) in [
                ("name", VarType::String),
                ("type", VarType::Int),
                ("value", var.var_type()),
                ("hint", VarType::Int),
                ("hint_string", VarType::String),
            ] {
                list.push(PropertyInfo::new(
                    format!("{prefix}{field}"),
                    var_type,
                    PropertyUsage::Storage,
                ));
            }
        }

        list.push(PropertyInfo::new(
            MAPPING_GROUP,
            VarType::Nil,
            PropertyUsage::Group,
        ));
        for (name, _) in self.variables() {
            let usage = if self.alias(name).is_some() {
                PropertyUsage::Default
            } else {
                PropertyUsage::Editor
            };
            list.push(PropertyInfo::new(
                format!("{MAPPING_PREFIX}{name}"),
                VarType::String,
                usage,
            ));
        }

        list
    }

    pub fn can_revert(&self, path: &str) -> bool {
        if path.starts_with(MAPPING_PREFIX) {
            return true;
        }
        self.base().is_some_and(|b| b.has_variable(path))
    }

    /// The value `path` reverts to: the empty alias, or the base plan's value.
    pub fn revert_value(&self, path: &str) -> Option<Property> {
        if path.starts_with(MAPPING_PREFIX) {
            return Some(Property::Alias(String::new()));
        }
        self.base()?
            .variable(path)
            .map(|v| Property::Value(v.value().clone()))
    }
}
