use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{
    Blackboard, BlackboardError, PlanError, Resolver, ScopeId, Value, VarType, Variable,
};

/// Names starting with this prefix are reserved for host metadata.
pub const RESERVED_PREFIX: &str = "resource_";

static NEXT_PLAN_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a plan resource.
///
/// Clones of a plan share its id, so a clone is rejected as its original's base. Use
/// [`Plan::duplicate`] for an independent copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlanId(u64);

impl PlanId {
    fn next() -> Self {
        PlanId(NEXT_PLAN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Result of [`Plan::set_base`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseChange {
    Set,
    Cleared,
    /// The plan was offered itself as a base; the base was cleared instead.
    RejectedSelfReference,
}

/// Per-variable issues met while populating a scope. None of them stop the other variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub issues: Vec<PlanError>,
}

impl PopulateReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Ordered schema of blackboard variables, optionally derived from a base plan.
///
/// A derived plan mirrors its base's variables in the base's order. Type and hint always
/// follow the base; a value follows the base unless it has been overridden locally.
#[derive(Debug, Clone)]
pub struct Plan {
    id: PlanId,
    vars: Vec<(String, Variable)>,
    base: Option<Arc<Plan>>,
    aliases: BTreeMap<String, String>,
    prefetch_refs: bool,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            id: PlanId::next(),
            vars: Vec::new(),
            base: None,
            aliases: BTreeMap::new(),
            prefetch_refs: true,
        }
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh plan derived from `base` and synced with it.
    pub fn derived_from(base: Arc<Plan>) -> Result<Self, PlanError> {
        let mut plan = Self::new();
        plan.set_base(Some(base))?;
        Ok(plan)
    }

    pub fn id(&self) -> PlanId {
        self.id
    }

    /// A copy of this plan under a new identity.
    pub fn duplicate(&self) -> Self {
        Self {
            id: PlanId::next(),
            ..self.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.vars.iter().position(|(n, _)| n == name)
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.vars.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn variable_by_index(&self, index: usize) -> Option<(&str, &Variable)> {
        self.vars.get(index).map(|(n, v)| (n.as_str(), v))
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Variable)> {
        self.vars.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn names(&self) -> Vec<&str> {
        self.vars.iter().map(|(n, _)| n.as_str()).collect()
    }

    /// Name of the first variable equal to `var`.
    pub fn name_of(&self, var: &Variable) -> Option<&str> {
        self.vars
            .iter()
            .find(|(_, v)| v == var)
            .map(|(n, _)| n.as_str())
    }

    /// Non-empty identifier, outside the reserved prefix, not yet declared.
    pub fn is_valid_name(&self, name: &str) -> bool {
        is_identifier(name) && !name.starts_with(RESERVED_PREFIX) && !self.has_variable(name)
    }

    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        template: Variable,
    ) -> Result<(), PlanError> {
        let name = name.into();
        if name.is_empty() || name.starts_with(RESERVED_PREFIX) {
            return Err(PlanError::InvalidName(name));
        }
        if self.has_variable(&name) {
            return Err(PlanError::DuplicateName(name));
        }
        self.vars.push((name, template));
        Ok(())
    }

    pub fn remove_variable(&mut self, name: &str) -> Result<Variable, PlanError> {
        let index = self
            .index_of(name)
            .ok_or_else(|| PlanError::NotFound(name.to_string()))?;
        self.aliases.remove(name);
        Ok(self.vars.remove(index).1)
    }

    /// Rename in place, keeping position, value, type, hint and alias.
    pub fn rename_variable(&mut self, old: &str, new: &str) -> Result<(), PlanError> {
        let index = self
            .index_of(old)
            .ok_or_else(|| PlanError::NotFound(old.to_string()))?;
        if old == new {
            return Ok(());
        }
        if self.has_variable(new) {
            return Err(PlanError::DuplicateName(new.to_string()));
        }
        if !self.is_valid_name(new) {
            return Err(PlanError::InvalidName(new.to_string()));
        }

        self.vars[index].0 = new.to_string();
        if let Some(target) = self.aliases.remove(old) {
            self.aliases.insert(new.to_string(), target);
        }
        Ok(())
    }

    pub fn move_variable(&mut self, from: usize, to: usize) -> Result<(), PlanError> {
        let len = self.vars.len();
        for index in [from, to] {
            if index >= len {
                return Err(PlanError::IndexOutOfRange { index, len });
            }
        }
        if from != to {
            let entry = self.vars.remove(from);
            self.vars.insert(to, entry);
        }
        Ok(())
    }

    /// Alias `name` to `target` in the enclosing scope. An empty target clears the alias.
    pub fn set_alias(&mut self, name: &str, target: impl Into<String>) -> Result<(), PlanError> {
        if !self.has_variable(name) {
            return Err(PlanError::NotFound(name.to_string()));
        }
        let target = target.into();
        if target.is_empty() {
            self.aliases.remove(name);
        } else {
            self.aliases.insert(name.to_string(), target);
        }
        Ok(())
    }

    pub fn alias(&self, name: &str) -> Option<&str> {
        self.aliases
            .get(name)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Editor-style value write.
    ///
    /// The value counts as overridden only while it differs from the base plan's value.
    pub fn set_value(&mut self, name: &str, value: impl Into<Value>) -> Result<(), PlanError> {
        let base_value = self
            .base
            .as_ref()
            .and_then(|b| b.variable(name))
            .map(|v| v.value().clone());
        let index = self
            .index_of(name)
            .ok_or_else(|| PlanError::NotFound(name.to_string()))?;
        let var = &mut self.vars[index].1;
        let expected = var.var_type();
        var.try_set(value.into())
            .map_err(|actual| BlackboardError::TypeMismatch {
                name: name.to_string(),
                expected,
                actual,
            })?;
        if base_value.as_ref() == Some(var.value()) {
            var.clear_overridden();
        }
        Ok(())
    }

    pub(crate) fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.vars
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn base(&self) -> Option<&Arc<Plan>> {
        self.base.as_ref()
    }

    pub fn is_derived(&self) -> bool {
        self.base.is_some()
    }

    /// Replace the base plan and reconcile with it.
    pub fn set_base(&mut self, base: Option<Arc<Plan>>) -> Result<BaseChange, PlanError> {
        let change = match base {
            Some(base) if base.id == self.id => {
                tracing::warn!(
                    plan = self.id.0,
                    "a plan cannot be its own base; clearing base instead"
                );
                self.base = None;
                BaseChange::RejectedSelfReference
            }
            Some(base) => {
                self.base = Some(base);
                BaseChange::Set
            }
            None => {
                self.base = None;
                BaseChange::Cleared
            }
        };
        self.sync_with_base()?;
        Ok(change)
    }

    /// Whether path-typed variables are resolved to live objects on instantiation.
    ///
    /// Derived plans use their base's setting.
    pub fn prefetch_refs(&self) -> bool {
        match &self.base {
            Some(base) => base.prefetch_refs(),
            None => self.prefetch_refs,
        }
    }

    pub fn set_prefetch_refs(&mut self, enable: bool) {
        self.prefetch_refs = enable;
    }

    /// Reconcile with the current base plan. Returns whether anything changed.
    pub fn sync_with_base(&mut self) -> Result<bool, PlanError> {
        let Some(base) = self.base.clone() else {
            return Ok(false);
        };
        self.sync_with(&base)
    }

    /// Reconcile this plan's variables against `base`. Idempotent.
    ///
    /// Afterwards the variable set equals the base's, in the base's order, with the base's
    /// type and hint everywhere and the base's value wherever the value is not overridden.
    pub fn sync_with(&mut self, base: &Plan) -> Result<bool, PlanError> {
        let mut changed = false;

        for (name, base_var) in &base.vars {
            let Some(index) = self.index_of(name) else {
                self.vars.push((name.clone(), base_var.duplicate()));
                changed = true;
                continue;
            };

            let var = &mut self.vars[index].1;
            if !var.same_prop_info(base_var) {
                var.copy_prop_info(base_var);
                changed = true;
            }

            let stale = !var.is_overridden() && var.value() != base_var.value();
            if stale || !var.value_matches_type() {
                let base_value = base_var.value();
                if var.value() != base_value || var.is_overridden() {
                    var.reset_value(base_value.clone());
                    changed = true;
                }
            }
        }

        let before = self.vars.len();
        self.vars.retain(|(name, _)| base.has_variable(name));
        if self.vars.len() != before {
            let vars = &self.vars;
            self.aliases
                .retain(|name, _| vars.iter().any(|(n, _)| n == name));
            changed = true;
        }

        if self.vars.len() != base.vars.len() {
            tracing::error!(
                local = self.vars.len(),
                base = base.vars.len(),
                "plan variable count differs from base after sync"
            );
            return Err(PlanError::StructuralMismatch {
                local: self.vars.len(),
                base: base.vars.len(),
            });
        }

        // Stable reorder: pull each base entry forward to its position.
        for (position, (base_name, _)) in base.vars.iter().enumerate() {
            if &self.vars[position].0 == base_name {
                continue;
            }
            if let Some(offset) = self.vars[position + 1..]
                .iter()
                .position(|(n, _)| n == base_name)
            {
                let entry = self.vars.remove(position + 1 + offset);
                self.vars.insert(position, entry);
                changed = true;
            }
        }

        if changed {
            tracing::debug!(plan = self.id.0, base = base.id.0, "plan synced with base");
        }
        Ok(changed)
    }

    /// Create a scope under `parent` and fill it from this plan.
    pub fn instantiate<R: Resolver>(
        &self,
        board: &mut Blackboard,
        resolver: &R,
        agent: R::Agent,
        parent: Option<ScopeId>,
    ) -> Result<(ScopeId, PopulateReport), BlackboardError> {
        let scope = board.create_scope(parent)?;
        let report = self.populate(board, scope, true, resolver, agent)?;
        Ok((scope, report))
    }

    /// Fill an existing scope with copies of this plan's variables, then link aliased ones
    /// to the scope's parent.
    ///
    /// With `overwrite` unset, names that already resolve from `scope` are left alone.
    pub fn populate<R: Resolver>(
        &self,
        board: &mut Blackboard,
        scope: ScopeId,
        overwrite: bool,
        resolver: &R,
        agent: R::Agent,
    ) -> Result<PopulateReport, BlackboardError> {
        let parent = board.parent(scope)?;
        let prefetch = self.prefetch_refs();
        let mut report = PopulateReport::default();

        for (name, template) in &self.vars {
            if !overwrite && board.has(scope, name) {
                continue;
            }

            if prefetch && template.var_type() == VarType::Path {
                let path = template.value().as_str().unwrap_or_default();
                match resolver.resolve(agent, path) {
                    Some(object) => {
                        let mut var = template.duplicate();
                        var.reset_value(Value::Object(object));
                        board.declare(scope, name.clone(), var)?;
                    }
                    // A name that already resolves was initialized by the caller or a parent
                    // scope; keep it.
                    None if board.has(scope, name) => {}
                    None => {
                        tracing::warn!(var = %name, path, "prefetch failed; leaving variable empty");
                        report.issues.push(PlanError::Unresolved {
                            name: name.clone(),
                            path: path.to_string(),
                        });
                        let mut var = template.duplicate();
                        var.reset_value(Value::Nil);
                        board.declare(scope, name.clone(), var)?;
                    }
                }
            } else {
                board.declare(scope, name.clone(), template.duplicate())?;
            }

            if let Some(target) = self.alias(name) {
                match parent {
                    Some(parent) => board.link(scope, name.clone(), parent, target)?,
                    None => {
                        tracing::error!(
                            var = %name,
                            alias = %target,
                            "cannot link variable to parent scope: no parent scope"
                        );
                        report
                            .issues
                            .push(PlanError::MissingParentScope(name.clone()));
                    }
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rules() {
        assert!(is_identifier("health"));
        assert!(is_identifier("_hidden"));
        assert!(is_identifier("target2"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("2target"));
        assert!(!is_identifier("has space"));
        assert!(!is_identifier("var/x"));
    }

    #[test]
    fn clones_share_identity() {
        let plan = Plan::new();
        assert_eq!(plan.clone().id(), plan.id());
        assert_ne!(Plan::new().id(), plan.id());
    }
}
