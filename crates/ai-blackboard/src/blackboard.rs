use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{BlackboardError, Value, Variable};

/// Handle to one scope store inside a [`Blackboard`].
///
/// Handles are generational: once a scope is removed, its handle reports
/// [`BlackboardError::DanglingScope`] even if the storage slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScopeId {
    index: u32,
    generation: u32,
}

/// Redirect of a local name to a name in another scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub scope: ScopeId,
    pub name: String,
}

/// Variables of one execution context.
///
/// A name is either a local slot or a link, never both.
#[derive(Debug, Default)]
pub struct ScopeStore {
    slots: BTreeMap<String, Variable>,
    links: BTreeMap<String, Link>,
    parent: Option<ScopeId>,
}

impl ScopeStore {
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn slot(&self, name: &str) -> Option<&Variable> {
        self.slots.get(name)
    }

    pub fn link(&self, name: &str) -> Option<&Link> {
        self.links.get(name)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlackboardConfig {
    /// Upper bound on scope hops (links and parents) followed by one lookup.
    pub max_link_depth: usize,
}

impl Default for BlackboardConfig {
    fn default() -> Self {
        Self { max_link_depth: 64 }
    }
}

#[derive(Debug)]
struct Entry {
    generation: u32,
    store: Option<ScopeStore>,
}

enum Located {
    Found(ScopeId, String),
    /// Nothing resolves; a write should create the slot at this scope/name.
    Missing(ScopeId, String),
}

/// Registry of scope stores.
///
/// Scopes refer to their parent and link targets by [`ScopeId`], so a child scope never owns
/// the scope it reads through. All scopes that may link into each other must live in the same
/// registry.
#[derive(Debug, Default)]
pub struct Blackboard {
    entries: Vec<Entry>,
    free: Vec<u32>,
    config: BlackboardConfig,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BlackboardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &BlackboardConfig {
        &self.config
    }

    pub fn scope_count(&self) -> usize {
        self.entries.iter().filter(|e| e.store.is_some()).count()
    }

    pub fn create_scope(&mut self, parent: Option<ScopeId>) -> Result<ScopeId, BlackboardError> {
        if let Some(parent) = parent {
            self.store(parent)?;
        }
        let store = ScopeStore {
            parent,
            ..ScopeStore::default()
        };

        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.store = Some(store);
            return Ok(ScopeId {
                index,
                generation: entry.generation,
            });
        }

        let index = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            store: Some(store),
        });
        Ok(ScopeId {
            index,
            generation: 0,
        })
    }

    /// Tear down a scope. Links and child scopes pointing at it become dangling.
    pub fn remove_scope(&mut self, id: ScopeId) -> Option<ScopeStore> {
        let entry = self.entries.get_mut(id.index as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        let store = entry.store.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(store)
    }

    pub fn contains_scope(&self, id: ScopeId) -> bool {
        self.store(id).is_ok()
    }

    pub fn store(&self, id: ScopeId) -> Result<&ScopeStore, BlackboardError> {
        self.entries
            .get(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.store.as_ref())
            .ok_or(BlackboardError::DanglingScope(id))
    }

    fn store_mut(&mut self, id: ScopeId) -> Result<&mut ScopeStore, BlackboardError> {
        self.entries
            .get_mut(id.index as usize)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.store.as_mut())
            .ok_or(BlackboardError::DanglingScope(id))
    }

    pub fn parent(&self, id: ScopeId) -> Result<Option<ScopeId>, BlackboardError> {
        Ok(self.store(id)?.parent)
    }

    /// Borrow a cursor bound to one scope.
    pub fn scope(&mut self, id: ScopeId) -> Scope<'_> {
        Scope { board: self, id }
    }

    // Links first, then local slots, then the parent chain.
    fn locate(&self, scope: ScopeId, name: &str) -> Result<Located, BlackboardError> {
        let mut current = scope;
        let mut current_name = name.to_string();
        let mut origin = (scope, name.to_string());

        for _ in 0..=self.config.max_link_depth {
            let store = self.store(current)?;
            if let Some(link) = store.links.get(&current_name) {
                current = link.scope;
                current_name = link.name.clone();
                origin = (current, current_name.clone());
                continue;
            }
            if store.slots.contains_key(&current_name) {
                return Ok(Located::Found(current, current_name));
            }
            match store.parent {
                Some(parent) => current = parent,
                None => return Ok(Located::Missing(origin.0, origin.1)),
            }
        }

        Err(BlackboardError::LinkCycle(name.to_string()))
    }

    pub fn get_var(&self, scope: ScopeId, name: &str) -> Result<&Variable, BlackboardError> {
        match self.locate(scope, name)? {
            Located::Found(id, slot) => self
                .store(id)?
                .slots
                .get(&slot)
                .ok_or_else(|| BlackboardError::UndefinedVariable(name.to_string())),
            Located::Missing(..) => Err(BlackboardError::UndefinedVariable(name.to_string())),
        }
    }

    pub fn get(&self, scope: ScopeId, name: &str) -> Result<&Value, BlackboardError> {
        self.get_var(scope, name).map(Variable::value)
    }

    /// Write through links and the parent chain.
    ///
    /// Writing a name nothing resolves declares an untyped slot where the lookup ended: in
    /// `scope` itself, or at the target of the last link followed.
    pub fn set(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), BlackboardError> {
        let value = value.into();
        match self.locate(scope, name)? {
            Located::Found(id, slot) => {
                let var = self
                    .store_mut(id)?
                    .slots
                    .get_mut(&slot)
                    .ok_or_else(|| BlackboardError::UndefinedVariable(name.to_string()))?;
                let expected = var.var_type();
                var.try_set(value)
                    .map_err(|actual| BlackboardError::TypeMismatch {
                        name: name.to_string(),
                        expected,
                        actual,
                    })
            }
            Located::Missing(id, slot) => {
                self.store_mut(id)?
                    .slots
                    .insert(slot, Variable::untyped(value));
                Ok(())
            }
        }
    }

    pub fn has(&self, scope: ScopeId, name: &str) -> bool {
        matches!(self.locate(scope, name), Ok(Located::Found(..)))
    }

    /// Place a variable directly in `scope`, replacing any slot or link of that name.
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        var: Variable,
    ) -> Result<(), BlackboardError> {
        let name = name.into();
        let store = self.store_mut(scope)?;
        store.links.remove(&name);
        store.slots.insert(name, var);
        Ok(())
    }

    /// Redirect `name` in `scope` to `target_name` in `target`.
    ///
    /// Replaces any local slot or link of that name. The target is not checked until use.
    pub fn link(
        &mut self,
        scope: ScopeId,
        name: impl Into<String>,
        target: ScopeId,
        target_name: impl Into<String>,
    ) -> Result<(), BlackboardError> {
        let name = name.into();
        let store = self.store_mut(scope)?;
        store.slots.remove(&name);
        store.links.insert(
            name,
            Link {
                scope: target,
                name: target_name.into(),
            },
        );
        Ok(())
    }

    pub fn unlink(&mut self, scope: ScopeId, name: &str) -> Result<Option<Link>, BlackboardError> {
        Ok(self.store_mut(scope)?.links.remove(name))
    }

    /// Drop a local slot or link. Parent scopes are untouched.
    pub fn erase(&mut self, scope: ScopeId, name: &str) -> Result<bool, BlackboardError> {
        let store = self.store_mut(scope)?;
        let had_slot = store.slots.remove(name).is_some();
        let had_link = store.links.remove(name).is_some();
        Ok(had_slot || had_link)
    }

    /// Local names of a scope (slots and links), sorted.
    pub fn names(&self, scope: ScopeId) -> Result<Vec<String>, BlackboardError> {
        let store = self.store(scope)?;
        let mut names: Vec<String> = store
            .slots
            .keys()
            .chain(store.links.keys())
            .cloned()
            .collect();
        names.sort();
        Ok(names)
    }
}

/// Mutable cursor over one scope of a [`Blackboard`].
pub struct Scope<'a> {
    board: &'a mut Blackboard,
    id: ScopeId,
}

impl<'a> Scope<'a> {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    pub fn board(&mut self) -> &mut Blackboard {
        &mut *self.board
    }

    pub fn get(&self, name: &str) -> Result<&Value, BlackboardError> {
        self.board.get(self.id, name)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), BlackboardError> {
        self.board.set(self.id, name, value)
    }

    pub fn has(&self, name: &str) -> bool {
        self.board.has(self.id, name)
    }

    pub fn declare(&mut self, name: impl Into<String>, var: Variable) -> Result<(), BlackboardError> {
        self.board.declare(self.id, name, var)
    }

    pub fn link(
        &mut self,
        name: impl Into<String>,
        target: ScopeId,
        target_name: impl Into<String>,
    ) -> Result<(), BlackboardError> {
        self.board.link(self.id, name, target, target_name)
    }
}
