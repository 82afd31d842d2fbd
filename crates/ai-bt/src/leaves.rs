//! Leaf tasks.

use std::cmp::Ordering;

use ai_blackboard::{BlackboardError, ObjectId, Resolver, Value, WorldMut};

use crate::bt::{BtNode, BtStatus, TaskContext};
use crate::SetupError;

/// Succeeds when the predicate holds, fails otherwise.
pub struct Condition<F> {
    cond: F,
}

impl<F> Condition<F> {
    pub fn new<W>(cond: F) -> Self
    where
        W: WorldMut + 'static,
        F: FnMut(&TaskContext<'_, W>) -> bool + 'static,
    {
        Self { cond }
    }
}

impl<F, W> BtNode<W> for Condition<F>
where
    F: FnMut(&TaskContext<'_, W>) -> bool + 'static,
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        if (self.cond)(ctx) {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }
}

/// Runs a closure every tick and reports whatever it returns.
pub struct Action<F> {
    run: F,
}

impl<F> Action<F> {
    pub fn new<W>(run: F) -> Self
    where
        W: WorldMut + 'static,
        F: FnMut(&mut TaskContext<'_, W>, f64) -> BtStatus + 'static,
    {
        Self { run }
    }
}

impl<F, W> BtNode<W> for Action<F>
where
    F: FnMut(&mut TaskContext<'_, W>, f64) -> BtStatus + 'static,
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, elapsed: f64) -> BtStatus {
        (self.run)(ctx, elapsed)
    }
}

/// Runs for `seconds`, then succeeds.
#[derive(Debug, Clone, Copy)]
pub struct Wait {
    seconds: f64,
}

impl Wait {
    pub fn new(seconds: f64) -> Self {
        Self { seconds }
    }
}

impl<W> BtNode<W> for Wait
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, _ctx: &mut TaskContext<'_, W>, elapsed: f64) -> BtStatus {
        if elapsed >= self.seconds {
            BtStatus::Success
        } else {
            BtStatus::Running
        }
    }
}

/// Where [`AwaitCondition`] finds the object it watches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A blackboard variable holding an object or a path to one.
    Var(String),
    /// A path resolved directly against the world.
    Path(String),
}

/// Waits for a condition on a resolved object, with a soft deadline.
///
/// The target is resolved in setup; an unset or unresolvable target fails the task until
/// it is aborted. While the condition is false the task keeps running for up to
/// `max_time` seconds, then logs a warning and succeeds anyway.
pub struct AwaitCondition<F> {
    target: Option<Target>,
    until: F,
    max_time: f64,
    object: Option<ObjectId>,
}

impl<F> AwaitCondition<F> {
    pub fn new<W>(until: F, max_time: f64) -> Self
    where
        W: WorldMut + Resolver + 'static,
        F: FnMut(&W, W::Agent, ObjectId) -> bool + 'static,
    {
        Self {
            target: None,
            until,
            max_time,
            object: None,
        }
    }

    pub fn target(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    pub fn target_var(self, name: impl Into<String>) -> Self {
        self.target(Target::Var(name.into()))
    }

    pub fn target_path(self, path: impl Into<String>) -> Self {
        self.target(Target::Path(path.into()))
    }
}

fn resolve_path<W>(ctx: &TaskContext<'_, W>, path: &str) -> Result<ObjectId, SetupError>
where
    W: WorldMut + Resolver,
{
    ctx.world
        .resolve(ctx.agent, path)
        .ok_or_else(|| SetupError::Unresolved(path.to_owned()))
}

impl<F, W> BtNode<W> for AwaitCondition<F>
where
    F: FnMut(&W, W::Agent, ObjectId) -> bool + 'static,
    W: WorldMut + Resolver + 'static,
{
    fn setup(&mut self, ctx: &mut TaskContext<'_, W>) -> Result<(), SetupError> {
        self.object = None;
        if self.max_time <= 0.0 {
            return Err(SetupError::MissingParameter("max_time"));
        }

        let object = match &self.target {
            None => return Err(SetupError::MissingParameter("target")),
            Some(Target::Path(path)) => resolve_path(ctx, path)?,
            Some(Target::Var(name)) => match ctx.get(name)? {
                Value::Object(id) => *id,
                Value::Path(path) => resolve_path(ctx, path)?,
                _ => return Err(SetupError::Unresolved(name.clone())),
            },
        };
        self.object = Some(object);
        Ok(())
    }

    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, elapsed: f64) -> BtStatus {
        let Some(object) = self.object else {
            return BtStatus::Failure;
        };

        if (self.until)(&*ctx.world, ctx.agent, object) {
            BtStatus::Success
        } else if elapsed <= self.max_time {
            BtStatus::Running
        } else {
            tracing::warn!(
                object = object.0,
                elapsed,
                max_time = self.max_time,
                "condition not met before deadline; continuing"
            );
            BtStatus::Success
        }
    }
}

/// Writes a value into the instance scope.
#[derive(Debug, Clone)]
pub struct SetVar {
    name: String,
    value: Value,
}

impl SetVar {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl<W> BtNode<W> for SetVar
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        match ctx.set(&self.name, self.value.clone()) {
            Ok(()) => BtStatus::Success,
            Err(err) => {
                tracing::warn!(var = %self.name, error = %err, "failed to write variable");
                BtStatus::Failure
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Compare {
    #[default]
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl Compare {
    /// Numbers compare by value across int and float; other values only by equality.
    pub fn holds(self, left: &Value, right: &Value) -> bool {
        let ordering = match (left.as_float(), right.as_float()) {
            (Some(l), Some(r)) => l.partial_cmp(&r),
            _ if left == right => Some(Ordering::Equal),
            _ => None,
        };
        match self {
            Compare::Equal => ordering == Some(Ordering::Equal),
            Compare::NotEqual => ordering != Some(Ordering::Equal),
            Compare::Less => ordering == Some(Ordering::Less),
            Compare::LessEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            Compare::Greater => ordering == Some(Ordering::Greater),
            Compare::GreaterEqual => {
                matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
            }
        }
    }
}

/// Compares a variable against a constant.
///
/// An undefined variable is not an error: the task logs a warning and returns the
/// `if_unset` status, `Success` unless configured otherwise.
#[derive(Debug, Clone)]
pub struct CheckVar {
    name: String,
    check: Compare,
    value: Value,
    if_unset: BtStatus,
}

impl CheckVar {
    pub fn new(name: impl Into<String>, check: Compare, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            check,
            value: value.into(),
            if_unset: BtStatus::Success,
        }
    }

    pub fn equals(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, Compare::Equal, value)
    }

    pub fn if_unset(mut self, status: BtStatus) -> Self {
        self.if_unset = status;
        self
    }
}

impl<W> BtNode<W> for CheckVar
where
    W: WorldMut + 'static,
{
    fn tick(&mut self, ctx: &mut TaskContext<'_, W>, _elapsed: f64) -> BtStatus {
        match ctx.get(&self.name) {
            Ok(current) if self.check.holds(current, &self.value) => BtStatus::Success,
            Ok(_) => BtStatus::Failure,
            Err(BlackboardError::UndefinedVariable(_)) => {
                tracing::warn!(var = %self.name, status = ?self.if_unset, "variable is not set");
                self.if_unset
            }
            Err(err) => {
                tracing::warn!(var = %self.name, error = %err, "variable lookup failed");
                BtStatus::Failure
            }
        }
    }
}
