//! A guard patrols until the squad raises the alarm, then waits for the gate to close.
//!
//! Run with `RUST_LOG=debug` to see setup and scheduling events.

use std::collections::BTreeMap;

use ai_blackboard::{ObjectId, Plan, Resolver, Value, VarType, Variable, WorldMut, WorldView};
use ai_bt::{
    Action, AwaitCondition, BehaviorTree, BtStatus, CheckVar, ReactiveSelector, Repeat,
    Scheduler, SchedulerConfig, Sequence, Task, TaskContext, TickContext, Wait,
};
use tracing_subscriber::{fmt, EnvFilter};

const SQUAD: u64 = 0;
const GUARD: u64 = 1;

#[derive(Debug, Default)]
struct Camp {
    objects: BTreeMap<&'static str, ObjectId>,
    gate_closed: bool,
    steps: BTreeMap<u64, u32>,
}

impl WorldView for Camp {
    type Agent = u64;
}

impl WorldMut for Camp {}

impl Resolver for Camp {
    fn resolve(&self, _agent: u64, path: &str) -> Option<ObjectId> {
        self.objects.get(path).copied()
    }
}

fn gate_is_closed(camp: &Camp, _agent: u64, _gate: ObjectId) -> bool {
    camp.gate_closed
}

fn walk(ctx: &mut TaskContext<'_, Camp>, _elapsed: f64) -> BtStatus {
    *ctx.world.steps.entry(ctx.agent).or_default() += 1;
    BtStatus::Success
}

fn guard_tree() -> BehaviorTree<Camp> {
    let mut plan = Plan::new();
    plan.add_variable("alarm", Variable::with_value(VarType::Bool, false))
        .expect("fresh plan");
    plan.add_variable("gate", Variable::with_value(VarType::Path, Value::Path("Gate".into())))
        .expect("fresh plan");
    plan.set_alias("alarm", "squad_alarm").expect("declared above");

    BehaviorTree::new(plan, || {
        Task::new(ReactiveSelector::new(vec![
            Task::new(Sequence::new(vec![
                Task::new(CheckVar::equals("alarm", true)),
                Task::new(AwaitCondition::new(gate_is_closed, 3.0).target_var("gate"))
                    .labeled("hold_gate"),
            ]))
            .labeled("respond"),
            Task::new(Repeat::forever(Task::new(Sequence::new(vec![
                Task::new(Action::new(walk)),
                Task::new(Wait::new(0.5)),
            ]))))
            .labeled("patrol"),
        ]))
    })
}

fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let mut camp = Camp::default();
    camp.objects.insert("Gate", ObjectId(42));

    let mut squad_plan = Plan::new();
    squad_plan
        .add_variable("squad_alarm", Variable::with_value(VarType::Bool, false))
        .expect("fresh plan");
    let squad = BehaviorTree::new(squad_plan, || Task::new(Wait::new(f64::INFINITY)));

    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let squad_id = scheduler
        .spawn(&squad, &camp, SQUAD, None)
        .expect("squad spawns");
    let guard_id = scheduler
        .spawn_child(&guard_tree(), &camp, GUARD, squad_id)
        .expect("guard spawns");
    let squad_scope = scheduler.scope(squad_id).expect("squad is live");

    let mut tick = TickContext::start(0.25);
    for _ in 0..40 {
        match tick.tick {
            12 => {
                tracing::info!("squad raises the alarm");
                scheduler
                    .board_mut()
                    .set(squad_scope, "squad_alarm", true)
                    .expect("typed bool slot");
            }
            20 => {
                tracing::info!("gate closes");
                camp.gate_closed = true;
            }
            _ => {}
        }

        scheduler.tick(&tick, &mut camp);
        tracing::info!(
            tick = tick.tick,
            status = ?scheduler.last_status(guard_id),
            steps = camp.steps.get(&GUARD).copied().unwrap_or(0),
            "guard"
        );
        tick = tick.next();
    }
}
