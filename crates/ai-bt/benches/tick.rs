use ai_blackboard::{NullResolver, ObjectId, Plan, Resolver, VarType, Variable, WorldMut, WorldView};
use ai_bt::{
    BehaviorTree, CheckVar, Condition, ReactiveSequence, Scheduler, SchedulerConfig, Task,
    TaskContext, TickContext, Wait,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

#[derive(Default)]
struct World;

impl WorldView for World {
    type Agent = u64;
}

impl WorldMut for World {}

impl Resolver for World {
    fn resolve(&self, agent: u64, path: &str) -> Option<ObjectId> {
        NullResolver.resolve(agent, path)
    }
}

fn always_true(_ctx: &TaskContext<'_, World>) -> bool {
    true
}

fn bench_bt_tick(c: &mut Criterion) {
    let tree = BehaviorTree::new(Plan::new(), || {
        let mut children = (0..32)
            .map(|_| Task::new(Condition::new(always_true)))
            .collect::<Vec<_>>();
        children.push(Task::new(Wait::new(f64::INFINITY)));
        Task::new(ReactiveSequence::new(children))
    });

    let mut world = World;
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let id = scheduler.spawn(&tree, &world, 1, None).unwrap();

    let mut tick = TickContext::start(0.1);
    c.bench_function("ai-bt/tick(conditions=32)", |b| {
        b.iter(|| {
            scheduler.tick(&tick, &mut world);
            black_box(scheduler.last_status(id));
            tick = tick.next();
        })
    });
}

fn bench_scoped_lookups(c: &mut Criterion) {
    let mut plan = Plan::new();
    for i in 0..16 {
        plan.add_variable(format!("v{i}"), Variable::with_value(VarType::Int, i))
            .unwrap();
    }
    let plan = std::sync::Arc::new(plan);

    // Eight nested scopes, each aliasing into the previous one.
    let mut world = World;
    let mut scheduler = Scheduler::new(SchedulerConfig::default());
    let mut parent = None;
    for agent in 0..8u64 {
        let mut layer = Plan::derived_from(plan.clone()).unwrap();
        if parent.is_some() {
            layer.set_alias("v0", "v0").unwrap();
        }
        let tree = BehaviorTree::new(layer, || Task::new(CheckVar::equals("v0", 0)));
        let id = match parent {
            Some(p) => scheduler.spawn_child(&tree, &world, agent, p).unwrap(),
            None => scheduler.spawn(&tree, &world, agent, None).unwrap(),
        };
        parent = Some(id);
    }

    let mut tick = TickContext::start(0.1);
    c.bench_function("ai-bt/tick(alias_depth=8)", |b| {
        b.iter(|| {
            scheduler.tick(&tick, &mut world);
            tick = tick.next();
        })
    });
}

criterion_group!(benches, bench_bt_tick, bench_scoped_lookups);
criterion_main!(benches);
