use ai_blackboard::{Blackboard, ObjectId, Plan, Resolver, WorldMut, WorldView};
use ai_bt::{
    Action, BehaviorTree, BtNode, BtStatus, Parallel, ParallelPolicy, ReactiveSelector,
    ReactiveSequence, Selector, Sequence, Task, TaskContext, TaskStatus, TickContext,
    TreeInstance,
};

#[derive(Debug, Default)]
struct RecordingWorld {
    log: Vec<&'static str>,
}

impl WorldView for RecordingWorld {
    type Agent = u64;
}

impl WorldMut for RecordingWorld {}

impl Resolver for RecordingWorld {
    fn resolve(&self, _agent: u64, _path: &str) -> Option<ObjectId> {
        None
    }
}

/// Logs every tick; finishes with `outcome` once `finish_after` seconds have elapsed.
fn step(name: &'static str, finish_after: f64, outcome: BtStatus) -> Task<RecordingWorld> {
    Task::new(Action::new(
        move |ctx: &mut TaskContext<'_, RecordingWorld>, elapsed: f64| {
            ctx.world.log.push(name);
            if elapsed >= finish_after {
                outcome
            } else {
                BtStatus::Running
            }
        },
    ))
    .labeled(name)
}

/// Runs forever and records aborts.
struct Patrol;

impl BtNode<RecordingWorld> for Patrol {
    fn tick(&mut self, ctx: &mut TaskContext<'_, RecordingWorld>, _elapsed: f64) -> BtStatus {
        ctx.world.log.push("patrol");
        BtStatus::Running
    }

    fn abort(&mut self, ctx: &mut TaskContext<'_, RecordingWorld>) {
        ctx.world.log.push("patrol:abort");
    }
}

/// Succeeds while the boolean variable is true.
fn flag(name: &'static str) -> Task<RecordingWorld> {
    Task::new(Action::new(
        move |ctx: &mut TaskContext<'_, RecordingWorld>, _elapsed: f64| {
            match ctx.get(name).ok().and_then(|v| v.as_bool()) {
                Some(true) => BtStatus::Success,
                _ => BtStatus::Failure,
            }
        },
    ))
}

struct Harness {
    world: RecordingWorld,
    board: Blackboard,
    instance: TreeInstance<RecordingWorld>,
    tick: TickContext,
}

impl Harness {
    fn new(build: impl Fn() -> Task<RecordingWorld> + 'static) -> Self {
        let tree = BehaviorTree::new(Plan::new(), build);
        let world = RecordingWorld::default();
        let mut board = Blackboard::new();
        let instance = tree.instantiate(&mut board, &world, 1, None).unwrap();
        Self {
            world,
            board,
            instance,
            tick: TickContext::start(1.0),
        }
    }

    fn step(&mut self) -> BtStatus {
        let status = self
            .instance
            .tick(&self.tick, &mut self.world, &mut self.board);
        self.tick = self.tick.next();
        status
    }

    fn set(&mut self, name: &str, value: bool) {
        self.board.set(self.instance.scope(), name, value).unwrap();
    }
}

#[test]
fn sequence_resumes_running_child() {
    let mut h = Harness::new(|| {
        Task::new(Sequence::new(vec![
            step("a", 0.0, BtStatus::Success),
            step("b", 4.0, BtStatus::Success),
        ]))
    });

    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.world.log, vec!["a", "b"]);
    let children = h.instance.root().children();
    assert_eq!(children[0].status(), TaskStatus::Success);
    assert_eq!(children[1].status(), TaskStatus::Running);

    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.world.log, vec!["a", "b", "b", "b"]);

    assert_eq!(h.step(), BtStatus::Success);
    assert_eq!(h.world.log, vec!["a", "b", "b", "b", "b"]);
    assert_eq!(h.instance.root().status(), TaskStatus::Success);
    assert_eq!(h.instance.root().elapsed(), 0.0);
}

#[test]
fn sequence_stops_at_first_failure() {
    let mut h = Harness::new(|| {
        Task::new(Sequence::new(vec![
            step("a", 0.0, BtStatus::Failure),
            step("b", 0.0, BtStatus::Success),
        ]))
    });

    assert_eq!(h.step(), BtStatus::Failure);
    assert_eq!(h.world.log, vec!["a"]);
    assert_eq!(h.instance.root().children()[1].status(), TaskStatus::Fresh);
}

#[test]
fn selector_falls_through_failures() {
    let mut h = Harness::new(|| {
        Task::new(Selector::new(vec![
            step("a", 0.0, BtStatus::Failure),
            step("b", 2.0, BtStatus::Success),
            step("c", 0.0, BtStatus::Success),
        ]))
    });

    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.step(), BtStatus::Success);
    assert_eq!(h.world.log, vec!["a", "b", "b"]);

    // A finished selector restarts from its first child.
    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.world.log, vec!["a", "b", "b", "a", "b"]);
}

#[test]
fn reactive_sequence_aborts_running_child_when_condition_drops() {
    let mut h = Harness::new(|| {
        Task::new(ReactiveSequence::new(vec![
            flag("on_duty"),
            Task::new(Patrol),
        ]))
    });
    h.set("on_duty", true);

    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.world.log, vec!["patrol", "patrol"]);

    h.set("on_duty", false);
    assert_eq!(h.step(), BtStatus::Failure);
    assert_eq!(h.world.log, vec!["patrol", "patrol", "patrol:abort"]);
    assert_eq!(h.instance.root().children()[1].status(), TaskStatus::Fresh);
}

#[test]
fn reactive_selector_preempts_lower_priority_branch() {
    let mut h = Harness::new(|| {
        Task::new(ReactiveSelector::new(vec![
            Task::new(Sequence::new(vec![
                flag("alarm"),
                step("respond", 10.0, BtStatus::Success),
            ])),
            Task::new(Patrol),
        ]))
    });

    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.world.log, vec!["patrol"]);

    h.set("alarm", true);
    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.world.log, vec!["patrol", "respond", "patrol:abort"]);

    let children = h.instance.root().children();
    assert_eq!(children[0].status(), TaskStatus::Running);
    assert_eq!(children[1].status(), TaskStatus::Fresh);
}

#[test]
fn parallel_waits_for_all_and_does_not_rerun_finished_children() {
    let mut h = Harness::new(|| {
        Task::new(Parallel::new(
            vec![
                step("slow", 2.0, BtStatus::Success),
                step("fast", 0.0, BtStatus::Success),
            ],
            ParallelPolicy::all_succeed(),
        ))
    });

    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.step(), BtStatus::Success);
    assert_eq!(h.world.log, vec!["slow", "fast", "slow"]);
}

#[test]
fn parallel_any_success_aborts_the_rest() {
    let mut h = Harness::new(|| {
        Task::new(Parallel::new(
            vec![Task::new(Patrol), step("spot", 2.0, BtStatus::Success)],
            ParallelPolicy::any_succeed(),
        ))
    });

    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.step(), BtStatus::Success);
    assert_eq!(
        h.world.log,
        vec!["patrol", "spot", "patrol", "spot", "patrol:abort"]
    );
}

#[test]
fn parallel_fails_when_thresholds_become_unreachable() {
    let mut h = Harness::new(|| {
        Task::new(Parallel::new(
            vec![
                step("a", 0.0, BtStatus::Failure),
                step("b", 0.0, BtStatus::Success),
            ],
            ParallelPolicy::new(2, 2),
        ))
    });

    assert_eq!(h.step(), BtStatus::Failure);
}

#[test]
fn repeating_parallel_restarts_finished_children() {
    let mut h = Harness::new(|| {
        Task::new(Parallel::new(
            vec![
                step("blink", 0.0, BtStatus::Success),
                step("walk", 3.0, BtStatus::Success),
            ],
            ParallelPolicy::all_succeed().repeating(),
        ))
    });

    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.step(), BtStatus::Running);
    assert_eq!(h.step(), BtStatus::Success);
    assert_eq!(
        h.world.log,
        vec!["blink", "walk", "blink", "walk", "blink", "walk"]
    );
}
