//! Integration tests against the public `reactor_runtime` API, one per
//! scenario class the scheduler is expected to handle correctly.

use std::cell::Cell;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use reactor_core::{Instant, Interval};
use reactor_runtime::{
    Clock, Config, ReactorProgram, RuntimeError, Scheduler, TriggerId, TriggerTable,
    TriggerTableBuilder,
};

/// A clock that starts at a fixed instant and advances by a fixed step on
/// every call, so tests get deterministic physical time without sleeping.
struct SteppedClock {
    next: Cell<i64>,
    step_nanos: i64,
}

impl SteppedClock {
    fn new(start: Instant, step_nanos: i64) -> Self {
        Self {
            next: Cell::new(start.as_nanos()),
            step_nanos,
        }
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> Result<Instant, RuntimeError> {
        let t = self.next.get();
        self.next.set(t + self.step_nanos);
        Ok(Instant::from_nanos(t))
    }
}

// S1: a single periodic timer that stops itself on its third firing.
struct SingleTimer {
    fires: Arc<Mutex<u32>>,
}

impl ReactorProgram for SingleTimer {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();
        let timer = builder.add_trigger(Interval::ZERO, Interval::from_nanos(1_000_000_000), true);
        let fires = self.fires.clone();
        let reaction = builder.add_reaction(0, (), move |_, ctx| {
            let mut n = fires.lock().unwrap();
            *n += 1;
            if *n >= 3 {
                ctx.request_stop();
            }
        });
        builder.bind(timer, reaction);
        builder.build()
    }
}

#[test_log::test]
fn s1_single_timer_stops_after_third_fire_at_two_seconds() {
    let fires = Arc::new(Mutex::new(0));
    let mut program = SingleTimer { fires: fires.clone() };
    let config = Config::new().fast(true);
    let mut scheduler = Scheduler::with_clock(
        &mut program,
        config.clone(),
        Box::new(SteppedClock::new(Instant::from_nanos(0), 0)),
    );
    scheduler.initialize(&mut program, &config).unwrap();
    scheduler.run(&mut program).unwrap();

    assert_eq!(*fires.lock().unwrap(), 3);
    assert_eq!(scheduler.current_time(), Instant::from_nanos(2_000_000_000));
}

// S2: an empty event queue with a stop duration.
struct NoTriggers;

impl ReactorProgram for NoTriggers {
    fn build(&mut self) -> TriggerTable {
        TriggerTableBuilder::new().build()
    }
}

#[test_log::test]
fn s2_empty_queue_without_wait_returns_immediately() {
    let mut program = NoTriggers;
    let config = Config::new().fast(true).stop_after(Interval::from_nanos(500_000_000));
    let mut scheduler = Scheduler::with_clock(
        &mut program,
        config.clone(),
        Box::new(SteppedClock::new(Instant::from_nanos(0), 0)),
    );
    scheduler.initialize(&mut program, &config).unwrap();
    scheduler.run(&mut program).unwrap();

    assert_eq!(scheduler.current_time(), Instant::from_nanos(0));
}

#[test_log::test]
fn s2_empty_queue_with_wait_idles_to_the_stop_time() {
    let mut program = NoTriggers;
    let config = Config::new()
        .fast(true)
        .wait(true)
        .stop_after(Interval::from_nanos(500_000_000));
    let mut scheduler = Scheduler::with_clock(
        &mut program,
        config.clone(),
        Box::new(SteppedClock::new(Instant::from_nanos(0), 0)),
    );
    scheduler.initialize(&mut program, &config).unwrap();
    scheduler.run(&mut program).unwrap();

    assert_eq!(scheduler.current_time(), Instant::from_nanos(500_000_000));
}

// S3: chained reactions A -> B -> C at the same tag.
struct Chained {
    order: Arc<Mutex<Vec<&'static str>>>,
}

impl ReactorProgram for Chained {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();
        let start = builder.add_trigger(Interval::ZERO, Interval::ZERO, true);
        let b_trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, false);
        let c_trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, false);

        let order = self.order.clone();
        let reaction_c = builder.add_reaction(2, (), move |_, ctx| {
            order.lock().unwrap().push("c");
            ctx.request_stop();
        });
        builder.bind(c_trigger, reaction_c);

        let order = self.order.clone();
        let reaction_b = builder.add_reaction(1, (), move |_, ctx| {
            order.lock().unwrap().push("b");
            ctx.set_output(0);
        });
        builder.add_output(reaction_b, vec![c_trigger]);
        builder.bind(b_trigger, reaction_b);

        let order = self.order.clone();
        let reaction_a = builder.add_reaction(0, (), move |_, ctx| {
            order.lock().unwrap().push("a");
            ctx.set_output(0);
        });
        builder.add_output(reaction_a, vec![b_trigger]);
        builder.bind(start, reaction_a);

        builder.build()
    }
}

#[test_log::test]
fn s3_chained_reactions_run_in_index_order_within_one_tag() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut program = Chained { order: order.clone() };
    let config = Config::new().fast(true);
    let mut scheduler = Scheduler::with_clock(
        &mut program,
        config.clone(),
        Box::new(SteppedClock::new(Instant::from_nanos(0), 0)),
    );
    scheduler.initialize(&mut program, &config).unwrap();
    scheduler.run(&mut program).unwrap();

    assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
    assert_eq!(scheduler.current_time(), Instant::from_nanos(0));
}

// S4: a deadline violation runs its handler before the reaction body.
struct DeadlineProgram {
    violated: Arc<Mutex<bool>>,
    ran_body: Arc<Mutex<bool>>,
}

impl ReactorProgram for DeadlineProgram {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();

        let violation_trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, false);
        let violated = self.violated.clone();
        let ran_body = self.ran_body.clone();
        let violation = builder.add_reaction(0, (), move |_, _ctx| {
            assert!(!*ran_body.lock().unwrap(), "violation handler must run before the body");
            *violated.lock().unwrap() = true;
        });
        builder.bind(violation_trigger, violation);

        let main_trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, true);
        let ran_body = self.ran_body.clone();
        let main_reaction = builder.add_reaction(1, (), move |_, ctx| {
            *ran_body.lock().unwrap() = true;
            ctx.request_stop();
        });
        builder.set_deadline(main_reaction, Interval::from_nanos(1_000_000), Some(violation_trigger));
        builder.bind(main_trigger, main_reaction);

        builder.build()
    }
}

#[test_log::test]
fn s4_deadline_violation_handler_runs_before_the_body_exactly_once() {
    let violated = Arc::new(Mutex::new(false));
    let ran_body = Arc::new(Mutex::new(false));
    let mut program = DeadlineProgram {
        violated: violated.clone(),
        ran_body: ran_body.clone(),
    };
    // Not fast: the deadline check reads the clock, which must report
    // physical time far enough past the tag to trip a 1ms deadline.
    let config = Config::new();
    let mut scheduler = Scheduler::with_clock(
        &mut program,
        config.clone(),
        Box::new(SteppedClock::new(Instant::from_nanos(0), 10_000_000)),
    );
    scheduler.initialize(&mut program, &config).unwrap();
    scheduler.run(&mut program).unwrap();

    assert!(*violated.lock().unwrap());
    assert!(*ran_body.lock().unwrap());
}

// S5: a 100ms periodic timer with a nonzero 20ms offset fires at exact
// multiples of its period past that initial offset, not at
// `offset + n * (period - offset)`.
struct PeriodicExactness {
    ticks: Arc<Mutex<Vec<Instant>>>,
}

impl ReactorProgram for PeriodicExactness {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();
        let timer = builder.add_trigger(
            Interval::from_nanos(20_000_000),
            Interval::from_nanos(100_000_000),
            true,
        );
        let ticks = self.ticks.clone();
        let reaction = builder.add_reaction(0, (), move |_, ctx| {
            let mut t = ticks.lock().unwrap();
            t.push(ctx.current_time());
            if t.len() >= 5 {
                ctx.request_stop();
            }
        });
        builder.bind(timer, reaction);
        builder.build()
    }
}

#[test_log::test]
fn s5_periodic_timer_fires_at_exact_multiples_of_its_period() {
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let mut program = PeriodicExactness { ticks: ticks.clone() };
    let config = Config::new().fast(true);
    let mut scheduler = Scheduler::with_clock(
        &mut program,
        config.clone(),
        Box::new(SteppedClock::new(Instant::from_nanos(0), 0)),
    );
    scheduler.initialize(&mut program, &config).unwrap();
    scheduler.run(&mut program).unwrap();

    let ticks = ticks.lock().unwrap();
    assert_eq!(ticks[0], Instant::from_nanos(20_000_000));
    let diffs: Vec<i64> = ticks.windows(2).map(|w| (w[1] - w[0]).as_nanos()).collect();
    assert_eq!(diffs, vec![100_000_000; 4]);
}

// S6: an external thread schedules an event asynchronously while the
// scheduler idles on an empty queue with `-wait`.
struct AsyncProgram {
    ran: Arc<Mutex<bool>>,
    trigger: Arc<Mutex<Option<TriggerId>>>,
}

impl ReactorProgram for AsyncProgram {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();
        let trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, false);
        *self.trigger.lock().unwrap() = Some(trigger);
        let ran = self.ran.clone();
        let reaction = builder.add_reaction(0, (), move |_, ctx| {
            *ran.lock().unwrap() = true;
            ctx.request_stop();
        });
        builder.bind(trigger, reaction);
        builder.build()
    }
}

#[test_log::test]
fn s6_asynchronous_schedule_wakes_an_idle_scheduler() {
    let ran = Arc::new(Mutex::new(false));
    let trigger_slot = Arc::new(Mutex::new(None));
    let mut program = AsyncProgram {
        ran: ran.clone(),
        trigger: trigger_slot.clone(),
    };
    // Real time here: fast mode would make `wait_until` skip straight to
    // `Instant::MAX` without ever blocking on the async channel.
    let config = Config::new().wait(true);
    let mut scheduler = Scheduler::new(&mut program, config.clone());
    scheduler.initialize(&mut program, &config).unwrap();

    let trigger = trigger_slot.lock().unwrap().expect("build() registers the trigger");
    let sender = scheduler.async_sender();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(20));
        sender.schedule(trigger, Interval::from_nanos(30_000_000));
    });

    scheduler.run(&mut program).unwrap();

    assert!(*ran.lock().unwrap());
}
