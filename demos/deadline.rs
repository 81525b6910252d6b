//! A reaction with a 1ms deadline and a violation handler that fires if
//! the physical clock has drifted past it by the time the reaction runs.
//!
//! Run with `cargo run --example deadline`. Since this demo runs with a
//! real clock (no `-fast`), whether the deadline actually trips depends on
//! scheduling noise; `reactor_runtime`'s integration tests use a fake
//! clock to make this deterministic.

use reactor_core::Interval;
use reactor_runtime::{ReactorProgram, Scheduler, TriggerId, TriggerTable, TriggerTableBuilder};

struct Flag(bool);

struct DeadlineDemo {
    trigger: Option<TriggerId>,
}

impl ReactorProgram for DeadlineDemo {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();

        let violation_trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, false);
        let violation = builder.add_reaction(0, Flag(false), |flag, ctx| {
            flag.0 = true;
            println!("deadline violated at {}", ctx.current_time());
        });
        builder.bind(violation_trigger, violation);

        let main_trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, true);
        let main_reaction = builder.add_reaction(1, Flag(false), |_, ctx| {
            println!("reaction body ran at {}", ctx.current_time());
            ctx.request_stop();
        });
        builder.set_deadline(
            main_reaction,
            Interval::from_nanos(1_000_000),
            Some(violation_trigger),
        );
        builder.bind(main_trigger, main_reaction);

        self.trigger = Some(main_trigger);
        builder.build()
    }
}

fn main() -> Result<(), reactor_runtime::RuntimeError> {
    let mut program = DeadlineDemo { trigger: None };
    let config = reactor_runtime::Config::new();
    let mut scheduler = Scheduler::new(&mut program, config.clone());
    scheduler.initialize(&mut program, &config)?;
    scheduler.run(&mut program)?;
    Ok(())
}
