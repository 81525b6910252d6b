//! Three reactions, A -> B -> C, all firing within the same logical tag:
//! A's output triggers B, whose output triggers C. Demonstrates that a
//! produced output enqueues its downstream reactions immediately rather
//! than going back through the event queue.
//!
//! Run with `cargo run --example chained`.

use reactor_core::Interval;
use reactor_runtime::{ReactorProgram, Scheduler, TriggerId, TriggerTable, TriggerTableBuilder};

struct Trace(Vec<&'static str>);

struct Chained {
    start: Option<TriggerId>,
}

impl ReactorProgram for Chained {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();

        let start = builder.add_trigger(Interval::ZERO, Interval::ZERO, true);
        let b_trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, false);
        let c_trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, false);

        let reaction_c = builder.add_reaction(2, Trace(Vec::new()), |trace, ctx| {
            trace.0.push("c");
            println!("order so far: {:?} at {}", trace.0, ctx.current_time());
            ctx.request_stop();
        });
        builder.bind(c_trigger, reaction_c);

        let reaction_b = builder.add_reaction(1, Trace(Vec::new()), |trace, ctx| {
            trace.0.push("b");
            ctx.set_output(0);
        });
        builder.add_output(reaction_b, vec![c_trigger]);
        builder.bind(b_trigger, reaction_b);

        let reaction_a = builder.add_reaction(0, Trace(Vec::new()), |trace, ctx| {
            trace.0.push("a");
            ctx.set_output(0);
        });
        builder.add_output(reaction_a, vec![b_trigger]);
        builder.bind(start, reaction_a);

        self.start = Some(start);
        builder.build()
    }
}

fn main() -> Result<(), reactor_runtime::RuntimeError> {
    let mut program = Chained { start: None };
    let config = reactor_runtime::Config::new().fast(true);
    let mut scheduler = Scheduler::new(&mut program, config.clone());
    scheduler.initialize(&mut program, &config)?;
    scheduler.run(&mut program)?;
    Ok(())
}
