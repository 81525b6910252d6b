//! No timers at all: an external thread schedules an event after 50ms of
//! wall-clock time, standing in for the reference implementation's
//! signal-handler-driven asynchronous `schedule()`. Run with `-wait` so
//! the scheduler idles instead of exiting immediately on an empty queue.
//!
//! Run with `cargo run --example async_schedule`.

use std::thread;
use std::time::Duration;

use reactor_core::Interval;
use reactor_runtime::{ReactorProgram, Scheduler, TriggerId, TriggerTable, TriggerTableBuilder};

struct AsyncDemo {
    trigger: Option<TriggerId>,
}

impl ReactorProgram for AsyncDemo {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();
        let trigger = builder.add_trigger(Interval::ZERO, Interval::ZERO, false);
        let reaction = builder.add_reaction(0, (), |_, ctx| {
            println!("async event handled at {}", ctx.current_time());
            ctx.request_stop();
        });
        builder.bind(trigger, reaction);
        self.trigger = Some(trigger);
        builder.build()
    }
}

fn main() -> Result<(), reactor_runtime::RuntimeError> {
    let mut program = AsyncDemo { trigger: None };
    let config = reactor_runtime::Config::new().wait(true);
    let mut scheduler = Scheduler::new(&mut program, config.clone());
    scheduler.initialize(&mut program, &config)?;

    let trigger = program.trigger.expect("build populates trigger");
    let sender = scheduler.async_sender();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        sender.schedule(trigger, Interval::ZERO);
    });

    scheduler.run(&mut program)?;
    Ok(())
}
