//! A single periodic timer that stops itself on its third firing.
//!
//! Run with `cargo run --example single_timer -- --fast`.

use clap::Parser;
use reactor::runner::CliArgs;
use reactor_core::Interval;
use reactor_runtime::{ReactorProgram, Scheduler, TriggerId, TriggerTable, TriggerTableBuilder};

struct TimerState {
    fires: u32,
}

struct SingleTimer {
    timer: Option<TriggerId>,
}

impl ReactorProgram for SingleTimer {
    fn build(&mut self) -> TriggerTable {
        let mut builder = TriggerTableBuilder::new();
        let timer = builder.add_trigger(Interval::ZERO, Interval::from_nanos(1_000_000_000), true);
        let reaction = builder.add_reaction(0, TimerState { fires: 0 }, |state, ctx| {
            state.fires += 1;
            println!("tick {} at {}", state.fires, ctx.current_time());
            if state.fires >= 3 {
                ctx.request_stop();
            }
        });
        builder.bind(timer, reaction);
        self.timer = Some(timer);
        builder.build()
    }
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = args.into_config()?;

    let mut program = SingleTimer { timer: None };
    let mut scheduler = Scheduler::new(&mut program, config.clone());
    scheduler.initialize(&mut program, &config)?;
    scheduler.run(&mut program)?;
    Ok(())
}
