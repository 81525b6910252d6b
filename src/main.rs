//! Default CLI entry point: a single periodic timer that stops itself on
//! its third firing, the same S1 scenario exercised in
//! `reactor_runtime`'s integration tests. See `demos/` for the other
//! hand-built scenarios (chained reactions, deadlines, asynchronous
//! scheduling).

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
            tracing::info!(fires = state.fires, now = %ctx.current_time(), "tick");
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
    tracing_subscriber::fmt::init();

    let args = CliArgs::parse();
    let config = args.into_config()?;

    let mut program = SingleTimer { timer: None };
    let mut scheduler = Scheduler::new(&mut program, config.clone());
    scheduler.initialize(&mut program, &config)?;
    scheduler.run(&mut program)?;

    Ok(())
}
