//! The event loop: `next()`/`wait_until()`/`wrapup()`, ported from the
//! reference implementation's single-threaded C scheduler.

use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, instrument, trace, warn};

use reactor_core::{Instant, Interval};

use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::context::ReactionContext;
use crate::error::RuntimeError;
use crate::event::{Event, EventPool};
use crate::pqueue::{Prioritized, PriorityQueue};
use crate::program::ReactorProgram;
use crate::trigger::{ReactionId, TriggerId, TriggerTable};

/// A reaction sitting in the reaction queue for the tag currently being
/// processed, ordered by its topological index so reactions run in a
/// deterministic order within a tag.
#[derive(Debug, Clone, Copy)]
struct QueuedReaction {
    index: u32,
    reaction: ReactionId,
    pos: usize,
}

impl Prioritized for QueuedReaction {
    type Priority = u32;

    fn priority(&self) -> u32 {
        self.index
    }

    fn heap_pos(&self) -> usize {
        self.pos
    }

    fn set_heap_pos(&mut self, pos: usize) {
        self.pos = pos;
    }
}

/// A request to schedule `trigger` arriving from outside the scheduler
/// thread (e.g. a sensor callback). Delivered the same way the reference
/// implementation's POSIX-signal-based asynchronous `schedule()` is:
/// queued elsewhere and drained into the event queue at the top of every
/// `next()` iteration. Carries the same `(trigger, extra_delay)` pair the
/// synchronous `schedule()` primitive does, so both call sites apply
/// `trigger.offset` exactly once, via [`Scheduler::schedule_internal`].
pub struct AsyncSchedule {
    pub trigger: TriggerId,
    pub extra_delay: Interval,
}

/// A handle that can schedule events on a running [`Scheduler`] from
/// another thread.
#[derive(Clone)]
pub struct AsyncSender(Sender<AsyncSchedule>);

impl AsyncSender {
    /// Request that `trigger` fire `extra_delay` after its own offset,
    /// relative to the scheduler's logical time at the moment this request
    /// is drained — the same `schedule(trigger, extra_delay)` semantics as
    /// [`crate::context::ReactionContext::schedule`]. Delivery is
    /// asynchronous: the event is merged into the scheduler's own event
    /// queue the next time it drains its inbox, not immediately.
    pub fn schedule(&self, trigger: TriggerId, extra_delay: Interval) {
        // The scheduler outlives every sender it hands out in normal use;
        // if it has already shut down there is nothing useful to do with
        // the send failure.
        let _ = self.0.send(AsyncSchedule { trigger, extra_delay });
    }
}

/// The discrete-event scheduler.
pub struct Scheduler {
    pub(crate) table: TriggerTable,

    pub(crate) event_queue: PriorityQueue<Event>,
    event_pool: EventPool,

    reaction_queue: PriorityQueue<QueuedReaction>,
    pub(crate) queued: Vec<bool>,
    pub(crate) produced: Vec<Vec<bool>>,

    current_time: Instant,
    pub(crate) start_time: Instant,
    stop_time: Instant,

    fast: bool,
    wait: bool,
    stop_requested: bool,

    clock: Box<dyn Clock>,

    async_tx: Sender<AsyncSchedule>,
    async_rx: Receiver<AsyncSchedule>,

    pub(crate) pending_schedule: Vec<(TriggerId, Interval)>,
}

impl Scheduler {
    /// Build a scheduler from a [`ReactorProgram`] and a [`Config`], using
    /// the real system clock.
    pub fn new(program: &mut dyn ReactorProgram, config: Config) -> Self {
        Self::with_clock(program, config, Box::new(SystemClock))
    }

    /// As [`Scheduler::new`], but with an injectable clock (for tests that
    /// need deterministic physical time).
    pub fn with_clock(
        program: &mut dyn ReactorProgram,
        config: Config,
        clock: Box<dyn Clock>,
    ) -> Self {
        let table = program.build();
        let num_reactions = table.num_reactions();
        let (async_tx, async_rx) = crossbeam_channel::unbounded();

        Self {
            table,
            event_queue: PriorityQueue::new(),
            event_pool: EventPool::new(),
            reaction_queue: PriorityQueue::new(),
            queued: vec![false; num_reactions],
            produced: vec![Vec::new(); num_reactions],
            current_time: Instant::from_nanos(0),
            start_time: Instant::from_nanos(0),
            stop_time: Instant::NEVER,
            fast: config.fast,
            wait: config.wait,
            stop_requested: false,
            clock,
            async_tx,
            async_rx,
            pending_schedule: Vec::new(),
        }
    }

    /// A cloneable handle other threads can use to schedule events
    /// asynchronously while this scheduler runs.
    pub fn async_sender(&self) -> AsyncSender {
        AsyncSender(self.async_tx.clone())
    }

    pub fn current_time(&self) -> Instant {
        self.current_time
    }

    /// Arm all timers and compute the logical stop time, mirroring
    /// `initialize()` + `__start_timers()` in the reference implementation.
    #[instrument(skip_all)]
    pub fn initialize(&mut self, program: &mut dyn ReactorProgram, config: &Config) -> Result<(), RuntimeError> {
        self.start_time = self.clock.now()?;
        self.current_time = self.start_time;
        self.stop_time = match config.stop_duration {
            Some(d) => self.start_time.saturating_add(d),
            None => Instant::NEVER,
        };

        program.start_timers();
        for id in self.table.timers() {
            let offset = self.table.trigger(id).offset;
            let time = self.current_time.saturating_add(offset);
            self.insert_event(time, id);
        }
        info!(start_time = %self.start_time, stop_time = %self.stop_time, "scheduler initialized");
        Ok(())
    }

    pub(crate) fn insert_event(&mut self, time: Instant, trigger: TriggerId) {
        let ev = self.event_pool.acquire(time, trigger);
        self.event_queue.insert(ev);
    }

    /// Drain any events that arrived through an [`AsyncSender`] since the
    /// last drain, inserting them into the event queue. Called at the top
    /// of every `next()` iteration, exactly where the reference
    /// implementation's signal handler would have mutated the queue.
    fn drain_async(&mut self) {
        while let Ok(req) = self.async_rx.try_recv() {
            let now = self.current_time;
            self.schedule_internal(req.trigger, req.extra_delay, now);
        }
    }

    /// Block until the physical clock reaches `target`, setting
    /// `current_time` along the way. Returns `true` on success (sentinel
    /// `0`), `false` if the wait was interrupted or the target was clamped
    /// to `stop_time` (sentinel `-1`).
    ///
    /// In `fast` mode this never sleeps. Otherwise this is the portable
    /// substitute for the reference implementation's signal-interruptible
    /// `nanosleep`: a bounded `recv_timeout` on the same channel
    /// [`drain_async`] reads from, which wakes up exactly when an
    /// asynchronous event needs the wait reconsidered.
    #[instrument(skip(self))]
    fn wait_until(&mut self, mut target: Instant) -> Result<bool, RuntimeError> {
        let mut clamped = false;
        if self.stop_time.is_set() && target > self.stop_time {
            target = self.stop_time;
            clamped = true;
        }

        if self.fast {
            self.current_time = target;
            return Ok(!clamped);
        }

        let physical_now = self.clock.now()?;
        if target <= physical_now {
            self.current_time = target;
            return Ok(!clamped);
        }

        let remaining: Duration = target
            .duration_since(physical_now)
            .try_into()
            .map_err(|_| RuntimeError::Invariant("wait_until target is in the past".into()))?;

        trace!(?remaining, "sleeping until next logical time");
        match self.async_rx.recv_timeout(remaining) {
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                self.current_time = target;
                Ok(!clamped)
            }
            interrupted => {
                if let Ok(req) = interrupted {
                    let now = self.current_time;
                    self.schedule_internal(req.trigger, req.extra_delay, now);
                }
                let physical_now = self.clock.now()?;
                if physical_now > self.current_time && physical_now < target {
                    self.current_time = physical_now;
                } else if physical_now > self.current_time {
                    self.current_time = target;
                    return Ok(!clamped);
                }
                Ok(false)
            }
        }
    }

    /// Advance the scheduler by exactly one logical tag. Returns `false`
    /// once there is nothing left to do (empty queue with `-wait` unset,
    /// or the stop time has been reached), mirroring `next()`'s `0`/non-`0`
    /// return.
    #[instrument(skip_all)]
    pub fn next(&mut self, program: &mut dyn ReactorProgram) -> Result<bool, RuntimeError> {
        self.drain_async();

        loop {
            let peeked = self.event_queue.peek().map(|e| e.time);
            let target = match peeked {
                Some(t) => t,
                None if self.wait => Instant::MAX,
                None => {
                    debug!("event queue empty, stopping");
                    return Ok(false);
                }
            };

            if self.wait_until(target)? {
                break;
            }

            self.drain_async();
            let reached = self.event_queue.peek().map(|e| e.time);
            if reached == peeked && (self.current_time == self.stop_time || reached.is_none()) {
                debug!("wait interrupted with no new work, stopping");
                return Ok(false);
            }
            // Otherwise an earlier event arrived, or stop-time pacing moved
            // current_time forward with more work left: restart step 1.
        }

        program.start_time_step();
        self.process_tag(self.current_time)?;

        if self.current_time == self.stop_time {
            debug!("reached stop time, stopping");
            return Ok(false);
        }
        Ok(true)
    }

    /// Drain every event at `tag`, enqueue their reactions (deduplicated),
    /// and dispatch the reaction queue in topological order.
    fn process_tag(&mut self, tag: Instant) -> Result<(), RuntimeError> {
        while let Some(ev) = self.event_queue.peek() {
            if ev.time != tag {
                break;
            }
            let mut ev = self.event_queue.pop().unwrap();
            let trigger = ev.trigger;
            ev.time = Instant::from_nanos(0);
            self.event_pool.release(ev);
            self.enqueue_reactions_for(trigger);
            self.rearm_if_periodic(trigger, tag);
        }

        while let Some(queued) = self.reaction_queue.pop() {
            self.queued[queued.reaction.0] = false;
            self.dispatch(queued.reaction, tag)?;
        }

        Ok(())
    }

    fn enqueue_reactions_for(&mut self, trigger: TriggerId) {
        let reactions = self.table.trigger(trigger).reactions.clone();
        for r in reactions {
            self.enqueue_reaction(r);
        }
    }

    fn enqueue_reaction(&mut self, reaction: ReactionId) {
        if self.queued[reaction.0] {
            return;
        }
        self.queued[reaction.0] = true;
        let index = self.table.reaction(reaction).index;
        self.reaction_queue.insert(QueuedReaction {
            index,
            reaction,
            pos: 0,
        });
    }

    /// Re-arm a periodic trigger for `tag + period`, via the
    /// `__schedule(trigger, period - offset)` identity from §4.3. `rearm_delay`
    /// may be negative here (a trigger with a long initial offset and a
    /// shorter repeat period, e.g. start after 500ms then tick every
    /// 100ms, is a perfectly valid graph) — `schedule_internal` computes
    /// `tag + offset + rearm_delay`, which cancels back to `tag + period`
    /// regardless of the sign of `rearm_delay`, so nothing here needs
    /// asserting against.
    fn rearm_if_periodic(&mut self, trigger: TriggerId, tag: Instant) {
        let desc = self.table.trigger(trigger);
        if !desc.is_periodic() {
            return;
        }
        let rearm_delay = desc.period - desc.offset;
        // `schedule_internal` computes `tag + offset + rearm_delay`, which
        // cancels back to `tag + period`, the same identity this function's
        // doc comment describes, routed through the one place that
        // arithmetic is defined instead of re-deriving it here.
        self.schedule_internal(trigger, rearm_delay, tag);
    }

    /// Run a single reaction, handling its deadline (if any) first, then
    /// applying whatever it scheduled or produced.
    fn dispatch(&mut self, id: ReactionId, tag: Instant) -> Result<(), RuntimeError> {
        trace!(?id, %tag, "dispatching reaction");
        let deadline = self.table.reaction(id).deadline;
        if deadline.is_positive() {
            let physical_now = self.clock.now()?;
            if physical_now > tag.saturating_add(deadline) {
                if let Some(handler) = self.table.reaction(id).deadline_violation {
                    warn!(?id, "deadline violated, running violation handler");
                    // Dispatch only the reactions bound to `handler` here, in
                    // their own topological order, rather than routing them
                    // through the shared reaction queue: draining that queue
                    // until empty would also run whatever unrelated
                    // reactions are already waiting there for this tag,
                    // ahead of the reaction currently dispatching.
                    let bound = self.table.trigger(handler).reactions.clone();
                    let mut handler_reactions: Vec<ReactionId> = bound
                        .into_iter()
                        .filter(|r| !std::mem::replace(&mut self.queued[r.0], true))
                        .collect();
                    handler_reactions.sort_by_key(|r| self.table.reaction(*r).index);
                    // Violation handlers run synchronously, ahead of the
                    // reaction body itself, same ordering as the
                    // reference implementation's `deadline_violation`.
                    for handler_reaction in handler_reactions {
                        self.queued[handler_reaction.0] = false;
                        self.dispatch(handler_reaction, tag)?;
                    }
                }
            }
        }
        self.run_body(id, tag)
    }

    fn run_body(&mut self, id: ReactionId, tag: Instant) -> Result<(), RuntimeError> {
        // `self.table.reactions[id]` holds the closure we are about to call
        // with `&mut self` (via the context below). Calling it in place
        // would alias `self`, so the state and body are swapped out for
        // placeholders for the duration of the call and swapped back after.
        let mut state = std::mem::replace(&mut self.table.reactions[id.0].state, Box::new(()));
        let mut body = std::mem::replace(
            &mut self.table.reactions[id.0].body,
            Box::new(|_: &mut dyn std::any::Any, _: &mut ReactionContext<'_>| {}),
        );

        if self.produced[id.0].is_empty() {
            let num_outputs = self.table.reaction(id).outputs.len();
            self.produced[id.0] = vec![false; num_outputs];
        } else {
            self.produced[id.0].iter_mut().for_each(|p| *p = false);
        }

        {
            let mut ctx = ReactionContext {
                current_time: tag,
                produced: &mut self.produced[id.0],
                pending_schedule: &mut self.pending_schedule,
                stop_requested: &mut self.stop_requested,
            };
            (body)(state.as_mut(), &mut ctx);
        }

        self.table.reactions[id.0].state = state;
        self.table.reactions[id.0].body = body;

        self.apply_outputs(id, tag);
        self.apply_pending_schedule(tag);
        Ok(())
    }

    /// A produced output fires its downstream triggers at the *same* tag:
    /// their reactions join the in-progress reaction queue rather than
    /// going through the event queue.
    fn apply_outputs(&mut self, id: ReactionId, _tag: Instant) {
        let outputs = self.table.reaction(id).outputs.clone();
        for (slot, out) in outputs.iter().enumerate() {
            if self.produced[id.0].get(slot).copied().unwrap_or(false) {
                for &downstream in &out.triggers {
                    self.enqueue_reactions_for(downstream);
                }
            }
        }
    }

    fn apply_pending_schedule(&mut self, tag: Instant) {
        let pending = std::mem::take(&mut self.pending_schedule);
        for (trigger, extra_delay) in pending {
            self.schedule_internal(trigger, extra_delay, tag);
        }
    }

    /// Run until `next()` returns `false`, mirroring the reference
    /// implementation's `main()` loop.
    #[instrument(skip_all)]
    pub fn run(&mut self, program: &mut dyn ReactorProgram) -> Result<(), RuntimeError> {
        while self.next(program)? && !self.stop_requested {}
        self.wrapup();
        Ok(())
    }

    /// Log the logical and physical elapsed time, mirroring `wrapup()`.
    pub fn wrapup(&self) {
        let logical_elapsed = self.current_time.duration_since(self.start_time);
        let physical_elapsed = self
            .clock
            .now()
            .map(|now| now.duration_since(self.start_time))
            .unwrap_or(Interval::ZERO);
        info!(%logical_elapsed, %physical_elapsed, "run finished");

        if !self.event_queue.is_empty() {
            warn!(
                unprocessed = self.event_queue.len(),
                "stopped with events still pending in the event queue"
            );
        }
    }
}
