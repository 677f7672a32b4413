//! Engine: the orchestrator that drives a plan through its lifecycle.
//!
//! One [`Typewriter`] owns one scheduler and one state machine and drives
//! one run at a time under one run token. It decides resets by comparing
//! plan signatures, advances the unit cursor strictly in plan order,
//! tokenizes text, coordinates nested completion, and invokes the
//! completion hook exactly once per run.
//!
//! # Architecture
//!
//! ```text
//! content tree ──▶ Plan ──▶ Signature ──┐ (gates reset)
//!                                       ▼
//!                  ┌─────────────────────────────┐
//!                  │         Typewriter          │
//!   Scheduler ◀──▶ │  run_unit / text_tick loop  │ ──▶ StreamState
//!   (run token)    │     completion mailbox      │     (observable)
//!                  └─────────────────────────────┘
//! ```
//!
//! Everything is single-threaded and cooperative: suspension points are
//! scheduler delays (interval ticks for text, zero-delay continuations
//! between units), and callers pump the engine forward. Within one run
//! token, unit `i + 1` never starts before unit `i` reaches its terminal
//! sub-state. A nested child that never signals completion stalls its
//! parent indefinitely; that is documented behavior, not a defect to
//! paper over with a timeout.

mod tokenize;

pub use tokenize::tokenize;

use crate::content::{Element, Node};
use crate::options::{CompletionHook, InstanceId, StreamOptions};
use crate::plan::{ExecutionUnit, Plan, Signature};
use crate::schedule::Scheduler;
use crate::state::{Action, Rendered, StreamState};
use bitflags::bitflags;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

bitflags! {
    /// Observable state exposed to the view-layer collaborator.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StreamFlags: u8 {
        /// Constant while the instance is mounted.
        const STREAM_ROOT = 0b0000_0001;
        /// Text is revealing or a nested stream is pending.
        const STREAMING = 0b0000_0010;
        /// The terminal unit has been passed.
        const COMPLETE = 0b0000_0100;
    }
}

/// A scheduled step, executed by the engine when it comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Start the unit at the given index (or finish the run past the end).
    RunUnit(usize),
    /// One tick of text progress on the active text unit.
    TextTick,
}

/// Signal from a nested child's composed completion hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamSignal {
    /// The awaited child completed during the tagged run.
    NestedDone {
        /// Parent run token captured when the child was started.
        token: u64,
    },
}

/// Drop guard that reports nested completion to the parent.
///
/// Created before the original hook is invoked, so the signal is sent
/// whether that invocation returns or unwinds.
struct NestedAdvance {
    tx: Sender<StreamSignal>,
    token: u64,
}

impl Drop for NestedAdvance {
    fn drop(&mut self) {
        let _ = self.tx.send(StreamSignal::NestedDone { token: self.token });
    }
}

/// The typewriter orchestrator.
///
/// Build one with [`Typewriter::new`], feed it a content tree with
/// [`Typewriter::sync`], and drive it with [`Typewriter::pump`]. All
/// `*_at` variants take an explicit instant so tests can drive virtual
/// time; the plain variants use [`Instant::now`].
pub struct Typewriter {
    /// Caller-supplied stable identifier.
    id: InstanceId,
    /// Per-instance configuration.
    options: StreamOptions,
    /// Current plan.
    plan: Plan,
    /// Signature of the current plan; `None` until the first sync.
    signature: Option<Signature>,
    /// Auto-start flag as of the current run; `None` until the first sync.
    last_auto_start: Option<bool>,
    /// Timed step queue fenced by the run token.
    scheduler: Scheduler<Step>,
    /// Run state.
    state: StreamState,
    /// Completion mailbox shared with nested children's composed hooks.
    signal_tx: Sender<StreamSignal>,
    signal_rx: Receiver<StreamSignal>,
}

impl Typewriter {
    /// Create an engine with the default instance identifier.
    #[must_use]
    pub fn new(options: StreamOptions) -> Self {
        Self::with_id(InstanceId::default(), options)
    }

    /// Create an engine with a caller-chosen stable identifier.
    #[must_use]
    pub fn with_id(id: InstanceId, options: StreamOptions) -> Self {
        let (signal_tx, signal_rx) = unbounded();
        Self {
            id,
            options,
            plan: Plan::default(),
            signature: None,
            last_auto_start: None,
            scheduler: Scheduler::new(),
            state: StreamState::new(),
            signal_tx,
            signal_rx,
        }
    }

    /// Build the engine for a nested stream element, returning it with
    /// the content tree the child reveals.
    ///
    /// The element's settings (including any composed completion hook a
    /// parent installed) become the child's options. The id should come
    /// from [`InstanceId::child`] on the parent's id so keys stay stable.
    #[must_use]
    pub fn from_element(id: InstanceId, element: &Element) -> (Self, Node) {
        let options = element.stream.clone().unwrap_or_default();
        let tree = Node::Fragment(element.children.clone());
        (Self::with_id(id, options), tree)
    }

    /// This instance's identifier.
    pub const fn id(&self) -> &InstanceId {
        &self.id
    }

    /// This instance's configuration.
    pub const fn options(&self) -> &StreamOptions {
        &self.options
    }

    /// The current plan.
    pub const fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The current run state.
    pub const fn state(&self) -> &StreamState {
        &self.state
    }

    /// Observable flags for the view layer.
    pub fn flags(&self) -> StreamFlags {
        let mut flags = StreamFlags::STREAM_ROOT;
        if self.state.is_streaming() {
            flags |= StreamFlags::STREAMING;
        }
        if self.state.complete {
            flags |= StreamFlags::COMPLETE;
        }
        flags
    }

    /// Whether the current run has passed its terminal unit.
    pub const fn is_complete(&self) -> bool {
        self.state.complete
    }

    /// Concatenated text revealed so far, in unit order.
    ///
    /// Non-text slots are skipped; mapping those onto a host tree is the
    /// view layer's job.
    pub fn rendered_text(&self) -> String {
        self.state
            .rendered
            .values()
            .filter_map(Rendered::as_text)
            .collect()
    }

    /// Earliest instant at which pending work comes due, if any.
    ///
    /// `None` either means the run is finished or that the engine is
    /// waiting on an external event (a nested child's completion).
    pub fn next_due(&self) -> Option<Instant> {
        self.scheduler.next_due()
    }

    /// Whether no scheduled step or pending signal remains.
    pub fn is_idle(&self) -> bool {
        self.scheduler.next_due().is_none() && self.signal_rx.is_empty()
    }

    /// Reconcile with a content tree at the current instant.
    pub fn sync(&mut self, tree: &Node) {
        self.sync_at(tree, Instant::now());
    }

    /// Reconcile with a content tree.
    ///
    /// Rebuilds the plan and compares signatures: an unchanged signature
    /// (and unchanged auto-start flag) is a no-op, so re-renders that only
    /// swap node identity never restart the run. A changed signature
    /// invalidates the run token, resets the state, and — for a non-empty
    /// plan with auto-start enabled — begins unit 0. An empty plan
    /// completes immediately. This is the only event that triggers a
    /// reset.
    pub fn sync_at(&mut self, tree: &Node, now: Instant) {
        let plan = Plan::build(tree);
        let signature = plan.signature();
        let auto_start = self.options.auto_start;
        if self.signature == Some(signature) && self.last_auto_start == Some(auto_start) {
            return;
        }
        self.plan = plan;
        self.signature = Some(signature);
        self.last_auto_start = Some(auto_start);
        self.restart(now);
    }

    /// Change the auto-start flag at the current instant.
    pub fn set_auto_start(&mut self, auto_start: bool) {
        self.set_auto_start_at(auto_start, Instant::now());
    }

    /// Change the auto-start flag.
    ///
    /// Flipping the flag after a sync invalidates the run exactly like a
    /// signature change; setting it to its current value does nothing.
    pub fn set_auto_start_at(&mut self, auto_start: bool, now: Instant) {
        self.options.auto_start = auto_start;
        if self.last_auto_start.is_some() && self.last_auto_start != Some(auto_start) {
            self.last_auto_start = Some(auto_start);
            self.restart(now);
        }
    }

    /// Drive all work due at the current instant.
    pub fn pump(&mut self) {
        self.pump_at(Instant::now());
    }

    /// Drive all work due at `now`: drain nested-completion signals, then
    /// execute scheduled steps, until neither source yields anything.
    pub fn pump_at(&mut self, now: Instant) {
        loop {
            let mut progressed = false;
            while let Ok(signal) = self.signal_rx.try_recv() {
                self.handle_signal(signal, now);
                progressed = true;
            }
            if let Some(step) = self.scheduler.pop_due(now) {
                progressed = true;
                match step {
                    Step::RunUnit(unit) => self.run_unit(unit, now),
                    Step::TextTick => self.text_tick(now),
                }
            }
            if !progressed {
                return;
            }
        }
    }

    /// Invalidate the current run and start over from the current plan.
    fn restart(&mut self, now: Instant) {
        let token = self.scheduler.next_run_token();
        self.state.apply(Action::Reset);
        debug!(id = %self.id, token, units = self.plan.len(), "stream reset");
        if self.plan.is_empty() {
            self.finish_run();
        } else if self.options.auto_start {
            self.run_unit(0, now);
        }
    }

    /// Start the unit at `unit`, or finish the run past the end.
    fn run_unit(&mut self, unit: usize, now: Instant) {
        let Some(current) = self.plan.get(unit).cloned() else {
            self.finish_run();
            return;
        };
        trace!(id = %self.id, unit, kind = ?current.kind(), "unit start");
        match current {
            ExecutionUnit::Text { content } => {
                let tokens = tokenize(&content, self.options.stream_by);
                self.state.apply(Action::BeginText { unit, tokens });
                self.scheduler
                    .schedule(Step::TextTick, self.options.interval, now);
            }
            ExecutionUnit::Instant { node } => {
                self.state.apply(Action::InstantRender { unit, node });
                self.state.apply(Action::Advance);
                // Deferred, not recursed: a long run of instant units must
                // not become one uninterrupted cascade.
                self.scheduler
                    .schedule(Step::RunUnit(self.state.unit_index), Duration::ZERO, now);
            }
            ExecutionUnit::Nested { node } => {
                let rewritten = match &node {
                    Node::Element(element) => self.rewrite_nested(element),
                    _ => node.clone(),
                };
                self.state.apply(Action::NestedStart {
                    unit,
                    node: rewritten,
                });
                // Nothing further until the composed hook fires.
            }
        }
    }

    /// Rewrite a nested element so its completion gates this run.
    ///
    /// The original completion hook is preserved and invoked first; the
    /// drop guard then reports completion to this engine's mailbox even
    /// if that invocation unwinds, and the unwind continues outward to
    /// the collaborator. Auto-start is forced on — a unit embedded in a
    /// plan must run once its turn arrives.
    fn rewrite_nested(&self, element: &Element) -> Node {
        let mut options = element.stream.clone().unwrap_or_default();
        let original = options.on_complete.take();
        let tx = self.signal_tx.clone();
        let token = self.scheduler.token();
        options.auto_start = true;
        options.on_complete = Some(CompletionHook::new(move || {
            let _advance = NestedAdvance {
                tx: tx.clone(),
                token,
            };
            if let Some(hook) = &original {
                hook.invoke();
            }
        }));
        Node::Element(Element {
            component: element.component.clone(),
            children: element.children.clone(),
            stream: Some(options),
        })
    }

    /// One tick of text progress.
    #[allow(clippy::cast_possible_truncation)]
    fn text_tick(&mut self, now: Instant) {
        let Some(progress) = self.state.text.as_ref() else {
            return;
        };
        if !progress.streaming {
            return;
        }
        let total = progress.tokens.len();
        let step = self.options.speed.max(1) as usize;
        let next = (progress.index + step).min(total);
        // Cumulative recompute: a delayed or repeated tick lands on the
        // same content, never a corrupted suffix.
        let content = progress.tokens[..next].concat();
        self.state.apply(Action::TextTick {
            next_index: next,
            content,
        });
        if next >= total {
            self.state.apply(Action::EndText);
            self.state.apply(Action::Advance);
            self.scheduler
                .schedule(Step::RunUnit(self.state.unit_index), Duration::ZERO, now);
        } else {
            self.scheduler
                .schedule(Step::TextTick, self.options.interval, now);
        }
    }

    /// React to a nested child's completion signal.
    fn handle_signal(&mut self, signal: StreamSignal, now: Instant) {
        let StreamSignal::NestedDone { token } = signal;
        if token != self.scheduler.token() {
            // A child of an invalidated run; the fence drops it.
            return;
        }
        if !self.state.waiting_nested {
            return;
        }
        debug!(id = %self.id, unit = self.state.unit_index, "nested complete");
        self.state.apply(Action::NestedDone);
        self.state.apply(Action::Advance);
        self.scheduler
            .schedule(Step::RunUnit(self.state.unit_index), Duration::ZERO, now);
    }

    /// Mark the run complete and invoke the hook, at most once per run.
    fn finish_run(&mut self) {
        if self.state.complete {
            return;
        }
        self.state.apply(Action::Complete);
        debug!(id = %self.id, "stream complete");
        if let Some(hook) = self.options.on_complete.clone() {
            hook.invoke();
        }
    }
}

impl std::fmt::Debug for Typewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typewriter")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("units", &self.plan.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ComponentId, ComponentRef};
    use crate::options::StreamBy;
    use std::cell::Cell;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::rc::Rc;

    const MS: Duration = Duration::from_millis(1);

    fn counter_hook() -> (CompletionHook, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        (CompletionHook::new(move || seen.set(seen.get() + 1)), count)
    }

    fn word_options(speed: u32) -> StreamOptions {
        StreamOptions::default()
            .with_speed(speed)
            .with_interval(10 * MS)
    }

    fn instant(name: &str) -> Node {
        Node::element(ComponentRef::direct(ComponentId::new(name)), vec![])
    }

    fn text_slot(tw: &Typewriter, unit: usize) -> String {
        tw.state().rendered[&unit].as_text().unwrap().to_string()
    }

    /// Event-loop stand-in: advance virtual time through every scheduled
    /// step until the engine has nothing left to do.
    fn drain(tw: &mut Typewriter, from: Instant) -> Instant {
        let mut now = from;
        loop {
            tw.pump_at(now);
            match tw.next_due() {
                Some(due) => now = now.max(due),
                None => return now,
            }
        }
    }

    #[test]
    fn test_word_mode_timing() {
        let (hook, count) = counter_hook();
        let mut tw = Typewriter::new(word_options(2).with_on_complete(hook));
        let t0 = Instant::now();

        tw.sync_at(&Node::text("Hello world!"), t0);
        assert_eq!(text_slot(&tw, 0), "");
        assert!(tw.flags().contains(StreamFlags::STREAMING));

        tw.pump_at(t0);
        assert_eq!(text_slot(&tw, 0), "");

        tw.pump_at(t0 + 10 * MS);
        assert_eq!(text_slot(&tw, 0), "Hello ");
        assert!(tw.flags().contains(StreamFlags::STREAMING));
        assert_eq!(count.get(), 0);

        tw.pump_at(t0 + 20 * MS);
        assert_eq!(text_slot(&tw, 0), "Hello world!");
        assert!(!tw.flags().contains(StreamFlags::STREAMING));
        assert!(tw.flags().contains(StreamFlags::COMPLETE));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_character_mode_timing() {
        let options = StreamOptions::default()
            .with_stream_by(StreamBy::Character)
            .with_speed(1)
            .with_interval(10 * MS);
        let mut tw = Typewriter::new(options);
        let t0 = Instant::now();

        tw.sync_at(&Node::text("Hi!"), t0);
        for (tick, expected) in [(1u32, "H"), (2, "Hi"), (3, "Hi!")] {
            tw.pump_at(t0 + tick * 10 * MS);
            assert_eq!(text_slot(&tw, 0), expected);
        }
        assert!(tw.is_complete());
    }

    #[test]
    fn test_late_tick_stays_exact() {
        // A tick that fires far past its due instant advances one step
        // and lands on exact cumulative content; the run then finishes
        // normally from there.
        let mut tw = Typewriter::new(word_options(1));
        let t0 = Instant::now();
        tw.sync_at(&Node::text("a b c"), t0);

        let late = t0 + Duration::from_secs(5);
        tw.pump_at(late);
        assert_eq!(text_slot(&tw, 0), "a");
        assert_eq!(tw.next_due(), Some(late + 10 * MS));

        drain(&mut tw, late);
        assert_eq!(text_slot(&tw, 0), "a b c");
        assert!(tw.is_complete());
    }

    #[test]
    fn test_empty_plan_completes_immediately() {
        let (hook, count) = counter_hook();
        let mut tw = Typewriter::new(StreamOptions::default().with_on_complete(hook));
        let t0 = Instant::now();

        tw.sync_at(&Node::list(vec![Node::Null, Node::Bool(false)]), t0);
        assert!(tw.is_complete());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_instant_units_defer_between_units() {
        let mut tw = Typewriter::new(StreamOptions::default());
        let t0 = Instant::now();
        tw.sync_at(&Node::list(vec![instant("Rule"), instant("Img")]), t0);

        // Unit 0 ran synchronously; the continuation to unit 1 is
        // scheduled, not recursed.
        assert_eq!(tw.state().rendered.len(), 1);
        assert_eq!(tw.state().unit_index, 1);
        assert!(!tw.is_complete());

        tw.pump_at(t0);
        assert_eq!(tw.state().rendered.len(), 2);
        assert!(tw.is_complete());
    }

    #[test]
    fn test_rendered_covers_every_unit_when_complete() {
        let mut tw = Typewriter::new(word_options(50));
        let t0 = Instant::now();
        tw.sync_at(
            &Node::list(vec![Node::text("one"), instant("Rule"), Node::text("two")]),
            t0,
        );
        drain(&mut tw, t0);

        assert!(tw.is_complete());
        let keys: Vec<_> = tw.state().rendered.keys().copied().collect();
        assert_eq!(keys, vec![0, 1, 2]);
    }

    #[test]
    fn test_identity_only_resync_does_not_restart() {
        let (hook, count) = counter_hook();
        let mut tw = Typewriter::new(word_options(50).with_on_complete(hook));
        let t0 = Instant::now();

        tw.sync_at(&Node::list(vec![Node::text("A"), instant("NodeX")]), t0);
        drain(&mut tw, t0);
        assert!(tw.is_complete());
        assert_eq!(count.get(), 1);

        // Same structure and text, fresh node identity.
        tw.sync_at(
            &Node::list(vec![Node::text("A"), instant("NodeY")]),
            t0 + Duration::from_secs(2),
        );
        assert!(tw.is_complete());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_signature_change_cancels_pending_tick() {
        let mut tw = Typewriter::new(word_options(2));
        let t0 = Instant::now();

        tw.sync_at(&Node::text("Hello world!"), t0);
        // The first tick is due at t0+10, but the tree changes at t0+5.
        tw.sync_at(&Node::text("Bye now"), t0 + 5 * MS);

        // The old tick must never be observed.
        tw.pump_at(t0 + 10 * MS);
        assert_eq!(text_slot(&tw, 0), "");

        tw.pump_at(t0 + 15 * MS);
        assert_eq!(text_slot(&tw, 0), "Bye ");
    }

    #[test]
    fn test_auto_start_disabled_then_enabled() {
        let mut tw = Typewriter::new(word_options(50).with_auto_start(false));
        let t0 = Instant::now();

        tw.sync_at(&Node::text("wait"), t0);
        tw.pump_at(t0 + Duration::from_secs(1));
        assert!(tw.state().rendered.is_empty());
        assert!(!tw.is_complete());

        let t1 = t0 + Duration::from_secs(2);
        tw.set_auto_start_at(true, t1);
        drain(&mut tw, t1);
        assert_eq!(text_slot(&tw, 0), "wait");
        assert!(tw.is_complete());
    }

    #[test]
    fn test_completion_hook_exactly_once() {
        let (hook, count) = counter_hook();
        let mut tw = Typewriter::new(word_options(50).with_on_complete(hook));
        let t0 = Instant::now();

        tw.sync_at(&Node::text("done"), t0);
        for ticks in 1..5u32 {
            tw.pump_at(t0 + ticks * 10 * MS);
        }
        assert!(tw.is_complete());
        assert_eq!(count.get(), 1);
    }

    /// Drive the parent to its nested unit and hand back the child.
    fn park_on_nested(tw: &mut Typewriter, t0: Instant) -> (Typewriter, Node) {
        tw.pump_at(t0 + 10 * MS);
        assert!(tw.state().waiting_nested);
        assert!(tw.flags().contains(StreamFlags::STREAMING));

        let unit = tw.state().unit_index;
        let node = tw.state().rendered[&unit].as_node().unwrap().clone();
        let element = node.as_element().unwrap();
        Typewriter::from_element(tw.id().child(unit), element)
    }

    #[test]
    fn test_nested_coordination() {
        let (child_hook, child_count) = counter_hook();
        let tree = Node::list(vec![
            Node::text("A"),
            Node::stream_with(
                vec![Node::text("B")],
                word_options(50)
                    .with_auto_start(false) // must be overridden by the parent
                    .with_on_complete(child_hook),
            ),
            Node::text("C"),
        ]);
        let mut tw = Typewriter::new(word_options(50));
        let t0 = Instant::now();
        tw.sync_at(&tree, t0);

        let (mut child, child_tree) = park_on_nested(&mut tw, t0);
        assert!(child.options().auto_start, "embedded unit must auto-start");
        assert_eq!(
            child_tree,
            Node::Fragment(vec![Node::text("B")]),
            "the slot hands the child exactly the nested content"
        );

        // The parent is parked: time alone cannot advance it.
        tw.pump_at(t0 + Duration::from_secs(10));
        assert!(tw.state().waiting_nested);
        assert!(!tw.is_complete());

        let t1 = t0 + Duration::from_secs(11);
        child.sync_at(&child_tree, t1);
        child.pump_at(t1 + 10 * MS);
        assert!(child.is_complete());
        assert_eq!(child.rendered_text(), "B");
        assert_eq!(child_count.get(), 1, "original hook preserved");

        // The composed hook queued the resume; one pump picks it up.
        let t2 = t1 + Duration::from_secs(1);
        tw.pump_at(t2);
        assert!(!tw.state().waiting_nested);
        tw.pump_at(t2 + 10 * MS);
        assert!(tw.is_complete());
        assert_eq!(tw.rendered_text(), "AC");
    }

    #[test]
    fn test_nested_hook_panic_still_advances_parent() {
        let tree = Node::list(vec![
            Node::stream_with(
                vec![Node::text("B")],
                word_options(50).with_on_complete(CompletionHook::new(|| panic!("hook"))),
            ),
            Node::text("C"),
        ]);
        let mut tw = Typewriter::new(word_options(50));
        let t0 = Instant::now();
        tw.sync_at(&tree, t0);
        assert!(tw.state().waiting_nested);

        let unit = tw.state().unit_index;
        let node = tw.state().rendered[&unit].as_node().unwrap().clone();
        let (mut child, child_tree) =
            Typewriter::from_element(tw.id().child(unit), node.as_element().unwrap());

        let t1 = t0 + Duration::from_secs(1);
        child.sync_at(&child_tree, t1);
        let outcome = catch_unwind(AssertUnwindSafe(|| child.pump_at(t1 + 10 * MS)));
        assert!(outcome.is_err(), "panic propagates to the collaborator");
        assert!(child.is_complete());

        // Advancement survived the unwind.
        let t2 = t1 + Duration::from_secs(1);
        tw.pump_at(t2);
        assert!(!tw.state().waiting_nested);
        tw.pump_at(t2 + 10 * MS);
        assert!(tw.is_complete());
        assert_eq!(tw.rendered_text(), "C");
    }

    #[test]
    fn test_stale_nested_signal_ignored_after_reset() {
        let tree = Node::stream(vec![Node::text("B")]);
        let mut tw = Typewriter::new(word_options(50));
        let t0 = Instant::now();
        tw.sync_at(&tree, t0);
        assert!(tw.state().waiting_nested);

        let node = tw.state().rendered[&0].as_node().unwrap().clone();
        let hook = node
            .as_element()
            .unwrap()
            .stream
            .as_ref()
            .unwrap()
            .on_complete
            .clone()
            .unwrap();

        // The tree changes before the child ever completes.
        let t1 = t0 + Duration::from_secs(1);
        tw.sync_at(&Node::text("replaced"), t1);

        // The orphaned child reports in; the fence drops it.
        hook.invoke();
        tw.pump_at(t1 + Duration::from_secs(5));
        assert_eq!(tw.rendered_text(), "replaced");
        assert!(tw.is_complete());
    }

    #[test]
    fn test_flags_surface() {
        let mut tw = Typewriter::new(word_options(1));
        let t0 = Instant::now();
        assert_eq!(tw.flags(), StreamFlags::STREAM_ROOT);

        tw.sync_at(&Node::text("a b"), t0);
        assert_eq!(tw.flags(), StreamFlags::STREAM_ROOT | StreamFlags::STREAMING);

        drain(&mut tw, t0);
        assert_eq!(tw.flags(), StreamFlags::STREAM_ROOT | StreamFlags::COMPLETE);
    }

    #[test]
    fn test_speed_applied_as_at_least_one() {
        let mut tw = Typewriter::new(word_options(0));
        let t0 = Instant::now();
        tw.sync_at(&Node::text("x y"), t0);
        tw.pump_at(t0 + 10 * MS);
        assert_eq!(text_slot(&tw, 0), "x");
    }

    #[test]
    fn test_next_due_and_idle() {
        let mut tw = Typewriter::new(word_options(1));
        assert!(tw.is_idle());

        let t0 = Instant::now();
        tw.sync_at(&Node::text("a b"), t0);
        assert_eq!(tw.next_due(), Some(t0 + 10 * MS));

        drain(&mut tw, t0);
        assert!(tw.is_complete());
        assert!(tw.is_idle());
    }
}
