//! Stream state machine: a pure transition function over the run state.
//!
//! The state machine knows nothing about plans, timers, or callbacks. It
//! applies discrete actions deterministically, which keeps it trivially
//! unit-testable without any time control; the orchestrator alone decides
//! when actions fire.

use crate::content::Node;
use std::collections::BTreeMap;

/// Content produced for one unit slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Cumulative revealed text of a text unit.
    Text(String),
    /// The node placed for an instant or nested unit.
    Node(Node),
}

impl Rendered {
    /// Text content, when this slot holds text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(content) => Some(content),
            Self::Node(_) => None,
        }
    }

    /// Node content, when this slot holds a node.
    pub const fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            Self::Text(_) => None,
        }
    }
}

/// Progress through one text unit's token sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TextProgress {
    /// Full token sequence of the active text unit.
    pub tokens: Vec<String>,
    /// Tokens revealed so far.
    pub index: usize,
    /// Unit slot the revealed text is written to.
    pub active_unit: usize,
    /// Whether the unit is still revealing.
    pub streaming: bool,
}

/// A discrete state transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Replace the state with the initial state.
    Reset,
    /// Start revealing a text unit.
    BeginText {
        /// Unit slot being revealed.
        unit: usize,
        /// Full token sequence.
        tokens: Vec<String>,
    },
    /// One tick of text progress.
    TextTick {
        /// Token index after this tick.
        next_index: usize,
        /// Cumulative content of tokens `[0, next_index)`.
        content: String,
    },
    /// The active text unit finished revealing.
    EndText,
    /// Move the unit cursor forward.
    Advance,
    /// Render a non-text unit in full.
    InstantRender {
        /// Unit slot.
        unit: usize,
        /// The rendered node.
        node: Node,
    },
    /// A nested stream started; the parent now waits on it.
    NestedStart {
        /// Unit slot.
        unit: usize,
        /// The rewritten stream node.
        node: Node,
    },
    /// The awaited nested stream completed.
    NestedDone,
    /// The terminal unit has been passed.
    Complete,
}

/// Mutable run state, created at reset and discarded wholesale on the
/// next reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamState {
    /// Unit cursor, monotonically non-decreasing within one run.
    pub unit_index: usize,
    /// True while a nested unit has started but not completed.
    pub waiting_nested: bool,
    /// Produced content per unit slot, in ascending slot order.
    pub rendered: BTreeMap<usize, Rendered>,
    /// Text substate while a text unit is active.
    pub text: Option<TextProgress>,
    /// True once the terminal unit has been passed.
    pub complete: bool,
}

impl StreamState {
    /// The initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any reveal is in flight: text streaming or a nested
    /// stream pending.
    pub fn is_streaming(&self) -> bool {
        self.waiting_nested || self.text.as_ref().is_some_and(|t| t.streaming)
    }

    /// Apply one action. Deterministic; no side effects.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Reset => *self = Self::default(),
            Action::BeginText { unit, tokens } => {
                self.rendered
                    .entry(unit)
                    .or_insert_with(|| Rendered::Text(String::new()));
                self.text = Some(TextProgress {
                    tokens,
                    index: 0,
                    active_unit: unit,
                    streaming: true,
                });
            }
            Action::TextTick {
                next_index,
                content,
            } => {
                if let Some(progress) = self.text.as_mut() {
                    self.rendered
                        .insert(progress.active_unit, Rendered::Text(content));
                    progress.index = next_index;
                }
            }
            Action::EndText => {
                if let Some(progress) = self.text.as_mut() {
                    progress.streaming = false;
                }
            }
            Action::Advance => self.unit_index += 1,
            Action::InstantRender { unit, node } => {
                self.rendered.insert(unit, Rendered::Node(node));
            }
            Action::NestedStart { unit, node } => {
                self.rendered.insert(unit, Rendered::Node(node));
                self.waiting_nested = true;
            }
            Action::NestedDone => self.waiting_nested = false,
            Action::Complete => self.complete = true,
        }
    }
}
