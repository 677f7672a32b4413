//! Per-instance configuration for a typewriter stream.

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// Token granularity for text reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamBy {
    /// Alternating word and whitespace-run tokens.
    Word,
    /// Single grapheme-cluster tokens.
    Character,
}

impl Default for StreamBy {
    fn default() -> Self {
        Self::Word
    }
}

/// Callback invoked when a run reaches its terminal unit.
///
/// Cheap to clone; clones share the underlying function. A run invokes
/// its hook exactly once, and a nested instance's hook is composed (not
/// replaced) when the parent rewrites the element.
#[derive(Clone)]
pub struct CompletionHook(Rc<dyn Fn()>);

impl CompletionHook {
    /// Wrap a callback.
    pub fn new(hook: impl Fn() + 'static) -> Self {
        Self(Rc::new(hook))
    }

    /// Invoke the callback.
    pub fn invoke(&self) {
        (self.0)();
    }
}

impl fmt::Debug for CompletionHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CompletionHook")
    }
}

impl PartialEq for CompletionHook {
    /// Hooks compare by identity of the shared function.
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Stable identifier for one typewriter instance.
///
/// Supplied by the caller at construction and derived deterministically
/// for nested children, so keys stay stable without any process-wide
/// counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceId(String);

impl InstanceId {
    /// Create an identifier from a caller-chosen stable key.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier of the nested child occupying the given unit slot.
    #[must_use]
    pub fn child(&self, unit: usize) -> Self {
        Self(format!("{}.{unit}", self.0))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self("stream".to_string())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration for one typewriter instance.
#[derive(Clone, PartialEq)]
pub struct StreamOptions {
    /// Tokens revealed per tick. Applied as at least 1.
    pub speed: u32,
    /// Delay between ticks.
    pub interval: Duration,
    /// Token granularity.
    pub stream_by: StreamBy,
    /// Whether a freshly synced tree starts revealing immediately.
    pub auto_start: bool,
    /// Invoked exactly once per completed run.
    pub on_complete: Option<CompletionHook>,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            speed: 5,
            interval: Duration::from_millis(50),
            stream_by: StreamBy::Word,
            auto_start: true,
            on_complete: None,
        }
    }
}

impl StreamOptions {
    /// Set tokens revealed per tick.
    #[must_use]
    pub const fn with_speed(mut self, speed: u32) -> Self {
        self.speed = speed;
        self
    }

    /// Set the delay between ticks.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the token granularity.
    #[must_use]
    pub const fn with_stream_by(mut self, stream_by: StreamBy) -> Self {
        self.stream_by = stream_by;
        self
    }

    /// Set whether a freshly synced tree starts immediately.
    #[must_use]
    pub const fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Set the completion callback.
    #[must_use]
    pub fn with_on_complete(mut self, hook: CompletionHook) -> Self {
        self.on_complete = Some(hook);
        self
    }
}

impl fmt::Debug for StreamOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamOptions")
            .field("speed", &self.speed)
            .field("interval", &self.interval)
            .field("stream_by", &self.stream_by)
            .field("auto_start", &self.auto_start)
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}
