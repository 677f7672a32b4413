//! Component identity and capability detection.
//!
//! A content tree may embed another typewriter instance as an opaque
//! element. Recognizing those elements cannot rely on reference equality:
//! real component graphs wrap implementations in memoization and
//! reference-forwarding shims. Detection is therefore a tagged, finite
//! lookup: the reference itself, one identity-preserving hop, one
//! call-delegating hop, and finally a conventional-name fallback for
//! bundlers that duplicate the canonical implementation.

/// Capability marker attached to a component identity.
///
/// Plays the role of a shared symbol: a single value minted for the
/// canonical implementation, compared by value rather than by reference so
/// delegating wrappers still expose it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapabilityMarker(u64);

/// Marker carried by the canonical typewriter implementation.
pub const STREAM_CAPABILITY: CapabilityMarker = CapabilityMarker(0x5459_5057_5249_5445);

/// Conventional name of the canonical implementation.
///
/// Used as a last-resort detection fallback when a duplicated copy of the
/// implementation lost the marker.
pub const STREAM_COMPONENT_NAME: &str = "Typewriter";

/// Identity of a component implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentId {
    /// Display name of the implementation.
    name: String,
    /// Capability marker, if the implementation carries one.
    marker: Option<CapabilityMarker>,
}

impl ComponentId {
    /// Create an identity with no capability marker.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            marker: None,
        }
    }

    /// The canonical typewriter implementation identity.
    pub fn stream() -> Self {
        Self {
            name: STREAM_COMPONENT_NAME.to_string(),
            marker: Some(STREAM_CAPABILITY),
        }
    }

    /// Attach a capability marker to this identity.
    #[must_use]
    pub const fn with_marker(mut self, marker: CapabilityMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Display name of the implementation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capability marker, if present.
    pub const fn marker(&self) -> Option<CapabilityMarker> {
        self.marker
    }
}

/// Reference to a component implementation, possibly through a wrapper.
///
/// Wrappers are modelled explicitly instead of duck-typed: a memoization
/// shim keeps the wrapped implementation in its type slot, a
/// reference-forwarding shim keeps it in its render slot. Detection looks
/// through exactly one layer of either.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ComponentRef {
    /// The implementation itself.
    Direct(ComponentId),
    /// Identity-preserving wrapper delegating via its type slot.
    Memo(Box<ComponentRef>),
    /// Call-delegating wrapper forwarding via its render slot.
    ForwardRef(Box<ComponentRef>),
}

impl ComponentRef {
    /// Wrap an identity directly.
    pub const fn direct(id: ComponentId) -> Self {
        Self::Direct(id)
    }

    /// Wrap a reference in a memoization shim.
    #[must_use]
    pub fn memo(inner: Self) -> Self {
        Self::Memo(Box::new(inner))
    }

    /// Wrap a reference in a reference-forwarding shim.
    #[must_use]
    pub fn forward_ref(inner: Self) -> Self {
        Self::ForwardRef(Box::new(inner))
    }

    /// Resolve the implementation identity this reference points at.
    ///
    /// Finite lookup: a direct reference resolves to itself; a wrapper
    /// resolves iff its single hop lands on a direct reference. Anything
    /// still wrapped after one hop resolves to nothing.
    pub fn resolve_target(&self) -> Option<&ComponentId> {
        match self {
            Self::Direct(id) => Some(id),
            Self::Memo(inner) | Self::ForwardRef(inner) => match inner.as_ref() {
                Self::Direct(id) => Some(id),
                Self::Memo(_) | Self::ForwardRef(_) => None,
            },
        }
    }

    /// Whether this reference designates the typewriter implementation.
    ///
    /// True when the resolved identity carries [`STREAM_CAPABILITY`], or
    /// as a fallback when its name equals [`STREAM_COMPONENT_NAME`].
    pub fn is_stream(&self) -> bool {
        self.resolve_target().is_some_and(|id| {
            id.marker == Some(STREAM_CAPABILITY) || id.name == STREAM_COMPONENT_NAME
        })
    }
}
