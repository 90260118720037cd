//! Event types and sinks for observing generation passes.
//!
//! This module defines [`PatternEvent`] and a set of sinks to emit, collect, or
//! forward events while driving a [`crate::pattern::Pattern`] through
//! [`crate::pattern::Pattern::frame_with_events`].
use crate::geometry::{Rect, Shape};

/// Describes events emitted while a pattern generates.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PatternEvent {
    /// Emitted before the first shape of a pass.
    PassStarted {
        /// Number of the pass, starting at 1.
        pass: u64,
        /// Container the root symbol fills.
        container: Rect,
    },

    /// Emitted for every produced shape.
    ShapeEmitted {
        pass: u64,
        /// Index of the shape within its pass.
        index: usize,
        shape: Shape,
    },

    /// Emitted when the root symbol reports it has finished.
    PassFinished {
        pass: u64,
        /// Shapes produced during the pass.
        shapes: usize,
    },

    /// Non-fatal warning generated while driving the pattern.
    Warning {
        /// Context string (e.g. node or effect tag).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of a [`PatternEvent`], used by sinks to filter what they receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternEventKind {
    PassStarted,
    ShapeEmitted,
    PassFinished,
    Warning,
}

impl PatternEvent {
    pub fn kind(&self) -> PatternEventKind {
        match self {
            PatternEvent::PassStarted { .. } => PatternEventKind::PassStarted,
            PatternEvent::ShapeEmitted { .. } => PatternEventKind::ShapeEmitted,
            PatternEvent::PassFinished { .. } => PatternEventKind::PassFinished,
            PatternEvent::Warning { .. } => PatternEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`PatternEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PatternEvent);

    /// Whether events of `kind` should be built at all.
    ///
    /// Emitters check this before cloning shapes into an event.
    fn wants(&self, _kind: PatternEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = PatternEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PatternEvent) {}

    #[inline]
    fn wants(&self, _kind: PatternEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PatternEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PatternEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PatternEvent),
{
    #[inline]
    fn send(&mut self, event: PatternEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally only some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PatternEvent>,
    only: Option<Vec<PatternEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self {
            events: Vec::with_capacity(cap),
            only: None,
        }
    }

    /// Collect only events of the listed kinds.
    pub fn only(kinds: &[PatternEventKind]) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.to_vec()),
        }
    }

    pub fn into_inner(self) -> Vec<PatternEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PatternEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PatternEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: PatternEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: PatternEvent) {
        let kind = event.kind();
        let mut targets: Vec<&mut S> = self.sinks.iter_mut().filter(|s| s.wants(kind)).collect();
        let Some(last) = targets.pop() else {
            return;
        };
        for sink in targets {
            sink.send(event.clone());
        }
        last.send(event);
    }

    fn wants(&self, kind: PatternEventKind) -> bool {
        self.sinks.iter().any(|sink| sink.wants(kind))
    }
}
