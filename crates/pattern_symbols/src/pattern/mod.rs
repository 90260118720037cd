//! Root document, frame driver and generation events.
pub mod config;
pub mod events;
pub mod runner;

pub use config::{Generation, PatternConfig, Size};
pub use events::{EventSink, FnSink, MultiSink, PatternEvent, PatternEventKind, VecSink};
pub use runner::{Frame, Pattern, MAX_PASS_STEPS};
