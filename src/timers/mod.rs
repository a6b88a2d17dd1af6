//! Internal timing utilities for build/solve reporting.

mod timers;
pub use timers::*;
