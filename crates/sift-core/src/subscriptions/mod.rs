//! Built-in subscription sources.
//!
//! - **Terminal events** ([`terminal_events`], [`TerminalEvents`]) -- keyboard,
//!   mouse, resize, focus, and paste events from the terminal.
//! - **Timers** ([`Every`]) -- repeating ticks, used to animate loading
//!   indicators.

mod terminal;
mod timer;

pub use terminal::*;
pub use timer::*;
