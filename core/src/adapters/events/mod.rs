//! Lock-state event source adapters.

mod lines;
mod screensaver;

pub use lines::{parse_line, LineEventSource};
pub use screensaver::{ActiveChangedParser, ScreenSaverMonitor};
