//! WindowEnumerator service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for talking to the window
//! system: listing top-level windows, reading their title/class/style bits and
//! issuing z-order requests. It MUST NOT contain rule matching or debounce logic;
//! those live in the tracker, the rule engine and the action executor.

mod dry_run;
mod r#trait;
#[cfg(windows)]
mod win32;
#[cfg(unix)]
mod x11;

#[cfg(test)]
pub use self::dry_run::{DesktopCall, SimulatedDesktop, SimulatedWindow};
pub use self::r#trait::{create_window_enumerator, WindowEnumerator};
