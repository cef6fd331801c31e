pub mod window;

pub use window::{ExtendedStyleFlags, ReorderFlags, StyleFlags, WindowHandle, WindowInfo, ZBand};
