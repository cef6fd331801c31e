pub mod executor;
pub mod notifier;
pub mod tracker;
pub mod watcher;
pub mod window_enumerator;

pub use notifier::create_notifier;
pub use watcher::{list_windows, Watcher};
pub use window_enumerator::create_window_enumerator;
