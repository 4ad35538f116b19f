// Export modules for use in tests
pub mod config;
pub mod font_metrics;
pub mod gestures;
pub mod layout;
pub mod paginator;
pub mod reader;
pub mod render;
pub mod selection;
pub mod styled_text;
pub mod theme;

// Re-export the host-facing surface
pub use reader::{Locator, PaginationWorker, ReaderEvent, ReaderSession};
