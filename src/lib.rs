// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod animator;
pub mod cancel;
pub mod chunker;
pub mod config;
pub mod cursor;
pub mod error;
pub mod geometry;
pub mod pane;
pub mod runtime;
pub mod scheduler;
pub mod scroll;
pub mod signal_line;
pub mod text;
pub mod typist;

pub use error::{ConfigError, Error};
