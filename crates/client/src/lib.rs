//! Text client for the arena.
//!
//! # Architecture
//!
//! ```text
//! main
//!   ├─→ config   (environment → ClientConfig)
//!   ├─→ logging  (file-only tracing)
//!   └─→ app      (session loop)
//!         ├─→ Runtime (entity tasks, via runtime crate)
//!         ├─→ render  (periodic + on-demand redraw)
//!         └─→ input   (stdin lines → commands)
//! ```

mod app;
pub mod config;
pub mod input;
pub mod logging;
pub mod render;

pub use app::run;
pub use config::ClientConfig;
