// Library surface for headless/integration tests and reuse.
// The TUI (ui module, App) lives in main.rs and stays out of the library.
pub mod config;
pub mod engine;
pub mod feedback;
pub mod result;
pub mod runtime;
pub mod settings;
pub mod stats;
pub mod text;
