// Library surface for the binary, headless integration tests and reuse.
// The session and metrics modules carry no terminal dependencies.
pub mod app;
pub mod clock;
pub mod config;
pub mod input;
pub mod metrics;
pub mod paragraphs;
pub mod runtime;
pub mod session;
pub mod ui;
