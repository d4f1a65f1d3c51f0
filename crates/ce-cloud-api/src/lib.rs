//! Carbon emission estimate API: library crate.
//!
//! Re-exports all modules so the binary (`main.rs`) and external crates
//! (e.g. `ce-e2e-tests`) can access internal types like `AppState`,
//! `build_router`, and `RequestPipeline`.

pub mod config;
pub mod db;
pub mod error;
pub mod inference;
pub mod pipeline;
pub mod routes;
pub mod state;
