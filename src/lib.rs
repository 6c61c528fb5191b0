//! Autopost - generates a tweet with a language model, optionally runs tools
//! such as image generation, publishes it to X and records it so later runs
//! avoid repeating themselves.

pub mod autopost;
pub mod config;
pub mod constants;
pub mod context;
pub mod domain;
pub mod error;
pub mod fallback;
pub mod models;
pub mod normalize;
pub mod persona;
pub mod report;
pub mod services;

pub use autopost::{AutopostError, AutopostMode, AutopostService};
pub use config::AutopostConfig;
pub use report::RunResult;
