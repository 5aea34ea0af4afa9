//! # rc-app
//!
//! Orchestration layer: page controllers fetch through the ports held in
//! `AppContext`, keep their own view state and render through `rc-ui`.

pub mod components;
pub mod context;
pub mod pages;
pub mod shell;

pub use context::AppContext;
pub use shell::{Command, Flow, Shell};
