//! Rewrite engine and interception pipeline for the localdev system.
//!
//! This crate holds everything that does not depend on a particular browser binding:
//! the URL matcher, the page gate, the guarded `src` setter, the scanner, the mutation
//! watcher, the fallback poller, the navigation monitor and the [`Redirector`] that
//! wires them together.  The environment is reached only through the [`dom::Dom`] and
//! [`timers::Timers`] traits, which lets the same pipeline run against a real browser
//! document (see the `localdev` crate) or against the in-memory [`sim`] harness.
//!
//! It is not intended for direct use; users should depend on the `localdev` crate instead.

/// Command trait and response types for the control surface.
pub mod command;
/// Configuration loaded by the developer.
pub mod config;
/// Environment traits and DOM value types.
pub mod dom;
/// Shared page environment.
pub mod env;
/// Error types.
pub mod error;
/// Guarded `src` setter.
pub mod intercept;
/// Leveled log lines.
pub mod log;
/// URL matcher and mapping table.
pub mod mapping;
/// SPA route-change detection.
pub mod navigation;
/// Periodic safety-net scanning.
pub mod poller;
/// One-shot sweep of extension iframes.
pub mod scanner;
/// In-memory DOM and virtual timers.
pub mod sim;
mod sys;
/// Page gate.
pub mod target;
/// Timer seam.
pub mod timers;
/// Debounced mutation watcher.
pub mod watcher;

mod controller;

pub use controller::{InitOutcome, Redirector};
