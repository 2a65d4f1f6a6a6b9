//! # Keel Plugin System
//!
//! Registers externally supplied plugins and drives their installation.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`traits`]**: the [`Plugin`] trait every plugin implements (name,
//!   version, dependencies, install/uninstall hooks).
//! - **[`context`]**: [`PluginContext`], the borrowed capability bundle passed
//!   to the hooks.
//! - **[`system`]**: [`PluginSystem`], which enforces that dependencies are
//!   installed first, refuses to remove a plugin others still need, and routes
//!   install failures through the recovery manager.
//! - **[`error`]**: [`PluginSystemError`].
pub mod context;
pub mod error;
pub mod system;
pub mod traits;

pub use context::PluginContext;
pub use error::PluginSystemError;
pub use system::PluginSystem;
pub use traits::Plugin;

// Test module declaration
#[cfg(test)]
mod tests;
