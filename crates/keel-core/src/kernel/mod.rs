//! # Keel Kernel
//!
//! The `kernel` module hosts the subsystems and ties them together.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrapping**: [`Kernel`](bootstrap::Kernel) owns one of each subsystem,
//!   initializes managers in dependency order and installs plugins.
//! - **Component storage**: [`ComponentRegistry`](component::ComponentRegistry)
//!   keeps manager instances by name and lets callers fetch them by concrete type.
//! - **Core Constants**: the `constants` submodule.
//! - **Error Handling**: the kernel-wide [`Error`](error::Error), its
//!   classification and the `Result` alias live in the `error` submodule.
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;

use std::future::Future;
use std::pin::Pin;

pub use bootstrap::Kernel;
pub use component::ComponentRegistry;
pub use error::{Error, Result};

/// An owned, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

// Test module declaration
#[cfg(test)]
mod tests;
