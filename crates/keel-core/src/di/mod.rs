//! # Keel Dependency Injection
//!
//! [`DiContainer`] registers constructible services under a name, each with a
//! [`Lifetime`], and builds them on demand, injecting declared dependencies
//! first.
//!
//! Services are addressed with typed [`Token`]s; the `*_any` methods offer a
//! string-keyed path for registrations whose type is only known at runtime.
//! Cycles are caught while constructing (the resolution stack of a call), and
//! [`DiContainer::validate`] checks declared dependencies statically through a
//! [`DependencyGraph`](crate::graph::DependencyGraph).
pub mod container;
pub mod error;
pub mod resolver;
pub mod scope;
pub mod token;

pub use container::{DiContainer, DiValidation, Registration};
pub use error::DiError;
pub use resolver::{AnyInstance, Injected, Resolver};
pub use scope::Scope;
pub use token::{Lifetime, Token};
