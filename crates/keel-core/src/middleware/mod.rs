//! # Keel Middleware Pipeline
//!
//! A chain of responsibility over a [`MiddlewareContext`]. Entries run by
//! descending [`priority`](Middleware::priority), equal priorities in
//! registration order. Each entry decides whether the rest of the chain runs
//! by calling (or not calling) [`Next::run`].
pub mod context;
pub mod error;
pub mod pipeline;
pub mod traits;

pub use context::MiddlewareContext;
pub use error::MiddlewareError;
pub use pipeline::{MiddlewarePipeline, Next};
pub use traits::{Middleware, middleware_fn};
