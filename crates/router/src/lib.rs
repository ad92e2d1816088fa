//! Fetch policy router for fetchwork.
//!
//! Classifies outgoing requests into route classes, answers each class
//! with its own cache/network strategy, and manages the lifecycle of
//! cache generations across install and activate.

pub mod activate;
pub mod install;
pub mod route;
pub mod router;

mod fetch;

#[cfg(test)]
mod testutil;

pub use activate::ActivateReport;
pub use install::InstallReport;
pub use route::{RouteClass, classify};
pub use router::FetchRouter;
