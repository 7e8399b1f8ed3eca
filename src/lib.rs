//! `catchdex` is a client library for the catch-tracking companion backend.
//!
//! Besides the typed [`api::Api`] client, it carries the one piece of real
//! domain logic in the system: resolving how much damage each attacking type
//! deals to a creature, given its one or two defending types. See
//! [`effectiveness`].

#![deny(missing_docs)]

pub mod api;
pub mod chart;
pub mod effectiveness;
pub mod model;

pub use api::Api;
pub use chart::Multiplier;
pub use chart::TypeChart;
pub use effectiveness::Band;
pub use effectiveness::Effectiveness;
pub use effectiveness::Resolver;
pub use model::TypeName;
