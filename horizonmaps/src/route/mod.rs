//! Planned routes.
//!
//! A [`RouteModel`] is an immutable snapshot returned by a directions service:
//! the polyline to draw and the ordered maneuver [`Step`]s to announce. Routes
//! are never edited in place; a reroute produces a new model that replaces the
//! old one wholesale.

mod error;
mod model;

pub use error::RouteError;
pub use model::{RouteModel, Step};
