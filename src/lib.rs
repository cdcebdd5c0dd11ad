//! Movie/TV recommendation scoring and preference elicitation.
//!
//! The core is a pure weighted scoring engine over catalog metadata plus a
//! round-based pairwise elicitation flow; the HTTP layer is a thin shell over
//! both, with the catalog and text-generation collaborators injected behind
//! traits.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod storage;
