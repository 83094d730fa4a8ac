//! `ev-core` — foundational types for the EV route planner.
//!
//! This crate is a dependency of every other `ev-*` crate.  It has no `ev-*`
//! dependencies and minimal external ones (only `thiserror`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                              |
//! |-------------|-------------------------------------------------------|
//! | [`ids`]     | `NodeId`, `EdgeId` (dense indices), `NodeKey`         |
//! | [`geo`]     | `GeoPoint`, haversine distance                        |
//! | [`error`]   | `CoreError`, `CoreResult`, input validation helpers   |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod error;
pub mod geo;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult, ensure_non_negative};
pub use geo::GeoPoint;
pub use ids::{EdgeId, NodeId, NodeKey};
