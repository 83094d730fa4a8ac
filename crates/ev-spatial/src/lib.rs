//! `ev-spatial` — road network, spatial snapping, loading, and shortest paths.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                       |
//! |-------------|----------------------------------------------------------------|
//! | [`network`] | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`             |
//! | [`router`]  | `Router` trait, `Route`, `DijkstraRouter`, single-source search |
//! | [`loader`]  | `load_network_csv`, `load_network_reader`, `LoadOptions`       |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `ev-core` types.        |

pub mod error;
pub mod loader;
pub mod network;
pub mod router;


pub use error::{SpatialError, SpatialResult};
pub use loader::{LoadOptions, load_network_csv, load_network_reader};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use router::{DijkstraRouter, Route, Router, nearest_matching, shortest_distances};
