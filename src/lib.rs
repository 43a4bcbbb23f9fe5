//! trip-planner
//!
//! Route optimization over a rate-limited map provider: requests too large
//! for one provider call are sharded and reassembled, a remote oracle orders
//! the stops, and the realized route is fetched back in that order.

pub mod client;
pub mod config;
pub mod error;
pub mod geo;
pub mod merge;
pub mod model;
pub mod multiplex;
pub mod oracle;
pub mod osrm;
pub mod polyline;
pub mod rate_limit;
pub mod shard;
pub mod traits;
pub mod trip;

pub use client::ProviderClient;
pub use config::PlannerConfig;
pub use error::{PlannerError, Result};
pub use trip::{TripPlanner, TripStage, TripSummary};
