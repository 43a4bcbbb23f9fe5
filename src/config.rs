//! Planner configuration.
//!
//! Every struct has working defaults, and the whole tree deserializes from
//! JSON with missing fields falling back to those defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::geo::LatLng;
use crate::model::{TransitMode, TravelMode};

/// A rate: at most `tokens` permits in any `interval_ms` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimit {
    pub tokens: u32,
    pub interval_ms: u64,
}

impl RateLimit {
    pub const fn per_second(tokens: u32) -> Self {
        Self {
            tokens,
            interval_ms: 1000,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    fn validate(&self, name: &str) -> Result<()> {
        if self.tokens == 0 || self.interval_ms == 0 {
            return Err(PlannerError::configuration(format!(
                "{name} rate limit must grant at least one token per non-empty interval"
            )));
        }
        Ok(())
    }
}

/// Per-call limits and pacing for the map provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub places_rate: RateLimit,
    pub routes_rate: RateLimit,
    /// Matrix calls consume one token per origin × destination cell.
    pub matrix_rate: RateLimit,
    /// Maximum points in one route call, origin and destination included.
    pub max_route_points: usize,
    /// Maximum origin × destination cells in one matrix call.
    pub max_matrix_elements: usize,
    /// Fixed delay between consecutive matrix shard launches.
    pub matrix_shard_pacing_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            places_rate: RateLimit::per_second(2),
            routes_rate: RateLimit::per_second(2),
            matrix_rate: RateLimit::per_second(100),
            max_route_points: 10,
            max_matrix_elements: 100,
            matrix_shard_pacing_ms: 5000,
        }
    }
}

impl ProviderConfig {
    pub fn matrix_shard_pacing(&self) -> Duration {
        Duration::from_millis(self.matrix_shard_pacing_ms)
    }

    pub fn validate(&self) -> Result<()> {
        self.places_rate.validate("places")?;
        self.routes_rate.validate("routes")?;
        self.matrix_rate.validate("matrix")?;
        if self.max_route_points < 2 {
            return Err(PlannerError::configuration(
                "max_route_points must allow an origin and a destination",
            ));
        }
        if self.max_matrix_elements < 2 {
            return Err(PlannerError::configuration(
                "max_matrix_elements must be at least 2",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/tsp_solver".to_string(),
            timeout_secs: 60,
        }
    }
}

/// How the realized route is fetched once the visiting order is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalRoute {
    /// One route call per consecutive pair, issued one after another.
    #[default]
    Legs,
    /// The whole sequence as one chained (possibly sharded) route.
    Chained,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripConfig {
    /// Query resolved to the trip's starting point.
    pub origin_query: String,
    pub location_bias: Option<LatLng>,
    pub place_fields: Vec<String>,
    /// Stops whose formatted address lacks this substring are dropped.
    pub locality: Option<String>,
    pub travel_mode: TravelMode,
    /// Preferred vehicles when `travel_mode` is transit; empty lets the
    /// provider choose.
    pub transit_modes: Vec<TransitMode>,
    /// Cost assigned to matrix cells the provider could not fill.
    pub unreachable_cost: u64,
    pub final_route: FinalRoute,
    pub return_to_origin: bool,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self {
            origin_query: "New York Penn Station".to_string(),
            location_bias: Some(LatLng::new(40.730610, -73.935242)),
            place_fields: vec![
                "place_id".to_string(),
                "formatted_address".to_string(),
                "name".to_string(),
            ],
            locality: Some("New York, NY".to_string()),
            travel_mode: TravelMode::Walking,
            transit_modes: Vec::new(),
            unreachable_cost: 10_000_000,
            final_route: FinalRoute::Legs,
            return_to_origin: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub provider: ProviderConfig,
    pub oracle: OracleConfig,
    pub trip: TripConfig,
}

impl PlannerConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.provider.validate()?;
        if self.oracle.endpoint.is_empty() {
            return Err(PlannerError::configuration("oracle endpoint is empty"));
        }
        Ok(())
    }
}
