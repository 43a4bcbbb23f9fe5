//! Request and response shapes exchanged with a map provider.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::geo::{LatLng, LatLngBounds};
use crate::polyline::Polyline;

/// The three operation types a provider offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    PlaceLookup,
    Route,
    Matrix,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PlaceLookup => "place lookup",
            Self::Route => "route",
            Self::Matrix => "matrix lookup",
        };
        f.write_str(name)
    }
}

/// Provider answer status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderStatus {
    Ok,
    ZeroResults,
    NotFound,
    InvalidRequest,
    MaxWaypointsExceeded,
    MaxElementsExceeded,
    MaxDimensionsExceeded,
    OverQueryLimit,
    RequestDenied,
    UnknownError,
}

impl ProviderStatus {
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::ZeroResults => "ZERO_RESULTS",
            Self::NotFound => "NOT_FOUND",
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::MaxWaypointsExceeded => "MAX_WAYPOINTS_EXCEEDED",
            Self::MaxElementsExceeded => "MAX_ELEMENTS_EXCEEDED",
            Self::MaxDimensionsExceeded => "MAX_DIMENSIONS_EXCEEDED",
            Self::OverQueryLimit => "OVER_QUERY_LIMIT",
            Self::RequestDenied => "REQUEST_DENIED",
            Self::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw provider answer: a status plus, on success, the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply<T> {
    pub status: ProviderStatus,
    pub payload: Option<T>,
}

impl<T> ProviderReply<T> {
    pub fn ok(payload: T) -> Self {
        Self {
            status: ProviderStatus::Ok,
            payload: Some(payload),
        }
    }

    pub fn failed(status: ProviderStatus) -> Self {
        Self {
            status,
            payload: None,
        }
    }

    /// Resolve with the payload on `OK`, fail with the status otherwise.
    ///
    /// An `OK` reply without a payload is reported as `UNKNOWN_ERROR`.
    pub fn into_result(self, operation: Operation) -> Result<T> {
        match (self.status, self.payload) {
            (ProviderStatus::Ok, Some(payload)) => Ok(payload),
            (ProviderStatus::Ok, None) => Err(PlannerError::provider(
                operation,
                ProviderStatus::UnknownError,
            )),
            (status, _) => Err(PlannerError::provider(operation, status)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    #[default]
    Walking,
    Bicycling,
    Transit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitMode {
    Bus,
    Rail,
    Subway,
    Train,
    Tram,
}

/// A location the provider can route to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub place_id: String,
    pub position: LatLng,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceQuery {
    pub query: String,
    pub location_bias: Option<LatLng>,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceResult {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    pub position: LatLng,
}

impl PlaceResult {
    pub fn location(&self) -> Location {
        Location {
            place_id: self.place_id.clone(),
            position: self.position,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Location,
    pub destination: Location,
    pub waypoints: Vec<Location>,
    pub travel_mode: TravelMode,
    pub optimize_waypoints: bool,
}

impl RouteRequest {
    /// A plain point-to-point request.
    pub fn between(origin: Location, destination: Location, travel_mode: TravelMode) -> Self {
        Self {
            origin,
            destination,
            waypoints: Vec::new(),
            travel_mode,
            optimize_waypoints: false,
        }
    }

    /// Origin, waypoints and destination.
    pub fn point_count(&self) -> usize {
        self.waypoints.len() + 2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub duration_secs: f64,
    pub distance_meters: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub legs: Vec<RouteLeg>,
    pub overview_path: Polyline,
    pub bounds: LatLngBounds,
    pub waypoint_order: Vec<usize>,
}

impl Route {
    pub fn duration_secs(&self) -> f64 {
        self.legs.iter().map(|leg| leg.duration_secs).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResult {
    pub routes: Vec<Route>,
}

impl DirectionsResult {
    /// The first route, the one the provider recommends.
    pub fn into_primary(self) -> Option<Route> {
        self.routes.into_iter().next()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRequest {
    pub origins: Vec<Location>,
    pub destinations: Vec<Location>,
    pub travel_mode: TravelMode,
    pub transit_modes: Vec<TransitMode>,
}

impl MatrixRequest {
    pub fn square(points: Vec<Location>, travel_mode: TravelMode) -> Self {
        Self {
            origins: points.clone(),
            destinations: points,
            travel_mode,
            transit_modes: Vec::new(),
        }
    }

    /// Number of origin × destination cells.
    pub fn element_count(&self) -> usize {
        self.origins.len() * self.destinations.len()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixElement {
    pub duration_secs: Option<f64>,
    pub distance_meters: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixRow {
    pub elements: Vec<MatrixElement>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MatrixResponse {
    pub origin_addresses: Vec<String>,
    pub destination_addresses: Vec<String>,
    pub rows: Vec<MatrixRow>,
}
