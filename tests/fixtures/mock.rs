//! In-memory collaborators for driving the planner without a network.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::{Instant, sleep};

use trip_planner::geo::{LatLng, LatLngBounds};
use trip_planner::model::{
    DirectionsResult, Location, MatrixElement, MatrixRequest, MatrixResponse, MatrixRow,
    PlaceQuery, PlaceResult, ProviderReply, ProviderStatus, Route, RouteLeg, RouteRequest,
    TransitMode,
};
use trip_planner::oracle::{CostMatrix, SolverResult};
use trip_planner::polyline::Polyline;
use trip_planner::traits::{MapProvider, Optimizer};
use trip_planner::{PlannerError, Result};

use super::nyc_parks::{CITY_SITES, PENN_STATION, Site, UPSTATE_SITES};

/// Seconds between two positions: a scaled Manhattan distance.
pub fn travel_secs(from: LatLng, to: LatLng) -> f64 {
    (((from.lat - to.lat).abs() + (from.lng - to.lng).abs()) * 20_000.0).round()
}

pub fn place_result(name: &str, lat: f64, lng: f64, address: &str) -> PlaceResult {
    PlaceResult {
        place_id: format!("place:{name}"),
        name: name.to_string(),
        formatted_address: address.to_string(),
        position: LatLng::new(lat, lng),
    }
}

pub fn location(name: &str, lat: f64, lng: f64) -> Location {
    Location {
        place_id: format!("place:{name}"),
        position: LatLng::new(lat, lng),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Place(String),
    Route {
        origin: String,
        destination: String,
        waypoints: Vec<String>,
    },
    Matrix {
        origins: usize,
        destinations: usize,
        transit_modes: Vec<TransitMode>,
        at: Instant,
    },
}

type Latency = Box<dyn Fn(&RouteRequest) -> Duration + Send + Sync>;

/// A provider over a fixed set of places. Travel times come from
/// [`travel_secs`]; selected calls can be made to fail.
#[derive(Default)]
pub struct MockProvider {
    places: HashMap<String, PlaceResult>,
    failing_places: HashSet<String>,
    failing_route_destinations: HashSet<String>,
    unreachable: HashSet<(String, String)>,
    fail_matrix_with: Option<ProviderStatus>,
    short_matrices: bool,
    route_latency: Option<Latency>,
    calls: Mutex<Vec<Call>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Penn Station plus every park site, city and upstate.
    pub fn new_york() -> Self {
        let mut provider = Self::new().with_site(&PENN_STATION);
        for site in CITY_SITES.iter().chain(UPSTATE_SITES) {
            provider = provider.with_site(site);
        }
        provider
    }

    pub fn with_site(self, site: &Site) -> Self {
        self.with_place(site.name, site.lat, site.lng, site.address)
    }

    pub fn with_place(mut self, name: &str, lat: f64, lng: f64, address: &str) -> Self {
        self.places
            .insert(name.to_string(), place_result(name, lat, lng, address));
        self
    }

    pub fn failing_place(mut self, name: &str) -> Self {
        self.failing_places.insert(name.to_string());
        self
    }

    pub fn failing_route_to(mut self, name: &str) -> Self {
        self.failing_route_destinations
            .insert(format!("place:{name}"));
        self
    }

    pub fn unreachable_between(mut self, from: &str, to: &str) -> Self {
        self.unreachable
            .insert((format!("place:{from}"), format!("place:{to}")));
        self
    }

    pub fn failing_matrix(mut self, status: ProviderStatus) -> Self {
        self.fail_matrix_with = Some(status);
        self
    }

    /// Answer every matrix call one origin and one destination short.
    pub fn short_matrices(mut self) -> Self {
        self.short_matrices = true;
        self
    }

    pub fn with_route_latency(
        mut self,
        latency: impl Fn(&RouteRequest) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.route_latency = Some(Box::new(latency));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn route_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Route { .. }))
            .collect()
    }

    pub fn matrix_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Matrix { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    /// The answer a provider without any size limit would give.
    pub fn unlimited_matrix(&self, request: &MatrixRequest) -> MatrixResponse {
        let address = |location: &Location| location.place_id.clone();
        MatrixResponse {
            origin_addresses: request.origins.iter().map(address).collect(),
            destination_addresses: request.destinations.iter().map(address).collect(),
            rows: request
                .origins
                .iter()
                .map(|from| MatrixRow {
                    elements: request
                        .destinations
                        .iter()
                        .map(|to| {
                            let key = (from.place_id.clone(), to.place_id.clone());
                            if self.unreachable.contains(&key) {
                                MatrixElement::default()
                            } else {
                                let secs = travel_secs(from.position, to.position);
                                MatrixElement {
                                    duration_secs: Some(secs),
                                    distance_meters: Some(secs * 1.3),
                                }
                            }
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

impl MapProvider for MockProvider {
    async fn lookup_place(&self, query: &PlaceQuery) -> ProviderReply<Vec<PlaceResult>> {
        self.record(Call::Place(query.query.clone()));
        if self.failing_places.contains(&query.query) {
            return ProviderReply::failed(ProviderStatus::UnknownError);
        }
        match self.places.get(&query.query) {
            Some(place) => ProviderReply::ok(vec![place.clone()]),
            None => ProviderReply::failed(ProviderStatus::ZeroResults),
        }
    }

    async fn route(&self, request: &RouteRequest) -> ProviderReply<DirectionsResult> {
        self.record(Call::Route {
            origin: request.origin.place_id.clone(),
            destination: request.destination.place_id.clone(),
            waypoints: request
                .waypoints
                .iter()
                .map(|waypoint| waypoint.place_id.clone())
                .collect(),
        });
        if let Some(latency) = &self.route_latency {
            sleep(latency(request)).await;
        }
        if self
            .failing_route_destinations
            .contains(&request.destination.place_id)
        {
            return ProviderReply::failed(ProviderStatus::ZeroResults);
        }

        let points: Vec<LatLng> = std::iter::once(&request.origin)
            .chain(&request.waypoints)
            .chain(std::iter::once(&request.destination))
            .map(|location| location.position)
            .collect();
        let legs = points
            .windows(2)
            .map(|pair| {
                let secs = travel_secs(pair[0], pair[1]);
                RouteLeg {
                    duration_secs: secs,
                    distance_meters: secs * 1.3,
                }
            })
            .collect();
        let bounds = LatLngBounds::from_points(&points).unwrap();
        ProviderReply::ok(DirectionsResult {
            routes: vec![Route {
                legs,
                overview_path: Polyline::new(points),
                bounds,
                waypoint_order: (0..request.waypoints.len()).collect(),
            }],
        })
    }

    async fn matrix(&self, request: &MatrixRequest) -> ProviderReply<MatrixResponse> {
        self.record(Call::Matrix {
            origins: request.origins.len(),
            destinations: request.destinations.len(),
            transit_modes: request.transit_modes.clone(),
            at: Instant::now(),
        });
        if let Some(status) = self.fail_matrix_with {
            return ProviderReply::failed(status);
        }
        let mut response = self.unlimited_matrix(request);
        if self.short_matrices {
            response.origin_addresses.pop();
            response.destination_addresses.pop();
            response.rows.pop();
            for row in &mut response.rows {
                row.elements.pop();
            }
        }
        ProviderReply::ok(response)
    }
}

#[derive(Debug, Clone)]
pub enum OracleMode {
    /// Greedy closed tour from index 0, reported the way the remote solver
    /// does: starting and ending at the depot.
    NearestNeighbour,
    Fixed(Vec<usize>),
    Fail,
}

#[derive(Debug)]
pub struct MockOracle {
    mode: OracleMode,
    received: Mutex<Vec<CostMatrix>>,
}

impl MockOracle {
    pub fn new(mode: OracleMode) -> Self {
        Self {
            mode,
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<CostMatrix> {
        self.received.lock().unwrap().clone()
    }
}

impl Optimizer for MockOracle {
    async fn solve(&self, matrix: &CostMatrix) -> Result<SolverResult> {
        self.received.lock().unwrap().push(matrix.clone());
        match &self.mode {
            OracleMode::Fail => Err(PlannerError::OracleStatus { status: 503 }),
            OracleMode::Fixed(path) => Ok(SolverResult {
                duration: 0.0,
                path: path.clone(),
            }),
            OracleMode::NearestNeighbour => Ok(nearest_neighbour(matrix)),
        }
    }
}

pub fn nearest_neighbour(matrix: &CostMatrix) -> SolverResult {
    let size = matrix.size();
    let mut visited = vec![false; size];
    let mut path = vec![0];
    let mut duration = 0u64;
    visited[0] = true;
    let mut current = 0;
    for _ in 1..size {
        let (next, cost) = (0..size)
            .filter(|candidate| !visited[*candidate])
            .map(|candidate| (candidate, matrix.cost(current, candidate).unwrap()))
            .min_by_key(|(_, cost)| *cost)
            .unwrap();
        visited[next] = true;
        duration += cost;
        path.push(next);
        current = next;
    }
    duration += matrix.cost(current, 0).unwrap();
    path.push(0);
    SolverResult {
        duration: duration as f64,
        path,
    }
}
