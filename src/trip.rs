//! Trip orchestration: from a list of stop names to an optimized, routed
//! trip.
//!
//! A run moves through [`TripStage`]s strictly in order, and each stage
//! finishes all of its concurrent work before the next begins. Stops that
//! cannot be resolved, or that fall outside the configured locality, are
//! dropped quietly. Any later failure aborts the run without a summary.

use std::fmt;
use std::future::Future;
use std::iter::once;

use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::client::ProviderClient;
use crate::config::{FinalRoute, TripConfig};
use crate::error::{PlannerError, Result};
use crate::model::{
    Location, MatrixRequest, Operation, PlaceQuery, PlaceResult, ProviderStatus, RouteLeg,
    RouteRequest,
};
use crate::oracle::CostMatrix;
use crate::polyline::Polyline;
use crate::traits::{MapProvider, Optimizer};

/// A named point of interest, resolved at most once.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    name: String,
    place: Option<PlaceResult>,
}

impl Stop {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            place: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn place(&self) -> Option<&PlaceResult> {
        self.place.as_ref()
    }

    pub fn location(&self) -> Option<Location> {
        self.place.as_ref().map(PlaceResult::location)
    }

    pub fn is_resolved(&self) -> bool {
        self.place.is_some()
    }

    /// Attach the lookup result. Returns `false`, leaving the stop untouched,
    /// if it was already resolved.
    fn resolve(&mut self, place: PlaceResult) -> bool {
        if self.place.is_some() {
            return false;
        }
        self.place = Some(place);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripStage {
    CollectingStops,
    ResolvingLocations,
    BuildingMatrix,
    Optimizing,
    ResolvingFinalRoute,
    Done,
}

impl fmt::Display for TripStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CollectingStops => "collecting stops",
            Self::ResolvingLocations => "resolving locations",
            Self::BuildingMatrix => "building matrix",
            Self::Optimizing => "optimizing",
            Self::ResolvingFinalRoute => "resolving final route",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// The result of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct TripSummary {
    pub origin: PlaceResult,
    /// Resolved stops in visiting order.
    pub stops: Vec<Stop>,
    /// Sum of every realized leg.
    pub total_duration_secs: f64,
    /// Cost the oracle reported for its order, in matrix units.
    pub solver_duration: Option<f64>,
    pub legs: Vec<RouteLeg>,
    pub path: Polyline,
}

type StageObserver = Box<dyn Fn(TripStage) + Send + Sync>;

pub struct TripPlanner<P, O> {
    client: ProviderClient<P>,
    oracle: O,
    config: TripConfig,
    observer: Option<StageObserver>,
}

impl<P, O> TripPlanner<P, O>
where
    P: MapProvider,
    O: Optimizer,
{
    pub fn new(client: ProviderClient<P>, oracle: O, config: TripConfig) -> Self {
        Self {
            client,
            oracle,
            config,
            observer: None,
        }
    }

    /// Report every stage transition to `observer`.
    pub fn with_observer(mut self, observer: impl Fn(TripStage) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn client(&self) -> &ProviderClient<P> {
        &self.client
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// Wait for the host to signal the provider is usable, then plan.
    pub async fn plan_when_ready<R, I, S>(&self, ready: R, names: I) -> Result<TripSummary>
    where
        R: Future<Output = ()>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ready.await;
        self.plan(names).await
    }

    #[instrument(skip_all)]
    pub async fn plan<I, S>(&self, names: I) -> Result<TripSummary>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enter(TripStage::CollectingStops);
        let stops: Vec<Stop> = names.into_iter().map(Stop::new).collect();

        self.enter(TripStage::ResolvingLocations);
        let (origin, stops) = self.resolve_locations(stops).await?;
        if stops.is_empty() {
            warn!("no stop survived location resolution");
            self.enter(TripStage::Done);
            return Ok(TripSummary {
                origin,
                stops,
                total_duration_secs: 0.0,
                solver_duration: None,
                legs: Vec::new(),
                path: Polyline::default(),
            });
        }

        self.enter(TripStage::BuildingMatrix);
        let origin_location = origin.location();
        let matrix = self.build_matrix(&origin_location, &stops).await?;

        self.enter(TripStage::Optimizing);
        let solved = self.oracle.solve(&matrix).await?;
        let order = solved.visiting_order(matrix.size())?;
        let mut slots: Vec<Option<Stop>> = stops.into_iter().map(Some).collect();
        let ordered: Vec<Stop> = order
            .into_iter()
            .filter_map(|index| slots[index - 1].take())
            .collect();

        self.enter(TripStage::ResolvingFinalRoute);
        let (legs, path) = self.final_route(&origin_location, &ordered).await?;
        let total_duration_secs: f64 = legs.iter().map(|leg| leg.duration_secs).sum();

        self.enter(TripStage::Done);
        info!(
            stops = ordered.len(),
            total_duration_secs,
            solver_duration = solved.duration,
            "trip planned"
        );
        Ok(TripSummary {
            origin,
            stops: ordered,
            total_duration_secs,
            solver_duration: Some(solved.duration),
            legs,
            path,
        })
    }

    fn enter(&self, stage: TripStage) {
        info!(%stage, "trip stage");
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }

    fn query(&self, text: &str) -> PlaceQuery {
        PlaceQuery {
            query: text.to_string(),
            location_bias: self.config.location_bias,
            fields: self.config.place_fields.clone(),
        }
    }

    fn in_locality(&self, place: &PlaceResult) -> bool {
        self.config
            .locality
            .as_deref()
            .is_none_or(|locality| place.formatted_address.contains(locality))
    }

    async fn resolve_locations(&self, stops: Vec<Stop>) -> Result<(PlaceResult, Vec<Stop>)> {
        let resolved = join_all(stops.into_iter().map(|stop| self.resolve_stop(stop)));
        let (origin, resolved) = futures::join!(self.resolve_origin(), resolved);

        let origin = origin?;
        let stops: Vec<Stop> = resolved.into_iter().flatten().collect();
        info!(origin = %origin.name, stops = stops.len(), "locations resolved");
        Ok((origin, stops))
    }

    /// The trip cannot start anywhere else, so a failed origin aborts.
    async fn resolve_origin(&self) -> Result<PlaceResult> {
        let query = self.query(&self.config.origin_query);
        self.client
            .find_place(&query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| PlannerError::provider(Operation::PlaceLookup, ProviderStatus::ZeroResults))
    }

    /// The resolved stop, or `None` if it should be dropped.
    async fn resolve_stop(&self, mut stop: Stop) -> Option<Stop> {
        let query = self.query(stop.name());
        let place = match self.client.find_place(&query).await {
            Ok(places) => places.into_iter().next(),
            Err(err) => {
                debug!(stop = stop.name(), error = %err, "dropping unresolvable stop");
                return None;
            }
        };
        let Some(place) = place else {
            debug!(stop = stop.name(), "dropping stop without results");
            return None;
        };
        if !self.in_locality(&place) {
            debug!(
                stop = stop.name(),
                address = %place.formatted_address,
                "dropping stop outside locality"
            );
            return None;
        }
        stop.resolve(place);
        Some(stop)
    }

    async fn build_matrix(&self, origin: &Location, stops: &[Stop]) -> Result<CostMatrix> {
        let points: Vec<Location> = once(origin.clone())
            .chain(stops.iter().filter_map(Stop::location))
            .collect();
        let request = MatrixRequest {
            transit_modes: self.config.transit_modes.clone(),
            ..MatrixRequest::square(points, self.config.travel_mode)
        };
        let response = self.client.distance_matrix(&request).await?;
        CostMatrix::from_response(&response, self.config.unreachable_cost)
    }

    async fn final_route(
        &self,
        origin: &Location,
        ordered: &[Stop],
    ) -> Result<(Vec<RouteLeg>, Polyline)> {
        let mut sequence: Vec<Location> = once(origin.clone())
            .chain(ordered.iter().filter_map(Stop::location))
            .collect();
        if self.config.return_to_origin {
            sequence.push(origin.clone());
        }
        let travel_mode = self.config.travel_mode;

        match self.config.final_route {
            FinalRoute::Chained => {
                let last = sequence.len() - 1;
                let route = self
                    .client
                    .route_chained(&sequence[0], &sequence[last], &sequence[1..last], travel_mode)
                    .await?;
                Ok((route.legs, route.overview_path))
            }
            FinalRoute::Legs => {
                let mut legs = Vec::new();
                let mut path = Polyline::default();
                // One call at a time, in visiting order.
                for pair in sequence.windows(2) {
                    let request = RouteRequest::between(pair[0].clone(), pair[1].clone(), travel_mode);
                    let route = self
                        .client
                        .route(&request)
                        .await?
                        .into_primary()
                        .ok_or_else(|| {
                            PlannerError::provider(Operation::Route, ProviderStatus::ZeroResults)
                        })?;
                    legs.extend(route.legs);
                    path.append(route.overview_path);
                }
                Ok((legs, path))
            }
        }
    }
}
