//! Rate-limited, status-translating wrapper around a [`MapProvider`].

use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::model::{
    DirectionsResult, MatrixRequest, MatrixResponse, Operation, PlaceQuery, PlaceResult,
    ProviderReply, RouteRequest,
};
use crate::rate_limit::RateLimiter;
use crate::traits::MapProvider;

/// Every provider call of the planner goes through this client.
///
/// Each operation type has its own bucket. Place and route lookups cost one
/// token; matrix lookups cost one token per origin × destination cell.
/// Nothing is retried here.
#[derive(Debug)]
pub struct ProviderClient<P> {
    provider: P,
    config: ProviderConfig,
    places: RateLimiter,
    routes: RateLimiter,
    matrices: RateLimiter,
}

impl<P: MapProvider> ProviderClient<P> {
    pub fn new(provider: P, config: ProviderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            places: RateLimiter::new(config.places_rate)?,
            routes: RateLimiter::new(config.routes_rate)?,
            matrices: RateLimiter::new(config.matrix_rate)?,
            provider,
            config,
        })
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    pub async fn find_place(&self, query: &PlaceQuery) -> Result<Vec<PlaceResult>> {
        self.places.acquire(1).await;
        debug!(query = %query.query, "looking up place");
        let reply = self.provider.lookup_place(query).await;
        settle(Operation::PlaceLookup, reply)
    }

    pub async fn route(&self, request: &RouteRequest) -> Result<DirectionsResult> {
        self.routes.acquire(1).await;
        debug!(
            origin = %request.origin.place_id,
            destination = %request.destination.place_id,
            waypoints = request.waypoints.len(),
            "requesting route"
        );
        let reply = self.provider.route(request).await;
        settle(Operation::Route, reply)
    }

    /// A single matrix call; see
    /// [`distance_matrix`](Self::distance_matrix) for requests that may
    /// exceed the per-call element limit.
    pub async fn matrix(&self, request: &MatrixRequest) -> Result<MatrixResponse> {
        let cells = request.element_count();
        self.matrices
            .acquire(u32::try_from(cells).unwrap_or(u32::MAX))
            .await;
        debug!(
            origins = request.origins.len(),
            destinations = request.destinations.len(),
            "requesting matrix"
        );
        let reply = self.provider.matrix(request).await;
        settle(Operation::Matrix, reply)
    }
}

fn settle<T>(operation: Operation, reply: ProviderReply<T>) -> Result<T> {
    if !reply.status.is_ok() {
        warn!(%operation, status = %reply.status, "provider call failed");
    }
    reply.into_result(operation)
}
