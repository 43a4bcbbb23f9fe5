//! Provider operations that transparently split requests exceeding the
//! per-call limits.
//!
//! Shards are launched together and complete in any order; results are
//! slotted by shard index and merged in shard order. A failing shard fails
//! the whole operation, but calls already in flight are still awaited.

use std::iter::once;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::client::ProviderClient;
use crate::error::{PlannerError, Result};
use crate::merge::{MatrixAssembler, ShardSlots, merge_routes};
use crate::model::{
    Location, MatrixRequest, MatrixResponse, Operation, ProviderStatus, Route, RouteRequest,
    TravelMode,
};
use crate::shard::{plan_chained, plan_tiled};
use crate::traits::MapProvider;

impl<P: MapProvider> ProviderClient<P> {
    /// Route from `origin` through `waypoints` (in order) to `destination`,
    /// however many waypoints there are.
    pub async fn route_chained(
        &self,
        origin: &Location,
        destination: &Location,
        waypoints: &[Location],
        travel_mode: TravelMode,
    ) -> Result<Route> {
        let plan = plan_chained(waypoints.len(), self.config().max_route_points)?;
        let points: Vec<&Location> = once(origin)
            .chain(waypoints)
            .chain(once(destination))
            .collect();
        let parts = plan.split(&points)?;
        debug!(
            waypoints = waypoints.len(),
            shards = plan.shard_count(),
            "issuing chained route"
        );

        let mut pending: FuturesUnordered<_> = parts
            .into_iter()
            .enumerate()
            .map(|(index, part)| {
                let request = RouteRequest {
                    origin: part[0].clone(),
                    destination: part[part.len() - 1].clone(),
                    waypoints: part[1..part.len() - 1]
                        .iter()
                        .map(|location| (*location).clone())
                        .collect(),
                    travel_mode,
                    optimize_waypoints: false,
                };
                async move { (index, self.route(&request).await) }
            })
            .collect();

        let mut slots = ShardSlots::new(plan.shard_count());
        let mut merged = None;
        let mut first_error = None;
        while let Some((index, outcome)) = pending.next().await {
            let route = outcome.and_then(|directions| {
                directions
                    .into_primary()
                    .ok_or_else(|| PlannerError::provider(Operation::Route, ProviderStatus::ZeroResults))
            });
            match route {
                Ok(route) => match slots.fill(index, route) {
                    Ok(Some(ordered)) => merged = merge_routes(ordered),
                    Ok(None) => {}
                    Err(err) => {
                        first_error.get_or_insert(err);
                    }
                },
                Err(err) => {
                    debug!(shard = index, error = %err, "route shard failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        if let Some(err) = first_error {
            return Err(err);
        }
        let mut route =
            merged.ok_or_else(|| PlannerError::assembly("chained route has no shards"))?;
        route.waypoint_order = (0..waypoints.len()).collect();
        Ok(route)
    }

    /// Distance matrix of any size the destination-axis split can serve.
    ///
    /// Shard `i` starts `i` pacing intervals after the first, regardless of
    /// how earlier shards fared.
    pub async fn distance_matrix(&self, request: &MatrixRequest) -> Result<MatrixResponse> {
        let plan = plan_tiled(
            request.origins.len(),
            request.destinations.len(),
            self.config().max_matrix_elements,
        )?;
        if !plan.is_split() {
            let response = self.matrix(request).await?;
            let mut assembler = MatrixAssembler::new(plan.origins, plan.destinations);
            let shard = plan
                .shards
                .first()
                .ok_or_else(|| PlannerError::assembly("matrix plan has no shards"))?;
            assembler.place(shard, response)?;
            return assembler.finish();
        }
        info!(
            origins = plan.origins,
            destinations = plan.destinations,
            shards = plan.shard_count(),
            "splitting matrix request"
        );

        let pacing = self.config().matrix_shard_pacing();
        let mut pending: FuturesUnordered<_> = plan
            .shards
            .iter()
            .map(|shard| {
                let sub_request = MatrixRequest {
                    origins: request.origins.clone(),
                    destinations: request.destinations[shard.destinations.clone()].to_vec(),
                    travel_mode: request.travel_mode,
                    transit_modes: request.transit_modes.clone(),
                };
                let delay = pacing * shard.index as u32;
                async move {
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                    (shard, self.matrix(&sub_request).await)
                }
            })
            .collect();

        let mut assembler = MatrixAssembler::new(plan.origins, plan.destinations);
        let mut first_error = None;
        while let Some((shard, outcome)) = pending.next().await {
            match outcome {
                Ok(response) if first_error.is_none() => {
                    if let Err(err) = assembler.place(shard, response) {
                        debug!(shard = shard.index, error = %err, "matrix shard misshapen");
                        first_error = Some(err);
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    debug!(shard = shard.index, error = %err, "matrix shard failed");
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => assembler.finish(),
        }
    }
}
