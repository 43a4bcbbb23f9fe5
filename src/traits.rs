//! Seams to the two remote collaborators of the planner.
//!
//! Concrete apps implement these for their provider of choice; the crate
//! ships an OSRM-backed [`MapProvider`](crate::osrm::OsrmProvider) and an
//! HTTP [`Optimizer`](crate::oracle::HttpOracle).

use std::future::Future;

use crate::error::Result;
use crate::model::{
    DirectionsResult, MatrixRequest, MatrixResponse, PlaceQuery, PlaceResult, ProviderReply,
    RouteRequest,
};
use crate::oracle::{CostMatrix, SolverResult};

/// A map/routing provider reachable through request/response calls.
///
/// Implementations report failures through the reply status, never by
/// panicking; rate limiting and status translation happen in
/// [`ProviderClient`](crate::client::ProviderClient).
pub trait MapProvider {
    fn lookup_place(
        &self,
        query: &PlaceQuery,
    ) -> impl Future<Output = ProviderReply<Vec<PlaceResult>>> + Send;

    fn route(
        &self,
        request: &RouteRequest,
    ) -> impl Future<Output = ProviderReply<DirectionsResult>> + Send;

    fn matrix(
        &self,
        request: &MatrixRequest,
    ) -> impl Future<Output = ProviderReply<MatrixResponse>> + Send;
}

/// A remote traveling-salesman solver.
///
/// The solver method is opaque; only the matrix-in, order-out contract
/// matters.
pub trait Optimizer {
    fn solve(&self, matrix: &CostMatrix) -> impl Future<Output = Result<SolverResult>> + Send;
}
