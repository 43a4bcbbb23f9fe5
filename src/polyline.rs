//! Polyline representation for route geometries.
//!
//! Routes carry their overview geometry as decoded coordinates. Any compact
//! encoding belongs to the provider adapter, not to the planner core.

use serde::{Deserialize, Serialize};

use crate::geo::{LatLng, LatLngBounds};

/// An ordered sequence of points along a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<LatLng>,
}

impl Polyline {
    pub fn new(points: Vec<LatLng>) -> Self {
        Self { points }
    }

    /// Returns a reference to the coordinate points.
    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    /// Consumes the polyline and returns the owned coordinate points.
    pub fn into_points(self) -> Vec<LatLng> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Appends every point of `other`, keeping order. Shared endpoints are
    /// not collapsed.
    pub fn append(&mut self, other: Polyline) {
        self.points.extend(other.points);
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::from_points(&self.points)
    }
}

impl From<Vec<LatLng>> for Polyline {
    fn from(points: Vec<LatLng>) -> Self {
        Self::new(points)
    }
}
