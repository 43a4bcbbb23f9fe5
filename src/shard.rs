//! Splitting oversized provider requests into calls that fit the per-call
//! limits.
//!
//! Two shapes are supported:
//!
//! * **chained**: a route through `origin, stop_1..stop_S, destination`
//!   limited to `K` points per call. Consecutive calls share one boundary
//!   point: the destination of call `i` is the origin of call `i + 1`.
//! * **tiled**: a matrix limited to `E` origin × destination cells per call,
//!   split along the destination axis only. Splitting origins is not
//!   supported; a request whose origins alone exceed `E` is rejected.

use std::ops::Range;

use crate::error::{PlannerError, Result};

/// One call of a chained plan, as inclusive indices into the full point
/// sequence (origin at 0, destination at `stops + 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainedShard {
    pub index: usize,
    pub first_point: usize,
    pub last_point: usize,
}

impl ChainedShard {
    /// Routing origin of this call.
    pub fn origin(&self) -> usize {
        self.first_point
    }

    /// Routing destination of this call.
    pub fn destination(&self) -> usize {
        self.last_point
    }

    /// Points sent as intermediate waypoints.
    pub fn waypoints(&self) -> Range<usize> {
        self.first_point + 1..self.last_point
    }

    pub fn point_count(&self) -> usize {
        self.last_point - self.first_point + 1
    }

    pub fn leg_count(&self) -> usize {
        self.last_point - self.first_point
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedPlan {
    pub stops: usize,
    pub capacity: usize,
    pub shards: Vec<ChainedShard>,
}

impl ChainedPlan {
    /// Origin, stops and destination.
    pub fn point_count(&self) -> usize {
        self.stops + 2
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Per-shard slices of `points`, which must hold exactly
    /// [`point_count`](Self::point_count) items.
    pub fn split<'a, T>(&self, points: &'a [T]) -> Result<Vec<&'a [T]>> {
        if points.len() != self.point_count() {
            return Err(PlannerError::assembly(format!(
                "chained plan covers {} points, got {}",
                self.point_count(),
                points.len()
            )));
        }
        Ok(self
            .shards
            .iter()
            .map(|shard| &points[shard.first_point..=shard.last_point])
            .collect())
    }
}

/// Plan a route through `stops` intermediate points with at most `capacity`
/// points per call.
pub fn plan_chained(stops: usize, capacity: usize) -> Result<ChainedPlan> {
    if capacity < 2 {
        return Err(PlannerError::invalid_shard(format!(
            "a route call needs room for origin and destination, capacity is {capacity}"
        )));
    }

    let step = capacity - 1;
    let last = stops + 1;
    let shard_count = (stops + 1).div_ceil(step);
    let shards = (0..shard_count)
        .map(|index| {
            let first_point = index * step;
            ChainedShard {
                index,
                first_point,
                last_point: (first_point + step).min(last),
            }
        })
        .collect();

    Ok(ChainedPlan {
        stops,
        capacity,
        shards,
    })
}

/// One call of a tiled plan: every origin against a contiguous range of
/// destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledShard {
    pub index: usize,
    pub destinations: Range<usize>,
}

impl TiledShard {
    pub fn width(&self) -> usize {
        self.destinations.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiledPlan {
    pub origins: usize,
    pub destinations: usize,
    pub capacity: usize,
    pub shards: Vec<TiledShard>,
}

impl TiledPlan {
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    pub fn is_split(&self) -> bool {
        self.shards.len() > 1
    }
}

/// Plan an `origins × destinations` matrix with at most `capacity` cells
/// per call.
pub fn plan_tiled(origins: usize, destinations: usize, capacity: usize) -> Result<TiledPlan> {
    if capacity <= 1 {
        return Err(PlannerError::invalid_shard(format!(
            "matrix capacity must exceed 1, got {capacity}"
        )));
    }
    if origins == 0 || destinations == 0 {
        return Err(PlannerError::invalid_shard(format!(
            "matrix request is empty ({origins} × {destinations})"
        )));
    }
    if origins > capacity {
        return Err(PlannerError::invalid_shard(format!(
            "{origins} origins exceed the {capacity} cells allowed per call; \
             only destinations are split"
        )));
    }

    let width = if origins * destinations <= capacity {
        destinations
    } else {
        capacity / origins
    };
    let shards = (0..destinations.div_ceil(width))
        .map(|index| {
            let start = index * width;
            TiledShard {
                index,
                destinations: start..(start + width).min(destinations),
            }
        })
        .collect();

    Ok(TiledPlan {
        origins,
        destinations,
        capacity,
        shards,
    })
}
