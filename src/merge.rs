//! Reassembling sharded provider results.

use crate::error::{PlannerError, Result};
use crate::model::{MatrixElement, MatrixResponse, MatrixRow, Route};
use crate::shard::TiledShard;

/// Fixed-size, index-addressed holding area for shard results that may
/// arrive in any order.
#[derive(Debug)]
pub struct ShardSlots<T> {
    slots: Vec<Option<T>>,
    filled: usize,
}

impl<T> ShardSlots<T> {
    pub fn new(count: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(count).collect(),
            filled: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// Store the result for shard `index`.
    ///
    /// Returns every result in shard order when this fill completes the
    /// set, and `None` while slots are still empty.
    pub fn fill(&mut self, index: usize, value: T) -> Result<Option<Vec<T>>> {
        let count = self.slots.len();
        let slot = self.slots.get_mut(index).ok_or_else(|| {
            PlannerError::assembly(format!("shard {index} is outside a plan of {count}"))
        })?;
        if slot.is_some() {
            return Err(PlannerError::assembly(format!(
                "shard {index} delivered twice"
            )));
        }
        *slot = Some(value);
        self.filled += 1;

        if !self.is_complete() {
            return Ok(None);
        }
        Ok(Some(self.slots.drain(..).flatten().collect()))
    }
}

/// Concatenate shard routes in order.
///
/// The first route is the base; later routes contribute their legs and
/// overview path, and the bounds grow to cover each of them. The base's
/// waypoint order is kept as is.
pub fn merge_routes(routes: impl IntoIterator<Item = Route>) -> Option<Route> {
    let mut routes = routes.into_iter();
    let mut merged = routes.next()?;
    for route in routes {
        merged.legs.extend(route.legs);
        merged.overview_path.append(route.overview_path);
        merged.bounds = merged.bounds.union(&route.bounds);
    }
    Some(merged)
}

/// Places destination-tiled matrix responses into one full grid.
#[derive(Debug)]
pub struct MatrixAssembler {
    origin_addresses: Option<Vec<String>>,
    destination_addresses: Vec<Option<String>>,
    rows: Vec<Vec<Option<MatrixElement>>>,
}

impl MatrixAssembler {
    pub fn new(origins: usize, destinations: usize) -> Self {
        Self {
            origin_addresses: None,
            destination_addresses: vec![None; destinations],
            rows: vec![vec![None; destinations]; origins],
        }
    }

    /// Copy one shard's response into its destination range.
    pub fn place(&mut self, shard: &TiledShard, response: MatrixResponse) -> Result<()> {
        let origins = self.rows.len();
        let range = shard.destinations.clone();
        if range.end > self.destination_addresses.len() {
            return Err(PlannerError::assembly(format!(
                "shard {} covers destinations {range:?} beyond {}",
                shard.index,
                self.destination_addresses.len()
            )));
        }
        if response.rows.len() != origins
            || response.origin_addresses.len() != origins
            || response.destination_addresses.len() != range.len()
        {
            return Err(PlannerError::assembly(format!(
                "shard {} returned {} rows × {} destinations, expected {origins} × {}",
                shard.index,
                response.rows.len(),
                response.destination_addresses.len(),
                range.len()
            )));
        }

        if self.origin_addresses.is_none() {
            self.origin_addresses = Some(response.origin_addresses);
        }
        for (offset, address) in response.destination_addresses.into_iter().enumerate() {
            self.destination_addresses[range.start + offset] = Some(address);
        }
        for (row_index, row) in response.rows.into_iter().enumerate() {
            if row.elements.len() != range.len() {
                return Err(PlannerError::assembly(format!(
                    "shard {} row {row_index} has {} elements, expected {}",
                    shard.index,
                    row.elements.len(),
                    range.len()
                )));
            }
            let target = &mut self.rows[row_index];
            for (offset, element) in row.elements.into_iter().enumerate() {
                target[range.start + offset] = Some(element);
            }
        }
        Ok(())
    }

    /// The assembled grid; fails if any cell is still missing.
    pub fn finish(self) -> Result<MatrixResponse> {
        let origin_addresses = self
            .origin_addresses
            .ok_or_else(|| PlannerError::assembly("no matrix shard was placed"))?;
        let destination_addresses = self
            .destination_addresses
            .into_iter()
            .enumerate()
            .map(|(index, address)| {
                address.ok_or_else(|| {
                    PlannerError::assembly(format!("destination {index} was never filled"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .into_iter()
            .enumerate()
            .map(|(row_index, cells)| {
                let elements = cells
                    .into_iter()
                    .enumerate()
                    .map(|(column, cell)| {
                        cell.ok_or_else(|| {
                            PlannerError::assembly(format!(
                                "cell ({row_index}, {column}) was never filled"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(MatrixRow { elements })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(MatrixResponse {
            origin_addresses,
            destination_addresses,
            rows,
        })
    }
}
