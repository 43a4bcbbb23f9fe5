//! Cost matrices and the remote traveling-salesman oracle.

use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::OracleConfig;
use crate::error::{PlannerError, Result};
use crate::model::MatrixResponse;
use crate::traits::Optimizer;

/// Square grid of travel costs in whole seconds.
///
/// Serializes as the oracle's request body, `{"matrix": [[...], ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostMatrix {
    matrix: Vec<Vec<u64>>,
}

impl CostMatrix {
    pub fn new(matrix: Vec<Vec<u64>>) -> Result<Self> {
        let size = matrix.len();
        if let Some(row) = matrix.iter().position(|row| row.len() != size) {
            return Err(PlannerError::assembly(format!(
                "cost matrix row {row} does not match size {size}"
            )));
        }
        Ok(Self { matrix })
    }

    /// Build from a provider matrix, using `unreachable` wherever the
    /// provider had no duration.
    pub fn from_response(response: &MatrixResponse, unreachable: u64) -> Result<Self> {
        let rows = response
            .rows
            .iter()
            .map(|row| {
                row.elements
                    .iter()
                    .map(|element| match element.duration_secs {
                        Some(secs) if secs.is_finite() => secs.max(0.0).round() as u64,
                        _ => unreachable,
                    })
                    .collect()
            })
            .collect();
        Self::new(rows)
    }

    pub fn size(&self) -> usize {
        self.matrix.len()
    }

    pub fn cost(&self, from: usize, to: usize) -> Option<u64> {
        self.matrix.get(from)?.get(to).copied()
    }

    pub fn rows(&self) -> &[Vec<u64>] {
        &self.matrix
    }
}

/// The oracle's answer: a visiting order over matrix indices and its cost.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverResult {
    pub duration: f64,
    pub path: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct OracleResponse {
    duration: f64,
    path: Vec<i64>,
}

impl SolverResult {
    fn from_wire(response: OracleResponse) -> Result<Self> {
        // The solver reports "no solution" as duration -1 with an empty path.
        if response.duration < 0.0 || response.path.is_empty() {
            return Err(PlannerError::oracle_answer("solver found no solution"));
        }
        let path = response
            .path
            .into_iter()
            .map(|index| {
                usize::try_from(index)
                    .map_err(|_| PlannerError::oracle_answer(format!("negative index {index}")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            duration: response.duration,
            path,
        })
    }

    /// Indices `1..size` in visiting order.
    ///
    /// Index 0 is the synthetic origin and is removed wherever it appears,
    /// so open paths and closed tours both work. Everything left must be a
    /// permutation of `1..size`.
    pub fn visiting_order(&self, size: usize) -> Result<Vec<usize>> {
        let order: Vec<usize> = self.path.iter().copied().filter(|index| *index != 0).collect();
        let mut seen = vec![false; size];
        for index in &order {
            match seen.get_mut(*index) {
                Some(slot) if !*slot => *slot = true,
                Some(_) => {
                    return Err(PlannerError::oracle_answer(format!(
                        "index {index} visited twice"
                    )));
                }
                None => {
                    return Err(PlannerError::oracle_answer(format!(
                        "index {index} outside a matrix of size {size}"
                    )));
                }
            }
        }
        if order.len() + 1 != size.max(1) {
            return Err(PlannerError::oracle_answer(format!(
                "path visits {} of {} stops",
                order.len(),
                size.saturating_sub(1)
            )));
        }
        Ok(order)
    }
}

/// [`Optimizer`] reached over HTTP: POST the matrix as JSON, read back
/// `{"duration": .., "path": [..]}`.
#[derive(Debug, Clone)]
pub struct HttpOracle {
    config: OracleConfig,
    client: reqwest::Client,
}

impl HttpOracle {
    pub fn new(config: OracleConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }
}

impl Optimizer for HttpOracle {
    async fn solve(&self, matrix: &CostMatrix) -> Result<SolverResult> {
        debug!(size = matrix.size(), endpoint = %self.config.endpoint, "sending cost matrix");
        let response = self
            .client
            .post(&self.config.endpoint)
            .header(ACCEPT, "application/json")
            .json(matrix)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlannerError::OracleStatus {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let answer: OracleResponse = serde_json::from_slice(&body)
            .map_err(|err| PlannerError::oracle_answer(format!("undecodable body: {err}")))?;
        let result = SolverResult::from_wire(answer)?;
        info!(duration = result.duration, stops = result.path.len(), "oracle answered");
        Ok(result)
    }
}
