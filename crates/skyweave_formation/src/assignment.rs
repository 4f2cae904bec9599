// SPDX-License-Identifier: MIT OR Apache-2.0
//! Minimum-cost perfect matching on square cost matrices.
//!
//! Shortest augmenting path form of the Hungarian algorithm with row and
//! column potentials (Jonker-Volgenant style), `O(n³)` time and `O(n)`
//! extra memory beyond the matrix.

use serde::{Deserialize, Serialize};

/// Default bound on the number of points handed to the solver
pub const DEFAULT_MAX_POINTS: usize = 4096;

/// Dense row-major `n × n` cost matrix
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    size: usize,
    costs: Vec<f64>,
}

impl CostMatrix {
    /// Wrap row-major costs; `costs.len()` must be `size²`
    pub fn new(size: usize, costs: Vec<f64>) -> Result<Self, AssignmentError> {
        if size.checked_mul(size) != Some(costs.len()) {
            return Err(AssignmentError::NotSquare {
                size,
                len: costs.len(),
            });
        }
        Ok(Self { size, costs })
    }

    /// Fill a matrix from `cost(row, col)`
    pub fn from_fn(size: usize, mut cost: impl FnMut(usize, usize) -> f64) -> Self {
        let mut costs = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                costs.push(cost(row, col));
            }
        }
        Self { size, costs }
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost of assigning `row` to `col`
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.costs[row * self.size + col]
    }

    fn first_non_finite(&self) -> Option<(usize, usize)> {
        self.costs
            .iter()
            .position(|c| !c.is_finite())
            .map(|i| (i / self.size, i % self.size))
    }
}

/// Optimal matching between rows and columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// Column assigned to each row
    pub row_to_col: Vec<usize>,
    /// Row assigned to each column
    pub col_to_row: Vec<usize>,
    /// Sum of the chosen costs
    pub total_cost: f64,
}

/// Solver failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssignmentError {
    /// Cost buffer does not describe a square matrix
    #[error("Cost matrix of size {size} cannot hold {len} entries")]
    NotSquare {
        /// Declared size
        size: usize,
        /// Number of costs supplied
        len: usize,
    },

    /// A cost is NaN or infinite
    #[error("Non-finite cost at row {row}, column {col}")]
    NonFinite {
        /// Row of the offending cost
        row: usize,
        /// Column of the offending cost
        col: usize,
    },

    /// Problem larger than the configured bound
    #[error("{size} points exceed the solver limit of {limit}")]
    TooLarge {
        /// Requested size
        size: usize,
        /// Configured bound
        limit: usize,
    },

    /// No augmenting path was found
    #[error("Solver failed to find an augmenting path")]
    Numerical,
}

/// Solve the assignment problem for `matrix`, refusing sizes above `limit`
pub fn solve(matrix: &CostMatrix, limit: usize) -> Result<Assignment, AssignmentError> {
    let n = matrix.size();
    if n > limit {
        return Err(AssignmentError::TooLarge { size: n, limit });
    }
    if let Some((row, col)) = matrix.first_non_finite() {
        return Err(AssignmentError::NonFinite { row, col });
    }
    if n == 0 {
        return Ok(Assignment {
            row_to_col: Vec::new(),
            col_to_row: Vec::new(),
            total_cost: 0.0,
        });
    }

    // 1-based, column 0 is the virtual start of each augmenting path
    let mut u = vec![0.0f64; n + 1];
    let mut v = vec![0.0f64; n + 1];
    let mut owner = vec![0usize; n + 1];
    let mut way = vec![0usize; n + 1];

    for row in 1..=n {
        owner[0] = row;
        let mut col0 = 0usize;
        let mut min_slack = vec![f64::INFINITY; n + 1];
        let mut used = vec![false; n + 1];

        loop {
            used[col0] = true;
            let row0 = owner[col0];
            let mut delta = f64::INFINITY;
            let mut col1 = 0usize;

            for col in 1..=n {
                if used[col] {
                    continue;
                }
                let reduced = matrix.get(row0 - 1, col - 1) - u[row0] - v[col];
                if reduced < min_slack[col] {
                    min_slack[col] = reduced;
                    way[col] = col0;
                }
                if min_slack[col] < delta {
                    delta = min_slack[col];
                    col1 = col;
                }
            }

            if col1 == 0 {
                return Err(AssignmentError::Numerical);
            }

            for col in 0..=n {
                if used[col] {
                    u[owner[col]] += delta;
                    v[col] -= delta;
                } else {
                    min_slack[col] -= delta;
                }
            }

            col0 = col1;
            if owner[col0] == 0 {
                break;
            }
        }

        // Flip the augmenting path
        loop {
            let col1 = way[col0];
            owner[col0] = owner[col1];
            col0 = col1;
            if col0 == 0 {
                break;
            }
        }
    }

    let mut row_to_col = vec![0usize; n];
    let mut col_to_row = vec![0usize; n];
    for col in 1..=n {
        let row = owner[col] - 1;
        row_to_col[row] = col - 1;
        col_to_row[col - 1] = row;
    }
    let total_cost = row_to_col
        .iter()
        .enumerate()
        .map(|(row, col)| matrix.get(row, *col))
        .sum();

    Ok(Assignment {
        row_to_col,
        col_to_row,
        total_cost,
    })
}
