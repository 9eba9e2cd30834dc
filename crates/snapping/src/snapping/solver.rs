//! Solvers for [`AssignmentProblem`].

use std::collections::HashMap;

use pathfinding::kuhn_munkres::{kuhn_munkres, Weights};

use super::problem::{AssignmentProblem, Solution};

/// Distances are scaled to integer weights at this resolution, unless the
/// largest cost would then push weights out of [`WEIGHT_LIMIT`].
const SCALE: f64 = 1000.0;

/// Bound on the magnitude of any matrix entry, leaving headroom for the
/// slack sums inside `kuhn_munkres`.
const WEIGHT_LIMIT: i64 = i64::MAX / 8;

pub trait AssignmentSolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Return a feasible solution. Every stop the solver leaves unassigned
    /// is reported to the caller as unsnapped.
    fn solve(&self, problem: &AssignmentProblem) -> Solution;
}

/// Each stop takes its cheapest candidate. Optimal when links are uncapped.
fn nearest(problem: &AssignmentProblem) -> Solution {
    let mut solution = Solution::unassigned(problem.stops.len());
    for (i, variable) in problem.variables.iter().enumerate() {
        let slot = &mut solution.assigned[variable.stop];
        let better = match *slot {
            None => true,
            Some(current) => {
                let best = &problem.variables[current];
                variable
                    .cost
                    .total_cmp(&best.cost)
                    .then(variable.link.cmp(&best.link))
                    .is_lt()
            }
        };
        if better {
            *slot = Some(i);
        }
    }
    solution
}

/// Optimal assignment via Kuhn–Munkres.
///
/// Each link is expanded into one column per free slot and every stop gets
/// access to an extra "unassigned" column, so the matrix always has at
/// least as many columns as rows. Candidate pairs are weighted
/// `reward - cost`, with `reward` larger than any total of costs, so the
/// maximum-weight assignment snaps as many stops as possible and, among
/// those, minimises total distance. Non-candidate pairs are weighted far
/// below any alternative and are never chosen.
#[derive(Clone, Copy, Debug, Default)]
pub struct KuhnMunkresSolver;

struct ScaledWeights(Vec<Vec<i64>>);

impl Weights<i64> for ScaledWeights {
    fn rows(&self) -> usize {
        self.0.len()
    }

    fn columns(&self) -> usize {
        self.0.first().map_or(0, |r| r.len())
    }

    fn at(&self, row: usize, col: usize) -> i64 {
        self.0[row][col]
    }

    fn neg(&self) -> Self {
        ScaledWeights(
            self.0
                .iter()
                .map(|r| r.iter().map(|&x| x.saturating_neg()).collect())
                .collect(),
        )
    }
}

/// Scale factor keeping `infeasible = -(max·n + n + 1)·(n + 1)` within
/// [`WEIGHT_LIMIT`] for `rows` stops.
fn scale_for(max_cost: f64, rows: usize) -> f64 {
    let n = rows as f64 + 1.0;
    let budget = WEIGHT_LIMIT as f64 / (n * n) - 2.0;
    if max_cost * SCALE <= budget {
        SCALE
    } else {
        (budget / max_cost).max(0.0)
    }
}

impl AssignmentSolver for KuhnMunkresSolver {
    fn name(&self) -> &'static str {
        "kuhn_munkres"
    }

    fn solve(&self, problem: &AssignmentProblem) -> Solution {
        let rows = problem.stops.len();
        if rows == 0 || problem.variables.is_empty() {
            return Solution::unassigned(rows);
        }
        if problem.link_capacity.is_none() {
            return nearest(problem);
        }

        // Column range of each link.
        let mut offsets = Vec::with_capacity(problem.links.len() + 1);
        offsets.push(0);
        for link in 0..problem.links.len() {
            let slots = problem.capacity(link).map_or(rows, |c| c.min(rows));
            offsets.push(offsets[link] + slots);
        }
        let link_columns = offsets[problem.links.len()];
        let column_link = |column: usize| offsets.partition_point(|&o| o <= column) - 1;

        let max_cost = problem
            .variables
            .iter()
            .map(|v| v.cost.max(0.0))
            .fold(0.0, f64::max);
        let scale = scale_for(max_cost, rows);
        let scaled = |cost: f64| (cost.max(0.0) * scale).round() as i64;
        let n = rows as i64;
        let reward = (scaled(max_cost) + 1) * n + 1;
        let infeasible = -(reward * (n + 1));

        let mut matrix = vec![vec![infeasible; link_columns + rows]; rows];
        for row in matrix.iter_mut() {
            row[link_columns..].fill(0);
        }
        let mut by_pair = HashMap::with_capacity(problem.variables.len());
        for (i, variable) in problem.variables.iter().enumerate() {
            let weight = reward - scaled(variable.cost);
            let columns = offsets[variable.link]..offsets[variable.link + 1];
            matrix[variable.stop][columns].fill(weight);
            by_pair.insert((variable.stop, variable.link), i);
        }

        let (_total, columns) = kuhn_munkres(&ScaledWeights(matrix));

        let mut solution = Solution::unassigned(rows);
        for (stop, &column) in columns.iter().enumerate() {
            if column < link_columns {
                solution.assigned[stop] = by_pair.get(&(stop, column_link(column))).copied();
            }
        }
        solution
    }
}

/// Cheapest candidate pairs first, skipping stops already assigned and
/// links already full.
#[derive(Clone, Copy, Debug, Default)]
pub struct GreedySolver;

impl AssignmentSolver for GreedySolver {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn solve(&self, problem: &AssignmentProblem) -> Solution {
        if problem.link_capacity.is_none() {
            return nearest(problem);
        }

        let mut order: Vec<usize> = (0..problem.variables.len()).collect();
        order.sort_by(|&a, &b| {
            let (va, vb) = (&problem.variables[a], &problem.variables[b]);
            va.cost
                .total_cmp(&vb.cost)
                .then(va.stop.cmp(&vb.stop))
                .then(va.link.cmp(&vb.link))
        });

        let mut solution = Solution::unassigned(problem.stops.len());
        let mut free: Vec<usize> = (0..problem.links.len())
            .map(|link| problem.capacity(link).unwrap_or(usize::MAX))
            .collect();
        for i in order {
            let variable = &problem.variables[i];
            if solution.assigned[variable.stop].is_none() && free[variable.link] > 0 {
                solution.assigned[variable.stop] = Some(i);
                free[variable.link] -= 1;
            }
        }
        solution
    }
}
