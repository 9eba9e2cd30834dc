//! Stop-to-link snapping as a linear assignment problem.
//!
//! One binary variable `x[s,l]` per candidate pair, with cost equal to the
//! stop-to-link distance.
//!
//! ```text
//! minimise    Σ d[s,l] · x[s,l]
//! subject to  Σ_l x[s,l] ≤ 1      for every stop s
//!             Σ_s x[s,l] ≤ cap    for every link l (when capped)
//! ```
//!
//! Solvers first maximise the number of stops assigned, then minimise the
//! objective among assignments of that size.

use std::collections::HashMap;

use itertools::{Either, Itertools};
use modenet_network::{LinkId, StopId};
use pathfinding::undirected::connected_components::connected_components;

use super::candidates::StopCandidates;

/// Decision variable `x[stop, link]`. Indices refer to the owning problem's
/// `stops` and `links`.
#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub stop: usize,
    pub link: usize,
    pub cost: f64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Constraint {
    /// At most one of `variables` (all belonging to `stop`) is set.
    OneLinkPerStop { stop: usize, variables: Vec<usize> },
    /// At most `capacity` of `variables` (all belonging to `link`) are set.
    LinkCapacity {
        link: usize,
        capacity: usize,
        variables: Vec<usize>,
    },
}

/// For each stop, the index of the chosen variable, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub assigned: Vec<Option<usize>>,
}

impl Solution {
    pub fn unassigned(stops: usize) -> Self {
        Self {
            assigned: vec![None; stops],
        }
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned.iter().flatten().count()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignmentProblem {
    pub stops: Vec<StopId>,
    pub links: Vec<LinkId>,
    pub variables: Vec<Variable>,
    pub link_capacity: Option<usize>,
    /// Slots of each link already taken outside this problem, by earlier
    /// blocks of the same component.
    pub used: Vec<usize>,
}

impl AssignmentProblem {
    /// Build the problem from candidate lists. Stops without candidates are
    /// left out; they cannot be part of any assignment.
    pub fn formulate(candidates: &[StopCandidates], link_capacity: Option<usize>) -> Self {
        let links: Vec<LinkId> = candidates
            .iter()
            .flat_map(|s| s.candidates.iter().map(|c| c.link.clone()))
            .sorted()
            .dedup()
            .collect();
        let link_index: HashMap<&LinkId, usize> =
            links.iter().enumerate().map(|(i, l)| (l, i)).collect();

        let mut stops = Vec::new();
        let mut variables = Vec::new();
        for entry in candidates.iter().filter(|s| !s.candidates.is_empty()) {
            let stop = stops.len();
            stops.push(entry.stop.clone());
            for candidate in &entry.candidates {
                variables.push(Variable {
                    stop,
                    link: link_index[&candidate.link],
                    cost: candidate.distance,
                });
            }
        }

        Self {
            used: vec![0; links.len()],
            stops,
            links,
            variables,
            link_capacity,
        }
    }

    /// Slots still free on `link`, or `None` when links are uncapped.
    pub fn capacity(&self, link: usize) -> Option<usize> {
        self.link_capacity
            .map(|capacity| capacity.saturating_sub(self.used[link]))
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Total cost of the chosen variables.
    pub fn objective(&self, solution: &Solution) -> f64 {
        solution
            .assigned
            .iter()
            .flatten()
            .map(|&v| self.variables[v].cost)
            .sum()
    }

    pub fn constraints(&self) -> Vec<Constraint> {
        let by_stop = self.variables_by(|v| v.stop, self.stops.len());
        let mut constraints: Vec<Constraint> = by_stop
            .into_iter()
            .enumerate()
            .map(|(stop, variables)| Constraint::OneLinkPerStop { stop, variables })
            .collect();

        if self.link_capacity.is_some() {
            let by_link = self.variables_by(|v| v.link, self.links.len());
            constraints.extend(by_link.into_iter().enumerate().filter_map(|(link, variables)| {
                Some(Constraint::LinkCapacity {
                    link,
                    capacity: self.capacity(link)?,
                    variables,
                })
            }));
        }
        constraints
    }

    /// True when `solution` only picks variables of the right stop and
    /// respects every constraint.
    pub fn is_feasible(&self, solution: &Solution) -> bool {
        if solution.assigned.len() != self.stops.len() {
            return false;
        }
        let owned = solution
            .assigned
            .iter()
            .enumerate()
            .all(|(stop, &v)| v.is_none_or(|v| self.variables.get(v).is_some_and(|x| x.stop == stop)));
        if !owned {
            return false;
        }

        let chosen: Vec<usize> = solution.assigned.iter().flatten().copied().collect();
        self.constraints().iter().all(|constraint| match constraint {
            Constraint::OneLinkPerStop { variables, .. } => {
                variables.iter().filter(|v| chosen.contains(v)).count() <= 1
            }
            Constraint::LinkCapacity {
                capacity, variables, ..
            } => variables.iter().filter(|v| chosen.contains(v)).count() <= *capacity,
        })
    }

    /// Split into independent sub-problems: stops and links connected
    /// through candidate pairs. Components are ordered by their first stop.
    pub fn components(&self) -> Vec<AssignmentProblem> {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        enum Vertex {
            Stop(usize),
            Link(usize),
        }

        let by_stop = self.variables_by(|v| v.stop, self.stops.len());
        let by_link = self.variables_by(|v| v.link, self.links.len());
        let starts: Vec<Vertex> = (0..self.stops.len()).map(Vertex::Stop).collect();

        let mut groups: Vec<(Vec<usize>, Vec<usize>)> = connected_components(&starts, |vertex| {
            match *vertex {
                Vertex::Stop(s) => by_stop[s]
                    .iter()
                    .map(|&v| Vertex::Link(self.variables[v].link))
                    .collect::<Vec<_>>(),
                Vertex::Link(l) => by_link[l]
                    .iter()
                    .map(|&v| Vertex::Stop(self.variables[v].stop))
                    .collect(),
            }
        })
        .into_iter()
        .map(|component| {
            let (stops, links): (Vec<_>, Vec<_>) =
                component.into_iter().partition_map(|vertex| match vertex {
                    Vertex::Stop(s) => Either::Left(s),
                    Vertex::Link(l) => Either::Right(l),
                });
            (stops.into_iter().sorted().collect(), links.into_iter().sorted().collect())
        })
        .collect();
        groups.sort_by_key(|(stops, _)| stops.first().copied());

        groups
            .into_iter()
            .map(|(stops, links)| self.restrict(&stops, &links))
            .collect()
    }

    /// Split into consecutive blocks of at most `max_stops` stops, each with
    /// the links its stops can reach. Blocks are solved one after another,
    /// so the caller carries link usage forward through [`Self::used`].
    pub fn blocks(&self, max_stops: usize) -> Vec<AssignmentProblem> {
        if self.stops.len() <= max_stops {
            return vec![self.clone()];
        }
        let by_stop = self.variables_by(|v| v.stop, self.stops.len());
        let indices: Vec<usize> = (0..self.stops.len()).collect();
        indices
            .chunks(max_stops.max(1))
            .map(|stops| {
                let links: Vec<usize> = stops
                    .iter()
                    .flat_map(|&s| by_stop[s].iter().map(|&v| self.variables[v].link))
                    .sorted()
                    .dedup()
                    .collect();
                self.restrict(stops, &links)
            })
            .collect()
    }

    fn restrict(&self, stops: &[usize], links: &[usize]) -> AssignmentProblem {
        let stop_map: HashMap<usize, usize> =
            stops.iter().enumerate().map(|(new, &old)| (old, new)).collect();
        let link_map: HashMap<usize, usize> =
            links.iter().enumerate().map(|(new, &old)| (old, new)).collect();

        let variables = self
            .variables
            .iter()
            .filter_map(|v| {
                Some(Variable {
                    stop: *stop_map.get(&v.stop)?,
                    link: *link_map.get(&v.link)?,
                    cost: v.cost,
                })
            })
            .collect();

        AssignmentProblem {
            stops: stops.iter().map(|&s| self.stops[s].clone()).collect(),
            links: links.iter().map(|&l| self.links[l].clone()).collect(),
            variables,
            link_capacity: self.link_capacity,
            used: links.iter().map(|&l| self.used[l]).collect(),
        }
    }

    fn variables_by(&self, key: impl Fn(&Variable) -> usize, len: usize) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); len];
        for (i, variable) in self.variables.iter().enumerate() {
            groups[key(variable)].push(i);
        }
        groups
    }
}
