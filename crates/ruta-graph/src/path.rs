//! Shortest path search.
//!
//! Dijkstra over non-negative integer weights with a binary-heap
//! frontier. Stale frontier entries are left in the heap and skipped
//! when popped for a location that is already settled.
//!
//! Weights are trusted to be non-negative; `Weight` is unsigned, so a
//! negative value can't reach this module in the first place.

use crate::edge::Distance;
use crate::graph::Graph;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use tracing::trace;

/// A path found by the search, with its total cost.
struct PathFound {
    locations: Vec<String>,
    distance: Distance,
}

impl Graph {
    /// Finds the minimum-weight path from `from` to `to`.
    ///
    /// Returns the visited locations in order, both endpoints included, or
    /// `None` if either endpoint is unknown or `to` is unreachable. A known
    /// location routed to itself yields `[from]` whether or not a self-loop
    /// exists.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        self.dijkstra(from, to).map(|found| found.locations)
    }

    /// Total weight of the path `shortest_path` returns for the same pair.
    pub fn shortest_distance(&self, from: &str, to: &str) -> Option<Distance> {
        self.dijkstra(from, to).map(|found| found.distance)
    }

    fn dijkstra(&self, from: &str, to: &str) -> Option<PathFound> {
        let locations = self.locations();
        // Re-borrow the endpoints from the graph so the maps below can hold
        // them alongside edge targets.
        let from = *locations.get(from)?;
        let to = *locations.get(to)?;

        if from == to {
            return Some(PathFound {
                locations: vec![from.to_string()],
                distance: 0,
            });
        }

        let mut distances: HashMap<&str, Distance> = locations
            .iter()
            .map(|&location| (location, Distance::MAX))
            .collect();
        let mut previous: HashMap<&str, &str> = HashMap::new();
        let mut settled: HashSet<&str> = HashSet::with_capacity(locations.len());

        // Ties on distance break on location name, which keeps path choice
        // stable across runs.
        let mut frontier: BinaryHeap<Reverse<(Distance, &str)>> = BinaryHeap::new();
        distances.insert(from, 0);
        frontier.push(Reverse((0, from)));

        while let Some(Reverse((distance, current))) = frontier.pop() {
            if current == to {
                break;
            }
            if !settled.insert(current) {
                continue;
            }

            for edge in self.edges_from(current) {
                let neighbor = edge.target.as_str();
                let candidate = distance.saturating_add(Distance::from(edge.weight));
                let known = distances.get(neighbor).copied().unwrap_or(Distance::MAX);

                if candidate < known {
                    distances.insert(neighbor, candidate);
                    previous.insert(neighbor, current);
                    frontier.push(Reverse((candidate, neighbor)));
                }
            }
        }

        trace!(from, to, settled = settled.len(), "route search finished");

        let distance = distances
            .get(to)
            .copied()
            .filter(|&d| d != Distance::MAX)?;

        let mut path = vec![to.to_string()];
        let mut current = to;
        while let Some(&parent) = previous.get(current) {
            path.push(parent.to_string());
            current = parent;
        }
        path.reverse();

        Some(PathFound {
            locations: path,
            distance,
        })
    }
}
