//! Bounded-transfer trip search.
//!
//! Enumerates direct, one-transfer and two-transfer combinations of
//! segments, bracketed and joined by walk legs, and keeps the single
//! lowest-scoring combination whose total walk fits the budget.
//!
//! The tiers are O(n), O(n²) and O(n³) in the segment count. That is fine for
//! community networks of tens to low hundreds of segments; a city-wide
//! network needs a proper shortest-path formulation instead.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Coord, Segment, SegmentKey, TripKind};

use super::config::{CostMetric, SearchConfig};

/// Error from trip search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// No combination satisfies the walk, transfer and mode constraints.
    #[error("no suitable route found")]
    NoRoute,
}

/// Request for trip search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub origin: Coord,
    pub destination: Coord,
}

impl SearchRequest {
    pub fn new(origin: Coord, destination: Coord) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

/// The winning combination of segments.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub kind: TripKind,
    /// Rides in travel order (1 to 3).
    pub segments: Vec<Segment>,
    /// Walk legs in travel order, one more than the rides: origin to first
    /// ride, between rides, last ride to destination (km).
    pub walks_km: Vec<f64>,
    /// Scalarized cost. Lower is better.
    pub score: f64,
    /// The metric the score was computed with.
    pub metric: CostMetric,
}

impl Candidate {
    /// Total walking distance (km).
    pub fn walk_km(&self) -> f64 {
        self.walks_km.iter().sum()
    }

    /// The walking term of the score.
    pub fn walk_penalty(&self) -> f64 {
        self.walk_km() * self.metric.walk_weight()
    }

    pub fn ride_fare(&self) -> f64 {
        self.segments.iter().map(|s| s.fare).sum()
    }

    pub fn ride_time_mins(&self) -> f64 {
        self.segments.iter().map(|s| s.time_mins).sum()
    }

    pub fn ride_distance_km(&self) -> f64 {
        self.segments.iter().map(|s| s.distance_km).sum()
    }

    pub fn transfer_count(&self) -> usize {
        self.kind.transfers()
    }
}

/// The metric value a single segment contributes to a score.
pub fn segment_cost(segment: &Segment, metric: CostMetric) -> f64 {
    match metric {
        CostMetric::Time => segment.time_mins,
        CostMetric::Fare => segment.fare,
        CostMetric::Distance => segment.distance_km,
    }
}

/// Score a ride total and walking distance: `ride + walk_km × weight`.
pub fn score(ride_cost: f64, walk_km: f64, metric: CostMetric) -> f64 {
    ride_cost + walk_km * metric.walk_weight()
}

/// Running best: segment indices, walk legs and score.
struct Best {
    indices: Vec<usize>,
    walks_km: Vec<f64>,
    score: f64,
}

/// Per-tier counts, for logging.
#[derive(Debug, Default, Clone, Copy)]
struct TierStats {
    evaluated: usize,
    admitted: usize,
}

/// Trip search over a fixed segment set.
pub struct Planner<'a> {
    segments: &'a [Segment],
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(segments: &'a [Segment], config: &'a SearchConfig) -> Self {
        Self { segments, config }
    }

    /// Find the lowest-scoring trip.
    ///
    /// All tiers up to the transfer ceiling are searched and the global
    /// minimum wins. Only a strictly lower score replaces the running best,
    /// so ties go to the earliest enumerated combination.
    pub fn search(&self, request: &SearchRequest) -> Result<Candidate, SearchError> {
        let segments = self.segments;
        let n = segments.len();
        let max_walk = self.config.max_walk_km;
        let metric = self.config.cost_metric;
        let transfers = self.config.effective_transfers();

        let to_start: Vec<f64> = segments
            .iter()
            .map(|s| request.origin.distance_km(&s.start.coord))
            .collect();
        let from_end: Vec<f64> = segments
            .iter()
            .map(|s| s.end.coord.distance_km(&request.destination))
            .collect();
        let costs: Vec<f64> = segments.iter().map(|s| segment_cost(s, metric)).collect();
        let identity = identity_classes(segments);

        let mut best: Option<Best> = None;
        let mut consider = |indices: &[usize], walks_km: &[f64], score: f64| {
            if best.as_ref().is_none_or(|b| score < b.score) {
                best = Some(Best {
                    indices: indices.to_vec(),
                    walks_km: walks_km.to_vec(),
                    score,
                });
            }
        };

        let mut stats = [TierStats::default(); 3];

        // Direct
        for i in 0..n {
            stats[0].evaluated += 1;
            let walk = to_start[i] + from_end[i];
            if walk > max_walk {
                continue;
            }
            stats[0].admitted += 1;
            consider(
                &[i],
                &[to_start[i], from_end[i]],
                score(costs[i], walk, metric),
            );
        }

        if transfers >= 1 && n > 1 {
            let gap = transfer_gaps(segments);

            // One transfer
            for i in 0..n {
                if to_start[i] > max_walk {
                    continue;
                }
                for j in 0..n {
                    if identity[i] == identity[j] {
                        continue;
                    }
                    stats[1].evaluated += 1;
                    let partial = to_start[i] + gap[i * n + j];
                    if partial > max_walk {
                        continue;
                    }
                    let walk = partial + from_end[j];
                    if walk > max_walk {
                        continue;
                    }
                    stats[1].admitted += 1;
                    consider(
                        &[i, j],
                        &[to_start[i], gap[i * n + j], from_end[j]],
                        score(costs[i] + costs[j], walk, metric),
                    );
                }
            }

            // Two transfers
            if transfers >= 2 {
                for i in 0..n {
                    if to_start[i] > max_walk {
                        continue;
                    }
                    for j in 0..n {
                        if identity[i] == identity[j] {
                            continue;
                        }
                        let first = to_start[i] + gap[i * n + j];
                        if first > max_walk {
                            continue;
                        }
                        for k in 0..n {
                            if identity[k] == identity[i] || identity[k] == identity[j] {
                                continue;
                            }
                            stats[2].evaluated += 1;
                            let second = first + gap[j * n + k];
                            if second > max_walk {
                                continue;
                            }
                            let walk = second + from_end[k];
                            if walk > max_walk {
                                continue;
                            }
                            stats[2].admitted += 1;
                            consider(
                                &[i, j, k],
                                &[
                                    to_start[i],
                                    gap[i * n + j],
                                    gap[j * n + k],
                                    from_end[k],
                                ],
                                score(costs[i] + costs[j] + costs[k], walk, metric),
                            );
                        }
                    }
                }
            }
        }

        debug!(
            segments = n,
            direct = ?stats[0],
            one_transfer = ?stats[1],
            two_transfer = ?stats[2],
            best_score = best.as_ref().map(|b| b.score),
            "trip search finished"
        );

        let best = best.ok_or(SearchError::NoRoute)?;
        let kind = TripKind::for_segment_count(best.indices.len()).ok_or(SearchError::NoRoute)?;

        Ok(Candidate {
            kind,
            segments: best.indices.iter().map(|&i| segments[i].clone()).collect(),
            walks_km: best.walks_km,
            score: best.score,
            metric,
        })
    }
}

/// Map each segment to a class id shared by segments with equal keys.
fn identity_classes(segments: &[Segment]) -> Vec<usize> {
    let mut ids: HashMap<&SegmentKey, usize> = HashMap::with_capacity(segments.len());
    segments
        .iter()
        .map(|s| {
            let next = ids.len();
            *ids.entry(&s.key).or_insert(next)
        })
        .collect()
}

/// Row-major matrix of walking distances from each segment's end to each
/// segment's start.
fn transfer_gaps(segments: &[Segment]) -> Vec<f64> {
    let n = segments.len();
    let mut gap = vec![0.0; n * n];
    for (i, from) in segments.iter().enumerate() {
        for (j, to) in segments.iter().enumerate() {
            gap[i * n + j] = from.end.coord.distance_km(&to.start.coord);
        }
    }
    gap
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
