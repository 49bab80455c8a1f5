//! Neighbour counting.
//!
//! Both strategies shortlist candidates with a window scan and confirm them
//! with the distance oracle:
//!
//! - **Sliding window**: every point sorted by latitude, one latitude window
//!   per point. Degrades to O(n²) when most points share a latitude band.
//! - **Zone grid**: inside each zone, members sorted by longitude and one
//!   longitude window per *resident* (a point whose home is the zone). Each
//!   point is evaluated exactly once and its home zone holds all of its
//!   neighbours, so both strategies report the same counts.
//!
//! A point is skipped without any distance check when its window holds fewer
//! candidates than the current maximum: it cannot reach it.

use super::distance::DistanceOracle;
use super::grid::{Zone, ZoneGrid, ZoneId};
use super::window::window;
use crate::cancel::{self, CancelToken};
use crate::dataset::PointSet;
use crate::error::Result;
#[cfg(feature = "parallel")]
use crate::error::CanopyError;
use canopy_types::result::NeighborResult;
use std::collections::BTreeSet;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Pivots scanned between cancellation polls in the sliding window.
const CANCEL_POLL_INTERVAL: usize = 4096;

/// How an observed count changed the tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    NewMax,
    Tie,
    Below,
}

/// Running maximum and the set of point indices attaining it.
///
/// Merging is commutative and associative, so partial tallies from
/// independent zones combine to the same result in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    max_count: usize,
    max_points: BTreeSet<usize>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_count(&self) -> usize {
        self.max_count
    }

    pub fn max_points(&self) -> &BTreeSet<usize> {
        &self.max_points
    }

    /// Record that point `index` has `count` neighbours.
    pub fn observe(&mut self, index: usize, count: usize) -> Observation {
        if count > self.max_count {
            self.max_count = count;
            self.max_points.clear();
            self.max_points.insert(index);
            Observation::NewMax
        } else if count == self.max_count && count > 0 {
            self.max_points.insert(index);
            Observation::Tie
        } else {
            Observation::Below
        }
    }

    /// True when `candidates` neighbours at most cannot reach the maximum.
    #[inline]
    pub fn can_skip(&self, candidates: usize) -> bool {
        candidates < self.max_count
    }

    pub fn merge(mut self, other: Tally) -> Tally {
        match self.max_count.cmp(&other.max_count) {
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Equal => {
                self.max_points.extend(other.max_points);
                self
            }
        }
    }

    /// Resolve indices into points, in point-set order.
    pub fn into_result(self, points: &PointSet) -> NeighborResult {
        let max_points = self
            .max_points
            .into_iter()
            .filter_map(|i| points.get(i).cloned())
            .collect();
        NeighborResult::new(self.max_count, max_points)
    }
}

/// Work counters for one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Points evaluated as window pivots
    pub pivots: usize,
    /// Pivots skipped because their window could not beat the maximum
    pub pruned: usize,
    /// Exact distance computations
    pub distance_checks: usize,
    /// Zones scanned (zone grid only)
    pub zones_visited: usize,
    /// Point-to-zone assignments (zone grid only)
    pub memberships: usize,
}

impl SearchStats {
    pub fn merge(self, other: SearchStats) -> SearchStats {
        SearchStats {
            pivots: self.pivots + other.pivots,
            pruned: self.pruned + other.pruned,
            distance_checks: self.distance_checks + other.distance_checks,
            zones_visited: self.zones_visited + other.zones_visited,
            memberships: self.memberships + other.memberships,
        }
    }
}

/// Counts neighbours within a fixed radius and tracks the maximum.
#[derive(Debug, Clone, Copy)]
pub struct NeighborCounter {
    oracle: DistanceOracle,
    radius: f64,
    diagnostics: bool,
}

impl NeighborCounter {
    pub fn new(oracle: DistanceOracle, radius: f64) -> Self {
        Self {
            oracle,
            radius,
            diagnostics: false,
        }
    }

    /// Log every new maximum and every tie at info level.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of `candidates` (indices into `points`) strictly within the
    /// radius of `pivot`, excluding the pivot itself.
    pub fn count_neighbors(&self, points: &PointSet, pivot: usize, candidates: &[usize]) -> usize {
        let center = points[pivot].point();
        candidates
            .iter()
            .filter(|&&j| j != pivot && self.oracle.within(center, points[j].point(), self.radius))
            .count()
    }

    /// One latitude window scan over every point.
    pub fn sliding_window(
        &self,
        points: &PointSet,
        lat_threshold: f64,
        cancel: Option<&CancelToken>,
    ) -> Result<(Tally, SearchStats)> {
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.sort_by(|&a, &b| points[a].lat().total_cmp(&points[b].lat()).then(a.cmp(&b)));

        let mut tally = Tally::new();
        let mut stats = SearchStats::default();

        for k in 0..order.len() {
            if k % CANCEL_POLL_INTERVAL == 0 {
                cancel::check(cancel)?;
            }

            let completion = k as f64 / order.len() as f64 * 100.0;
            self.evaluate(
                points,
                &order,
                k,
                lat_threshold,
                |i| points[i].lat(),
                completion,
                &mut tally,
                &mut stats,
            );
        }

        Ok((tally, stats))
    }

    /// Longitude window scans inside each zone of a distributed grid.
    pub fn zone_grid(
        &self,
        points: &PointSet,
        grid: &ZoneGrid,
        long_threshold: f64,
        cancel: Option<&CancelToken>,
    ) -> Result<(Tally, SearchStats)> {
        let zones: Vec<(ZoneId, &Zone)> = grid
            .zones()
            .filter(|(_, zone)| zone.residents() > 0)
            .collect();
        let total = zones.len().max(1) as f64;

        #[cfg(feature = "parallel")]
        let (tally, stats) = zones
            .par_iter()
            .enumerate()
            .try_fold(
                || (Tally::new(), SearchStats::default(), Vec::new()),
                |(mut tally, mut stats, mut scratch), (n, &(id, zone))| {
                    cancel::check(cancel)?;
                    let completion = n as f64 / total * 100.0;
                    self.scan_zone(
                        points,
                        grid,
                        id,
                        zone,
                        long_threshold,
                        completion,
                        &mut scratch,
                        &mut tally,
                        &mut stats,
                    );
                    Ok::<_, CanopyError>((tally, stats, scratch))
                },
            )
            .map(|partial| partial.map(|(tally, stats, _)| (tally, stats)))
            .try_reduce(
                || (Tally::new(), SearchStats::default()),
                |a, b| Ok((a.0.merge(b.0), a.1.merge(b.1))),
            )?;

        #[cfg(not(feature = "parallel"))]
        let (tally, stats) = {
            let mut tally = Tally::new();
            let mut stats = SearchStats::default();
            let mut scratch = Vec::new();
            for (n, &(id, zone)) in zones.iter().enumerate() {
                cancel::check(cancel)?;
                let completion = n as f64 / total * 100.0;
                self.scan_zone(
                    points,
                    grid,
                    id,
                    zone,
                    long_threshold,
                    completion,
                    &mut scratch,
                    &mut tally,
                    &mut stats,
                );
            }
            (tally, stats)
        };

        Ok((tally, stats))
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_zone(
        &self,
        points: &PointSet,
        grid: &ZoneGrid,
        id: ZoneId,
        zone: &Zone,
        long_threshold: f64,
        completion: f64,
        scratch: &mut Vec<usize>,
        tally: &mut Tally,
        stats: &mut SearchStats,
    ) {
        stats.zones_visited += 1;

        scratch.clear();
        scratch.extend_from_slice(zone.points());
        scratch.sort_by(|&a, &b| points[a].long().total_cmp(&points[b].long()).then(a.cmp(&b)));
        let members: &[usize] = scratch;

        for k in 0..members.len() {
            if grid.home_of(members[k]) != Some(id) {
                continue;
            }
            self.evaluate(
                points,
                members,
                k,
                long_threshold,
                |i| points[i].long(),
                completion,
                tally,
                stats,
            );
        }
    }

    /// Window, prune, confirm and record one pivot of a sorted index list.
    #[allow(clippy::too_many_arguments)]
    fn evaluate<F>(
        &self,
        points: &PointSet,
        sorted: &[usize],
        k: usize,
        threshold: f64,
        axis: F,
        completion: f64,
        tally: &mut Tally,
        stats: &mut SearchStats,
    ) where
        F: Fn(usize) -> f64,
    {
        let range = window(sorted, k, threshold, |&i| axis(i));
        let candidates = range.end() - range.start();
        stats.pivots += 1;

        if tally.can_skip(candidates) {
            stats.pruned += 1;
            return;
        }

        let pivot = sorted[k];
        stats.distance_checks += candidates;
        let count = self.count_neighbors(points, pivot, &sorted[range]);

        match tally.observe(pivot, count) {
            Observation::NewMax if self.diagnostics => log::info!(
                "New max neighbors: {} at {} (completion: {:.2}%)",
                count,
                points[pivot].id,
                completion
            ),
            Observation::Tie if self.diagnostics => log::info!(
                "Max neighbors matched at {} by {} (completion: {:.2}%)",
                count,
                points[pivot].id,
                completion
            ),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::spatial::thresholds::DegreeThresholds;
    use crate::config::EARTH_RADIUS_FT;
    use canopy_types::point::TreePoint;

    fn counter(radius: f64) -> NeighborCounter {
        NeighborCounter::new(DistanceOracle::default(), radius)
    }

    fn grid_for(set: &PointSet, t: &DegreeThresholds) -> ZoneGrid {
        let mut grid = ZoneGrid::build(&set.bounds().unwrap(), t, 1_000_000).unwrap();
        grid.distribute(set);
        grid
    }

    #[test]
    fn test_tally_rules() {
        let mut tally = Tally::new();
        assert_eq!(tally.observe(0, 0), Observation::Below);
        assert!(tally.max_points().is_empty());

        assert_eq!(tally.observe(1, 2), Observation::NewMax);
        assert_eq!(tally.observe(2, 2), Observation::Tie);
        assert_eq!(tally.observe(2, 2), Observation::Tie);
        assert_eq!(tally.observe(3, 1), Observation::Below);
        assert_eq!(tally.max_points().len(), 2);

        assert_eq!(tally.observe(4, 3), Observation::NewMax);
        assert_eq!(tally.max_count(), 3);
        assert_eq!(tally.max_points().iter().copied().collect::<Vec<_>>(), vec![4]);
    }

    #[test]
    fn test_tally_merge_is_order_independent() {
        let mut a = Tally::new();
        a.observe(1, 2);
        let mut b = Tally::new();
        b.observe(5, 2);
        let mut c = Tally::new();
        c.observe(9, 1);

        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = c.merge(b.merge(a));
        assert_eq!(left, right);
        assert_eq!(left.max_count(), 2);
        assert_eq!(left.max_points().len(), 2);
    }

    #[test]
    fn test_tally_skip_keeps_ties() {
        let mut tally = Tally::new();
        tally.observe(0, 3);
        assert!(tally.can_skip(2));
        assert!(!tally.can_skip(3));
    }

    #[test]
    fn test_three_point_scenario() {
        let set = PointSet::new(vec![
            TreePoint::new("P1", 0.0, 0.0),
            TreePoint::new("P2", 0.0, 0.0001),
            TreePoint::new("P3", 10.0, 10.0),
        ])
        .unwrap();
        // Wide enough to keep the grid small, far short of P3.
        let counter = counter(100_000.0);
        let t = DegreeThresholds::exact(100_000.0, EARTH_RADIUS_FT, 10.0);

        let (tally, _) = counter.sliding_window(&set, t.lat, None).unwrap();
        let result = tally.into_result(&set);
        assert_eq!(result.max_count, 1);
        assert_eq!(result.ids().collect::<Vec<_>>(), vec!["P1", "P2"]);

        let grid = grid_for(&set, &t);
        let (tally, _) = counter.zone_grid(&set, &grid, t.long, None).unwrap();
        assert_eq!(tally.into_result(&set), result);
    }

    #[test]
    fn test_coincident_points() {
        let set = PointSet::new(
            (0..6)
                .map(|i| TreePoint::new(format!("c{i}"), 40.7, -74.0))
                .collect(),
        )
        .unwrap();
        let counter = counter(10.0);
        let t = DegreeThresholds::exact(10.0, EARTH_RADIUS_FT, 40.7);

        let (tally, stats) = counter.sliding_window(&set, t.lat, None).unwrap();
        assert_eq!(tally.max_count(), 5);
        assert_eq!(tally.max_points().len(), 6);
        assert_eq!(stats.pivots, 6);

        let grid = grid_for(&set, &t);
        assert_eq!(grid.zone_count(), 1);
        let (tally, stats) = counter.zone_grid(&set, &grid, t.long, None).unwrap();
        assert_eq!(tally.max_count(), 5);
        assert_eq!(tally.max_points().len(), 6);
        assert_eq!(stats.zones_visited, 1);
    }

    #[test]
    fn test_pruning_skips_sparse_windows() {
        // A dense cluster first in latitude order, then isolated points.
        let mut trees: Vec<TreePoint> = (0..5)
            .map(|i| TreePoint::new(format!("d{i}"), 0.0, i as f64 * 0.00001))
            .collect();
        trees.extend((0..5).map(|i| TreePoint::new(format!("s{i}"), 1.0 + i as f64, 0.0)));
        let set = PointSet::new(trees).unwrap();

        let t = DegreeThresholds::exact(50.0, EARTH_RADIUS_FT, 5.0);
        let (tally, stats) = counter(50.0).sliding_window(&set, t.lat, None).unwrap();
        assert_eq!(tally.max_count(), 4);
        assert_eq!(stats.pivots, 10);
        assert_eq!(stats.pruned, 5);
        assert_eq!(stats.distance_checks, 20);
    }

    #[test]
    fn test_cancelled_before_start() {
        let set = PointSet::new(vec![TreePoint::new("a", 0.0, 0.0)]).unwrap();
        let token = CancelToken::new();
        token.cancel();
        let t = DegreeThresholds::exact(50.0, EARTH_RADIUS_FT, 0.0);

        assert!(counter(50.0).sliding_window(&set, t.lat, Some(&token)).is_err());
        let grid = grid_for(&set, &t);
        assert!(
            counter(50.0)
                .zone_grid(&set, &grid, t.long, Some(&token))
                .is_err()
        );
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_zones_merge_to_sequential_result() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(77);
        // Two separated clusters of equal shape tie across distant zones.
        let mut trees = Vec::new();
        for (c, (lat, long)) in [(40.70, -74.00), (40.72, -73.97)].into_iter().enumerate() {
            for i in 0..5 {
                let long = long + i as f64 * 0.00001;
                trees.push(TreePoint::new(format!("k{c}{i}"), lat, long));
            }
        }
        trees.extend((0..600).map(|i| {
            TreePoint::new(
                format!("r{i}"),
                40.69 + rng.random_range(0.0..0.04),
                -74.01 + rng.random_range(0.0..0.05),
            )
        }));
        let set = PointSet::new(trees).unwrap();

        let radius = 60.0;
        let counter = counter(radius);
        let t = DegreeThresholds::exact(radius, EARTH_RADIUS_FT, set.max_abs_lat());
        let grid = grid_for(&set, &t);

        let (parallel, parallel_stats) = counter.zone_grid(&set, &grid, t.long, None).unwrap();

        let mut sequential = Tally::new();
        let mut scratch = Vec::new();
        let mut visited = 0;
        for (id, zone) in grid.zones().filter(|(_, zone)| zone.residents() > 0) {
            let mut stats = SearchStats::default();
            counter.scan_zone(
                &set,
                &grid,
                id,
                zone,
                t.long,
                0.0,
                &mut scratch,
                &mut sequential,
                &mut stats,
            );
            visited += stats.zones_visited;
        }

        assert_eq!(parallel, sequential);
        assert_eq!(parallel_stats.zones_visited, visited);
        assert_eq!(parallel_stats.pivots, set.len());

        let (sliding, _) = counter.sliding_window(&set, t.lat, None).unwrap();
        assert_eq!(parallel, sliding);
        assert!(parallel.max_count() >= 4);
    }
}
