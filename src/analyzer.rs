//! Search facade: picks a strategy, derives thresholds and runs the counter.

use crate::cancel::CancelToken;
use crate::compute::spatial::{
    DegreeThresholds, DistanceOracle, NeighborCounter, SearchStats, ZoneGrid,
};
use crate::config::{Config, Strategy};
use crate::dataset::PointSet;
use crate::error::{CanopyError, Result};
use canopy_types::result::NeighborResult;

/// Finds the points with the most neighbours within the configured radius.
///
/// An analyzer holds no state between runs; the same analyzer can be applied
/// to any number of point sets.
///
/// # Examples
///
/// ```
/// use canopy::{Analyzer, Config, PointSet, TreePoint};
///
/// let points = PointSet::new(vec![
///     TreePoint::new("P1", 0.0, 0.0),
///     TreePoint::new("P2", 0.0, 0.0001),
///     TreePoint::new("P3", 0.01, 0.01),
/// ])?;
///
/// let analyzer = Analyzer::new(Config::with_radius(50.0))?;
/// let result = analyzer.analyze(&points)?;
/// assert_eq!(result.max_count, 1);
/// assert_eq!(result.ids().collect::<Vec<_>>(), vec!["P1", "P2"]);
/// # Ok::<(), canopy::CanopyError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: Config,
    cancel: Option<CancelToken>,
}

impl Analyzer {
    pub fn new(config: Config) -> Result<Self> {
        config.validate().map_err(CanopyError::InvalidConfig)?;
        Ok(Self {
            config,
            cancel: None,
        })
    }

    /// Poll `token` between zones (or every few thousand pivots) and stop
    /// with `Cancelled` once it fires.
    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn analyze(&self, points: &PointSet) -> Result<NeighborResult> {
        self.analyze_with_stats(points).map(|(result, _)| result)
    }

    /// Like [`analyze`](Self::analyze), also reporting how much work the
    /// search did.
    pub fn analyze_with_stats(&self, points: &PointSet) -> Result<(NeighborResult, SearchStats)> {
        let Some(bounds) = points.bounds() else {
            log::debug!("Empty dataset, nothing to search");
            return Ok((NeighborResult::empty(), SearchStats::default()));
        };

        let thresholds = DegreeThresholds::derive(&self.config, points.max_abs_lat());
        let counter = NeighborCounter::new(
            DistanceOracle::new(self.config.earth_radius_ft),
            self.config.search_radius_ft,
        )
        .with_diagnostics(self.config.diagnostics);
        let cancel = self.cancel.as_ref();

        log::debug!(
            "Searching {} points with {:?}, radius {} ft, thresholds {:.8}° lat / {:.8}° long",
            points.len(),
            self.config.strategy,
            self.config.search_radius_ft,
            thresholds.lat,
            thresholds.long
        );

        let (tally, stats) = match self.config.strategy {
            Strategy::SlidingWindow => counter.sliding_window(points, thresholds.lat, cancel)?,
            Strategy::ZoneGrid => {
                let mut grid = ZoneGrid::build(&bounds, &thresholds, self.config.max_zones)?;
                let memberships = grid.distribute(points);
                let (tally, stats) = counter.zone_grid(points, &grid, thresholds.long, cancel)?;
                (
                    tally,
                    SearchStats {
                        memberships,
                        ..stats
                    },
                )
            }
        };

        log::debug!(
            "Search finished: max {} neighbors shared by {} points ({} pivots, {} pruned, {} distance checks)",
            tally.max_count(),
            tally.max_points().len(),
            stats.pivots,
            stats.pruned,
            stats.distance_checks
        );

        Ok((tally.into_result(points), stats))
    }
}

/// Run the default zone-grid search with a given radius in feet.
pub fn most_neighbors(points: &PointSet, radius_ft: f64) -> Result<NeighborResult> {
    let config = Config {
        search_radius_ft: radius_ft,
        ..Config::default()
    };
    Analyzer::new(config)?.analyze(points)
}
