//! Overlapping zone grid.
//!
//! The bounding box of the dataset, grown by one zone side on every edge, is
//! covered by square zones whose side is four times the axis threshold. Zone
//! origins step by half a side, so neighbouring zones overlap by half in both
//! directions and every location lies in up to four zones.
//!
//! ## Home zones
//!
//! Each point is assigned to every zone containing it, and additionally gets
//! one *home* zone: the containing zone whose centre is nearest. Zone centres
//! are one step apart, so a point is at most half a step (one threshold) from
//! its home centre, and any neighbour of the point lies at most one step (half
//! a side) from that centre. Every neighbour of a point is therefore a member
//! of the point's home zone, which lets the counter evaluate each point exactly
//! once, in its home zone, against a complete candidate set.
//!
//! ```text
//!   top ┌───────┬───┬───────┐
//!       │ zone  │   │       │   rows step down by half a side,
//!       │ (0,0) │ ▒ │ (0,1) │   columns step right by half a side;
//!       ├───────┼───┼───────┤   ▒ is covered by both zones
//!       │   ▒   │ ▒ │   ▒   │
//!       └───────┴───┴───────┘
//! ```

use super::thresholds::DegreeThresholds;
use crate::dataset::PointSet;
use crate::error::{CanopyError, Result};
use canopy_types::bbox::ZoneBounds;
use geo::Point;
use smallvec::SmallVec;

/// Grids above this many zones are logged as unusually large.
const LARGE_GRID_ZONES: usize = 1_000_000;

/// Position of a zone: row (from the top) and column (from the left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneId {
    pub row: usize,
    pub col: usize,
}

impl ZoneId {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Zones containing one location. Four in the common case.
pub type ZoneMembership = SmallVec<[ZoneId; 4]>;

/// A square zone and the indices of the points it contains.
#[derive(Debug, Clone)]
pub struct Zone {
    bounds: ZoneBounds,
    points: Vec<usize>,
    residents: usize,
}

impl Zone {
    fn new(bounds: ZoneBounds) -> Self {
        Self {
            bounds,
            points: Vec::new(),
            residents: 0,
        }
    }

    pub fn bounds(&self) -> &ZoneBounds {
        &self.bounds
    }

    /// Indices into the point set, in distribution order.
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of member points whose home is this zone.
    pub fn residents(&self) -> usize {
        self.residents
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        self.bounds.contains(point)
    }
}

/// One band of latitude and its zones, ordered by ascending longitude.
#[derive(Debug, Clone)]
pub struct ZoneRow {
    bottom_lat: f64,
    top_lat: f64,
    zones: Vec<Zone>,
}

impl ZoneRow {
    pub fn bottom_lat(&self) -> f64 {
        self.bottom_lat
    }

    pub fn top_lat(&self) -> f64 {
        self.top_lat
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }
}

/// The zone grid: rows by descending latitude, each owning its zones.
#[derive(Debug, Clone)]
pub struct ZoneGrid {
    rows: Vec<ZoneRow>,
    cols: usize,
    top: f64,
    left: f64,
    lat_step: f64,
    long_step: f64,
    extent: ZoneBounds,
    home: Vec<ZoneId>,
}

impl ZoneGrid {
    /// Build the grid covering `bounds` for the given thresholds.
    ///
    /// A bounding box collapsed to one location yields a single zone centred
    /// on it.
    ///
    /// # Errors
    ///
    /// `GridTooLarge` when the grid would hold more than `max_zones` zones.
    pub fn build(
        bounds: &ZoneBounds,
        thresholds: &DegreeThresholds,
        max_zones: usize,
    ) -> Result<Self> {
        let lat_side = thresholds.zone_lat_side();
        let long_side = thresholds.zone_long_side();
        let lat_step = thresholds.zone_lat_step();
        let long_step = thresholds.zone_long_step();

        let (extent, rows, cols) = if bounds.is_degenerate() {
            let center = bounds.center();
            log::debug!(
                "Degenerate bounding box at ({}, {}), using a single zone",
                center.y(),
                center.x()
            );
            let extent = ZoneBounds::new(center.y(), center.y(), center.x(), center.x())
                .expand(lat_side / 2.0, long_side / 2.0);
            (extent, 1, 1)
        } else {
            let extent = bounds.expand(lat_side, long_side);
            let rows = steps_to_cover(extent.lat_span(), lat_step, max_zones)?;
            let cols = steps_to_cover(extent.long_span(), long_step, max_zones)?;
            (extent, rows, cols)
        };

        let zones = rows
            .checked_mul(cols)
            .filter(|&zones| zones <= max_zones)
            .ok_or(CanopyError::GridTooLarge {
                zones: rows.saturating_mul(cols),
                limit: max_zones,
            })?;

        if zones > LARGE_GRID_ZONES {
            log::warn!(
                "Zone grid of {} x {} = {} zones is very large and may consume significant memory",
                rows,
                cols,
                zones
            );
        }

        let top = extent.top_lat();
        let left = extent.left_long();

        let rows: Vec<ZoneRow> = (0..rows)
            .map(|i| {
                let top_lat = top - i as f64 * lat_step;
                let bottom_lat = top_lat - lat_side;
                let zones = (0..cols)
                    .map(|j| {
                        let left_long = left + j as f64 * long_step;
                        Zone::new(ZoneBounds::new(
                            bottom_lat,
                            top_lat,
                            left_long,
                            left_long + long_side,
                        ))
                    })
                    .collect();
                ZoneRow {
                    bottom_lat,
                    top_lat,
                    zones,
                }
            })
            .collect();

        log::debug!(
            "Built zone grid: {} rows x {} columns, zone side {:.8}° lat / {:.8}° long",
            rows.len(),
            cols,
            lat_side,
            long_side
        );

        Ok(Self {
            rows,
            cols,
            top,
            left,
            lat_step,
            long_step,
            extent,
            home: Vec::new(),
        })
    }

    /// Assign every point to every zone containing it and record its home
    /// zone. Returns the total number of zone memberships.
    ///
    /// Any previous distribution is discarded.
    pub fn distribute(&mut self, points: &PointSet) -> usize {
        for row in &mut self.rows {
            for zone in &mut row.zones {
                zone.points.clear();
                zone.residents = 0;
            }
        }
        self.home.clear();
        self.home.reserve(points.len());

        let mut memberships = 0;
        for (idx, tree) in points.iter().enumerate() {
            let containing = self.containing_zones(&tree.point);
            for id in &containing {
                self.rows[id.row].zones[id.col].points.push(idx);
            }
            memberships += containing.len();

            let home = match nearest_centre(&containing, self.offsets(&tree.point)) {
                Some(home) => home,
                None => {
                    // Outside the extent: adopt the nearest edge zone.
                    log::warn!("Point {} lies outside the zone grid", tree.id);
                    let home = self.clamped_zone(&tree.point);
                    self.rows[home.row].zones[home.col].points.push(idx);
                    memberships += 1;
                    home
                }
            };
            self.rows[home.row].zones[home.col].residents += 1;
            self.home.push(home);
        }

        log::debug!(
            "Distributed {} points into {} zone memberships",
            points.len(),
            memberships
        );
        memberships
    }

    /// Every zone whose bounds contain `point`.
    pub fn containing_zones(&self, point: &Point<f64>) -> ZoneMembership {
        let (row, col) = self.offsets(point);
        let rows = candidate_span(row, self.rows.len());
        let cols = candidate_span(col, self.cols);

        let mut found = ZoneMembership::new();
        for row in rows {
            if !self.rows[row].contains_lat(point.y()) {
                continue;
            }
            for col in cols.clone() {
                if self.rows[row].zones[col].bounds.contains_long(point.x()) {
                    found.push(ZoneId::new(row, col));
                }
            }
        }
        found
    }

    /// The containing zone whose centre is nearest to `point`, or `None`
    /// when the point lies outside the grid. Ties go to the first zone in
    /// row-major order.
    pub fn home_zone(&self, point: &Point<f64>) -> Option<ZoneId> {
        nearest_centre(&self.containing_zones(point), self.offsets(point))
    }

    /// Fractional row and column offset of `point`, in steps from the
    /// grid origin.
    fn offsets(&self, point: &Point<f64>) -> (f64, f64) {
        (
            (self.top - point.y()) / self.lat_step,
            (point.x() - self.left) / self.long_step,
        )
    }

    fn clamped_zone(&self, point: &Point<f64>) -> ZoneId {
        let (row, col) = self.offsets(point);
        // Zone `i` is centred one step below/right of its origin.
        ZoneId::new(
            nearest_index(row - 1.0, self.rows.len()),
            nearest_index(col - 1.0, self.cols),
        )
    }

    /// Home zone of the point at `index`, once distributed.
    pub fn home_of(&self, index: usize) -> Option<ZoneId> {
        self.home.get(index).copied()
    }

    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.rows.get(id.row).and_then(|row| row.zones.get(id.col))
    }

    pub fn rows(&self) -> &[ZoneRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn zone_count(&self) -> usize {
        self.rows.len() * self.cols
    }

    /// Area covered by the grid.
    pub fn extent(&self) -> &ZoneBounds {
        &self.extent
    }

    /// All zones in row-major order.
    pub fn zones(&self) -> impl Iterator<Item = (ZoneId, &Zone)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.zones
                .iter()
                .enumerate()
                .map(move |(c, zone)| (ZoneId::new(r, c), zone))
        })
    }
}

impl ZoneRow {
    #[inline]
    fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.bottom_lat && lat <= self.top_lat
    }
}

/// Number of zones stepping `step` apart needed to reach across `span`.
fn steps_to_cover(span: f64, step: f64, max_zones: usize) -> Result<usize> {
    let count = (span / step).ceil();
    if !count.is_finite() || count > max_zones as f64 {
        return Err(CanopyError::GridTooLarge {
            zones: if count.is_finite() {
                count as usize
            } else {
                usize::MAX
            },
            limit: max_zones,
        });
    }
    Ok((count as usize).max(1))
}

/// Indices of zones that may contain a location at fractional offset
/// `offset` (in steps from the grid origin). Zone `i` spans offsets
/// `[i, i + 2]`; one extra index on each side absorbs rounding.
fn candidate_span(offset: f64, len: usize) -> std::ops::RangeInclusive<usize> {
    let last = len.saturating_sub(1) as f64;
    let lo = (offset - 2.0).floor().clamp(0.0, last) as usize;
    let hi = offset.ceil().clamp(0.0, last) as usize;
    lo..=hi
}

/// Zone among `zones` whose centre, at offset `(row + 1, col + 1)`, is
/// nearest to the location at `offsets`.
fn nearest_centre(zones: &[ZoneId], (row, col): (f64, f64)) -> Option<ZoneId> {
    let distance = |id: &ZoneId| {
        let dr = row - (id.row as f64 + 1.0);
        let dc = col - (id.col as f64 + 1.0);
        dr * dr + dc * dc
    };
    zones
        .iter()
        .copied()
        .reduce(|best, id| if distance(&id) < distance(&best) { id } else { best })
}

fn nearest_index(offset: f64, len: usize) -> usize {
    offset.round().clamp(0.0, len.saturating_sub(1) as f64) as usize
}
