//! Randomised checks against independent references: an O(n²) scan and an
//! R-tree envelope query.

use canopy::compute::spatial::{DegreeThresholds, ZoneGrid};
use canopy::{
    AnalyzerBuilder, DegreeScale, EARTH_RADIUS_FT, NeighborResult, PointSet, Strategy, TreePoint,
    distance_ft, most_neighbors,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rstar::primitives::GeomWithData;
use rstar::{AABB, RTree};

type Indexed = GeomWithData<[f64; 2], usize>;

fn random_cloud(rng: &mut StdRng, n: usize, lat: f64, long: f64, span: f64) -> PointSet {
    let trees = (0..n)
        .map(|i| {
            TreePoint::new(
                format!("t{i}"),
                lat + rng.random_range(0.0..span),
                long + rng.random_range(0.0..span),
            )
        })
        .collect();
    PointSet::new(trees).unwrap()
}

/// Reference answer from per-point neighbour counts.
fn result_from_counts(points: &PointSet, counts: &[usize]) -> NeighborResult {
    let max = counts.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return NeighborResult::empty();
    }
    let winners = counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c == max)
        .map(|(i, _)| points[i].clone())
        .collect();
    NeighborResult::new(max, winners)
}

fn brute_force(points: &PointSet, radius: f64) -> NeighborResult {
    let counts: Vec<usize> = (0..points.len())
        .map(|a| {
            (0..points.len())
                .filter(|&b| b != a && distance_ft(points[a].point(), points[b].point()) < radius)
                .count()
        })
        .collect();
    result_from_counts(points, &counts)
}

fn rtree_reference(points: &PointSet, radius: f64) -> NeighborResult {
    let t = DegreeThresholds::exact(radius, EARTH_RADIUS_FT, points.max_abs_lat());
    let tree: RTree<Indexed> = RTree::bulk_load(
        points
            .iter()
            .enumerate()
            .map(|(i, p)| GeomWithData::new([p.long(), p.lat()], i))
            .collect(),
    );

    let counts: Vec<usize> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let envelope = AABB::from_corners(
                [p.long() - t.long, p.lat() - t.lat],
                [p.long() + t.long, p.lat() + t.lat],
            );
            tree.locate_in_envelope(&envelope)
                .filter(|other| {
                    other.data != i && distance_ft(p.point(), points[other.data].point()) < radius
                })
                .count()
        })
        .collect();
    result_from_counts(points, &counts)
}

fn analyze(points: &PointSet, radius: f64, strategy: Strategy) -> NeighborResult {
    AnalyzerBuilder::new()
        .radius_ft(radius)
        .strategy(strategy)
        .degree_scale(DegreeScale::LatitudeCorrected)
        .build()
        .unwrap()
        .analyze(points)
        .unwrap()
}

#[test]
fn test_strategies_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(2016);

    for round in 0..12 {
        let n = rng.random_range(1..250);
        let radius = rng.random_range(20.0..400.0);
        let points = random_cloud(&mut rng, n, 40.5, -74.2, 0.01);

        let expected = brute_force(&points, radius);
        let sliding = analyze(&points, radius, Strategy::SlidingWindow);
        let grid = analyze(&points, radius, Strategy::ZoneGrid);

        assert_eq!(sliding, expected, "sliding window, round {round}");
        assert_eq!(grid, expected, "zone grid, round {round}");
    }
}

#[test]
fn test_grid_matches_rtree_on_dense_cloud() {
    let mut rng = StdRng::seed_from_u64(42);
    let points = random_cloud(&mut rng, 1500, 40.6, -73.9, 0.02);

    let expected = rtree_reference(&points, 150.0);
    assert!(expected.max_count > 0);
    assert_eq!(analyze(&points, 150.0, Strategy::ZoneGrid), expected);
}

#[test]
fn test_default_config_matches_brute_force_at_new_york() {
    let mut rng = StdRng::seed_from_u64(407);

    for round in 0..8 {
        let radius = rng.random_range(50.0..500.0);
        let points = random_cloud(&mut rng, 300, 40.7, -74.0, 0.01);
        let expected = brute_force(&points, radius);

        for strategy in [Strategy::SlidingWindow, Strategy::ZoneGrid] {
            let result = AnalyzerBuilder::new()
                .radius_ft(radius)
                .strategy(strategy)
                .build()
                .unwrap()
                .analyze(&points)
                .unwrap();
            assert_eq!(result, expected, "{strategy:?}, round {round}");
        }
        assert_eq!(most_neighbors(&points, radius).unwrap(), expected);
    }
}

#[test]
fn test_fixed_scale_is_exact_near_equator() {
    let mut rng = StdRng::seed_from_u64(9);

    for _ in 0..5 {
        let points = random_cloud(&mut rng, 300, -0.01, 30.0, 0.02);
        let radius = rng.random_range(50.0..300.0);
        let expected = brute_force(&points, radius);

        for strategy in [Strategy::SlidingWindow, Strategy::ZoneGrid] {
            let result = AnalyzerBuilder::new()
                .radius_ft(radius)
                .strategy(strategy)
                .degree_scale(DegreeScale::fixed())
                .build()
                .unwrap()
                .analyze(&points)
                .unwrap();
            assert_eq!(result, expected);
        }
    }
}

#[test]
fn test_grid_coverage_invariant() {
    let mut rng = StdRng::seed_from_u64(77);

    for _ in 0..6 {
        let radius = rng.random_range(30.0..300.0);
        let points = random_cloud(&mut rng, 200, 51.4, -0.2, 0.01);
        let t = DegreeThresholds::exact(radius, EARTH_RADIUS_FT, points.max_abs_lat());
        let mut grid = ZoneGrid::build(&points.bounds().unwrap(), &t, 1_000_000).unwrap();
        grid.distribute(&points);

        for a in 0..points.len() {
            for b in (a + 1)..points.len() {
                if distance_ft(points[a].point(), points[b].point()) >= radius {
                    continue;
                }
                let shared = grid.zones().any(|(_, zone)| {
                    zone.points().contains(&a) && zone.points().contains(&b)
                });
                assert!(shared, "points {a} and {b} share no zone");
            }
        }
    }
}

#[test]
fn test_distance_symmetry_and_identity() {
    let mut rng = StdRng::seed_from_u64(5);

    for _ in 0..500 {
        let a = geo::Point::new(rng.random_range(-180.0..180.0), rng.random_range(-90.0..90.0));
        let b = geo::Point::new(rng.random_range(-180.0..180.0), rng.random_range(-90.0..90.0));
        let ab = distance_ft(&a, &b);
        let ba = distance_ft(&b, &a);
        assert!((ab - ba).abs() <= 1e-9 * ab.max(1.0));
        assert_eq!(distance_ft(&a, &a), 0.0);
    }
}
