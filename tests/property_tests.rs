use proptest::prelude::*;
use strokectl::direction::{Direction, direction_between, direction_from_degrees};
use strokectl::gestures::{GestureClassifier, sample_points};
use strokectl::label::GestureLabel;
use strokectl::{ClassifierConfig, Point};

// --- STRATEGIES ---

prop_compose! {
    fn arb_point()(x in -2000.0..2000.0f64, y in -2000.0..2000.0f64) -> Point {
        Point::new(x, y)
    }
}

prop_compose! {
    fn arb_path()(points in proptest::collection::vec(arb_point(), 0..200)) -> Vec<Point> {
        points
    }
}

// A random walk looks more like a real drag than scattered points.
prop_compose! {
    fn arb_walk()(
        start in arb_point(),
        steps in proptest::collection::vec((-15.0..15.0f64, -15.0..15.0f64), 1..150)
    ) -> Vec<Point> {
        let mut p = start;
        let mut out = vec![p];
        for (dx, dy) in steps {
            p = Point::new(p.x + dx, p.y + dy);
            out.push(p);
        }
        out
    }
}

proptest! {
    #[test]
    fn same_point_is_unknown(p in arb_point(), t in 1.0..=45.0f64) {
        prop_assert_eq!(direction_between(p, p, t), Direction::Unknown);
    }

    #[test]
    fn every_angle_has_exactly_one_known_bucket(deg in -179.999..=180.0f64, t in 1.0..=45.0f64) {
        let d = direction_from_degrees(deg, t);
        prop_assert!(d.is_known());
        prop_assert_eq!(d, direction_from_degrees(deg, t));
    }

    #[test]
    fn distinct_points_are_known(a in arb_point(), b in arb_point(), t in 1.0..=45.0f64) {
        prop_assume!(a != b);
        prop_assert!(direction_between(a, b, t).is_known());
    }

    #[test]
    fn sampling_is_bounded_and_keeps_endpoints(path in arb_path(), n in 2usize..80) {
        let s = sample_points(&path, n);
        prop_assert_eq!(s.len(), path.len().min(n));
        prop_assert_eq!(s.first(), path.first());
        prop_assert_eq!(s.last(), path.last());
    }

    #[test]
    fn labels_are_well_formed(path in arb_walk()) {
        let label = GestureClassifier::default().classify(&path);
        prop_assert!(!label.as_str().contains("unknown"));
        if !label.is_empty() {
            prop_assert!(label.as_str().parse::<GestureLabel>().is_ok());
            let tokens = label.as_str().split('-').count();
            prop_assert!((1..=6).contains(&tokens));
        }
    }

    #[test]
    fn classification_is_pure(path in arb_walk()) {
        let c = GestureClassifier::new(ClassifierConfig::preview());
        let before = path.clone();
        let a = c.classify(&path);
        let b = c.classify(&path);
        prop_assert_eq!(a, b);
        prop_assert_eq!(path, before);
    }

    #[test]
    fn tiny_paths_never_classify(path in proptest::collection::vec((0.0..4.0f64, 0.0..4.0f64), 0..5)) {
        // at most 4 hops of < 5.7 px each stays under the 20 px gate
        let pts: Vec<Point> = path.into_iter().map(Point::from).collect();
        prop_assert!(GestureClassifier::default().classify(&pts).is_empty());
    }
}
