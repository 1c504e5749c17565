//! Cross-checks the bounding-hierarchy traversal against the brute-force
//! linear search over a large random scene: the two must always agree on
//! which primitive (and at what distance) a ray hits.

use photon_core::hierarchy::build_hierarchy;
use photon_core::math::{Point3, Ray, Vec3};
use photon_core::primitive::Primitive;
use photon_core::traversal::{find_closest_object, find_closest_object_linear};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

fn random_sphere(rng: &mut SmallRng) -> Primitive {
    Primitive::Sphere {
        center: Point3::new(
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
            rng.gen_range(-20.0..20.0),
        ),
        radius: rng.gen_range(0.2..1.0),
        material: 0,
        texture_info: None,
    }
}

#[test]
fn hierarchical_traversal_matches_linear_search() {
    let mut rng = SmallRng::seed_from_u64(42);
    let primitives: Vec<Primitive> = (0..500).map(|_| random_sphere(&mut rng)).collect();
    let root = build_hierarchy((0..primitives.len()).collect(), &primitives, 16);
    let roots = [root];

    for _ in 0..200 {
        let origin = Point3::new(
            rng.gen_range(-30.0..30.0),
            rng.gen_range(-30.0..30.0),
            rng.gen_range(-30.0..30.0),
        );
        let dir = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        );
        if dir.length_squared() < 1e-6 {
            continue;
        }
        let ray = Ray::new(origin, dir);
        let fast = find_closest_object(&roots, &primitives, &ray);
        let slow = find_closest_object_linear(&primitives, &ray);
        match (fast, slow) {
            (None, None) => {}
            (Some(a), Some(b)) => assert!((a.t - b.t).abs() < 1e-5),
            other => panic!("traversal disagreement: {:?}", other.0.map(|h| h.t)),
        }
    }
}

#[test]
fn hierarchy_with_few_polygons_per_leaf_still_matches_linear() {
    let mut rng = SmallRng::seed_from_u64(99);
    let primitives: Vec<Primitive> = (0..120).map(|_| random_sphere(&mut rng)).collect();
    let root = build_hierarchy((0..primitives.len()).collect(), &primitives, 2);
    let roots = [root];

    for _ in 0..100 {
        let origin = Point3::new(rng.gen_range(-25.0..25.0), rng.gen_range(-25.0..25.0), rng.gen_range(-25.0..25.0));
        let dir = Vec3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        if dir.length_squared() < 1e-6 {
            continue;
        }
        let ray = Ray::new(origin, dir);
        let fast = find_closest_object(&roots, &primitives, &ray);
        let slow = find_closest_object_linear(&primitives, &ray);
        match (fast, slow) {
            (None, None) => {}
            (Some(a), Some(b)) => assert!((a.t - b.t).abs() < 1e-5),
            other => panic!("traversal disagreement: {:?}", other.0.map(|h| h.t)),
        }
    }
}
