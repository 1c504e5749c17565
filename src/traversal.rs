use crate::hierarchy::HierarchyNode;
use crate::hit::Hit;
use crate::math::{Ray, Real};
use crate::primitive::Primitive;

/// Finds the closest primitive hit by `ray` by DFS over the hierarchy
/// forest. Pushes every root, then repeatedly pops a node and follows its
/// `check_next` continuation child without a push/pop round-trip, which
/// measurably cuts traversal cost for the common single-child case.
pub fn find_closest_object(roots: &[HierarchyNode], primitives: &[Primitive], ray: &Ray) -> Option<Hit> {
    let mut best_t = Real::INFINITY;
    let mut best_primitive: Option<usize> = None;
    let mut stack: Vec<&HierarchyNode> = roots.iter().collect();

    while let Some(mut node) = stack.pop() {
        loop {
            match node.check_next(ray, primitives, &mut best_t, &mut best_primitive, &mut stack) {
                Some(cont) => node = cont,
                None => break,
            }
        }
    }

    best_primitive.map(|idx| primitives[idx].compute_intersection(ray, best_t, idx))
}

/// Brute-force fallback used when `polygons_per_bounding == 0` disables the
/// hierarchy, and as the reference implementation traversal equivalence is
/// tested against.
pub fn find_closest_object_linear(primitives: &[Primitive], ray: &Ray) -> Option<Hit> {
    let mut best_t = Real::INFINITY;
    let mut best_primitive: Option<usize> = None;
    for (idx, primitive) in primitives.iter().enumerate() {
        if let Some(t) = primitive.measure_distance(ray) {
            if t < best_t {
                best_t = t;
                best_primitive = Some(idx);
            }
        }
    }
    best_primitive.map(|idx| primitives[idx].compute_intersection(ray, best_t, idx))
}

// Hierarchy-vs-linear equivalence over a large random scene lives in
// tests/traversal.rs, where it belongs as a cross-module integration check.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point3;

    #[test]
    fn linear_search_picks_nearest_of_two_overlapping_spheres() {
        let near = Primitive::Sphere { center: Point3::new(0.0, 0.0, -2.0), radius: 1.0, material: 0, texture_info: None };
        let far = Primitive::Sphere { center: Point3::new(0.0, 0.0, -5.0), radius: 1.0, material: 0, texture_info: None };
        let primitives = vec![far, near];
        let ray = Ray::new(Point3::zero(), crate::math::Vec3::unit_z() * -1.0);
        let hit = find_closest_object_linear(&primitives, &ray).expect("should hit");
        assert_eq!(hit.primitive_index, 1);
    }

    #[test]
    fn empty_scene_never_hits() {
        let ray = Ray::new(Point3::zero(), crate::math::Vec3::unit_z() * -1.0);
        assert!(find_closest_object_linear(&[], &ray).is_none());
    }
}
