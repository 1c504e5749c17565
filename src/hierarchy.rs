use crate::bounds::Bounds;
use crate::kmeans::k_means;
use crate::math::{Point3, Ray, Real};
use crate::primitive::Primitive;

const MIN_NUMBER_OF_POLYGONS_FOR_BOX: usize = 5;
const CARDINAL_OF_BOX_GROUP: usize = 3;

/// A node in the bounding hierarchy. `Container` is a degenerate form with
/// no box, used only for primitive sets too small for a box to pay off;
/// `Terminal` owns a box and a leaf set of primitives; `Internal` owns a box
/// and child nodes.
pub enum HierarchyNode {
    Container {
        primitives: Vec<usize>,
    },
    Terminal {
        bounds: Bounds,
        primitives: Vec<usize>,
    },
    Internal {
        bounds: Bounds,
        children: Vec<HierarchyNode>,
    },
}

impl HierarchyNode {
    pub fn bounds(&self) -> Option<&Bounds> {
        match self {
            HierarchyNode::Container { .. } => None,
            HierarchyNode::Terminal { bounds, .. } => Some(bounds),
            HierarchyNode::Internal { bounds, .. } => Some(bounds),
        }
    }

    /// Shared traversal primitive: tests this node's box (if any), updates
    /// `(best_t, best_primitive)` against any primitives owned directly, and
    /// returns a continuation child to descend into next without a
    /// push/pop round-trip on the caller's stack.
    pub fn check_next<'a>(
        &'a self,
        ray: &Ray,
        primitives: &[Primitive],
        best_t: &mut Real,
        best_primitive: &mut Option<usize>,
        stack: &mut Vec<&'a HierarchyNode>,
    ) -> Option<&'a HierarchyNode> {
        match self {
            HierarchyNode::Container { primitives: refs } => {
                test_primitives(refs, primitives, ray, best_t, best_primitive);
                None
            }
            HierarchyNode::Terminal { bounds, primitives: refs } => {
                if bounds.is_hit_by(ray) {
                    test_primitives(refs, primitives, ray, best_t, best_primitive);
                }
                None
            }
            HierarchyNode::Internal { bounds, children } => {
                if !bounds.is_hit_by(ray) || children.is_empty() {
                    return None;
                }
                stack.extend(children[1..].iter());
                Some(&children[0])
            }
        }
    }
}

fn test_primitives(
    refs: &[usize],
    primitives: &[Primitive],
    ray: &Ray,
    best_t: &mut Real,
    best_primitive: &mut Option<usize>,
) {
    for &idx in refs {
        if let Some(t) = primitives[idx].measure_distance(ray) {
            if t < *best_t {
                *best_t = t;
                *best_primitive = Some(idx);
            }
        }
    }
}

/// Aggregates the world-axis bounds of a primitive group.
fn bounds_of(refs: &[usize], primitives: &[Primitive]) -> Bounds {
    let mut min = Point3::new(Real::INFINITY, Real::INFINITY, Real::INFINITY);
    let mut max = Point3::new(Real::NEG_INFINITY, Real::NEG_INFINITY, Real::NEG_INFINITY);
    for &idx in refs {
        let (lo, hi) = primitives[idx].axis_aligned_bounds();
        min = Point3::new(min.x.min(lo.x), min.y.min(lo.y), min.z.min(lo.z));
        max = Point3::new(max.x.max(hi.x), max.y.max(hi.y), max.z.max(hi.z));
    }
    Bounds::from_min_max(min, max)
}

/// Builds a single `HierarchyNode` over `indices`, targeting `polygons_per_bounding`
/// primitives per leaf. `polygons_per_bounding == 0` disables the hierarchy
/// entirely (the caller should fall back to a flat linear search instead of
/// calling this at all).
pub fn build_hierarchy(
    indices: Vec<usize>,
    primitives: &[Primitive],
    polygons_per_bounding: usize,
) -> HierarchyNode {
    let n = indices.len();
    if n < MIN_NUMBER_OF_POLYGONS_FOR_BOX {
        return HierarchyNode::Container { primitives: indices };
    }
    if n <= polygons_per_bounding {
        let bounds = bounds_of(&indices, primitives);
        return HierarchyNode::Terminal {
            bounds,
            primitives: indices,
        };
    }

    let k = 1 + n / polygons_per_bounding.max(1);
    let centroids: Vec<Point3> = indices.iter().map(|&i| primitives[i].centroid()).collect();
    let groups = k_means(&centroids, k);

    let mut terminals: Vec<HierarchyNode> = groups
        .into_iter()
        .filter(|g| !g.is_empty())
        .map(|group| {
            let refs: Vec<usize> = group.into_iter().map(|local| indices[local]).collect();
            let bounds = bounds_of(&refs, primitives);
            HierarchyNode::Terminal {
                bounds,
                primitives: refs,
            }
        })
        .collect();

    while terminals.len() > CARDINAL_OF_BOX_GROUP {
        let m = terminals.len();
        let k2 = 1 + m / CARDINAL_OF_BOX_GROUP;
        let node_centroids: Vec<Point3> = terminals
            .iter()
            .map(|t| t.bounds().expect("sub-nodes always own a box").center)
            .collect();
        let groups2 = k_means(&node_centroids, k2);

        let mut pool: Vec<Option<HierarchyNode>> = terminals.into_iter().map(Some).collect();
        terminals = groups2
            .into_iter()
            .filter(|g| !g.is_empty())
            .map(|group| {
                let children: Vec<HierarchyNode> =
                    group.into_iter().map(|i| pool[i].take().unwrap()).collect();
                let bounds = children
                    .iter()
                    .skip(1)
                    .fold(*children[0].bounds().unwrap(), |acc, c| {
                        Bounds::union(&acc, c.bounds().unwrap())
                    });
                HierarchyNode::Internal { bounds, children }
            })
            .collect();
    }

    let bounds = terminals
        .iter()
        .skip(1)
        .fold(*terminals[0].bounds().unwrap(), |acc, c| {
            Bounds::union(&acc, c.bounds().unwrap())
        });
    HierarchyNode::Internal {
        bounds,
        children: terminals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn sphere_at(x: Real) -> Primitive {
        Primitive::Sphere {
            center: Point3::new(x, 0.0, 0.0),
            radius: 0.1,
            material: 0,
            texture_info: None,
        }
    }

    #[test]
    fn tiny_set_becomes_container() {
        let primitives: Vec<Primitive> = (0..3).map(|i| sphere_at(i as Real)).collect();
        let node = build_hierarchy((0..3).collect(), &primitives, 16);
        assert!(matches!(node, HierarchyNode::Container { .. }));
    }

    #[test]
    fn bounding_soundness_on_built_tree() {
        let primitives: Vec<Primitive> = (0..200).map(|i| sphere_at(i as Real * 0.3)).collect();
        let node = build_hierarchy((0..200).collect(), &primitives, 16);
        let mut ancestors = Vec::new();
        check_bounds_contain_primitives(&node, &primitives, &mut ancestors);
    }

    #[test]
    fn bounding_soundness_holds_with_boxes_and_cylinders() {
        let primitives: Vec<Primitive> = (0..120)
            .map(|i| {
                let x = i as Real * 0.4;
                if i % 2 == 0 {
                    Primitive::Box {
                        center: Point3::new(x, 0.0, 0.0),
                        axes: [Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z()],
                        half_extents: [0.3, 0.6, 0.2],
                        material: 0,
                        texture_info: None,
                    }
                } else {
                    Primitive::Cylinder { base: Point3::new(x, -0.5, 0.0), axis: Vec3::unit_y(), radius: 0.25, length: 1.0, material: 0, texture_info: None }
                }
            })
            .collect();
        let node = build_hierarchy((0..120).collect(), &primitives, 8);
        let mut ancestors = Vec::new();
        check_bounds_contain_primitives(&node, &primitives, &mut ancestors);
    }

    /// Every sampled point of every primitive must lie within ITS OWN node's
    /// box and every ancestor box above it — not just the immediate leaf's
    /// box, since a broken `Bounds::union` could shrink an ancestor without
    /// the leaf-level check ever noticing. Samples the eight corners and
    /// center of each primitive's true AABB rather than just its own
    /// lo/hi/midpoint, so a bbox that excludes a primitive's actual corner
    /// (but happens to contain its reported lo/hi points) still fails.
    fn check_bounds_contain_primitives(node: &HierarchyNode, primitives: &[Primitive], ancestors: &mut Vec<Bounds>) {
        match node {
            HierarchyNode::Container { primitives: refs } => {
                assert!(!refs.is_empty());
                assert_all_contained(refs, primitives, ancestors);
            }
            HierarchyNode::Terminal { bounds, primitives: refs } => {
                ancestors.push(*bounds);
                assert_all_contained(refs, primitives, ancestors);
                ancestors.pop();
            }
            HierarchyNode::Internal { bounds, children } => {
                ancestors.push(*bounds);
                for c in children {
                    check_bounds_contain_primitives(c, primitives, ancestors);
                }
                ancestors.pop();
            }
        }
    }

    fn assert_all_contained(refs: &[usize], primitives: &[Primitive], ancestors: &[Bounds]) {
        for &idx in refs {
            for p in sample_points(primitives[idx].axis_aligned_bounds()) {
                for (depth, bounds) in ancestors.iter().enumerate() {
                    assert!(
                        bounds.contains(p),
                        "primitive {idx}'s point {p:?} escapes ancestor box at depth {depth}"
                    );
                }
            }
        }
    }

    fn sample_points((lo, hi): (Point3, Point3)) -> Vec<Point3> {
        let mut points = Vec::with_capacity(9);
        for &x in &[lo.x, hi.x] {
            for &y in &[lo.y, hi.y] {
                for &z in &[lo.z, hi.z] {
                    points.push(Point3::new(x, y, z));
                }
            }
        }
        points.push((lo + hi) * 0.5);
        points
    }
}
