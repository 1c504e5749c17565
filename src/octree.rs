use crate::math::{Point3, Real};

/// Points per leaf before the build stops splitting.
const MAX_ELTS_PER_LEAF: usize = 10;

struct OctreeNode {
    is_leaf: bool,
    /// Split point for internal nodes; centroid of the owned points for
    /// leaves (unused by the query but kept for `display`-style diagnostics).
    center: Point3,
    items: Vec<usize>,
}

/// A nearest-centroid index over a fixed point set. Child `c` of node `i`
/// lives at flat index `8*i + c + 1`; a point belongs to child `c` iff
/// comparing its coordinates against the node's centroid yields the 3-bit
/// pattern `c`. Used by the k-means clusterer once the number of means
/// exceeds `MIN_FOR_TREE_SEARCH`, where a linear scan gets too slow.
pub struct Octree<'a> {
    nodes: Vec<Option<OctreeNode>>,
    points: &'a [Point3],
}

fn region_of(p: Point3, center: Point3) -> usize {
    let bx = (p.x >= center.x) as usize;
    let by = (p.y >= center.y) as usize;
    let bz = (p.z >= center.z) as usize;
    bx | (by << 1) | (bz << 2)
}

/// Minimum possible squared distance from `q` to the half-open octant
/// `region` around `center` — zero if `q` already lies in that octant.
fn distance_sq_to_region(q: Point3, center: Point3, region: usize) -> Real {
    let mut d = 0.0;
    for axis in 0..3 {
        let wants_ge = (region >> axis) & 1 == 1;
        let diff = center[axis] - q[axis];
        let q_is_ge = q[axis] >= center[axis];
        if wants_ge != q_is_ge {
            d += diff * diff;
        }
    }
    d
}

fn centroid_of(indices: &[usize], points: &[Point3]) -> Point3 {
    let sum = indices.iter().fold(Point3::zero(), |acc, &i| acc + points[i]);
    sum / indices.len() as Real
}

impl<'a> Octree<'a> {
    pub fn build(points: &'a [Point3]) -> Self {
        let mut nodes = Vec::new();
        if !points.is_empty() {
            let all: Vec<usize> = (0..points.len()).collect();
            Self::build_node(0, all, points, &mut nodes);
        }
        Self { nodes, points }
    }

    fn build_node(index: usize, items: Vec<usize>, points: &[Point3], nodes: &mut Vec<Option<OctreeNode>>) {
        if nodes.len() <= index {
            nodes.resize_with(index + 1, || None);
        }
        if items.len() <= MAX_ELTS_PER_LEAF {
            let center = centroid_of(&items, points);
            nodes[index] = Some(OctreeNode {
                is_leaf: true,
                center,
                items,
            });
            return;
        }
        let center = centroid_of(&items, points);
        nodes[index] = Some(OctreeNode {
            is_leaf: false,
            center,
            items: Vec::new(),
        });
        let mut buckets: [Vec<usize>; 8] = Default::default();
        for i in items {
            buckets[region_of(points[i], center)].push(i);
        }
        for (region, bucket) in buckets.into_iter().enumerate() {
            if !bucket.is_empty() {
                Self::build_node(8 * index + region + 1, bucket, points, nodes);
            }
        }
    }

    /// Returns the index (into the original `points` slice) of the point
    /// nearest `query`. Always returns `Some` when the tree is non-empty —
    /// a `None` here with a non-empty point set would be the "traversal
    /// inconsistency" failure mode the error taxonomy treats as a
    /// programming error, never surfaced to callers.
    pub fn nearest(&self, query: Point3) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best: Option<(usize, Real)> = None;
        self.search(0, query, &mut best);
        best.map(|(i, _)| i)
    }

    fn search(&self, index: usize, query: Point3, best: &mut Option<(usize, Real)>) {
        let node = match self.nodes.get(index).and_then(|n| n.as_ref()) {
            Some(n) => n,
            None => return,
        };
        if node.is_leaf {
            for &i in &node.items {
                let d = (self.points[i] - query).length_squared();
                if best.map_or(true, |(_, bd)| d < bd) {
                    *best = Some((i, d));
                }
            }
            return;
        }
        let mut regions: Vec<usize> = (0..8).collect();
        regions.sort_by(|&a, &b| {
            distance_sq_to_region(query, node.center, a)
                .partial_cmp(&distance_sq_to_region(query, node.center, b))
                .unwrap()
        });
        for region in regions {
            let bound = distance_sq_to_region(query, node.center, region);
            if let Some((_, bd)) = *best {
                if bound > bd {
                    continue;
                }
            }
            let child = 8 * index + region + 1;
            if child < self.nodes.len() {
                self.search(child, query, best);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn nearest_matches_linear_search() {
        let points: Vec<Point3> = (0..200)
            .map(|i| {
                let f = i as Real;
                Vec3::new((f * 1.37).sin() * 10.0, (f * 2.11).cos() * 10.0, f % 7.0)
            })
            .collect();
        let tree = Octree::build(&points);
        let queries = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(5.0, -3.0, 2.0),
            Point3::new(-8.0, 8.0, 6.0),
        ];
        for q in queries {
            let linear = points
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    (**a - q)
                        .length_squared()
                        .partial_cmp(&(**b - q).length_squared())
                        .unwrap()
                })
                .map(|(i, _)| i)
                .unwrap();
            let tree_idx = tree.nearest(q).unwrap();
            let d_linear = (points[linear] - q).length_squared();
            let d_tree = (points[tree_idx] - q).length_squared();
            assert!((d_linear - d_tree).abs() < 1e-9);
        }
    }

    #[test]
    fn empty_tree_returns_none() {
        let points: Vec<Point3> = Vec::new();
        let tree = Octree::build(&points);
        assert!(tree.nearest(Point3::zero()).is_none());
    }
}
