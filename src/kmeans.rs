use crate::math::Point3;
use crate::octree::Octree;
use rayon::prelude::*;
use std::sync::Mutex;

/// Below this cluster count a linear scan over the means is faster than
/// building an octree; above it, the octree pays for itself.
const MIN_FOR_TREE_SEARCH: usize = 50;
const MAX_NUMBER_OF_ITERATIONS: usize = 10;

fn centroid_of(indices: &[usize], points: &[Point3]) -> Point3 {
    let sum = indices.iter().fold(Point3::zero(), |acc, &i| acc + points[i]);
    sum / indices.len() as f64
}

fn closest_mean_linear(point: Point3, means: &[Point3]) -> usize {
    let mut best = 0;
    let mut best_d = (point - means[0]).length_squared();
    for (i, &m) in means.iter().enumerate().skip(1) {
        let d = (point - m).length_squared();
        if d < best_d {
            best_d = d;
            best = i;
        }
    }
    best
}

/// Assigns every item to its closest mean. Parallelized over items; each
/// worker locks only the destination cluster's own vector, so disjoint
/// clusters never contend.
fn assign(points: &[Point3], means: &[Point3]) -> Vec<Vec<usize>> {
    let groups: Vec<Mutex<Vec<usize>>> = (0..means.len()).map(|_| Mutex::new(Vec::new())).collect();

    if means.len() < MIN_FOR_TREE_SEARCH {
        (0..points.len()).into_par_iter().for_each(|i| {
            let closest = closest_mean_linear(points[i], means);
            groups[closest].lock().unwrap().push(i);
        });
    } else {
        let tree = Octree::build(means);
        (0..points.len()).into_par_iter().for_each(|i| {
            let closest = tree.nearest(points[i]).unwrap_or(0);
            groups[closest].lock().unwrap().push(i);
        });
    }

    groups.into_iter().map(|m| m.into_inner().unwrap()).collect()
}

/// Redistributes items into any empty group by pulling one item at a time
/// from the largest non-empty group, so every returned group is non-empty
/// (when there are at least as many items as groups).
fn fill_empty_clusters(mut groups: Vec<Vec<usize>>) -> Vec<Vec<usize>> {
    for ci in 0..groups.len() {
        while groups[ci].is_empty() {
            let donor = (0..groups.len())
                .filter(|&j| j != ci && groups[j].len() > 1)
                .max_by_key(|&j| groups[j].len());
            match donor {
                Some(j) => {
                    let item = groups[j].pop().unwrap();
                    groups[ci].push(item);
                }
                None => break,
            }
        }
    }
    groups
}

fn assignment_vector(groups: &[Vec<usize>], n: usize) -> Vec<usize> {
    let mut assignment = vec![usize::MAX; n];
    for (ci, group) in groups.iter().enumerate() {
        for &i in group {
            assignment[i] = ci;
        }
    }
    assignment
}

/// Partitions `points` into up to `k` non-empty groups minimizing Lloyd
/// total variance, via iterated k-means. Returns the groups as lists of
/// indices into `points`; ordering within a group is not meaningful.
pub fn k_means(points: &[Point3], k: usize) -> Vec<Vec<usize>> {
    let n = points.len();
    if n == 0 {
        return Vec::new();
    }
    let k = k.clamp(1, n);
    let stride = (n / k).max(1);
    let mut means: Vec<Point3> = (0..k).map(|i| points[(i * stride).min(n - 1)]).collect();

    let mut prev_assignment: Option<Vec<usize>> = None;
    let mut groups = Vec::new();

    for _ in 0..MAX_NUMBER_OF_ITERATIONS {
        let raw = assign(points, &means);
        let assignment = assignment_vector(&raw, n);
        groups = fill_empty_clusters(raw);

        for (ci, group) in groups.iter().enumerate() {
            if !group.is_empty() {
                means[ci] = centroid_of(group, points);
            }
        }

        let converged = prev_assignment.as_ref() == Some(&assignment);
        prev_assignment = Some(assignment);
        if converged {
            break;
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    #[test]
    fn produces_k_non_empty_groups_when_enough_points() {
        let points: Vec<Point3> = (0..100)
            .map(|i| {
                let cluster = i / 25;
                let base = Vec3::new(cluster as f64 * 10.0, 0.0, 0.0);
                base + Vec3::new((i % 25) as f64 * 0.1, 0.0, 0.0)
            })
            .collect();
        let groups = k_means(&points, 4);
        assert_eq!(groups.len(), 4);
        assert!(groups.iter().all(|g| !g.is_empty()));
        let total: usize = groups.iter().map(|g| g.len()).sum();
        assert_eq!(total, points.len());
    }

    #[test]
    fn handles_k_larger_than_points() {
        let points = vec![Point3::zero(), Point3::new(1.0, 0.0, 0.0)];
        let groups = k_means(&points, 10);
        assert_eq!(groups.len(), 2);
    }
}
