use crate::math::{Point3, Ray, Real, Vec3};

/// An axis-aligned (or, for user-authored boxes, arbitrarily oriented)
/// bounding box: a center, three orthonormal axes, and the corresponding
/// half-extents. Hierarchy-internal boxes always use the world axes, which
/// lets `is_hit_by` take a fast path; the general form is kept for
/// user-authored `Primitive::Box` geometry.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub center: Point3,
    pub axes: [Vec3; 3],
    pub half_extents: [Real; 3],
}

const WORLD_AXES: [Vec3; 3] = [Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z()];

impl Bounds {
    pub fn world_axis_aligned(center: Point3, half_extents: [Real; 3]) -> Self {
        Self {
            center,
            axes: WORLD_AXES,
            half_extents,
        }
    }

    pub fn from_min_max(min: Point3, max: Point3) -> Self {
        let center = (min + max) * 0.5;
        let half_extents = [
            (max.x - min.x) * 0.5,
            (max.y - min.y) * 0.5,
            (max.z - min.z) * 0.5,
        ];
        Self::world_axis_aligned(center, half_extents)
    }

    pub fn min_max(&self) -> (Point3, Point3) {
        let mut min = self.center;
        let mut max = self.center;
        for i in 0..3 {
            let extent = self.axes[i] * self.half_extents[i];
            min = Point3::new(
                min.x.min(self.center.x - extent.x.abs()),
                min.y.min(self.center.y - extent.y.abs()),
                min.z.min(self.center.z - extent.z.abs()),
            );
            max = Point3::new(
                max.x.max(self.center.x + extent.x.abs()),
                max.y.max(self.center.y + extent.y.abs()),
                max.z.max(self.center.z + extent.z.abs()),
            );
        }
        (min, max)
    }

    fn is_world_axis_aligned(&self) -> bool {
        let eps = 1e-9;
        (self.axes[0] - WORLD_AXES[0]).length_squared() < eps
            && (self.axes[1] - WORLD_AXES[1]).length_squared() < eps
            && (self.axes[2] - WORLD_AXES[2]).length_squared() < eps
    }

    pub fn contains(&self, p: Point3) -> bool {
        let d = p - self.center;
        for i in 0..3 {
            let proj = d.dot(self.axes[i]);
            if proj.abs() > self.half_extents[i] + 1e-6 {
                return false;
            }
        }
        true
    }

    /// Union of two world-axis boxes — used while accumulating hierarchy
    /// bounds over a group of primitives or child nodes.
    pub fn union(a: &Bounds, b: &Bounds) -> Bounds {
        let (amin, amax) = a.min_max();
        let (bmin, bmax) = b.min_max();
        Bounds::from_min_max(
            Point3::new(amin.x.min(bmin.x), amin.y.min(bmin.y), amin.z.min(bmin.z)),
            Point3::new(amax.x.max(bmax.x), amax.y.max(bmax.y), amax.z.max(bmax.z)),
        )
    }

    /// Fast "does this ray hit?" predicate. World-axis boxes use the
    /// precomputed `inv_dir`/`abs_inv_dir` slab test directly; general-axis
    /// boxes project the ray into box-local coordinates first.
    pub fn is_hit_by(&self, ray: &Ray) -> bool {
        if self.contains(ray.origin) {
            return true;
        }
        if self.is_world_axis_aligned() {
            self.slab_test(ray.origin, ray.inv_dir)
        } else {
            let local_origin = Point3::new(
                (ray.origin - self.center).dot(self.axes[0]),
                (ray.origin - self.center).dot(self.axes[1]),
                (ray.origin - self.center).dot(self.axes[2]),
            );
            let dir = ray.direction();
            let local_dir = Vec3::new(
                dir.dot(self.axes[0]),
                dir.dot(self.axes[1]),
                dir.dot(self.axes[2]),
            );
            let inv = Vec3::new(1.0 / local_dir.x, 1.0 / local_dir.y, 1.0 / local_dir.z);
            self.slab_test(local_origin + self.center, inv)
        }
    }

    fn slab_test(&self, origin: Point3, inv_dir: Vec3) -> bool {
        let (min, max) = self.min_max();
        let mut t_min = 0.0_f64;
        let mut t_max = Real::INFINITY;
        for axis in 0..3 {
            let mut t0 = (min[axis] - origin[axis]) * inv_dir[axis];
            let mut t1 = (max[axis] - origin[axis]) * inv_dir[axis];
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_through_center_hits() {
        let b = Bounds::from_min_max(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vec3::unit_x());
        assert!(b.is_hit_by(&ray));
    }

    #[test]
    fn ray_missing_box() {
        let b = Bounds::from_min_max(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(-5.0, 5.0, 0.0), Vec3::unit_x());
        assert!(!b.is_hit_by(&ray));
    }

    #[test]
    fn origin_inside_box_counts_as_hit() {
        let b = Bounds::from_min_max(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::zero(), Vec3::unit_x());
        assert!(b.is_hit_by(&ray));
    }

    #[test]
    fn union_contains_both() {
        let a = Bounds::from_min_max(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let b = Bounds::from_min_max(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));
        let u = Bounds::union(&a, &b);
        assert!(u.contains(Point3::new(0.0, 0.0, 0.0)));
        assert!(u.contains(Point3::new(5.5, 5.5, 5.5)));
    }
}
