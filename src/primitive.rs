use crate::hit::{BarycentricInfo, Hit};
use crate::math::{Point3, Ray, Real, Vec3};

const EPS: Real = 1e-6;

/// Tagged union over the six supported surface types. A `match` in the hot
/// intersection loop replaces the virtual dispatch the original source uses,
/// letting the compiler inline each variant's closed-form solver.
pub enum Primitive {
    Sphere {
        center: Point3,
        radius: Real,
        material: usize,
        texture_info: Option<usize>,
    },
    Plane {
        point: Point3,
        normal: Vec3,
        material: usize,
        texture_info: Option<usize>,
    },
    Box {
        center: Point3,
        axes: [Vec3; 3],
        half_extents: [Real; 3],
        material: usize,
        texture_info: Option<usize>,
    },
    Cylinder {
        base: Point3,
        axis: Vec3,
        radius: Real,
        length: Real,
        material: usize,
        texture_info: Option<usize>,
    },
    Triangle {
        v0: Point3,
        v1: Point3,
        v2: Point3,
        normal: Vec3,
        vertex_normals: Option<[Vec3; 3]>,
        material: usize,
        texture_info: Option<usize>,
    },
    Quad {
        origin: Point3,
        edge_u: Vec3,
        edge_v: Vec3,
        normal: Vec3,
        vertex_normals: Option<[Vec3; 4]>,
        material: usize,
        texture_info: Option<usize>,
    },
}

/// Whether to use vertex-normal interpolation for polygons when available.
/// A compile-time policy in the original source; kept as a constant here so
/// the choice is visible without threading a flag through every call site.
pub const SMOOTH_SHADING: bool = true;

fn project_barycentric(point: Point3, v0: Point3, v1: Point3, v2: Point3, normal: Vec3) -> Option<(Real, Real)> {
    let (ia, ib) = {
        let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
        if ax >= ay && ax >= az {
            (1usize, 2usize)
        } else if ay >= az {
            (0usize, 2usize)
        } else {
            (0usize, 1usize)
        }
    };
    let (x0, y0) = (v0[ia], v0[ib]);
    let (x1, y1) = (v1[ia], v1[ib]);
    let (x2, y2) = (v2[ia], v2[ib]);
    let (xp, yp) = (point[ia], point[ib]);
    let denom = (y1 - y2) * (x0 - x2) + (x2 - x1) * (y0 - y2);
    if denom.abs() < 1e-12 {
        return None;
    }
    let l1 = ((y1 - y2) * (xp - x2) + (x2 - x1) * (yp - y2)) / denom;
    let l2 = ((y2 - y0) * (xp - x2) + (x0 - x2) * (yp - y2)) / denom;
    let l0 = 1.0 - l1 - l2;
    if l0 < -1e-6 || l1 < -1e-6 || l2 < -1e-6 {
        None
    } else {
        Some((l1, l2))
    }
}

impl Primitive {
    pub fn material(&self) -> usize {
        match self {
            Primitive::Sphere { material, .. }
            | Primitive::Plane { material, .. }
            | Primitive::Box { material, .. }
            | Primitive::Cylinder { material, .. }
            | Primitive::Triangle { material, .. }
            | Primitive::Quad { material, .. } => *material,
        }
    }

    pub fn texture_info(&self) -> Option<usize> {
        match self {
            Primitive::Sphere { texture_info, .. }
            | Primitive::Plane { texture_info, .. }
            | Primitive::Box { texture_info, .. }
            | Primitive::Cylinder { texture_info, .. }
            | Primitive::Triangle { texture_info, .. }
            | Primitive::Quad { texture_info, .. } => *texture_info,
        }
    }

    /// Smallest positive parametric distance at which `ray` meets the
    /// surface, or `None`. Degenerate configurations (near-zero
    /// denominators/determinants) report a miss rather than a spurious `t`.
    pub fn measure_distance(&self, ray: &Ray) -> Option<Real> {
        match self {
            Primitive::Sphere { center, radius, .. } => {
                let v = *center - ray.origin;
                let b = ray.direction().dot(v);
                let delta = b * b + radius * radius - v.length_squared();
                if delta < 0.0 {
                    return None;
                }
                let sqrt_delta = delta.sqrt();
                let t1 = b - sqrt_delta;
                if t1 > EPS {
                    return Some(t1);
                }
                let t2 = b + sqrt_delta;
                if t2 > EPS {
                    Some(t2)
                } else {
                    None
                }
            }
            Primitive::Plane { point, normal, .. } => {
                let denom = ray.direction().dot(*normal);
                if denom.abs() < EPS {
                    return None;
                }
                let t = (*point - ray.origin).dot(*normal) / denom;
                if t > EPS {
                    Some(t)
                } else {
                    None
                }
            }
            Primitive::Box {
                center,
                axes,
                half_extents,
                ..
            } => {
                let rel = ray.origin - *center;
                let inside = (0..3).all(|i| rel.dot(axes[i]).abs() <= half_extents[i] + EPS);
                let a = if inside { 1.0 } else { -1.0 };
                let mut best: Option<Real> = None;
                for i in 0..3 {
                    let denom = ray.direction().dot(axes[i]);
                    if denom.abs() < EPS {
                        continue;
                    }
                    let t = -rel.dot(axes[i]) / denom + a * half_extents[i] / denom.abs();
                    if t <= EPS {
                        continue;
                    }
                    let contact = ray.at(t) - *center;
                    let on_face = (0..3).all(|j| {
                        j == i || contact.dot(axes[j]).abs() <= half_extents[j] + 1e-6
                    });
                    if on_face && best.map_or(true, |bt| t < bt) {
                        best = Some(t);
                    }
                }
                best
            }
            Primitive::Cylinder {
                base,
                axis,
                radius,
                length,
                ..
            } => cylinder_measure_distance(*base, *axis, *radius, *length, ray),
            Primitive::Triangle { v0, v1, v2, normal, .. } => {
                let denom = ray.direction().dot(*normal);
                if denom.abs() < EPS {
                    return None;
                }
                let t = (*v0 - ray.origin).dot(*normal) / denom;
                if t <= EPS {
                    return None;
                }
                let p = ray.at(t);
                project_barycentric(p, *v0, *v1, *v2, *normal).map(|_| t)
            }
            Primitive::Quad {
                origin,
                edge_u,
                edge_v,
                normal,
                ..
            } => {
                let denom = ray.direction().dot(*normal);
                if denom.abs() < EPS {
                    return None;
                }
                let t = (*origin - ray.origin).dot(*normal) / denom;
                if t <= EPS {
                    return None;
                }
                let p = ray.at(t);
                let p0 = *origin;
                let p1 = *origin + *edge_u;
                let p2 = *origin + *edge_u + *edge_v;
                let p3 = *origin + *edge_v;
                if project_barycentric(p, p0, p1, p2, *normal).is_some()
                    || project_barycentric(p, p0, p3, p2, *normal).is_some()
                {
                    Some(t)
                } else {
                    None
                }
            }
        }
    }

    /// Builds the shading-ready `Hit` at the already-known distance `t`.
    pub fn compute_intersection(&self, ray: &Ray, t: Real, primitive_index: usize) -> Hit {
        match self {
            Primitive::Sphere { center, radius, .. } => {
                let point = ray.at(t);
                let outward_normal = (point - *center) / *radius;
                Hit::new(*ray, point, t, outward_normal, primitive_index, None, None)
            }
            Primitive::Plane { normal, .. } => {
                let point = ray.at(t);
                Hit::new(*ray, point, t, *normal, primitive_index, None, None)
            }
            Primitive::Box {
                center,
                axes,
                half_extents,
                ..
            } => {
                let point = ray.at(t);
                let rel = point - *center;
                let mut best_axis = 0;
                let mut best_diff = Real::INFINITY;
                for i in 0..3 {
                    let diff = (rel.dot(axes[i]).abs() - half_extents[i]).abs();
                    if diff < best_diff {
                        best_diff = diff;
                        best_axis = i;
                    }
                }
                let sign = rel.dot(axes[best_axis]).signum();
                let normal = axes[best_axis] * sign;
                Hit::new(*ray, point, t, normal, primitive_index, None, None)
            }
            Primitive::Cylinder {
                base,
                axis,
                length,
                ..
            } => {
                let point = ray.at(t);
                let s = (point - *base).dot(*axis);
                let outward_normal = if s <= EPS {
                    -*axis
                } else if s >= *length - EPS {
                    *axis
                } else {
                    let radial = (point - *base) - *axis * s;
                    radial.normalized()
                };
                Hit::new(*ray, point, t, outward_normal, primitive_index, None, None)
            }
            Primitive::Triangle {
                v0,
                v1,
                v2,
                normal,
                vertex_normals,
                ..
            } => {
                let point = ray.at(t);
                let (l1, l2) = project_barycentric(point, *v0, *v1, *v2, *normal).unwrap_or((0.0, 0.0));
                let bary = BarycentricInfo {
                    l1,
                    l2,
                    lower_triangle: true,
                };
                let shading_normal = if SMOOTH_SHADING {
                    if let Some(vn) = vertex_normals {
                        let l0 = 1.0 - l1 - l2;
                        (vn[0] * l0 + vn[1] * l1 + vn[2] * l2).normalized()
                    } else {
                        *normal
                    }
                } else {
                    *normal
                };
                Hit::new(
                    *ray,
                    point,
                    t,
                    shading_normal,
                    primitive_index,
                    Some(*normal),
                    Some(bary),
                )
            }
            Primitive::Quad {
                origin,
                edge_u,
                edge_v,
                normal,
                vertex_normals,
                ..
            } => {
                let point = ray.at(t);
                let p0 = *origin;
                let p1 = *origin + *edge_u;
                let p2 = *origin + *edge_u + *edge_v;
                let p3 = *origin + *edge_v;
                let (bary, lower) = match project_barycentric(point, p0, p1, p2, *normal) {
                    Some((l1, l2)) => (BarycentricInfo { l1, l2, lower_triangle: true }, true),
                    None => {
                        let (l1, l2) =
                            project_barycentric(point, p0, p3, p2, *normal).unwrap_or((0.0, 0.0));
                        (BarycentricInfo { l1, l2, lower_triangle: false }, false)
                    }
                };
                let shading_normal = if SMOOTH_SHADING {
                    if let Some(vn) = vertex_normals {
                        let l0 = 1.0 - bary.l1 - bary.l2;
                        let (n0, n1, n2) = if lower {
                            (vn[0], vn[1], vn[2])
                        } else {
                            (vn[0], vn[3], vn[2])
                        };
                        (n0 * l0 + n1 * bary.l1 + n2 * bary.l2).normalized()
                    } else {
                        *normal
                    }
                } else {
                    *normal
                };
                Hit::new(
                    *ray,
                    point,
                    t,
                    shading_normal,
                    primitive_index,
                    Some(*normal),
                    Some(bary),
                )
            }
        }
    }

    /// Conservative world-space min/max used only by the hierarchy builder.
    pub fn axis_aligned_bounds(&self) -> (Point3, Point3) {
        match self {
            Primitive::Sphere { center, radius, .. } => {
                let r = Vec3::new(radius.abs(), radius.abs(), radius.abs());
                (*center - r, *center + r)
            }
            Primitive::Plane { point, .. } => {
                let big = 1e4;
                let _ = point;
                (
                    Point3::new(-big, -big, -big),
                    Point3::new(big, big, big),
                )
            }
            Primitive::Box {
                center,
                axes,
                half_extents,
                ..
            } => {
                // Conservative bound: center +/- the sum of |axis * extent| per component.
                let ext = Vec3::new(
                    (axes[0].x * half_extents[0]).abs()
                        + (axes[1].x * half_extents[1]).abs()
                        + (axes[2].x * half_extents[2]).abs(),
                    (axes[0].y * half_extents[0]).abs()
                        + (axes[1].y * half_extents[1]).abs()
                        + (axes[2].y * half_extents[2]).abs(),
                    (axes[0].z * half_extents[0]).abs()
                        + (axes[1].z * half_extents[1]).abs()
                        + (axes[2].z * half_extents[2]).abs(),
                );
                (*center - ext, *center + ext)
            }
            Primitive::Cylinder {
                base,
                axis,
                radius,
                length,
                ..
            } => {
                let top = *base + *axis * *length;
                let r = Vec3::new(*radius, *radius, *radius);
                let min = Point3::new(
                    base.x.min(top.x) - r.x,
                    base.y.min(top.y) - r.y,
                    base.z.min(top.z) - r.z,
                );
                let max = Point3::new(
                    base.x.max(top.x) + r.x,
                    base.y.max(top.y) + r.y,
                    base.z.max(top.z) + r.z,
                );
                (min, max)
            }
            Primitive::Triangle { v0, v1, v2, .. } => {
                let eps = 1e-4;
                let min = Point3::new(
                    v0.x.min(v1.x).min(v2.x) - eps,
                    v0.y.min(v1.y).min(v2.y) - eps,
                    v0.z.min(v1.z).min(v2.z) - eps,
                );
                let max = Point3::new(
                    v0.x.max(v1.x).max(v2.x) + eps,
                    v0.y.max(v1.y).max(v2.y) + eps,
                    v0.z.max(v1.z).max(v2.z) + eps,
                );
                (min, max)
            }
            Primitive::Quad {
                origin,
                edge_u,
                edge_v,
                ..
            } => {
                let corners = [
                    *origin,
                    *origin + *edge_u,
                    *origin + *edge_u + *edge_v,
                    *origin + *edge_v,
                ];
                let eps = 1e-4;
                let mut min = corners[0];
                let mut max = corners[0];
                for c in &corners[1..] {
                    min = Point3::new(min.x.min(c.x), min.y.min(c.y), min.z.min(c.z));
                    max = Point3::new(max.x.max(c.x), max.y.max(c.y), max.z.max(c.z));
                }
                (
                    min - Vec3::new(eps, eps, eps),
                    max + Vec3::new(eps, eps, eps),
                )
            }
        }
    }

    pub fn centroid(&self) -> Point3 {
        let (min, max) = self.axis_aligned_bounds();
        (min + max) * 0.5
    }
}

fn cylinder_measure_distance(
    base: Point3,
    axis: Vec3,
    radius: Real,
    length: Real,
    ray: &Ray,
) -> Option<Real> {
    let oc = ray.origin - base;
    let dir = ray.direction();
    let d_along = dir.dot(axis);
    let oc_along = oc.dot(axis);
    let d_perp = dir - axis * d_along;
    let oc_perp = oc - axis * oc_along;

    let mut best: Option<Real> = None;
    let mut consider = |t: Real, best: &mut Option<Real>| {
        if t > EPS && best.map_or(true, |bt| t < bt) {
            *best = Some(t);
        }
    };

    // Side surface: quadratic in the axis-orthogonal projection.
    let a = d_perp.length_squared();
    if a > 1e-10 {
        let b = d_perp.dot(oc_perp);
        let c = oc_perp.length_squared() - radius * radius;
        let disc = b * b - a * c;
        if disc >= 0.0 {
            let sqrt_disc = disc.sqrt();
            for t in [(-b - sqrt_disc) / a, (-b + sqrt_disc) / a] {
                if t > EPS {
                    let s = oc_along + t * d_along;
                    if s >= 0.0 && s <= length {
                        consider(t, &mut best);
                    }
                }
            }
        }
    }

    // End caps.
    if d_along.abs() > EPS {
        for cap_s in [0.0, length] {
            let t = (cap_s - oc_along) / d_along;
            if t > EPS {
                let p_perp = oc_perp + d_perp * t;
                if p_perp.length_squared() <= radius * radius {
                    consider(t, &mut best);
                }
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere() -> Primitive {
        Primitive::Sphere {
            center: Point3::zero(),
            radius: 1.0,
            material: 0,
            texture_info: None,
        }
    }

    #[test]
    fn sphere_hit_from_outside() {
        let s = sphere();
        let ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vec3::unit_z());
        let t = s.measure_distance(&ray).expect("should hit");
        assert!((t - 4.0).abs() < 1e-6);
        let hit = s.compute_intersection(&ray, t, 0);
        assert!((hit.point - Point3::new(0.0, 0.0, -1.0)).length() < 1e-6);
        assert!(hit.inward);
    }

    #[test]
    fn sphere_miss() {
        let s = sphere();
        let ray = Ray::new(Point3::new(5.0, 5.0, -5.0), Vec3::unit_z());
        assert!(s.measure_distance(&ray).is_none());
    }

    #[test]
    fn plane_intersection_exactness() {
        let p = Primitive::Plane {
            point: Point3::zero(),
            normal: Vec3::unit_y(),
            material: 0,
            texture_info: None,
        };
        let ray = Ray::new(Point3::new(0.0, 5.0, 0.0), -Vec3::unit_y());
        let t = p.measure_distance(&ray).unwrap();
        assert!((t - 5.0).abs() < 1e-9);
    }

    #[test]
    fn triangle_barycentric_inside() {
        let tri = Primitive::Triangle {
            v0: Point3::new(-1.0, -1.0, 0.0),
            v1: Point3::new(1.0, -1.0, 0.0),
            v2: Point3::new(0.0, 1.0, 0.0),
            normal: Vec3::unit_z(),
            vertex_normals: None,
            material: 0,
            texture_info: None,
        };
        let ray = Ray::new(Point3::new(0.0, -0.3, -5.0), Vec3::unit_z());
        assert!(tri.measure_distance(&ray).is_some());
        let ray_outside = Ray::new(Point3::new(5.0, 5.0, -5.0), Vec3::unit_z());
        assert!(tri.measure_distance(&ray_outside).is_none());
    }

    #[test]
    fn quad_lower_and_upper_triangle() {
        let quad = Primitive::Quad {
            origin: Point3::new(-1.0, -1.0, 0.0),
            edge_u: Vec3::new(2.0, 0.0, 0.0),
            edge_v: Vec3::new(0.0, 2.0, 0.0),
            normal: Vec3::unit_z(),
            vertex_normals: None,
            material: 0,
            texture_info: None,
        };
        // near P0-P1-P2 triangle
        let ray1 = Ray::new(Point3::new(0.5, -0.5, -5.0), Vec3::unit_z());
        assert!(quad.measure_distance(&ray1).is_some());
        // near P0-P3-P2 triangle
        let ray2 = Ray::new(Point3::new(-0.5, 0.5, -5.0), Vec3::unit_z());
        assert!(quad.measure_distance(&ray2).is_some());
    }

    #[test]
    fn cylinder_side_and_cap() {
        let cyl = Primitive::Cylinder {
            base: Point3::zero(),
            axis: Vec3::unit_y(),
            radius: 1.0,
            length: 2.0,
            material: 0,
            texture_info: None,
        };
        let side_ray = Ray::new(Point3::new(-5.0, 1.0, 0.0), Vec3::unit_x());
        assert!(cyl.measure_distance(&side_ray).is_some());
        let cap_ray = Ray::new(Point3::new(0.0, 5.0, 0.0), -Vec3::unit_y());
        assert!(cyl.measure_distance(&cap_ray).is_some());
    }

    #[test]
    fn box_face_hit_and_normal() {
        let b = Primitive::Box {
            center: Point3::zero(),
            axes: [Vec3::unit_x(), Vec3::unit_y(), Vec3::unit_z()],
            half_extents: [1.0, 1.0, 1.0],
            material: 0,
            texture_info: None,
        };
        let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vec3::unit_x());
        let t = b.measure_distance(&ray).unwrap();
        assert!((t - 4.0).abs() < 1e-6);
        let hit = b.compute_intersection(&ray, t, 0);
        assert!((hit.normal - (-Vec3::unit_x())).length() < 1e-6);
    }
}
