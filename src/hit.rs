use crate::math::{Point3, Ray, Real, Vec3};

/// Barycentric coordinates of a point on a triangle or quad face, along with
/// which of the quad's two constituent triangles they were measured against.
#[derive(Debug, Clone, Copy)]
pub struct BarycentricInfo {
    pub l1: Real,
    pub l2: Real,
    pub lower_triangle: bool,
}

/// The shading-ready result of a successful intersection. The normal stored
/// here is already oriented so that `inward` holds — callers never flip it.
#[derive(Debug, Clone, Copy)]
pub struct Hit {
    pub ray: Ray,
    pub point: Point3,
    pub normal: Vec3,
    pub geometric_normal: Option<Vec3>,
    pub primitive_index: usize,
    pub t: Real,
    pub inward: bool,
    pub barycentric: Option<BarycentricInfo>,
}

impl Hit {
    /// Orients `outward_normal` against the incoming ray direction and
    /// derives `inward = (ray.direction · normal) <= 0`.
    pub fn new(
        ray: Ray,
        point: Point3,
        t: Real,
        outward_normal: Vec3,
        primitive_index: usize,
        geometric_normal: Option<Vec3>,
        barycentric: Option<BarycentricInfo>,
    ) -> Self {
        let inward = ray.direction().dot(outward_normal) <= 0.0;
        let normal = if inward {
            outward_normal
        } else {
            -outward_normal
        };
        Self {
            ray,
            point,
            normal,
            geometric_normal,
            primitive_index,
            t,
            inward,
            barycentric,
        }
    }
}
