use crate::hit::Hit;
use crate::math::{Point3, Ray, Real, Vec3};
use crate::rng::uniform;
use rand::rngs::SmallRng;

const PI: Real = std::f64::consts::PI;
const TWO_PI: Real = std::f64::consts::TAU;

/// Bias applied to a new ray's origin to dodge self-intersection with the
/// surface it was just generated on.
const BIAS: Real = 1.0e-3;

/// Interpolates between the surface normal and the mirror-reflected
/// incoming direction by `reflectivity`. At `reflectivity == 1` this is a
/// pure specular reflection; at `0` it collapses to the normal itself,
/// which is what makes `specular_ray` double as the Lambert-law diffuse
/// case when called with `reflectivity == 0`.
pub fn central_reflected_direction(hit: &Hit, reflectivity: Real) -> Vec3 {
    let u = hit.ray.direction();
    let cos = -u.dot(hit.normal);
    (hit.normal * (reflectivity * (2.0 * cos - 1.0) + 1.0)) + u * reflectivity
}

/// Samples a unit direction uniformly within the cone of half-angle
/// `theta_max` around `central_dir`. Builds an orthonormal basis (x, y)
/// perpendicular to `central_dir`, picking the construction that stays
/// numerically stable when a component of `central_dir` is near zero.
pub fn random_direction(rng: &mut SmallRng, central_dir: Vec3, theta_max: Real) -> Vec3 {
    let p = uniform(rng, 1.0);
    let phi = uniform(rng, TWO_PI);

    let (a, b, c) = (central_dir.x, central_dir.y, central_dir.z);
    let (x, y) = if a != 0.0 {
        (
            Vec3::new(-b, a, 0.0).normalized(),
            Vec3::new(a * c, b * c, -(a * a + b * b)).normalized(),
        )
    } else if b != 0.0 {
        (Vec3::new(0.0, -c, b).normalized(), Vec3::unit_x())
    } else {
        (Vec3::unit_x(), Vec3::unit_y())
    };

    let cos_theta_max = theta_max.cos();
    let cos_theta = 1.0 - p * (1.0 - cos_theta_max);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    x * (phi.cos() * sin_theta) + y * (phi.sin() * sin_theta) + central_dir * cos_theta
}

/// Nudges `hit.point` along the pre-oriented normal: `outward` keeps the
/// new segment on the side the generating ray arrived from (reflection),
/// while `!outward` crosses to the far side (transmission).
pub fn biased_origin(hit: &Hit, outward: bool) -> Point3 {
    let sign = if outward { 1.0 } else { -1.0 };
    hit.point + hit.normal * (sign * BIAS)
}

/// Specular bounce mixed with a `(1 - reflectivity)`-weighted diffuse
/// lobe sampled over the full hemisphere (`theta_max = PI`). Calling this
/// with `reflectivity == 0.0` is exactly the diffuse case, since the
/// central direction collapses to the surface normal.
pub fn specular_ray(hit: &Hit, rng: &mut SmallRng, reflectivity: Real) -> Ray {
    let central = central_reflected_direction(hit, reflectivity);
    let direction = if reflectivity >= 1.0 {
        central
    } else {
        (central + random_direction(rng, central, PI) * (1.0 - reflectivity)).normalized()
    };
    Ray::biased_from(biased_origin(hit, true), direction, hit.normal, true)
}

/// Pure diffuse (Lambertian) bounce: cosine-weighted sampling around the
/// surface normal via the same cone sampler used for specular scattering.
pub fn diffuse_ray(hit: &Hit, rng: &mut SmallRng) -> Ray {
    let direction = (hit.normal + random_direction(rng, hit.normal, PI)).normalized();
    Ray::biased_from(biased_origin(hit, true), direction, hit.normal, true)
}

/// Precomputes the refraction geometry at a hit: `vx` is the refracted
/// direction's component parallel to the surface, and `sin_theta_2_sq`
/// is `sin`² of the refracted angle — `>= 1.0` signals total internal
/// reflection before a square root would go complex.
pub fn sin_refracted(hit: &Hit, current_refr_index: Real, surface_refr_index: Real) -> (Vec3, Real) {
    let dir = hit.ray.direction();
    let vx = (hit.normal * -dir.dot(hit.normal) + dir) * (current_refr_index / surface_refr_index);
    (vx, vx.length_squared())
}

/// The exact refracted direction (no scattering cone applied yet). Unlike
/// the construction this is grounded on, no `inward` branch is needed:
/// `hit.normal` already points back toward the ray's incident side, so
/// subtracting it (rather than conditionally negating a raw outward
/// normal) lands on the far side regardless of which face was hit.
pub fn refracted_direction(hit: &Hit, vx: Vec3, sin_theta_2_sq: Real) -> Vec3 {
    vx - hit.normal * (1.0 - sin_theta_2_sq).max(0.0).sqrt()
}

/// Refractive bounce: the exact refracted direction widened by a cone of
/// half-angle `refraction_scattering * PI/2`, biased through to the far
/// side of the surface.
pub fn refractive_ray(hit: &Hit, rng: &mut SmallRng, refraction_scattering: Real, vx: Vec3, sin_theta_2_sq: Real) -> Ray {
    let refracted = refracted_direction(hit, vx, sin_theta_2_sq);
    let direction = random_direction(rng, refracted, refraction_scattering * (PI / 2.0));
    Ray::biased_from(biased_origin(hit, false), direction, hit.normal, false)
}

/// Schlick's approximation of the Fresnel reflectance `Kr` at normal
/// incidence ratio `refr_1 -> refr_2`, given `cos_theta_1 = |dir . normal|`.
pub fn schlick(cos_theta_1: Real, refr_1: Real, refr_2: Real) -> Real {
    let ratio = (refr_1 - refr_2) / (refr_1 + refr_2);
    let r0 = ratio * ratio;
    r0 + (1.0 - r0) * (1.0 - cos_theta_1).powi(5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn flat_hit(incoming: Vec3, normal: Vec3) -> Hit {
        let ray = Ray::new(Point3::zero() - incoming, incoming);
        Hit::new(ray, Point3::zero(), 1.0, normal, 0, None, None)
    }

    #[test]
    fn mirror_reflection_is_exact() {
        let hit = flat_hit(Vec3::new(1.0, -1.0, 0.0).normalized(), Vec3::unit_y());
        let central = central_reflected_direction(&hit, 1.0);
        let expected = Vec3::new(1.0, 1.0, 0.0).normalized();
        assert!((central - expected).length_squared() < 1e-9);
    }

    #[test]
    fn cone_sample_stays_within_angle_of_center() {
        let mut rng = SmallRng::seed_from_u64(7);
        let central = Vec3::unit_z();
        for _ in 0..200 {
            let d = random_direction(&mut rng, central, PI / 4.0);
            assert!(d.length_squared() > 0.99 && d.length_squared() < 1.01);
            assert!(d.dot(central) >= (PI / 4.0).cos() - 1e-9);
        }
    }

    #[test]
    fn schlick_is_near_zero_head_on_for_equal_indices() {
        assert!(schlick(1.0, 1.5, 1.5) < 1e-9);
    }

    #[test]
    fn schlick_grazing_angle_approaches_full_reflectance() {
        let kr = schlick(0.01, 1.0, 1.5);
        assert!(kr > 0.5);
    }

    #[test]
    fn straight_through_refraction_is_undeviated() {
        let hit = flat_hit(Vec3::unit_z(), Vec3::new(0.0, 0.0, -1.0));
        let (vx, sin2) = sin_refracted(&hit, 1.0, 1.5);
        assert!(sin2 < 1e-9);
        let refr = refracted_direction(&hit, vx, sin2);
        assert!((refr - Vec3::unit_z()).length_squared() < 1e-9);
    }

    #[test]
    fn grazing_high_index_ratio_triggers_total_internal_reflection() {
        let incoming = Vec3::new(0.0447, 0.999, 0.0).normalized();
        let hit = flat_hit(incoming, Vec3::new(-1.0, 0.0, 0.0));
        let (_, sin2) = sin_refracted(&hit, 1.5, 1.0);
        assert!(sin2 >= 1.0);
    }

    #[test]
    fn diffuse_ray_starts_biased_away_from_surface() {
        let mut rng = SmallRng::seed_from_u64(3);
        let hit = flat_hit(Vec3::new(0.0, -1.0, 0.0), Vec3::unit_y());
        let ray = diffuse_ray(&hit, &mut rng);
        assert!(ray.origin.y > hit.point.y);
    }
}
