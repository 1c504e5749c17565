use crate::hit::Hit;
use crate::material::Material;
use crate::math::{Color, Point3, Ray, Real, Vec3};
use crate::primitive::Primitive;
use crate::rng::uniform;
use crate::scene::Scene;
use crate::shading::{
    biased_origin, central_reflected_direction, diffuse_ray, random_direction, refracted_direction, refractive_ray,
    schlick, sin_refracted, specular_ray,
};
use crate::traversal::{find_closest_object, find_closest_object_linear};
use rand::rngs::SmallRng;

/// Russian-roulette knobs. Disabled by default (`enabled = false`), in
/// which case the loop always runs the full `max_bounces` steps.
#[derive(Debug, Clone, Copy)]
pub struct RouletteConfig {
    pub enabled: bool,
    pub min_depth: u32,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_depth: 4,
        }
    }
}

fn closest_hit(scene: &Scene, ray: &Ray) -> Option<Hit> {
    if scene.polygons_per_bounding == 0 {
        find_closest_object_linear(&scene.primitives, ray)
    } else {
        find_closest_object(&scene.hierarchy_roots, &scene.primitives, ray)
    }
}

/// Perturbs `hit.normal` by a tangent-space normal-map sample, when the
/// primitive carries one and the hit lies on a triangle or quad (the only
/// shapes that carry the barycentric coordinates a UV lookup needs).
/// Leaves the hit untouched otherwise.
fn apply_normal_map(scene: &Scene, hit: Hit, primitive: &Primitive) -> Hit {
    let Some(ti_idx) = primitive.texture_info() else { return hit };
    let info = &scene.texture_infos[ti_idx];
    let Some(nm_idx) = info.normal_map_index else { return hit };
    let Some(bary) = hit.barycentric else { return hit };

    let (u, v) = info.barycenter_uv(bary.l1, bary.l2, bary.lower_triangle);
    let local = scene.normal_maps[nm_idx].sample(u, v);
    let geometric = hit.geometric_normal.unwrap_or(hit.normal);
    let world = info.normal_to_world(local, geometric);
    let normal = if hit.inward { world } else { -world };
    Hit { normal, ..hit }
}

/// Multiplies `color_materials` by the material's flat color, or by the
/// textured color sampled at the hit's barycentric coordinates when the
/// primitive carries one. Skipped entirely when `apply` is false (the
/// specular branch with `reflects_color == false`).
fn update_accumulators(
    scene: &Scene,
    hit: &Hit,
    primitive: &Primitive,
    material: &Material,
    apply: bool,
    emitted: &mut Color,
    color_materials: &mut Color,
) {
    if material.emissive() {
        *emitted = *emitted + color_materials.hadamard(material.emitted_color * material.emission_intensity);
    }
    if !apply {
        return;
    }
    let textured = primitive
        .texture_info()
        .and_then(|ti_idx| {
            let info = &scene.texture_infos[ti_idx];
            let bary = hit.barycentric?;
            let (u, v) = info.barycenter_uv(bary.l1, bary.l2, bary.lower_triangle);
            info.texture_index.map(|tex_idx| scene.textures[tex_idx].sample(u, v))
        });
    *color_materials = color_materials.hadamard(textured.unwrap_or(material.color));
}

/// Single-sample iterative path trace: bounces at most `max_bounces` times,
/// accumulating `throughput` (`color_materials`) and `emitted` exactly as
/// described for the opaque/transparent branches, then resolves to the
/// background color on a miss or to black if the bounce budget runs out.
pub fn pathtrace(
    scene: &Scene,
    mut ray: Ray,
    max_bounces: u32,
    init_refr_index: Real,
    roulette: RouletteConfig,
    rng: &mut SmallRng,
) -> Color {
    let mut color_materials = Color::ones();
    let mut emitted = Color::zero();
    let mut refr_index = init_refr_index;
    let mut refr_stack: Vec<Real> = Vec::new();

    for depth in 0..max_bounces {
        let hit = match closest_hit(scene, &ray) {
            Some(h) => h,
            None => return color_materials.hadamard(scene.background.sample(ray.direction())) + emitted,
        };

        let primitive = &scene.primitives[hit.primitive_index];
        let material = &scene.materials[primitive.material()];

        if material.emissive() && material.emission_intensity >= 1.0 {
            let light_color = primitive
                .texture_info()
                .zip(hit.barycentric)
                .and_then(|(ti_idx, bary)| {
                    let info = &scene.texture_infos[ti_idx];
                    let (u, v) = info.barycenter_uv(bary.l1, bary.l2, bary.lower_triangle);
                    info.texture_index.map(|tex_idx| scene.textures[tex_idx].sample(u, v))
                })
                .unwrap_or(material.emitted_color);
            return color_materials.hadamard(light_color * material.emission_intensity) + emitted;
        }

        let hit = apply_normal_map(scene, hit, primitive);

        if material.opaque() {
            let specular = material.has_spec_prob() && uniform(rng, 1.0) <= material.specular_probability;
            if specular {
                ray = specular_ray(&hit, rng, material.reflectivity);
                update_accumulators(scene, &hit, primitive, material, material.reflects_color, &mut emitted, &mut color_materials);
            } else {
                ray = diffuse_ray(&hit, rng);
                update_accumulators(scene, &hit, primitive, material, true, &mut emitted, &mut color_materials);
            }
        } else {
            let next_refr_index = if hit.inward {
                material.refraction_index
            } else {
                refr_stack.last().copied().unwrap_or(1.0)
            };
            if hit.inward {
                if refr_index != 1.0 {
                    refr_stack.push(refr_index);
                }
            } else {
                refr_stack.pop();
            }

            let (vx, sin_theta_2_sq) = sin_refracted(&hit, refr_index, next_refr_index);
            let cos_theta_1 = hit.ray.direction().dot(hit.normal).abs();
            let kr = if hit.inward { schlick(cos_theta_1, refr_index, next_refr_index) } else { 0.0 };

            let reflects = hit.inward && uniform(rng, 1.0) * material.transparency <= kr;
            if reflects || sin_theta_2_sq >= 1.0 {
                ray = specular_ray(&hit, rng, material.reflectivity);
                update_accumulators(scene, &hit, primitive, material, false, &mut emitted, &mut color_materials);
            } else {
                ray = refractive_ray(&hit, rng, material.refraction_scattering, vx, sin_theta_2_sq);
                refr_index = next_refr_index;
                update_accumulators(scene, &hit, primitive, material, true, &mut emitted, &mut color_materials);
            }
        }

        if roulette.enabled && depth >= roulette.min_depth {
            let p = color_materials.max_component().min(1.0);
            if uniform(rng, 1.0) > p {
                return emitted;
            }
            color_materials = color_materials / p.max(1e-6);
        }
    }

    emitted
}

/// A candidate bounce direction before its scattering cone is sampled:
/// origin (already biased), exact central direction, and the mixing
/// weight `scattering` used by `random_dir` below (`1 - reflectivity` for
/// reflective branches, `refraction_scattering` for the refractive one —
/// both plug into the same `(central + (1-scattering)*cone).unit()`
/// recipe the multisample path uses for every branch kind).
struct BounceBranch {
    origin: Point3,
    central_dir: Vec3,
    scattering: Real,
    color_materials: Color,
    init_refr_index: Real,
}

/// Computes the two candidate bounce directions and their throughput
/// updates at the first hit (mirroring `compute_bouncing_ray`), returning
/// `None` for the second branch when the surface only has one outgoing
/// direction (pure diffuse, or a dielectric with no internal reflection
/// component).
fn primary_branches(
    scene: &Scene,
    hit: &Hit,
    primitive: &Primitive,
    material: &Material,
) -> (BounceBranch, Option<BounceBranch>, Color, Real) {
    let mut emitted = Color::zero();

    if material.opaque() {
        if material.has_spec_prob() {
            let mut color1 = Color::ones();
            update_accumulators(scene, hit, primitive, material, material.reflects_color, &mut emitted, &mut color1);
            let branch1 = BounceBranch {
                origin: biased_origin(hit, true),
                central_dir: central_reflected_direction(hit, material.reflectivity),
                scattering: material.reflectivity,
                color_materials: color1,
                init_refr_index: 1.0,
            };
            let mut color2 = Color::ones();
            update_accumulators(scene, hit, primitive, material, true, &mut emitted, &mut color2);
            let branch2 = BounceBranch {
                origin: biased_origin(hit, true),
                central_dir: hit.normal,
                scattering: 0.0,
                color_materials: color2,
                init_refr_index: 1.0,
            };
            (branch1, Some(branch2), emitted, material.specular_probability)
        } else {
            let mut color1 = Color::ones();
            update_accumulators(scene, hit, primitive, material, true, &mut emitted, &mut color1);
            let branch1 = BounceBranch {
                origin: biased_origin(hit, true),
                central_dir: hit.normal,
                scattering: 0.0,
                color_materials: color1,
                init_refr_index: 1.0,
            };
            (branch1, None, emitted, 1.0)
        }
    } else {
        let next_refr_index = if hit.inward { material.refraction_index } else { 1.0 };
        let (vx, sin_theta_2_sq) = sin_refracted(hit, 1.0, next_refr_index);
        let cos_theta_1 = hit.ray.direction().dot(hit.normal).abs();
        let kr = if hit.inward { schlick(cos_theta_1, 1.0, next_refr_index) } else { 0.0 };

        if sin_theta_2_sq >= 1.0 {
            let mut color1 = Color::ones();
            update_accumulators(scene, hit, primitive, material, false, &mut emitted, &mut color1);
            let branch1 = BounceBranch {
                origin: biased_origin(hit, true),
                central_dir: central_reflected_direction(hit, material.reflectivity),
                scattering: material.reflectivity,
                color_materials: color1,
                init_refr_index: 1.0,
            };
            (branch1, None, emitted, 1.0)
        } else {
            let mut color1 = Color::ones();
            update_accumulators(scene, hit, primitive, material, true, &mut emitted, &mut color1);
            let branch1 = BounceBranch {
                origin: biased_origin(hit, false),
                central_dir: refracted_direction(hit, vx, sin_theta_2_sq),
                scattering: 1.0 - material.refraction_scattering,
                color_materials: color1,
                init_refr_index: next_refr_index,
            };
            if hit.inward {
                let mut color2 = Color::ones();
                update_accumulators(scene, hit, primitive, material, false, &mut emitted, &mut color2);
                let branch2 = BounceBranch {
                    origin: biased_origin(hit, true),
                    central_dir: central_reflected_direction(hit, material.reflectivity),
                    scattering: material.reflectivity,
                    color_materials: color2,
                    init_refr_index: 1.0,
                };
                let proba_1 = 1.0 - (kr / material.transparency).clamp(0.0, 1.0);
                (branch1, Some(branch2), emitted, proba_1)
            } else {
                (branch1, None, emitted, 1.0)
            }
        }
    }
}

/// After the first hit, casts `number_of_samples` secondary rays split
/// between up to two precomputed bounce branches in proportion to
/// `proba_1`, re-sampling the scattering cone per sample; the remaining
/// bounces of each secondary ray run the ordinary single-sample path.
pub fn pathtrace_multisample(
    scene: &Scene,
    ray: Ray,
    max_bounces: u32,
    number_of_samples: u32,
    roulette: RouletteConfig,
    rng: &mut SmallRng,
) -> Color {
    let hit = match closest_hit(scene, &ray) {
        Some(h) => h,
        None => return scene.background.sample(ray.direction()),
    };

    let primitive = &scene.primitives[hit.primitive_index];
    let material = &scene.materials[primitive.material()];

    if material.emissive() && material.emission_intensity >= 1.0 {
        let light_color = primitive
            .texture_info()
            .zip(hit.barycentric)
            .and_then(|(ti_idx, bary)| {
                let info = &scene.texture_infos[ti_idx];
                let (u, v) = info.barycenter_uv(bary.l1, bary.l2, bary.lower_triangle);
                info.texture_index.map(|tex_idx| scene.textures[tex_idx].sample(u, v))
            })
            .unwrap_or(material.emitted_color);
        return light_color * material.emission_intensity;
    }

    let hit = apply_normal_map(scene, hit, primitive);
    let (branch1, branch2, emitted, proba_1) = primary_branches(scene, &hit, primitive, material);

    let sample_branch = |branch: &BounceBranch, rng: &mut SmallRng| -> Color {
        let dir = (branch.central_dir
            + random_direction(rng, branch.central_dir, std::f64::consts::PI) * (1.0 - branch.scattering))
            .normalized();
        let secondary = Ray::new(branch.origin, dir);
        pathtrace(scene, secondary, max_bounces.saturating_sub(1), branch.init_refr_index, roulette, rng)
    };

    match branch2 {
        None => {
            let mut sum = Color::zero();
            for _ in 0..number_of_samples {
                sum = sum + sample_branch(&branch1, rng);
            }
            branch1.color_materials.hadamard(sum / number_of_samples as Real) + emitted
        }
        Some(branch2) if proba_1 < 1.0 => {
            let mut sum1 = Color::zero();
            let mut sum2 = Color::zero();
            let mut n1 = 0u32;
            let mut n2 = 0u32;
            for _ in 0..number_of_samples {
                if uniform(rng, 1.0) <= proba_1 {
                    sum1 = sum1 + sample_branch(&branch1, rng);
                    n1 += 1;
                } else {
                    sum2 = sum2 + sample_branch(&branch2, rng);
                    n2 += 1;
                }
            }
            let mut out = emitted;
            if n1 > 0 {
                out = out + branch1.color_materials.hadamard(sum1 / n1 as Real) * (n1 as Real / number_of_samples as Real);
            }
            if n2 > 0 {
                out = out + branch2.color_materials.hadamard(sum2 / n2 as Real) * (n2 as Real / number_of_samples as Real);
            }
            out
        }
        Some(_) => {
            let mut sum = Color::zero();
            for _ in 0..number_of_samples {
                sum = sum + sample_branch(&branch1, rng);
            }
            branch1.color_materials.hadamard(sum / number_of_samples as Real) + emitted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, CameraConfig};
    use crate::material::Material;
    use crate::math::{Color, Point3, Vec3};
    use crate::scene::Background;
    use crate::texture::{NormalMap, Texture, TextureInfo};
    use rand::SeedableRng;

    fn single_sphere_scene(material: Material) -> Scene {
        let primitives = vec![Primitive::Sphere {
            center: Point3::new(0.0, 0.0, -3.0),
            radius: 1.0,
            material: 0,
            texture_info: None,
        }];
        Scene::new(
            primitives,
            vec![material],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Camera::new(&CameraConfig::default()),
            Background::Constant(Color::new(0.5, 0.7, 1.0)),
            0,
        )
    }

    #[test]
    fn hitting_a_light_returns_its_emitted_color() {
        let scene = single_sphere_scene(Material::light(Color::new(1.0, 0.0, 0.0), 2.0));
        let mut rng = SmallRng::seed_from_u64(1);
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let color = pathtrace(&scene, ray, 8, 1.0, RouletteConfig::default(), &mut rng);
        assert!(color.x > 1.5);
        assert_eq!(color.y, 0.0);
    }

    #[test]
    fn miss_returns_background() {
        let scene = single_sphere_scene(Material::diffuse(Color::ones()));
        let mut rng = SmallRng::seed_from_u64(1);
        let ray = Ray::new(Point3::new(10.0, 10.0, 10.0), Vec3::new(1.0, 1.0, 1.0));
        let color = pathtrace(&scene, ray, 4, 1.0, RouletteConfig::default(), &mut rng);
        assert!((color - Color::new(0.5, 0.7, 1.0)).length_squared() < 1e-9);
    }

    #[test]
    fn diffuse_sphere_never_returns_negative_or_nan() {
        let scene = single_sphere_scene(Material::diffuse(Color::new(0.8, 0.2, 0.2)));
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..50 {
            let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
            let color = pathtrace(&scene, ray, 8, 1.0, RouletteConfig::default(), &mut rng);
            assert!(color.x.is_finite() && color.x >= 0.0);
            assert!(color.y.is_finite() && color.y >= 0.0);
            assert!(color.z.is_finite() && color.z >= 0.0);
        }
    }

    #[test]
    fn normal_map_perturbs_shading_normal_on_textured_quad() {
        let quad = Primitive::Quad {
            origin: Point3::new(-1.0, -1.0, -3.0),
            edge_u: Vec3::new(2.0, 0.0, 0.0),
            edge_v: Vec3::new(0.0, 2.0, 0.0),
            normal: Vec3::unit_z(),
            vertex_normals: None,
            material: 0,
            texture_info: Some(0),
        };
        let ray = Ray::new(Point3::zero(), Vec3::new(0.0, 0.0, -1.0));
        let t = quad.measure_distance(&ray).expect("ray should hit the quad");
        let hit = quad.compute_intersection(&ray, t, 0);

        let info = TextureInfo::new(Some(0), Some(0), vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
        let scene = Scene::new(
            vec![quad],
            vec![Material::diffuse(Color::zero())],
            vec![Texture::solid(Color::new(0.2, 0.4, 0.6))],
            vec![NormalMap::new(1, 1, vec![Vec3::new(1.0, 0.0, 0.0)])],
            vec![info],
            Camera::new(&CameraConfig::default()),
            Background::Constant(Color::zero()),
            0,
        );

        let perturbed = apply_normal_map(&scene, hit, &scene.primitives[0]);
        assert!((perturbed.normal - Vec3::unit_x()).length_squared() < 1e-9);
    }

    #[test]
    fn apply_normal_map_is_a_no_op_without_texture_info() {
        let scene = single_sphere_scene(Material::diffuse(Color::ones()));
        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = closest_hit(&scene, &ray).expect("sphere should be hit");
        let normal_before = hit.normal;
        let result = apply_normal_map(&scene, hit, &scene.primitives[0]);
        assert!((result.normal - normal_before).length_squared() < 1e-12);
    }
}
