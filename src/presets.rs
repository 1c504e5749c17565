use crate::camera::{Camera, CameraConfig};
use crate::material::Material;
use crate::math::{Color, Point3, Vec3};
use crate::primitive::Primitive;
use crate::scene::{Background, Scene};
use crate::texture::{NormalMap, Texture, TextureInfo};
use rand::Rng;

/// A complete scene ready to render, bundling the geometry/camera/background
/// with the sample/bounce counts the preset was designed around — a user can
/// still override either from the CLI.
pub struct PresetScene {
    pub name: &'static str,
    pub scene: Scene,
    pub default_samples_per_pixel: u32,
    pub default_max_bounces: u32,
}

/// Built-in scene presets, selectable from the CLI.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ScenePreset {
    /// A random arrangement of diffuse, metallic, and glass spheres on a
    /// checkerboard-less ground plane.
    Showcase,
    /// A Cornell box built from quad walls, an emissive ceiling light, and
    /// a metal/glass sphere pair.
    Cornell,
    /// A single reflective sphere on a ground plane — useful for benchmarking.
    Minimal,
    /// A gallery demonstrating every primitive and material kind.
    Gallery,
    /// A stress-test scene with many random spheres to exercise the hierarchy.
    Stress,
}

impl ScenePreset {
    pub fn build(self, width: usize, height: usize, polygons_per_bounding: usize) -> PresetScene {
        match self {
            ScenePreset::Showcase => build_showcase(width, height, polygons_per_bounding),
            ScenePreset::Cornell => build_cornell(width, height, polygons_per_bounding),
            ScenePreset::Minimal => build_minimal(width, height, polygons_per_bounding),
            ScenePreset::Gallery => build_gallery(width, height, polygons_per_bounding),
            ScenePreset::Stress => build_stress(width, height, polygons_per_bounding),
        }
    }
}

fn sphere(center: Point3, radius: f64, material: usize) -> Primitive {
    Primitive::Sphere { center, radius, material, texture_info: None }
}

fn build_showcase(width: usize, height: usize, polygons_per_bounding: usize) -> PresetScene {
    let mut rng = rand::thread_rng();
    let mut materials = vec![
        Material::diffuse(Color::new(0.5, 0.5, 0.5)),
        Material::glass(1.5),
        Material::diffuse(Color::new(0.7, 0.15, 0.15)),
        Material::metal(Color::new(0.85, 0.85, 0.9), 0.0),
    ];
    let mut primitives = vec![
        Primitive::Plane { point: Point3::zero(), normal: Vec3::unit_y(), material: 0, texture_info: None },
        sphere(Point3::new(0.0, 1.0, 0.0), 1.0, 1),
        sphere(Point3::new(-4.0, 1.0, 0.0), 1.0, 2),
        sphere(Point3::new(4.0, 1.0, 0.0), 1.0, 3),
    ];

    for a in -8..8 {
        for b in -8..8 {
            let center = Point3::new(a as f64 + 0.9 * rng.gen::<f64>(), 0.2, b as f64 + 0.9 * rng.gen::<f64>());
            if (center - Point3::new(4.0, 0.2, 0.0)).length() < 0.9
                || (center - Point3::new(-4.0, 0.2, 0.0)).length() < 0.9
                || (center - Point3::new(0.0, 0.2, 0.0)).length() < 0.9
            {
                continue;
            }
            let choose: f64 = rng.gen();
            let material = if choose < 0.7 {
                Material::diffuse(Color::new(rng.gen::<f64>() * rng.gen::<f64>(), rng.gen::<f64>() * rng.gen::<f64>(), rng.gen::<f64>() * rng.gen::<f64>()))
            } else if choose < 0.9 {
                Material::metal(
                    Color::new(rng.gen_range(0.5..1.0), rng.gen_range(0.5..1.0), rng.gen_range(0.5..1.0)),
                    rng.gen_range(0.0..0.3),
                )
            } else {
                Material::glass(1.5)
            };
            materials.push(material);
            primitives.push(sphere(center, 0.2, materials.len() - 1));
        }
    }

    let camera = Camera::new(&CameraConfig {
        origin: Point3::new(13.0, 2.0, 3.0),
        look_at: Point3::new(0.0, 0.5, 0.0),
        up: Vec3::unit_y(),
        vfov_degrees: 20.0,
        width,
        height,
        aperture: 0.1,
        focus_dist: 10.0,
        ..CameraConfig::default()
    });

    PresetScene {
        name: "Showcase",
        scene: Scene::new(
            primitives,
            materials,
            Vec::new(),
            Vec::new(),
            Vec::new(),
            camera,
            Background::Constant(Color::new(0.5, 0.7, 1.0)),
            polygons_per_bounding,
        ),
        default_samples_per_pixel: 64,
        default_max_bounces: 12,
    }
}

fn quad(origin: Point3, edge_u: Vec3, edge_v: Vec3, material: usize) -> Primitive {
    let normal = edge_u.cross(edge_v).normalized();
    Primitive::Quad { origin, edge_u, edge_v, normal, vertex_normals: None, material, texture_info: None }
}

fn textured_quad(origin: Point3, edge_u: Vec3, edge_v: Vec3, material: usize, texture_info: usize) -> Primitive {
    let normal = edge_u.cross(edge_v).normalized();
    Primitive::Quad {
        origin,
        edge_u,
        edge_v,
        normal,
        vertex_normals: None,
        material,
        texture_info: Some(texture_info),
    }
}

/// An 8x8 checkerboard in two tones, for the back wall of the gallery.
fn checkerboard_texture(a: Color, b: Color) -> Texture {
    let size = 8;
    let pixels = (0..size * size)
        .map(|i| if (i / size + i % size) % 2 == 0 { a } else { b })
        .collect();
    Texture::new(size, size, pixels)
}

/// A mild wave pattern, tangent-space normals pointing mostly outward with a
/// periodic tilt, for the same wall.
fn ripple_normal_map() -> NormalMap {
    let size = 8;
    let normals = (0..size * size)
        .map(|i| {
            let (x, y) = (i % size, i / size);
            let tilt = ((x as f64 * 0.8).sin() + (y as f64 * 0.8).cos()) * 0.25;
            Vec3::new(tilt, tilt, 1.0).normalized()
        })
        .collect();
    NormalMap::new(size, size, normals)
}

fn wall_texture_info() -> TextureInfo {
    TextureInfo::new(Some(0), Some(0), vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0])
}

fn build_cornell(width: usize, height: usize, polygons_per_bounding: usize) -> PresetScene {
    let white = Material::diffuse(Color::new(0.73, 0.73, 0.73));
    let red = Material::diffuse(Color::new(0.65, 0.05, 0.05));
    let green = Material::diffuse(Color::new(0.12, 0.45, 0.15));
    let light = Material::light(Color::new(1.0, 0.95, 0.85), 18.0);
    let metal = Material::metal(Color::new(0.9, 0.9, 0.95), 0.02);
    let glass = Material::glass(1.5);
    let materials = vec![white, red, green, light, metal, glass];

    let primitives = vec![
        quad(Point3::new(-2.0, 0.0, -4.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0), 0),
        quad(Point3::new(-2.0, 4.0, 0.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -4.0), 0),
        quad(Point3::new(-2.0, 0.0, -4.0), Vec3::new(4.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), 0),
        quad(Point3::new(-2.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -4.0), Vec3::new(0.0, 4.0, 0.0), 1),
        quad(Point3::new(2.0, 0.0, -4.0), Vec3::new(0.0, 0.0, 4.0), Vec3::new(0.0, 4.0, 0.0), 2),
        quad(Point3::new(-0.5, 3.99, -2.5), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0), 3),
        sphere(Point3::new(-0.7, 0.6, -2.2), 0.6, 4),
        sphere(Point3::new(0.7, 0.45, -1.5), 0.45, 5),
    ];

    let camera = Camera::new(&CameraConfig {
        origin: Point3::new(0.0, 2.0, 3.5),
        look_at: Point3::new(0.0, 1.5, -2.0),
        up: Vec3::unit_y(),
        vfov_degrees: 50.0,
        width,
        height,
        focus_dist: 5.0,
        ..CameraConfig::default()
    });

    PresetScene {
        name: "Cornell Box",
        scene: Scene::new(primitives, materials, Vec::new(), Vec::new(), Vec::new(), camera, Background::Constant(Color::zero()), polygons_per_bounding),
        default_samples_per_pixel: 256,
        default_max_bounces: 8,
    }
}

fn build_minimal(width: usize, height: usize, polygons_per_bounding: usize) -> PresetScene {
    let materials = vec![
        Material::diffuse(Color::new(0.5, 0.5, 0.5)),
        Material::metal(Color::new(0.95, 0.95, 0.97), 0.0),
        Material::diffuse(Color::new(0.9, 0.2, 0.1)),
        Material::glass(1.5),
    ];
    let primitives = vec![
        Primitive::Plane { point: Point3::new(0.0, -0.5, 0.0), normal: Vec3::unit_y(), material: 0, texture_info: None },
        sphere(Point3::new(0.0, 0.5, -1.0), 0.5, 1),
        sphere(Point3::new(-1.2, 0.25, -0.5), 0.25, 2),
        sphere(Point3::new(1.0, 0.3, -0.8), 0.3, 3),
    ];

    let camera = Camera::new(&CameraConfig {
        origin: Point3::new(0.0, 1.5, 2.0),
        look_at: Point3::new(0.0, 0.3, -1.0),
        up: Vec3::unit_y(),
        vfov_degrees: 40.0,
        width,
        height,
        aperture: 0.02,
        focus_dist: 3.0,
        ..CameraConfig::default()
    });

    PresetScene {
        name: "Minimal",
        scene: Scene::new(primitives, materials, Vec::new(), Vec::new(), Vec::new(), camera, Background::Constant(Color::new(0.7, 0.8, 1.0)), polygons_per_bounding),
        default_samples_per_pixel: 32,
        default_max_bounces: 8,
    }
}

fn build_gallery(width: usize, height: usize, polygons_per_bounding: usize) -> PresetScene {
    let materials = vec![
        Material::diffuse(Color::new(0.46, 0.46, 0.5)),
        Material::diffuse(Color::new(0.15, 0.15, 0.2)),
        Material::metal(Color::new(0.7, 0.7, 0.75), 0.15),
        Material::glass(1.5),
        Material::diffuse(Color::new(0.95, 0.55, 0.15)),
        Material::metal(Color::new(0.9, 0.75, 0.6), 0.08),
        Material::diffuse(Color::new(0.1, 0.4, 0.85)),
        Material::metal(Color::new(0.95, 0.95, 0.95), 0.0),
        Material::diffuse(Color::new(0.8, 0.15, 0.5)),
        Material::light(Color::new(1.0, 0.9, 0.7), 12.0),
        Material::light(Color::new(0.5, 0.7, 1.0), 10.0),
    ];

    let primitives = vec![
        Primitive::Plane { point: Point3::zero(), normal: Vec3::unit_y(), material: 0, texture_info: None },
        textured_quad(Point3::new(-6.0, 0.0, -5.0), Vec3::new(12.0, 0.0, 0.0), Vec3::new(0.0, 6.0, 0.0), 1, 0),
        // A flattened cylinder stands in for a circular pedestal.
        Primitive::Cylinder { base: Point3::new(0.0, 0.0, -1.0), axis: Vec3::unit_y(), radius: 2.5, length: 0.05, material: 2, texture_info: None },
        sphere(Point3::new(0.0, 1.0, -1.0), 1.0, 3),
        sphere(Point3::new(-2.8, 0.7, -0.5), 0.7, 4),
        sphere(Point3::new(2.8, 0.8, -0.8), 0.8, 5),
        sphere(Point3::new(-1.2, 0.3, 0.8), 0.3, 6),
        sphere(Point3::new(1.5, 0.25, 1.0), 0.25, 7),
        sphere(Point3::new(0.8, 0.2, 0.5), 0.2, 8),
        sphere(Point3::new(-1.0, 3.5, -2.0), 0.3, 9),
        sphere(Point3::new(2.0, 2.5, 0.0), 0.2, 10),
    ];

    let camera = Camera::new(&CameraConfig {
        origin: Point3::new(0.0, 2.5, 6.0),
        look_at: Point3::new(0.0, 0.8, -1.0),
        up: Vec3::unit_y(),
        vfov_degrees: 35.0,
        width,
        height,
        aperture: 0.05,
        focus_dist: 7.0,
        ..CameraConfig::default()
    });

    let textures = vec![checkerboard_texture(Color::new(0.85, 0.82, 0.7), Color::new(0.2, 0.18, 0.15))];
    let normal_maps = vec![ripple_normal_map()];
    let texture_infos = vec![wall_texture_info()];

    PresetScene {
        name: "Gallery",
        scene: Scene::new(
            primitives,
            materials,
            textures,
            normal_maps,
            texture_infos,
            camera,
            Background::Constant(Color::new(0.02, 0.02, 0.08)),
            polygons_per_bounding,
        ),
        default_samples_per_pixel: 96,
        default_max_bounces: 12,
    }
}

fn build_stress(width: usize, height: usize, polygons_per_bounding: usize) -> PresetScene {
    let mut rng = rand::thread_rng();
    let mut materials = vec![Material::diffuse(Color::new(0.5, 0.5, 0.5))];
    let mut primitives = vec![Primitive::Plane { point: Point3::zero(), normal: Vec3::unit_y(), material: 0, texture_info: None }];

    for _ in 0..500 {
        let center = Point3::new(rng.gen_range(-15.0..15.0), rng.gen_range(0.1..0.4), rng.gen_range(-15.0..15.0));
        let radius = rng.gen_range(0.08..0.35);
        materials.push(Material::diffuse(Color::new(rng.gen(), rng.gen(), rng.gen())));
        primitives.push(sphere(center, radius, materials.len() - 1));
    }

    let camera = Camera::new(&CameraConfig {
        origin: Point3::new(10.0, 4.0, 10.0),
        look_at: Point3::zero(),
        up: Vec3::unit_y(),
        vfov_degrees: 30.0,
        width,
        height,
        focus_dist: 14.0,
        ..CameraConfig::default()
    });

    PresetScene {
        name: "Stress Test (500 spheres)",
        scene: Scene::new(primitives, materials, Vec::new(), Vec::new(), Vec::new(), camera, Background::Constant(Color::new(0.4, 0.6, 1.0)), polygons_per_bounding),
        default_samples_per_pixel: 16,
        default_max_bounces: 8,
    }
}
