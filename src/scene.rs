use crate::camera::Camera;
use crate::hierarchy::{build_hierarchy, HierarchyNode};
use crate::material::Material;
use crate::math::{Color, Real, Vec3};
use crate::primitive::Primitive;
use crate::texture::{NormalMap, Texture, TextureInfo};

/// Either a constant color or a texture sampled equirectangularly after
/// rotating the lookup direction by three Euler angles.
pub enum Background {
    Constant(Color),
    Texture {
        texture: Texture,
        rotate_x: Real,
        rotate_y: Real,
        rotate_z: Real,
    },
}

impl Background {
    pub fn sample(&self, direction: Vec3) -> Color {
        match self {
            Background::Constant(c) => *c,
            Background::Texture {
                texture,
                rotate_x,
                rotate_y,
                rotate_z,
            } => {
                let d = rotate_euler(direction, *rotate_x, *rotate_y, *rotate_z).normalized();
                let u = 0.5 + d.z.atan2(d.x) / std::f64::consts::TAU;
                let v = 0.5 - d.y.asin() / std::f64::consts::PI;
                texture.sample(u, v)
            }
        }
    }
}

fn rotate_euler(v: Vec3, rx: Real, ry: Real, rz: Real) -> Vec3 {
    let (sx, cx) = rx.sin_cos();
    let (sy, cy) = ry.sin_cos();
    let (sz, cz) = rz.sin_cos();

    let v = Vec3::new(v.x, v.y * cx - v.z * sx, v.y * sx + v.z * cx);
    let v = Vec3::new(v.x * cy + v.z * sy, v.y, -v.x * sy + v.z * cy);
    Vec3::new(v.x * cz - v.y * sz, v.x * sz + v.y * cz, v.z)
}

/// Owns every arena the renderer reads from: primitives, materials,
/// textures, normal maps, the bounding-hierarchy forest, the camera, the
/// background, and the per-leaf fan-out the hierarchy was built with.
/// Immutable once constructed — freely shared across render threads.
pub struct Scene {
    pub primitives: Vec<Primitive>,
    pub materials: Vec<Material>,
    pub textures: Vec<Texture>,
    pub normal_maps: Vec<NormalMap>,
    pub texture_infos: Vec<TextureInfo>,
    pub hierarchy_roots: Vec<HierarchyNode>,
    pub camera: Camera,
    pub background: Background,
    pub polygons_per_bounding: usize,
}

impl Scene {
    /// Builds the bounding hierarchy (or disables it, per
    /// `polygons_per_bounding == 0`) over every primitive in `primitives`.
    pub fn new(
        primitives: Vec<Primitive>,
        materials: Vec<Material>,
        textures: Vec<Texture>,
        normal_maps: Vec<NormalMap>,
        texture_infos: Vec<TextureInfo>,
        camera: Camera,
        background: Background,
        polygons_per_bounding: usize,
    ) -> Self {
        let hierarchy_roots = if polygons_per_bounding == 0 || primitives.is_empty() {
            Vec::new()
        } else {
            vec![build_hierarchy(
                (0..primitives.len()).collect(),
                &primitives,
                polygons_per_bounding,
            )]
        };

        Self {
            primitives,
            materials,
            textures,
            normal_maps,
            texture_infos,
            hierarchy_roots,
            camera,
            background,
            polygons_per_bounding,
        }
    }

    pub fn material_of(&self, primitive_index: usize) -> &Material {
        &self.materials[self.primitives[primitive_index].material()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_background_ignores_direction() {
        let bg = Background::Constant(Color::new(0.1, 0.2, 0.3));
        let a = bg.sample(Vec3::unit_x());
        let b = bg.sample(Vec3::unit_y());
        assert_eq!(a.x, b.x);
    }
}
