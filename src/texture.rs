use crate::math::{Color, Real, Vec3};

/// Row-major pixel array of linear `Color`. `sample` maps floating UVs to the
/// nearest texel with border clamping — no filtering, matching the original
/// renderer's nearest-neighbor lookup.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Color>,
}

impl Texture {
    pub fn new(width: usize, height: usize, pixels: Vec<Color>) -> Self {
        assert_eq!(pixels.len(), width * height);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn solid(color: Color) -> Self {
        Self::new(1, 1, vec![color])
    }

    pub fn sample(&self, u: Real, v: Real) -> Color {
        let (x, y) = self.texel_coords(u, v);
        self.pixels[y * self.width + x]
    }

    fn texel_coords(&self, u: Real, v: Real) -> (usize, usize) {
        let x = (u * (self.width as Real - 1.0)).round();
        let y = (v * (self.height as Real - 1.0)).round();
        let x = x.clamp(0.0, self.width as Real - 1.0) as usize;
        let y = y.clamp(0.0, self.height as Real - 1.0) as usize;
        (x, y)
    }
}

/// Same shape as `Texture` but stores decoded unit tangent-space normals
/// instead of colors.
#[derive(Debug, Clone)]
pub struct NormalMap {
    pub width: usize,
    pub height: usize,
    normals: Vec<Vec3>,
}

impl NormalMap {
    pub fn new(width: usize, height: usize, normals: Vec<Vec3>) -> Self {
        assert_eq!(normals.len(), width * height);
        Self {
            width,
            height,
            normals,
        }
    }

    pub fn sample(&self, u: Real, v: Real) -> Vec3 {
        let x = (u * (self.width as Real - 1.0))
            .round()
            .clamp(0.0, self.width as Real - 1.0) as usize;
        let y = (v * (self.height as Real - 1.0))
            .round()
            .clamp(0.0, self.height as Real - 1.0) as usize;
        self.normals[y * self.width + x]
    }
}

/// Per-vertex UV coordinates and the precomputed tangent frame needed to
/// rotate normal-map samples into world space. Six UV reals for a triangle,
/// eight for a quad.
#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub texture_index: Option<usize>,
    pub normal_map_index: Option<usize>,
    pub uv_coordinates: Vec<Real>,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

impl TextureInfo {
    pub fn new(
        texture_index: Option<usize>,
        normal_map_index: Option<usize>,
        uv_coordinates: Vec<Real>,
    ) -> Self {
        Self {
            texture_index,
            normal_map_index,
            uv_coordinates,
            tangent: Vec3::unit_x(),
            bitangent: Vec3::unit_y(),
        }
    }

    pub fn set_tangent_space(&mut self, tangent: Vec3, bitangent: Vec3) {
        self.tangent = tangent;
        self.bitangent = bitangent;
    }

    pub fn has_texture_information(&self) -> bool {
        self.texture_index.is_some()
    }

    pub fn has_normal_information(&self) -> bool {
        self.normal_map_index.is_some()
    }

    /// UV of the barycenter given `(l1, l2, lower_triangle)`. For a quad, the
    /// lower triangle is vertices (0,1,2), the upper is (0,3,2).
    pub fn barycenter_uv(&self, l1: Real, l2: Real, lower_triangle: bool) -> (Real, Real) {
        let (i0, i1, i2) = if self.uv_coordinates.len() == 6 {
            (0usize, 1usize, 2usize)
        } else if lower_triangle {
            (0usize, 1usize, 2usize)
        } else {
            (0usize, 3usize, 2usize)
        };
        let uv = |i: usize| (self.uv_coordinates[2 * i], self.uv_coordinates[2 * i + 1]);
        let (u0, v0) = uv(i0);
        let (u1, v1) = uv(i1);
        let (u2, v2) = uv(i2);
        let l0 = 1.0 - l1 - l2;
        (l0 * u0 + l1 * u1 + l2 * u2, l0 * v0 + l1 * v1 + l2 * v2)
    }

    /// Rotates a tangent-space normal `(nx, ny, nz)` into world space using
    /// the precomputed tangent/bitangent and the geometric normal.
    pub fn normal_to_world(&self, local: Vec3, geometric_normal: Vec3) -> Vec3 {
        (self.tangent * local.x + self.bitangent * local.y + geometric_normal * local.z)
            .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_clamps_to_border() {
        let tex = Texture::new(
            2,
            1,
            vec![Color::new(1.0, 0.0, 0.0), Color::new(0.0, 0.0, 1.0)],
        );
        assert_eq!(tex.sample(-1.0, 0.5).x, 1.0);
        assert_eq!(tex.sample(2.0, 0.5).z, 1.0);
    }

    #[test]
    fn normal_bytes_roundtrip_direction() {
        let n = Vec3::from_normal_bytes(128, 128, 255);
        assert!(n.z > 0.9);
    }
}
