use crate::math::Color;

/// Surface material. A plain value type rather than a trait object: the
/// renderer's hot loop matches on the derived booleans instead of paying for
/// vtable dispatch, and the precomputed flags only make sense on a concrete
/// struct. Materials are move-only — there is no `Clone` impl, so handing a
/// material to a `Scene` always transfers ownership rather than duplicating it.
#[derive(Debug)]
pub struct Material {
    pub color: Color,
    pub emitted_color: Color,
    pub emission_intensity: f64,
    /// 0 = pure diffuse, 1 = pure mirror.
    pub reflectivity: f64,
    pub specular_probability: f64,
    /// Tints specular bounces with `color` when true; leaves them white otherwise.
    pub reflects_color: bool,
    pub transparency: f64,
    pub refraction_scattering: f64,
    pub refraction_index: f64,
}

impl Material {
    pub fn new(
        color: Color,
        emitted_color: Color,
        emission_intensity: f64,
        reflectivity: f64,
        specular_probability: f64,
        reflects_color: bool,
        transparency: f64,
        refraction_scattering: f64,
        refraction_index: f64,
    ) -> Self {
        Self {
            color,
            emitted_color,
            emission_intensity,
            reflectivity,
            specular_probability,
            reflects_color,
            transparency,
            refraction_scattering,
            refraction_index,
        }
    }

    #[inline(always)]
    pub fn opaque(&self) -> bool {
        self.transparency == 0.0
    }

    #[inline(always)]
    pub fn emissive(&self) -> bool {
        self.emission_intensity > 0.0
    }

    /// True unless the material is a pure mirror, in which case the
    /// specular/diffuse coin flip in the opaque branch can be skipped.
    #[inline(always)]
    pub fn has_spec_prob(&self) -> bool {
        self.specular_probability < 1.0
    }

    pub fn diffuse(color: Color) -> Self {
        Self::new(color, Color::zero(), 0.0, 0.0, 0.0, false, 0.0, 0.0, 1.0)
    }

    pub fn mirror(color: Color) -> Self {
        Self::new(color, Color::zero(), 0.0, 1.0, 1.0, false, 0.0, 0.0, 1.0)
    }

    /// Tinted, roughness-softened mirror: `fuzz` in `[0, 1]` pulls
    /// `reflectivity` down from a perfect mirror toward a diffuse lobe.
    pub fn metal(color: Color, fuzz: f64) -> Self {
        Self::new(color, Color::zero(), 0.0, (1.0 - fuzz).clamp(0.0, 1.0), 1.0, true, 0.0, 0.0, 1.0)
    }

    pub fn glass(refraction_index: f64) -> Self {
        Self::new(
            Color::ones(),
            Color::zero(),
            0.0,
            0.0,
            0.0,
            false,
            1.0,
            0.0,
            refraction_index,
        )
    }

    /// Water-like dielectric: mild refraction scattering softens caustics.
    pub fn water() -> Self {
        Self::new(
            Color::ones(),
            Color::zero(),
            0.0,
            0.0,
            0.0,
            false,
            1.0,
            0.05,
            1.33,
        )
    }

    pub fn light(emitted_color: Color, intensity: f64) -> Self {
        Self::new(
            Color::ones(),
            emitted_color,
            intensity,
            0.0,
            0.0,
            false,
            0.0,
            0.0,
            1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_flags() {
        let m = Material::glass(1.5);
        assert!(!m.opaque());
        assert!(!m.emissive());
        assert!(m.has_spec_prob());

        let mirror = Material::mirror(Color::ones());
        assert!(mirror.opaque());
        assert!(!mirror.has_spec_prob());

        let light = Material::light(Color::ones(), 5.0);
        assert!(light.emissive());
    }
}
