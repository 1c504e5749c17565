use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Index, Mul, MulAssign, Neg, Sub};

/// Floating point precision used throughout the renderer. The original source
/// mixes single and double precision across files; this picks double and
/// threads it through a single alias so the choice is visible and swappable.
pub type Real = f64;

/// A 3-component vector used for positions, directions, and colors.
#[derive(Debug, Clone, Copy)]
pub struct Vec3 {
    pub x: Real,
    pub y: Real,
    pub z: Real,
}

pub type Point3 = Vec3;
pub type Color = Vec3;

impl Vec3 {
    #[inline(always)]
    pub const fn new(x: Real, y: Real, z: Real) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn ones() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    #[inline(always)]
    pub const fn unit_x() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_y() -> Self {
        Self::new(0.0, 1.0, 0.0)
    }

    #[inline(always)]
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    #[inline(always)]
    pub fn length_squared(self) -> Real {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline(always)]
    pub fn length(self) -> Real {
        self.length_squared().sqrt()
    }

    #[inline(always)]
    pub fn normalized(self) -> Self {
        let len = self.length();
        debug_assert!(len > 1e-12, "attempted to normalize a zero-length vector");
        self / len
    }

    #[inline(always)]
    pub fn dot(self, rhs: Self) -> Real {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[inline(always)]
    pub fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Specular reflection of `self` about the surface normal `n`: I - 2(I·N)N.
    #[inline(always)]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * 2.0 * self.dot(normal)
    }

    /// Snell's law refraction. `None` signals total internal reflection.
    #[inline]
    pub fn refract(self, normal: Self, eta_ratio: Real) -> Option<Self> {
        let cos_theta = (-self).dot(normal).min(1.0);
        let r_perp = (self + normal * cos_theta) * eta_ratio;
        let discriminant = 1.0 - r_perp.length_squared();
        if discriminant < 0.0 {
            return None;
        }
        let r_parallel = normal * -(discriminant.sqrt());
        Some(r_perp + r_parallel)
    }

    #[inline(always)]
    pub fn hadamard(self, rhs: Self) -> Self {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }

    #[inline(always)]
    pub fn lerp(self, other: Self, t: Real) -> Self {
        self * (1.0 - t) + other * t
    }

    #[inline(always)]
    pub fn saturate(self) -> Self {
        Self::new(
            self.x.clamp(0.0, 1.0),
            self.y.clamp(0.0, 1.0),
            self.z.clamp(0.0, 1.0),
        )
    }

    #[inline(always)]
    pub fn gamma_correct(self) -> Self {
        Self::new(self.x.sqrt(), self.y.sqrt(), self.z.sqrt())
    }

    #[inline(always)]
    pub fn near_zero(self) -> bool {
        const EPS: Real = 1e-8;
        self.x.abs() < EPS && self.y.abs() < EPS && self.z.abs() < EPS
    }

    /// Largest component — used by Russian-roulette continuation probability.
    #[inline(always)]
    pub fn max_component(self) -> Real {
        self.x.max(self.y).max(self.z)
    }

    /// Rec. 709 relative luminance, used by every terminal preview mode that
    /// needs a single brightness scalar instead of a full color (ASCII ramp
    /// indexing, braille dot thresholding).
    #[inline(always)]
    pub fn luminance(self) -> Real {
        0.2126 * self.x + 0.7152 * self.y + 0.0722 * self.z
    }

    pub fn to_rgb8(self) -> (u8, u8, u8) {
        let c = self.saturate();
        (
            (c.x * 255.999) as u8,
            (c.y * 255.999) as u8,
            (c.z * 255.999) as u8,
        )
    }

    /// Decodes a byte triple `(2c/255 - 1)` into a tangent-space normal, the
    /// inverse of the usual `[-1,1] -> [0,255]` normal-map packing.
    pub fn from_normal_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            2.0 * (r as Real / 255.0) - 1.0,
            2.0 * (g as Real / 255.0) - 1.0,
            2.0 * (b as Real / 255.0) - 1.0,
        )
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

impl Sub for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<Real> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn mul(self, t: Real) -> Self {
        Self::new(self.x * t, self.y * t, self.z * t)
    }
}

impl Mul<Vec3> for Real {
    type Output = Vec3;
    #[inline(always)]
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl MulAssign<Real> for Vec3 {
    #[inline(always)]
    fn mul_assign(&mut self, t: Real) {
        self.x *= t;
        self.y *= t;
        self.z *= t;
    }
}

impl Div<Real> for Vec3 {
    type Output = Self;
    #[inline(always)]
    fn div(self, t: Real) -> Self {
        let inv = 1.0 / t;
        Self::new(self.x * inv, self.y * inv, self.z * inv)
    }
}

impl DivAssign<Real> for Vec3 {
    #[inline(always)]
    fn div_assign(&mut self, t: Real) {
        let inv = 1.0 / t;
        self.x *= inv;
        self.y *= inv;
        self.z *= inv;
    }
}

impl Index<usize> for Vec3 {
    type Output = Real;
    fn index(&self, i: usize) -> &Real {
        match i {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 index out of bounds: {i}"),
        }
    }
}

// ─── Ray ────────────────────────────────────────────────────────────────────

/// A parametric ray R(t) = origin + t·direction.
///
/// `inv_dir` and `abs_inv_dir` (componentwise reciprocal and its absolute
/// value) are precomputed so the box predicate never divides inside the hot
/// loop. The two constructors are the only way to set `direction`, so the
/// precomputed vectors can never go stale.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Point3,
    direction: Vec3,
    pub inv_dir: Vec3,
    pub abs_inv_dir: Vec3,
}

impl Ray {
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self::with_direction(origin, direction.normalized())
    }

    /// Like `new`, but takes `direction` as-is (already known to be unit).
    pub fn with_direction(origin: Point3, direction: Vec3) -> Self {
        let inv_dir = Vec3::new(1.0 / direction.x, 1.0 / direction.y, 1.0 / direction.z);
        let abs_inv_dir = Vec3::new(inv_dir.x.abs(), inv_dir.y.abs(), inv_dir.z.abs());
        Self {
            origin,
            direction,
            inv_dir,
            abs_inv_dir,
        }
    }

    #[inline(always)]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline(always)]
    pub fn at(&self, t: Real) -> Point3 {
        self.origin + self.direction * t
    }

    /// Nudges the ray's origin along a `Hit`'s pre-oriented normal to avoid
    /// self-intersection ("shadow acne"). `normal` is expected to already
    /// point back toward the side the generating ray arrived from (as
    /// `Hit::normal` always does); `outward_bias` selects whether the new
    /// segment continues on that same side (reflection) or crosses to the
    /// other side (transmission).
    pub fn biased_from(point: Point3, direction: Vec3, normal: Vec3, outward_bias: bool) -> Self {
        const BIAS: Real = 1e-3;
        let sign = if outward_bias { 1.0 } else { -1.0 };
        Self::new(point + normal * (sign * BIAS), direction)
    }
}
