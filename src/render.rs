use crate::math::{Color, Real};
use crate::pathtracer::{pathtrace, pathtrace_multisample, RouletteConfig};
use crate::rng::thread_rng_for;
use crate::scene::Scene;
use crossterm::style::{self, Stylize};
use rayon::prelude::*;
use std::io::{self, Write};
use std::sync::Mutex;

/// Everything `render` needs beyond the `Scene` itself: how many primary
/// samples per pixel, how deep paths may bounce, and which of the two
/// pathtrace variants to run. `multisample` mirrors the source's own
/// optional feature: `None` runs the single-sample integrator once per
/// primary sample; `Some(n)` instead fires one primary ray per pixel and
/// fans it out into `n` secondary rays at the first hit.
pub struct RenderConfig {
    pub samples_per_pixel: u32,
    pub max_bounces: u32,
    pub seed: u64,
    pub init_refraction_index: Real,
    pub roulette: RouletteConfig,
    pub multisample: Option<u32>,
    pub gamma: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            samples_per_pixel: 50,
            max_bounces: 12,
            seed: 42,
            init_refraction_index: 1.0,
            roulette: RouletteConfig::default(),
            multisample: None,
            gamma: true,
        }
    }
}

// ─── Framebuffer ────────────────────────────────────────────────────────────

pub struct Framebuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::zero(); width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    /// Writes the framebuffer as a binary PPM (P6) — lossless preview output,
    /// viewable with most image tools without pulling in a BMP/PNG codec.
    pub fn write_ppm(&self, path: &str) -> io::Result<()> {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        write!(file, "P6\n{} {}\n255\n", self.width, self.height)?;
        for pixel in &self.pixels {
            let (r, g, b) = pixel.to_rgb8();
            file.write_all(&[r, g, b])?;
        }
        file.flush()
    }

    /// Writes an uncompressed 24bpp Windows BMP: 14-byte file header, 40-byte
    /// `BITMAPINFOHEADER`, then bottom-up BGR rows padded to a 4-byte stride.
    pub fn write_bmp(&self, path: &str) -> io::Result<()> {
        let row_stride = (self.width * 3 + 3) / 4 * 4;
        let pixel_data_size = row_stride * self.height;
        let file_size = 14 + 40 + pixel_data_size;

        let mut file = io::BufWriter::new(std::fs::File::create(path)?);

        file.write_all(b"BM")?;
        file.write_all(&(file_size as u32).to_le_bytes())?;
        file.write_all(&0u32.to_le_bytes())?;
        file.write_all(&(54u32).to_le_bytes())?;

        file.write_all(&(40u32).to_le_bytes())?;
        file.write_all(&(self.width as i32).to_le_bytes())?;
        file.write_all(&(self.height as i32).to_le_bytes())?;
        file.write_all(&(1u16).to_le_bytes())?;
        file.write_all(&(24u16).to_le_bytes())?;
        file.write_all(&0u32.to_le_bytes())?;
        file.write_all(&(pixel_data_size as u32).to_le_bytes())?;
        file.write_all(&(2835i32).to_le_bytes())?;
        file.write_all(&(2835i32).to_le_bytes())?;
        file.write_all(&0u32.to_le_bytes())?;
        file.write_all(&0u32.to_le_bytes())?;

        let pad = vec![0u8; row_stride - self.width * 3];
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let (r, g, b) = self.get(x, y).to_rgb8();
                file.write_all(&[b, g, r])?;
            }
            file.write_all(&pad)?;
        }
        file.flush()
    }
}

// ─── Render statistics ──────────────────────────────────────────────────────

pub struct RenderStats {
    pub total_rays: u64,
    pub elapsed_secs: f64,
    pub width: usize,
    pub height: usize,
    pub spp: u32,
    pub multisample: Option<u32>,
    pub roulette_enabled: bool,
}

impl RenderStats {
    pub fn mrays_per_sec(&self) -> f64 {
        self.total_rays as f64 / self.elapsed_secs / 1e6
    }

    pub fn print_summary(&self) {
        let fill = "━".repeat(30);
        let integrator = match self.multisample {
            Some(n) => format!("multisample x{n}"),
            None => "single-sample".to_string(),
        };
        eprintln!("  {fill}");
        eprintln!("  Time:       {:.2}s", self.elapsed_secs);
        eprintln!("  Rays:       {:.2}M total", self.total_rays as f64 / 1e6);
        eprintln!("  Speed:      {:.2} Mrays/s", self.mrays_per_sec());
        eprintln!("  Image:      {}×{} @ {} spp", self.width, self.height, self.spp);
        eprintln!("  Integrator: {integrator}, roulette {}", if self.roulette_enabled { "on" } else { "off" });
        eprintln!("  {fill}");
    }
}

// ─── Progress reporter ──────────────────────────────────────────────────────

/// A Unicode progress bar rendered to stderr, ticked once per completed row.
/// Guarded by a `Mutex` since rows complete out of order across worker threads.
/// Unlike a generic row counter, it tracks `rays_per_row` so the live status
/// line reports the same Mrays/s throughput `RenderStats` reports at the end,
/// rather than a row-only ETA.
struct ProgressBar {
    total: u32,
    done: u32,
    last_pct: u32,
    rays_per_row: u64,
    start: std::time::Instant,
}

impl ProgressBar {
    fn new(total: u32, rays_per_row: u64) -> Self {
        Self {
            total,
            done: 0,
            last_pct: 0,
            rays_per_row,
            start: std::time::Instant::now(),
        }
    }

    fn tick(&mut self) {
        self.done += 1;
        let pct = self.done * 100 / self.total;
        if pct != self.last_pct {
            let elapsed = self.start.elapsed().as_secs_f64();
            let rate = self.done as f64 / elapsed;
            let remaining = (self.total - self.done) as f64 / rate;
            let mrays_per_sec = (self.done as u64 * self.rays_per_row) as f64 / elapsed / 1e6;
            let bar_width = 24;
            let filled = (pct as usize * bar_width) / 100;
            let empty = bar_width - filled;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));
            eprint!("\r  Rendering: │{bar}│ {pct:3}%  {mrays_per_sec:.1} Mrays/s  ETA {remaining:.0}s   ");
            self.last_pct = pct;
        }
    }

    fn finish(&self) {
        let elapsed = self.start.elapsed().as_secs_f64();
        let bar = "█".repeat(24);
        let mrays_per_sec = (self.total as u64 * self.rays_per_row) as f64 / elapsed / 1e6;
        eprintln!("\r  Rendering: │{bar}│ 100%  {mrays_per_sec:.1} Mrays/s  {elapsed:.2}s       ");
    }
}

/// Renders `scene` row-parallel via `rayon`: each row owns a disjoint slice
/// of the framebuffer and, within it, a per-pixel PRNG seeded from
/// `config.seed ^ pixel_index` — reproducible regardless of how rows happen
/// to be scheduled across threads.
pub fn render(scene: &Scene, config: &RenderConfig) -> (Framebuffer, RenderStats) {
    let width = scene.camera.width();
    let height = scene.camera.height();
    let mut fb = Framebuffer::new(width, height);
    let rays_per_row = width as u64 * config.samples_per_pixel as u64;
    let progress = Mutex::new(ProgressBar::new(height as u32, rays_per_row));
    let t0 = std::time::Instant::now();

    fb.pixels.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        for (x, out) in row.iter_mut().enumerate() {
            let pixel_index = (y * width + x) as u64;
            let mut rng = thread_rng_for(config.seed, pixel_index);
            let mut sum = Color::zero();
            for _ in 0..config.samples_per_pixel {
                let ray = scene.camera.get_ray(x, y, &mut rng);
                sum = sum
                    + match config.multisample {
                        Some(n) => pathtrace_multisample(scene, ray, config.max_bounces, n, config.roulette, &mut rng),
                        None => pathtrace(scene, ray, config.max_bounces, config.init_refraction_index, config.roulette, &mut rng),
                    };
            }
            let mut color = sum / config.samples_per_pixel as Real;
            if config.gamma {
                color = color.gamma_correct();
            }
            *out = color;
        }
        progress.lock().unwrap().tick();
    });
    progress.lock().unwrap().finish();

    let elapsed = t0.elapsed();
    let stats = RenderStats {
        total_rays: width as u64 * height as u64 * config.samples_per_pixel as u64,
        elapsed_secs: elapsed.as_secs_f64(),
        width,
        height,
        spp: config.samples_per_pixel,
        multisample: config.multisample,
        roulette_enabled: config.roulette.enabled,
    };
    (fb, stats)
}

// ─── Terminal preview ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Braille,
    TrueColor,
    HalfBlock,
    Ascii,
}

pub fn display_framebuffer(fb: &Framebuffer, mode: OutputMode) {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    match mode {
        OutputMode::TrueColor => display_truecolor(&mut out, fb),
        OutputMode::HalfBlock => display_halfblock(&mut out, fb),
        OutputMode::Ascii => display_ascii(&mut out, fb),
        OutputMode::Braille => display_braille(&mut out, fb),
    }
    let _ = out.flush();
}

/// Shared by every RGB-capable preview mode below, so the `Color` -> terminal
/// RGB conversion lives in one place instead of being re-spelled per mode.
fn rgb_style(c: Color) -> style::Color {
    let (r, g, b) = c.to_rgb8();
    style::Color::Rgb { r, g, b }
}

fn display_truecolor(out: &mut impl Write, fb: &Framebuffer) {
    for y in 0..fb.height {
        for x in 0..fb.width {
            let _ = write!(out, "{}", "█".with(rgb_style(fb.get(x, y))));
        }
        let _ = writeln!(out);
    }
}

fn display_halfblock(out: &mut impl Write, fb: &Framebuffer) {
    let rows = fb.height / 2;
    for row in 0..rows {
        for x in 0..fb.width {
            let top = rgb_style(fb.get(x, row * 2));
            let bottom = rgb_style(fb.get(x, row * 2 + 1));
            let _ = write!(out, "{}", "▀".with(top).on(bottom));
        }
        let _ = writeln!(out);
    }
}

fn display_ascii(out: &mut impl Write, fb: &Framebuffer) {
    const RAMP: &[u8] = b" .:-=+*#%@";
    for y in 0..fb.height {
        for x in 0..fb.width {
            let lum = fb.get(x, y).luminance();
            let idx = (lum.clamp(0.0, 0.999) * RAMP.len() as f64) as usize;
            let _ = write!(out, "{}", RAMP[idx] as char);
        }
        let _ = writeln!(out);
    }
}

/// Each braille glyph (U+2800..U+28FF) packs a 2×4 dot matrix, giving 2×
/// horizontal and 4× vertical subpixel resolution in a monospace cell.
fn display_braille(out: &mut impl Write, fb: &Framebuffer) {
    let cell_w = 2usize;
    let cell_h = 4usize;
    let cols = fb.width / cell_w;
    let rows = fb.height / cell_h;

    for row in 0..rows {
        for col in 0..cols {
            let bx = col * cell_w;
            let by = row * cell_h;

            let mut pattern: u8 = 0;
            let mut avg_color = Color::zero();
            let mut lit_count = 0u32;

            let offsets: [(usize, usize, u8); 8] =
                [(0, 0, 0), (0, 1, 1), (0, 2, 2), (1, 0, 3), (1, 1, 4), (1, 2, 5), (0, 3, 6), (1, 3, 7)];

            for &(dx, dy, bit) in &offsets {
                let px = bx + dx;
                let py = by + dy;
                if px < fb.width && py < fb.height {
                    let c = fb.get(px, py);
                    if c.luminance() > 0.15 {
                        pattern |= 1 << bit;
                        avg_color += c;
                        lit_count += 1;
                    }
                }
            }

            if lit_count > 0 {
                avg_color /= lit_count as f64;
            }

            let braille_char = char::from_u32(0x2800 + pattern as u32).unwrap_or(' ');
            let _ = write!(out, "{}", braille_char.to_string().with(rgb_style(avg_color)));
        }
        let _ = writeln!(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{Camera, CameraConfig};
    use crate::material::Material;
    use crate::math::Point3;
    use crate::primitive::Primitive;
    use crate::scene::Background;

    fn tiny_scene() -> Scene {
        let primitives = vec![Primitive::Sphere {
            center: Point3::new(0.0, 0.0, -3.0),
            radius: 1.0,
            material: 0,
            texture_info: None,
        }];
        let camera = Camera::new(&CameraConfig {
            width: 8,
            height: 6,
            pixel_jitter_std_dev: 0.0,
            ..CameraConfig::default()
        });
        Scene::new(
            primitives,
            vec![Material::diffuse(Color::new(0.8, 0.3, 0.3))],
            Vec::new(),
            Vec::new(),
            Vec::new(),
            camera,
            Background::Constant(Color::new(0.5, 0.7, 1.0)),
            0,
        )
    }

    #[test]
    fn render_fills_every_pixel_with_finite_color() {
        let scene = tiny_scene();
        let config = RenderConfig {
            samples_per_pixel: 2,
            max_bounces: 4,
            ..RenderConfig::default()
        };
        let (fb, stats) = render(&scene, &config);
        assert_eq!(fb.pixels.len(), 8 * 6);
        assert!(fb.pixels.iter().all(|c| c.x.is_finite() && c.y.is_finite() && c.z.is_finite()));
        assert_eq!(stats.total_rays, 8 * 6 * 2);
    }

    #[test]
    fn same_seed_is_deterministic_across_runs() {
        let scene = tiny_scene();
        let config = RenderConfig {
            samples_per_pixel: 4,
            max_bounces: 4,
            seed: 7,
            ..RenderConfig::default()
        };
        let (a, _) = render(&scene, &config);
        let (b, _) = render(&scene, &config);
        for (pa, pb) in a.pixels.iter().zip(b.pixels.iter()) {
            assert_eq!(pa.x, pb.x);
            assert_eq!(pa.y, pb.y);
            assert_eq!(pa.z, pb.z);
        }
    }
}
