use crate::error::{PhotonError, Result};
use crate::math::Color;
use crate::render::Framebuffer;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Raw, unaveraged radiance accumulator: one `Color` sum per pixel plus the
/// sample count it was accumulated over. Distinct from a `Framebuffer`,
/// which always holds display-ready (averaged, optionally gamma-corrected)
/// colors — an `.rtdata` file is the intermediate state a render can be
/// checkpointed to and later resumed or combined from.
pub struct RtData {
    pub width: usize,
    pub height: usize,
    pub number_of_rays: u64,
    pub pixels: Vec<Color>,
}

impl RtData {
    /// Packages an already-averaged `Framebuffer` back into raw accumulator
    /// form by scaling each pixel by `number_of_rays`, the inverse of the
    /// averaging `to_framebuffer` performs.
    pub fn from_framebuffer(fb: &Framebuffer, number_of_rays: u64) -> Self {
        let scale = number_of_rays as f64;
        Self {
            width: fb.width,
            height: fb.height,
            number_of_rays,
            pixels: fb.pixels.iter().map(|c| *c * scale).collect(),
        }
    }

    /// Averages by `number_of_rays` and gamma-corrects, producing the same
    /// display-ready representation an ordinary render would.
    pub fn to_framebuffer(&self) -> Framebuffer {
        let mut fb = Framebuffer::new(self.width, self.height);
        let n = self.number_of_rays.max(1) as f64;
        for (out, sum) in fb.pixels.iter_mut().zip(&self.pixels) {
            *out = (*sum / n).gamma_correct();
        }
        fb
    }

    /// ASCII format: `width:<W> height:<H> number_of_rays:<N>`, then
    /// `W·H` lines of `r g b` in row-major `(i + j·W)` order.
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut file = std::fs::File::create(path).map_err(|source| PhotonError::Io { path: path.to_path_buf(), source })?;
        writeln!(file, "width:{} height:{} number_of_rays:{}", self.width, self.height, self.number_of_rays)
            .map_err(|source| PhotonError::Io { path: path.to_path_buf(), source })?;
        for pixel in &self.pixels {
            writeln!(file, "{} {} {}", pixel.x, pixel.y, pixel.z)
                .map_err(|source| PhotonError::Io { path: path.to_path_buf(), source })?;
        }
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| PhotonError::Io { path: path.to_path_buf(), source })?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .ok_or_else(|| parse_error(path, "missing header line"))?
            .map_err(|source| PhotonError::Io { path: path.to_path_buf(), source })?;
        let (width, height, number_of_rays) = parse_header(path, &header)?;

        let mut pixels = Vec::with_capacity(width * height);
        for line in lines {
            let line = line.map_err(|source| PhotonError::Io { path: path.to_path_buf(), source })?;
            let mut parts = line.split_whitespace();
            let (r, g, b) = (next_real(path, &mut parts)?, next_real(path, &mut parts)?, next_real(path, &mut parts)?);
            pixels.push(Color::new(r, g, b));
        }
        if pixels.len() != width * height {
            return Err(parse_error(
                path,
                &format!("expected {} pixel lines, found {}", width * height, pixels.len()),
            ));
        }

        Ok(Self { width, height, number_of_rays, pixels })
    }

    /// Pixelwise-sums several accumulators of matching dimensions, combining
    /// their ray counts too, so the merged file can still be averaged and
    /// displayed exactly like one produced by a single longer render.
    pub fn merge(datas: &[RtData]) -> Result<RtData> {
        let first = datas.first().ok_or_else(|| PhotonError::Parse {
            path: PathBuf::new(),
            message: "merge requires at least one .rtdata file".to_string(),
        })?;
        let (width, height) = (first.width, first.height);

        let mut pixels = vec![Color::zero(); width * height];
        let mut number_of_rays = 0u64;
        for data in datas {
            if data.width != width || data.height != height {
                return Err(PhotonError::Parse {
                    path: PathBuf::new(),
                    message: format!(
                        "dimension mismatch: expected {width}x{height}, found {}x{}",
                        data.width, data.height
                    ),
                });
            }
            for (out, pixel) in pixels.iter_mut().zip(&data.pixels) {
                *out = *out + *pixel;
            }
            number_of_rays += data.number_of_rays;
        }

        Ok(RtData { width, height, number_of_rays, pixels })
    }
}

fn parse_error(path: &Path, message: &str) -> PhotonError {
    PhotonError::Parse { path: path.to_path_buf(), message: message.to_string() }
}

fn parse_header(path: &Path, header: &str) -> Result<(usize, usize, u64)> {
    let mut width = None;
    let mut height = None;
    let mut number_of_rays = None;
    for field in header.split_whitespace() {
        let (key, value) = field.split_once(':').ok_or_else(|| parse_error(path, &format!("malformed header field '{field}'")))?;
        match key {
            "width" => width = value.parse().ok(),
            "height" => height = value.parse().ok(),
            "number_of_rays" => number_of_rays = value.parse().ok(),
            _ => {}
        }
    }
    match (width, height, number_of_rays) {
        (Some(w), Some(h), Some(n)) => Ok((w, h, n)),
        _ => Err(parse_error(path, "header must set width, height, and number_of_rays")),
    }
}

fn next_real(path: &Path, parts: &mut std::str::SplitWhitespace<'_>) -> Result<f64> {
    parts
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_error(path, "expected three floating-point components per pixel line"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> RtData {
        RtData {
            width: 2,
            height: 1,
            number_of_rays: 4,
            pixels: vec![Color::new(1.0, 2.0, 3.0), Color::new(4.0, 5.0, 6.0)],
        }
    }

    #[test]
    fn write_then_read_roundtrips() {
        let data = sample_data();
        let path = std::env::temp_dir().join("photon_core_rtdata_roundtrip_test.rtdata");
        data.write(&path).unwrap();
        let loaded = RtData::read(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.width, data.width);
        assert_eq!(loaded.height, data.height);
        assert_eq!(loaded.number_of_rays, data.number_of_rays);
        for (a, b) in data.pixels.iter().zip(&loaded.pixels) {
            assert!((a.x - b.x).abs() < 1e-9);
            assert!((a.y - b.y).abs() < 1e-9);
            assert!((a.z - b.z).abs() < 1e-9);
        }
    }

    #[test]
    fn merge_sums_pixels_and_ray_counts() {
        let a = sample_data();
        let b = sample_data();
        let merged = RtData::merge(&[a, b]).unwrap();
        assert_eq!(merged.number_of_rays, 8);
        assert!((merged.pixels[0].x - 2.0).abs() < 1e-9);
        assert!((merged.pixels[0].y - 4.0).abs() < 1e-9);
        assert!((merged.pixels[0].z - 6.0).abs() < 1e-9);
    }

    #[test]
    fn merge_rejects_dimension_mismatch() {
        let a = sample_data();
        let mut b = sample_data();
        b.width = 3;
        assert!(RtData::merge(&[a, b]).is_err());
    }

    #[test]
    fn to_framebuffer_averages_by_ray_count() {
        let data = sample_data();
        let fb = data.to_framebuffer();
        // un-gamma-corrected comparison: just check averaging happened before the sqrt.
        assert!((fb.pixels[0].x - (1.0f64 / 4.0).sqrt()).abs() < 1e-9);
    }
}
