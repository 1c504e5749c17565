//! photon-core — a physically-based Monte Carlo path tracer core, with a
//! terminal preview front-end.
//!
//! Solves the rendering equation
//!
//! ```text
//!   L_o(p, w_o) = L_e(p, w_o) + Integral_Omega f_r(p, w_i, w_o) L_i(p, w_i) |cos theta_i| dw_i
//! ```
//!
//! via unidirectional Monte Carlo path tracing, importance-sampling each
//! surface's BRDF lobe at every bounce (see `pathtracer`/`shading`).

use clap::Parser;
use photon_core::cli::Cli;
use photon_core::math::Color;
use photon_core::pathtracer::RouletteConfig;
use photon_core::render::{self, display_framebuffer, Framebuffer, RenderConfig};
use photon_core::rtdata::RtData;
use photon_core::scene::Scene;
use std::path::Path;

fn main() {
    let cli = Cli::parse();
    let preset = cli.scene.build(cli.width, cli.height, cli.polygons_per_bounding);
    let scene = preset.scene;

    let spp = cli.spp.unwrap_or(preset.default_samples_per_pixel);
    let max_bounces = cli.bounces.unwrap_or(preset.default_max_bounces);
    let roulette = RouletteConfig { enabled: cli.roulette, ..RouletteConfig::default() };

    eprintln!();
    eprintln!("  photon-core — physically-based path tracer");
    eprintln!("  Scene: {}  ({}x{})", preset.name, cli.width, cli.height);
    eprintln!();

    match cli.rays {
        Some(rays) => run_fixed_sample(&scene, &cli, rays, max_bounces, roulette),
        None => run_interactive(&scene, &cli, spp, max_bounces, roulette),
    }
}

/// `--rays <N>`: renders exactly `N` samples per pixel once, writes
/// `image.bmp` and `image.rtdata`, and exits — the original CLI's
/// non-interactive batch mode.
fn run_fixed_sample(scene: &Scene, cli: &Cli, rays: u32, max_bounces: u32, roulette: RouletteConfig) {
    let config = RenderConfig {
        samples_per_pixel: rays,
        max_bounces,
        seed: cli.seed,
        roulette,
        multisample: cli.multisample,
        gamma: false,
        ..RenderConfig::default()
    };
    let (fb, stats) = render::render(scene, &config);
    stats.print_summary();

    let mut preview = Framebuffer::new(fb.width, fb.height);
    for (out, linear) in preview.pixels.iter_mut().zip(&fb.pixels) {
        *out = if cli.no_gamma { *linear } else { linear.gamma_correct() };
    }

    if let Err(e) = preview.write_bmp("image.bmp") {
        eprintln!("error writing image.bmp: {e}");
        std::process::exit(1);
    }

    let rtdata = RtData::from_framebuffer(&fb, rays as u64);
    if let Err(e) = rtdata.write(Path::new("image.rtdata")) {
        eprintln!("error writing image.rtdata: {e}");
        std::process::exit(1);
    }

    eprintln!("  wrote image.bmp, image.rtdata");
}

/// Default mode: renders one sample pass at a time, displaying the running
/// average after every pass. Space/Enter (or any other key) advance to the
/// next pass, `b`/`r` snapshot the current accumulator to disk, and Esc
/// exits — matching the original viewer loop's key bindings.
fn run_interactive(scene: &Scene, cli: &Cli, samples_per_pass: u32, max_bounces: u32, roulette: RouletteConfig) {
    use crossterm::event::{self, Event, KeyCode};
    use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

    let width = scene.camera.width();
    let height = scene.camera.height();
    let mut accumulator = vec![Color::zero(); width * height];
    let mut total_samples: u64 = 0;
    let mode = cli.mode.into();

    let _ = enable_raw_mode();
    loop {
        let pass_config = RenderConfig {
            samples_per_pixel: samples_per_pass,
            max_bounces,
            seed: cli.seed ^ total_samples,
            roulette,
            multisample: cli.multisample,
            gamma: false,
            ..RenderConfig::default()
        };
        let (fb, _) = render::render(scene, &pass_config);
        for (acc, sample) in accumulator.iter_mut().zip(&fb.pixels) {
            *acc = *acc + *sample * samples_per_pass as f64;
        }
        total_samples += samples_per_pass as u64;

        let mut preview = Framebuffer::new(width, height);
        for (out, acc) in preview.pixels.iter_mut().zip(&accumulator) {
            let averaged = *acc / total_samples as f64;
            *out = if cli.no_gamma { averaged } else { averaged.gamma_correct() };
        }
        display_framebuffer(&preview, mode);
        eprintln!("  {total_samples} samples/px");
        if total_samples % 10 == 0 {
            eprintln!("  (resynchronized)");
        }

        if let Ok(Event::Key(key)) = event::read() {
            match key.code {
                KeyCode::Esc => break,
                KeyCode::Char('b') => match preview.write_bmp("image.bmp") {
                    Ok(()) => eprintln!("  wrote image.bmp"),
                    Err(e) => eprintln!("error writing image.bmp: {e}"),
                },
                KeyCode::Char('r') => {
                    let rtdata = RtData { width, height, number_of_rays: total_samples, pixels: accumulator.clone() };
                    match rtdata.write(Path::new("image.rtdata")) {
                        Ok(()) => eprintln!("  wrote image.rtdata"),
                        Err(e) => eprintln!("error writing image.rtdata: {e}"),
                    }
                }
                _ => {}
            }
        }
    }
    let _ = disable_raw_mode();
}
