use anyhow::{Context, Result};
use ember_core::{RenderSettings, SceneDescription};
use ember_renderer::{FrameScheduler, PixelBuffer, RayTracer, Scene, TracerConfig};

mod args;

use args::{snapshot_path, Args, USAGE};

/// Frames rendered when `--frames` is not given, in seconds at the target fps.
const DEFAULT_SECONDS: u64 = 5;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            println!("{}", USAGE);
            return Ok(());
        }
        Err(err) => {
            eprintln!("error: {:#}\n\n{}", err, USAGE);
            std::process::exit(2);
        }
    };

    run(&args)
}

fn run(args: &Args) -> Result<()> {
    log::info!("Starting Ember");

    let settings = RenderSettings::from_file(&args.config)
        .with_context(|| format!("Failed to load config {}", args.config.display()))?;
    let description = SceneDescription::from_file(&args.scene)
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let mut scene = Scene::from_description(&description).context("Failed to build scene")?;
    scene.create_accelerated_structure(settings.bvh_leaf_threshold)?;

    let tracer = RayTracer::new(&scene, TracerConfig::from(&settings));
    let mut buffer = PixelBuffer::new(settings.window_width, settings.window_height);
    let mut scheduler = FrameScheduler::new(settings.num_threads, settings.seed)?;

    let frames = args
        .frames
        .unwrap_or(settings.fps as u64 * DEFAULT_SECONDS);
    let budget = settings.frame_duration();
    log::info!(
        "Rendering {} frames of {:.1} ms on {} threads",
        frames,
        budget.as_secs_f64() * 1000.0,
        scheduler.num_threads()
    );

    for frame in 0..frames {
        if let Some(resize) = args.resize.filter(|r| r.frame == frame) {
            buffer.resize(resize.width, resize.height);
        }

        let stats = scheduler.render_frame(&tracer, &buffer, budget);
        log::info!(
            "Frame {}/{}: {} samples ({:.0}/s), {} total",
            stats.frame + 1,
            frames,
            stats.samples,
            stats.samples_per_second(),
            buffer.total_samples()
        );

        let done = frame + 1;
        if let Some(every) = args.snapshot_every {
            if done % every == 0 && done < frames {
                let path = snapshot_path(&args.output, done);
                buffer
                    .save_png(&path)
                    .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
            }
        }
    }

    buffer
        .save_png(&args.output)
        .with_context(|| format!("Failed to write image {}", args.output.display()))?;

    Ok(())
}
