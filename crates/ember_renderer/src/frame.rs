//! Frame scheduling on a fixed worker pool.
//!
//! Each frame every worker draws random screen points and shades them
//! until the frame's deadline passes. The call returns once all workers
//! have finished their last sample, which is the frame barrier.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::{gen_f32, PixelBuffer, RayTracer, RenderError};

/// What one frame produced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Index of the frame, starting at 0
    pub frame: u64,
    /// Samples written across all workers
    pub samples: u64,
    /// Wall-clock time from start to barrier
    pub elapsed: Duration,
}

impl FrameStats {
    pub fn samples_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.samples as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs frames on a pool of `num_threads` workers that lives as long as
/// the scheduler.
pub struct FrameScheduler {
    pool: ThreadPool,
    seed: u64,
    frame: u64,
}

impl FrameScheduler {
    pub fn new(num_threads: usize, seed: u64) -> Result<Self, RenderError> {
        if num_threads == 0 {
            return Err(RenderError::NoThreads);
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("ember-worker-{i}"))
            .build()?;

        log::info!("Started render pool with {} threads", num_threads);

        Ok(Self {
            pool,
            seed,
            frame: 0,
        })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Index the next frame will get.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    /// Sample until `budget` has elapsed since the call.
    ///
    /// Samples started before the deadline always finish, so a frame can
    /// overrun by up to one sample per worker.
    pub fn render_frame(
        &mut self,
        tracer: &RayTracer<'_>,
        buffer: &PixelBuffer,
        budget: Duration,
    ) -> FrameStats {
        let start = Instant::now();
        let deadline = start + budget;
        self.run(tracer, buffer, start, |_| Instant::now() < deadline)
    }

    /// Take exactly `samples_per_thread` samples on every worker.
    pub fn render_fixed(
        &mut self,
        tracer: &RayTracer<'_>,
        buffer: &PixelBuffer,
        samples_per_thread: u64,
    ) -> FrameStats {
        self.run(tracer, buffer, Instant::now(), |taken| taken < samples_per_thread)
    }

    fn run<F>(
        &mut self,
        tracer: &RayTracer<'_>,
        buffer: &PixelBuffer,
        start: Instant,
        keep_going: F,
    ) -> FrameStats
    where
        F: Fn(u64) -> bool + Sync,
    {
        let frame = self.frame;
        self.frame += 1;

        let seed = self.seed;
        // The buffer cannot be resized while it is borrowed for the frame
        let projection = tracer.projection_for(buffer);

        let per_worker = self.pool.broadcast(|ctx| {
            let mut rng = StdRng::seed_from_u64(worker_seed(seed, frame, ctx.index()));
            let mut taken = 0u64;
            while keep_going(taken) {
                let x = gen_f32(&mut rng);
                let y = gen_f32(&mut rng);
                tracer.sample_projected(&projection, buffer, x, y, &mut rng);
                taken += 1;
            }
            taken
        });

        let stats = FrameStats {
            frame,
            samples: per_worker.iter().sum(),
            elapsed: start.elapsed(),
        };
        log::debug!(
            "Frame {}: {} samples in {:.1} ms",
            stats.frame,
            stats.samples,
            stats.elapsed.as_secs_f64() * 1000.0
        );
        stats
    }
}

/// Distinct, reproducible seed per (session seed, frame, worker).
fn worker_seed(seed: u64, frame: u64, worker: usize) -> u64 {
    // SplitMix64-style mixing so neighbouring frames and workers diverge
    let mut z = seed
        ^ frame.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (worker as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
