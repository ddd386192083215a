//! Progressive accumulation buffer.
//!
//! Every pixel keeps the running mean of all samples written to it and the
//! number of samples behind that mean. Render workers share the buffer by
//! reference; one mutex guards the whole image and each update holds it for
//! a single pixel's read-modify-write.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::Color;
use image::{ImageResult, RgbaImage};

#[derive(Debug, Default)]
struct PixelData {
    colors: Vec<Color>,
    samples: Vec<u32>,
}

impl PixelData {
    fn zeroed(len: usize) -> Self {
        Self {
            colors: vec![Color::ZERO; len],
            samples: vec![0; len],
        }
    }
}

/// Row-major running-average RGB image.
#[derive(Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Mutex<PixelData>,
}

impl PixelBuffer {
    /// Create a buffer with every pixel at zero samples.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: Mutex::new(PixelData::zeroed(width as usize * height as usize)),
        }
    }

    // A panicking writer cannot leave a pixel half-updated: the mean and
    // the count are assigned after all arithmetic is done.
    fn lock(&self) -> MutexGuard<'_, PixelData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| (y * self.width + x) as usize)
    }

    /// Fold one sample into the running mean of pixel `(x, y)`.
    ///
    /// Out-of-range coordinates are ignored.
    pub fn set_pixel(&self, x: u32, y: u32, color: Color) {
        let Some(index) = self.index(x, y) else {
            log::debug!(
                "Dropping sample outside {}x{} buffer at ({}, {})",
                self.width,
                self.height,
                x,
                y
            );
            return;
        };

        let mut data = self.lock();
        let n = data.samples[index] as f32;
        let mean = data.colors[index] * (n / (n + 1.0)) + color * (1.0 / (n + 1.0));
        data.colors[index] = mean;
        data.samples[index] += 1;
    }

    /// Current mean of pixel `(x, y)`; zero outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Color {
        self.index(x, y)
            .map(|index| self.lock().colors[index])
            .unwrap_or(Color::ZERO)
    }

    /// Samples accumulated at `(x, y)`; zero outside the buffer.
    pub fn samples(&self, x: u32, y: u32) -> u32 {
        self.index(x, y)
            .map(|index| self.lock().samples[index])
            .unwrap_or(0)
    }

    /// Copy of the image as row-major RGB float triplets.
    pub fn pixels(&self) -> Vec<f32> {
        self.with_pixels(<[f32]>::to_vec)
    }

    /// Borrow the row-major RGB float triplets under the lock.
    pub fn with_pixels<R>(&self, f: impl FnOnce(&[f32]) -> R) -> R {
        let data = self.lock();
        f(bytemuck::cast_slice(data.colors.as_slice()))
    }

    /// `(width, height)` in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Sum of sample counts over all pixels.
    pub fn total_samples(&self) -> u64 {
        self.lock().samples.iter().map(|&n| n as u64).sum()
    }

    /// Reallocate to a new size, discarding every sample.
    ///
    /// Takes `&mut self`, so no worker can be writing while it runs.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::info!(
            "Resizing pixel buffer {}x{} -> {}x{}",
            self.width,
            self.height,
            width,
            height
        );
        self.width = width;
        self.height = height;
        *self.data.get_mut().unwrap_or_else(PoisonError::into_inner) =
            PixelData::zeroed(width as usize * height as usize);
    }

    /// Reset every pixel to zero samples, keeping the size.
    pub fn clear(&self) {
        let mut data = self.lock();
        data.colors.fill(Color::ZERO);
        data.samples.fill(0);
    }

    /// Gamma-encoded 8-bit copy of the current image.
    pub fn to_image(&self) -> RgbaImage {
        let data = self.lock();
        let mut bytes = Vec::with_capacity(data.colors.len() * 4);
        for color in &data.colors {
            bytes.extend_from_slice(&color_to_rgba(*color));
        }
        // Length matches width * height * 4 by construction
        RgbaImage::from_raw(self.width, self.height, bytes)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Write the current image as a PNG (format picked from the extension).
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let path = path.as_ref();
        self.to_image().save(path)?;
        log::info!(
            "Saved {}x{} snapshot ({} samples) to {}",
            self.width,
            self.height,
            self.total_samples(),
            path.display()
        );
        Ok(())
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to gamma-encoded 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let encode = |c: f32| (255.0 * linear_to_gamma(c).clamp(0.0, 1.0)) as u8;
    [encode(color.x), encode(color.y), encode(color.z), 255]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use rayon::prelude::*;

    fn mean(colors: &[Color]) -> Color {
        colors.iter().copied().sum::<Color>() / colors.len() as f32
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = PixelBuffer::new(4, 3);

        assert_eq!(buffer.size(), (4, 3));
        assert_eq!(buffer.pixels(), vec![0.0; 4 * 3 * 3]);
        assert_eq!(buffer.total_samples(), 0);
    }

    #[test]
    fn test_running_mean_any_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut colors: Vec<Color> = (0..200)
            .map(|_| Color::new(rng.gen(), rng.gen(), rng.gen()) * 4.0)
            .collect();
        let expected = mean(&colors);

        for _ in 0..5 {
            colors.shuffle(&mut rng);
            let buffer = PixelBuffer::new(2, 2);
            for &c in &colors {
                buffer.set_pixel(1, 0, c);
            }

            assert_eq!(buffer.samples(1, 0), colors.len() as u32);
            assert!((buffer.pixel(1, 0) - expected).length() < 1e-4);
            assert_eq!(buffer.samples(0, 0), 0);
        }
    }

    #[test]
    fn test_concurrent_writers_produce_mean() {
        let buffer = PixelBuffer::new(3, 3);
        let colors: Vec<Color> = (0..4000)
            .map(|i| Color::splat((i % 10) as f32))
            .collect();

        colors.par_iter().for_each(|&c| buffer.set_pixel(2, 1, c));

        assert_eq!(buffer.samples(2, 1), 4000);
        assert!((buffer.pixel(2, 1) - Color::splat(4.5)).length() < 1e-3);
    }

    #[test]
    fn test_scoped_threads_share_buffer() {
        let buffer = PixelBuffer::new(8, 8);

        std::thread::scope(|s| {
            for t in 0..4 {
                let buffer = &buffer;
                s.spawn(move || {
                    for i in 0..64 {
                        buffer.set_pixel(i % 8, i / 8, Color::splat(t as f32));
                    }
                });
            }
        });

        assert_eq!(buffer.total_samples(), 4 * 64);
        assert!((buffer.pixel(5, 5) - Color::splat(1.5)).length() < 1e-5);
    }

    #[test]
    fn test_out_of_range_writes_ignored() {
        let buffer = PixelBuffer::new(2, 2);
        buffer.set_pixel(2, 0, Color::ONE);
        buffer.set_pixel(0, 2, Color::ONE);

        assert_eq!(buffer.total_samples(), 0);
        assert_eq!(buffer.pixel(5, 5), Color::ZERO);
    }

    #[test]
    fn test_pixels_are_row_major_triplets() {
        let buffer = PixelBuffer::new(3, 2);
        buffer.set_pixel(1, 1, Color::new(0.1, 0.2, 0.3));

        let pixels = buffer.pixels();
        // Pixel (1, 1) of a 3-wide image
        let offset = 4 * 3;
        assert_eq!(&pixels[offset..offset + 3], &[0.1, 0.2, 0.3]);
        assert_eq!(buffer.with_pixels(|p| p.len()), 3 * 2 * 3);
    }

    #[test]
    fn test_resize_discards_samples() {
        let mut buffer = PixelBuffer::new(4, 4);
        buffer.set_pixel(3, 3, Color::ONE);

        buffer.resize(6, 2);

        assert_eq!(buffer.size(), (6, 2));
        assert_eq!(buffer.total_samples(), 0);
        assert_eq!(buffer.pixels().len(), 6 * 2 * 3);
        buffer.set_pixel(5, 1, Color::ONE);
        assert_eq!(buffer.samples(5, 1), 1);
    }

    #[test]
    fn test_clear() {
        let buffer = PixelBuffer::new(2, 2);
        buffer.set_pixel(0, 0, Color::ONE);
        buffer.clear();

        assert_eq!(buffer.samples(0, 0), 0);
        assert_eq!(buffer.pixel(0, 0), Color::ZERO);
    }

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert!((linear_to_gamma(1.0) - 1.0).abs() < 0.0001);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::ONE), [255, 255, 255, 255]);
        // Over-bright values clamp
        assert_eq!(color_to_rgba(Color::splat(9.0)), [255, 255, 255, 255]);
        assert_eq!(color_to_rgba(Color::new(0.25, 0.0, 0.0))[0], 127);
    }

    #[test]
    fn test_to_image() {
        let buffer = PixelBuffer::new(3, 2);
        buffer.set_pixel(2, 1, Color::ONE);

        let image = buffer.to_image();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.get_pixel(2, 1).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
    }
}
