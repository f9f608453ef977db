// src/analysis/mock.rs
use std::thread;
use std::time::Duration;

use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use rand::prelude::*;
use tracing::debug;

use super::error::AnalysisError;
use super::producer::{ImageProducer, ProducedImage};
use super::types::Coordinates;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;
const JPEG_QUALITY: u8 = 80;

const BACKGROUND: Rgb<u8> = Rgb([0x2d, 0x50, 0x16]);
pub const SIGNIFICANT: Rgb<u8> = Rgb([0xef, 0x44, 0x44]);
pub const MODERATE: Rgb<u8> = Rgb([0xf5, 0x9e, 0x0b]);
pub const WATER: Rgb<u8> = Rgb([0x3b, 0x82, 0xf6]);
const BAND: Rgb<u8> = Rgb([0x14, 0x24, 0x0a]);

/// Synthesizes a placeholder change map after a simulated processing delay
pub struct MockProducer {
    min_delay: Duration,
    max_delay: Duration,
}

impl MockProducer {
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        let max_delay = max_delay.max(min_delay);
        Self { min_delay, max_delay }
    }

    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    fn pick_delay(&self, rng: &mut impl Rng) -> Duration {
        if self.max_delay == self.min_delay {
            return self.min_delay;
        }
        let ms = rng.gen_range(self.min_delay.as_millis()..=self.max_delay.as_millis());
        Duration::from_millis(ms as u64)
    }
}

impl Default for MockProducer {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000), Duration::from_millis(4000))
    }
}

impl ImageProducer for MockProducer {
    fn produce(&self, location: Coordinates) -> Result<ProducedImage, AnalysisError> {
        let mut rng = thread_rng();
        let delay = self.pick_delay(&mut rng);
        debug!(?delay, "simulating processing time");
        thread::sleep(delay);

        let image = render_change_map(&mut rng);
        let mut bytes = Vec::new();
        image.write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))
            .map_err(|e| AnalysisError::Image(e.to_string()))?;

        debug!(lat = location.lat, lng = location.lng, size = bytes.len(), "mock change map ready");
        Ok(ProducedImage { bytes, extension: "jpg" })
    }

    fn is_demo(&self) -> bool {
        true
    }
}

pub fn render_change_map(rng: &mut impl Rng) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    // vegetation texture
    for _ in 0..100 {
        let color = Rgb([
            rng.gen_range(45..=85),
            rng.gen_range(80..=120),
            rng.gen_range(16..=36),
        ]);
        let x = rng.gen_range(0..WIDTH);
        let y = rng.gen_range(0..HEIGHT);
        let w = rng.gen_range(1..=20);
        let h = rng.gen_range(1..=20);
        fill_rect(&mut img, x, y, w, h, color);
    }

    fill_circle(&mut img, 400, 200, 50, SIGNIFICANT);
    fill_circle(&mut img, 600, 400, 30, SIGNIFICANT);
    fill_circle(&mut img, 200, 300, 25, MODERATE);
    fill_circle(&mut img, 650, 150, 35, MODERATE);
    fill_rect(&mut img, 50, 450, 200, 100, WATER);

    // header and footer bands where a caption would sit
    fill_rect(&mut img, 0, 20, WIDTH, 44, BAND);
    fill_rect(&mut img, 0, HEIGHT - 36, WIDTH, 36, BAND);

    img
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = (x + w).min(img.width());
    let y_end = (y + h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

fn fill_circle(img: &mut RgbImage, cx: i64, cy: i64, r: i64, color: Rgb<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    for py in (cy - r).max(0)..(cy + r + 1).min(h) {
        for px in (cx - r).max(0)..(cx + r + 1).min(w) {
            let (dx, dy) = (px - cx, py - cy);
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}
