#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use aurora_stego::{ImageSurface, PngSurface, Record, Result};
use image::{ImageBuffer, Rgb, RgbImage};
use serde_json::json;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// a carrier with varied colors so cleared and set LSBs both occur
pub fn carrier_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([
            (x * 7 + y) as u8,
            (y * 13 + x) as u8 | 1,
            (x ^ y) as u8,
        ])
    })
}

pub fn prepare_carrier(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    carrier_image(width, height)
        .save(&path)
        .expect("Failed to write the carrier image");

    path
}

pub fn member_record() -> Record {
    let mut record = Record::new();
    record.insert("card_id".to_string(), json!("aurora_001_crimson"));
    record.insert("member_id".to_string(), json!("m_1847392"));
    record.insert("name".to_string(), json!("Crimson"));
    record.insert("tier".to_string(), json!("Premium"));
    record.insert("credits".to_string(), json!(0));
    record.insert(
        "subscription".to_string(),
        json!({"status": "active", "perks": ["early_access", "vault"]}),
    );

    record
}

/// reads the big endian u32 length header from the first 32 bits
pub fn declared_length(bits: &[bool]) -> usize {
    bits[..32]
        .iter()
        .fold(0usize, |acc, bit| (acc << 1) | usize::from(*bit))
}

/// counts loads and saves on top of `PngSurface`
#[derive(Debug, Default)]
pub struct CountingSurface {
    pub loads: AtomicUsize,
    pub saves: AtomicUsize,
}

impl CountingSurface {
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ImageSurface for CountingSurface {
    fn load(&self, path: &Path) -> Result<RgbImage> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        PngSurface.load(path)
    }

    fn save(&self, image: &RgbImage, path: &Path) -> Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        PngSurface.save(image, path)
    }
}
