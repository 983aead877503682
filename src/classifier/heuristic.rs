use anyhow::Context;
use image::imageops::FilterType;
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use super::{FoodClassifier, NutritionInfo, NutritionTable, Prediction};

/// Side length images are resized to before sampling.
pub const INPUT_SIZE: u32 = 224;

/// Mean channel intensities of an image, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStats {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
}

impl ColorStats {
    pub fn brightness(&self) -> f64 {
        (self.red + self.green + self.blue) / 3.0
    }

    /// Decodes, converts to RGB, resizes and averages.
    pub fn from_image_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let decoded = image::load_from_memory(bytes).context("decode image")?;
        let rgb = decoded.to_rgb8();
        let resized = image::imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);

        let mut sums = [0u64; 3];
        for px in resized.pixels() {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
        }
        let n = (INPUT_SIZE as f64) * (INPUT_SIZE as f64) * 255.0;
        Ok(Self {
            red: sums[0] as f64 / n,
            green: sums[1] as f64 / n,
            blue: sums[2] as f64 / n,
        })
    }
}

/// Label family picked from colour statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoodGroup {
    Fruit,
    Cooked,
    Vegetable,
    Staple,
}

impl FoodGroup {
    pub fn from_stats(stats: &ColorStats) -> Self {
        let brightness = stats.brightness();
        if brightness > 0.7 {
            FoodGroup::Fruit
        } else if brightness > 0.5 {
            FoodGroup::Cooked
        } else if stats.green > stats.red {
            FoodGroup::Vegetable
        } else {
            FoodGroup::Staple
        }
    }

    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            FoodGroup::Fruit => &["banana", "apple", "orange"],
            FoodGroup::Cooked => &["pizza", "burger", "sandwich", "pasta"],
            FoodGroup::Vegetable => &["salad", "broccoli"],
            FoodGroup::Staple => &["rice", "chicken", "bread"],
        }
    }

    /// `(floor, span)`: confidence is drawn from `[floor, floor + span)`.
    pub fn confidence_range(&self) -> (f64, f64) {
        match self {
            FoodGroup::Fruit => (0.85, 0.10),
            FoodGroup::Cooked => (0.75, 0.15),
            FoodGroup::Vegetable => (0.80, 0.10),
            FoodGroup::Staple => (0.70, 0.20),
        }
    }

    pub const ALL: [FoodGroup; 4] = [
        FoodGroup::Fruit,
        FoodGroup::Cooked,
        FoodGroup::Vegetable,
        FoodGroup::Staple,
    ];
}

/// Placeholder classifier guessing a food from average colour.
pub struct HeuristicClassifier {
    table: NutritionTable,
}

impl HeuristicClassifier {
    pub fn new(table: NutritionTable) -> Self {
        Self { table }
    }

    pub fn predict_with<R: Rng + ?Sized>(
        &self,
        image: &[u8],
        rng: &mut R,
    ) -> anyhow::Result<Prediction> {
        let stats = ColorStats::from_image_bytes(image)?;
        let group = FoodGroup::from_stats(&stats);

        let label = group
            .labels()
            .choose(rng)
            .copied()
            .context("empty label group")?;
        let (floor, span) = group.confidence_range();
        let confidence = floor + rng.gen::<f64>() * span;

        debug!(
            brightness = stats.brightness(),
            group = ?group,
            label,
            confidence,
            "image classified"
        );
        Ok(Prediction {
            food_item: label.to_string(),
            confidence,
        })
    }
}

impl FoodClassifier for HeuristicClassifier {
    fn predict(&self, image: &[u8]) -> anyhow::Result<Prediction> {
        self.predict_with(image, &mut rand::thread_rng())
    }

    fn nutrition(&self, label: &str) -> NutritionInfo {
        self.table.lookup(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, Rgb, RgbImage};
    use rand::{rngs::StdRng, SeedableRng};
    use std::io::Cursor;

    fn png_of(color: [u8; 3], w: u32, h: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(w, h, Rgb(color));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
            .expect("encode png");
        buf
    }

    fn classifier() -> HeuristicClassifier {
        HeuristicClassifier::new(NutritionTable::embedded().unwrap())
    }

    #[test]
    fn stats_of_uniform_image() {
        let stats = ColorStats::from_image_bytes(&png_of([255, 0, 51], 10, 7)).unwrap();
        assert!((stats.red - 1.0).abs() < 0.01);
        assert!(stats.green.abs() < 0.01);
        assert!((stats.blue - 0.2).abs() < 0.01);
    }

    #[test]
    fn groups_follow_brightness_then_green() {
        let s = |r, g, b| ColorStats { red: r, green: g, blue: b };
        assert_eq!(FoodGroup::from_stats(&s(0.9, 0.9, 0.9)), FoodGroup::Fruit);
        assert_eq!(FoodGroup::from_stats(&s(0.6, 0.6, 0.6)), FoodGroup::Cooked);
        assert_eq!(FoodGroup::from_stats(&s(1.0, 0.5, 0.5)), FoodGroup::Cooked);
        assert_eq!(FoodGroup::from_stats(&s(0.1, 0.5, 0.1)), FoodGroup::Vegetable);
        assert_eq!(FoodGroup::from_stats(&s(0.4, 0.1, 0.1)), FoodGroup::Staple);
        // equal red and green falls through to staples
        assert_eq!(FoodGroup::from_stats(&s(0.3, 0.3, 0.3)), FoodGroup::Staple);
    }

    #[test]
    fn predicts_within_group_and_confidence_range() {
        let cases = [
            ([255, 255, 255], FoodGroup::Fruit),
            ([150, 150, 150], FoodGroup::Cooked),
            ([30, 120, 30], FoodGroup::Vegetable),
            ([100, 20, 20], FoodGroup::Staple),
        ];
        let c = classifier();
        let mut rng = StdRng::seed_from_u64(7);
        for (color, group) in cases {
            let bytes = png_of(color, 32, 32);
            for _ in 0..20 {
                let p = c.predict_with(&bytes, &mut rng).unwrap();
                assert!(group.labels().contains(&p.food_item.as_str()), "{:?}", p);
                let (floor, span) = group.confidence_range();
                assert!(p.confidence >= floor && p.confidence < floor + span, "{:?}", p);
            }
        }
    }

    #[test]
    fn same_seed_same_prediction() {
        let c = classifier();
        let bytes = png_of([200, 200, 200], 16, 16);
        let a = c.predict_with(&bytes, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = c.predict_with(&bytes, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_undecodable_bytes() {
        let err = classifier().predict(b"definitely not an image").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn every_label_has_nutrition() {
        let table = NutritionTable::embedded().unwrap();
        for group in FoodGroup::ALL {
            for label in group.labels() {
                assert!(table.contains(label), "missing nutrition for {}", label);
            }
        }
    }
}
