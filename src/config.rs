//! Widget configuration, read from a `data-options` JSON attribute or the
//! `options` argument of `mount`. Every field has a default.

use rand::Rng;
use serde::Deserialize;

use crate::error::Result;
use crate::physics::GRAVITY;

/// Seed used when neither the page nor the caller supplies one.
pub const DEFAULT_SEED: u64 = 0x5eed_1e77e2;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub typeface_url: String,
    /// `error`, `warn`, `info`, `debug` or `trace`.
    pub log_level: String,
    /// Rotation multiplier while the pointer hovers a widget.
    pub hover_speed: f32,
    /// RNG seed for letter shuffling and jitter.
    pub seed: Option<u64>,
    pub initials: InitialsOptions,
    pub falling_letters: FallingLettersOptions,
    pub boxes: BoxesOptions,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            typeface_url: "fonts/block.typeface.json".into(),
            log_level: "info".into(),
            hover_speed: 3.0,
            seed: None,
            initials: InitialsOptions::default(),
            falling_letters: FallingLettersOptions::default(),
            boxes: BoxesOptions::default(),
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn seed(&self) -> u64 {
        self.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn log_level(&self) -> log::Level {
        self.log_level.parse().unwrap_or(log::Level::Info)
    }

    /// Replace `log_level` when the page names one.
    pub fn with_log_level(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.log_level = level;
        }
        self
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct InitialsOptions {
    /// Left (accent) and right (primary) glyphs.
    pub letters: [char; 2],
    pub glyph_size: f32,
    pub glyph_depth: f32,
    /// Containers narrower than this (CSS px) use the compact layout.
    pub narrow_width: f32,
}

impl Default for InitialsOptions {
    fn default() -> Self {
        Self {
            letters: ['F', 'M'],
            glyph_size: 3.0,
            glyph_depth: 1.0,
            narrow_width: 768.0,
        }
    }
}

/// Inclusive count range; `min == max` gives a fixed count.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub fn fixed(n: usize) -> Self {
        Self { min: n, max: n }
    }

    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let (lo, hi) = (self.min.min(self.max), self.min.max(self.max));
        if lo == hi {
            lo
        } else {
            rng.gen_range(lo..=hi)
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct FallingLettersOptions {
    /// Visible world height of the orthographic camera.
    pub frustum: f32,
    /// Layout height as a multiple of `frustum`; letters start above the view.
    pub layout_height_scale: f32,
    pub letters: CountRange,
    pub alphabet: String,
    pub glyph_size: f32,
    pub glyph_depth: f32,
    /// Upper bound of the per-row upward jitter.
    pub row_jitter: f32,
    pub ground_y: f32,
    pub wall_thickness: f32,
    pub wall_depth: f32,
    pub repulsor_radius: f32,
    pub gravity: f32,
}

impl Default for FallingLettersOptions {
    fn default() -> Self {
        Self {
            frustum: 15.0,
            layout_height_scale: 1.5,
            letters: CountRange::fixed(50),
            alphabet: "ABCDEFGHIJKLMNOPQRSTUVWXYZ".into(),
            glyph_size: 3.0,
            glyph_depth: 0.2,
            row_jitter: 2.0,
            ground_y: -9.0,
            wall_thickness: 1.0,
            wall_depth: 1.0,
            repulsor_radius: 0.5,
            gravity: GRAVITY,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoxesOptions {
    pub frustum: f32,
    pub eye_z: f32,
    pub count: usize,
    /// Full box dimensions (w, h, d).
    pub size: [f32; 3],
    /// Vertical gap between stacked boxes.
    pub spacing: f32,
    /// Horizontal offsets, cycled per box.
    pub offsets_x: Vec<f32>,
    pub ground_y: f32,
    pub angular_damping: f32,
    /// Vertical speed imposed on every box per scroll event.
    pub scroll_velocity: f32,
    pub gravity: f32,
}

impl Default for BoxesOptions {
    fn default() -> Self {
        Self {
            frustum: 35.0,
            eye_z: 100.0,
            count: 3,
            size: [20.0, 10.0, 10.0],
            spacing: 4.0,
            offsets_x: vec![0.0, -2.0, 2.0],
            ground_y: -15.0,
            angular_damping: 0.9,
            scroll_velocity: 8.0,
            gravity: GRAVITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = SceneConfig::from_json(
            r#"{ "seed": 9, "falling_letters": { "letters": { "min": 10, "max": 20 } } }"#,
        )
        .unwrap();
        assert_eq!(cfg.seed(), 9);
        assert_eq!(cfg.falling_letters.letters, CountRange { min: 10, max: 20 });
        assert_eq!(cfg.falling_letters.ground_y, -9.0);
        assert_eq!(cfg.boxes, BoxesOptions::default());
        assert_eq!(cfg.hover_speed, 3.0);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(SceneConfig::from_json("{ \"hover_speed\": \"fast\" }").is_err());
    }

    #[test]
    fn log_level_falls_back_to_info() {
        let mut cfg = SceneConfig::default();
        assert_eq!(cfg.log_level(), log::Level::Info);
        cfg.log_level = "debug".into();
        assert_eq!(cfg.log_level(), log::Level::Debug);
        cfg.log_level = "loud".into();
        assert_eq!(cfg.log_level(), log::Level::Info);
    }

    #[test]
    fn page_log_level_overrides_the_default() {
        let page = SceneConfig::default().with_log_level(Some("warn".into()));
        assert_eq!(page.log_level(), log::Level::Warn);
        assert_eq!(SceneConfig::default().with_log_level(None).log_level(), log::Level::Info);
    }

    #[test]
    fn count_range_stays_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(CountRange::fixed(50).pick(&mut rng), 50);
        let r = CountRange { min: 30, max: 12 };
        for _ in 0..100 {
            let n = r.pick(&mut rng);
            assert!((12..=30).contains(&n));
        }
    }
}
