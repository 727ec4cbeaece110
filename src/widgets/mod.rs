//! The five scene kinds. Each widget owns its shape indices and animation
//! state; the scene itself lives in the lifecycle.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use glam::Vec2;
use serde::Deserialize;

use crate::camera::{Camera, CameraSpec, Size};
use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::host::Signal;
use crate::scene::Scene;
use crate::theme::Palette;
use crate::typeface::Typeface;

mod boxes;
mod cube;
mod falling_letters;
mod initials;
mod sphere;

pub use boxes::Boxes;
pub use cube::Cube;
pub use falling_letters::FallingLetters;
pub use initials::Initials;
pub use sphere::Sphere;

/// Per-frame input gathered by the lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Seconds since the first rendered frame.
    pub elapsed: f32,
    /// Last pointer position normalized to the container, y up.
    pub pointer: Option<Vec2>,
    pub hovered: bool,
}

pub struct BuildContext<'a> {
    pub camera: &'a Camera,
    /// Container size in CSS pixels.
    pub size: Size,
}

pub trait Widget {
    fn camera(&self) -> CameraSpec;

    fn palette(&self) -> &Palette;

    /// Host signals beyond resize this widget reacts to.
    fn signals(&self) -> &'static [Signal] {
        &[]
    }

    /// Populate `scene`. Called once, with the first non-empty size.
    fn build(&mut self, scene: &mut Scene, ctx: &BuildContext<'_>) -> Result<()>;

    /// Container changed size after the build.
    fn resized(&mut self, _scene: &mut Scene, _ctx: &BuildContext<'_>) {}

    fn frame(&mut self, scene: &mut Scene, input: &FrameInput);

    /// Window scrolled by `delta` pixels (never zero).
    fn scroll(&mut self, _scene: &mut Scene, _delta: f32) {}

    /// Drop simulation state. The scene is cleared separately.
    fn dispose(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    Cube,
    Sphere,
    Initials,
    FallingLetters,
    Boxes,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 5] = [
        WidgetKind::Cube,
        WidgetKind::Sphere,
        WidgetKind::Initials,
        WidgetKind::FallingLetters,
        WidgetKind::Boxes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::Cube => "cube",
            WidgetKind::Sphere => "sphere",
            WidgetKind::Initials => "initials",
            WidgetKind::FallingLetters => "falling-letters",
            WidgetKind::Boxes => "boxes",
        }
    }

    /// Text widgets wait for the typeface before they can be created.
    pub fn needs_typeface(self) -> bool {
        matches!(self, WidgetKind::Initials | WidgetKind::FallingLetters)
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetKind {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self> {
        WidgetKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SceneError::UnknownWidget(s.to_string()))
    }
}

pub fn create_widget(
    kind: WidgetKind,
    config: &SceneConfig,
    typeface: Option<Rc<Typeface>>,
) -> Result<Box<dyn Widget>> {
    let face = || typeface.clone().ok_or(SceneError::InvalidState("typeface not loaded"));
    Ok(match kind {
        WidgetKind::Cube => Box::new(Cube::new(config.hover_speed)),
        WidgetKind::Sphere => Box::new(Sphere::new(config.hover_speed)),
        WidgetKind::Initials => Box::new(Initials::new(face()?, config.initials.clone())),
        WidgetKind::FallingLetters => Box::new(FallingLetters::new(
            face()?,
            config.falling_letters.clone(),
            config.seed(),
        )),
        WidgetKind::Boxes => Box::new(Boxes::new(config.boxes.clone())),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip_through_from_str() {
        for kind in WidgetKind::ALL {
            assert_eq!(kind.as_str().parse::<WidgetKind>().unwrap(), kind);
        }
        assert!(matches!("donut".parse::<WidgetKind>(), Err(SceneError::UnknownWidget(_))));
        let k: WidgetKind = serde_json::from_str("\"falling-letters\"").unwrap();
        assert_eq!(k, WidgetKind::FallingLetters);
    }

    #[test]
    fn text_widgets_require_a_typeface() {
        let cfg = SceneConfig::default();
        assert!(create_widget(WidgetKind::Initials, &cfg, None).is_err());
        assert!(create_widget(WidgetKind::FallingLetters, &cfg, None).is_err());
        assert!(create_widget(WidgetKind::Cube, &cfg, None).is_ok());
        assert!(create_widget(WidgetKind::Initials, &cfg, Some(testing::block_face())).is_ok());
    }
}
