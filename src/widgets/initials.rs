use std::rc::Rc;

use glam::Vec3;

use crate::camera::CameraSpec;
use crate::config::InitialsOptions;
use crate::error::Result;
use crate::geometry::{make_wireframe, ShapeSpec};
use crate::scene::{Role, Scene};
use crate::theme::{Palette, ThemeColors};
use crate::typeface::Typeface;

use super::{BuildContext, FrameInput, Widget};

const PALETTE: Palette = Palette {
    primary: ThemeColors::new(0x0f0f0f, 0xffffff),
    accent: ThemeColors::new(0x0036fe, 0xfdc700),
};

/// Two extruded glyphs bobbing out of phase.
pub struct Initials {
    typeface: Rc<Typeface>,
    options: InitialsOptions,
    left: usize,
    right: usize,
    base_x: (f32, f32),
}

impl Initials {
    pub fn new(typeface: Rc<Typeface>, options: InitialsOptions) -> Self {
        Self { typeface, options, left: 0, right: 0, base_x: (0.0, 0.0) }
    }

    fn layout(&self, width: f32) -> (f32, f32) {
        if width < self.options.narrow_width {
            (-1.75, 1.0)
        } else {
            (-1.25, 1.25)
        }
    }

    fn place(&self, scene: &mut Scene) {
        let (lx, rx) = self.base_x;
        if let Some(s) = scene.shape_mut(self.left) {
            s.transform.position.x = lx;
        }
        if let Some(s) = scene.shape_mut(self.right) {
            s.transform.position.x = rx;
        }
    }
}

impl Widget for Initials {
    fn camera(&self) -> CameraSpec {
        CameraSpec::perspective(75.0, 5.0)
    }

    fn palette(&self) -> &Palette {
        &PALETTE
    }

    fn build(&mut self, scene: &mut Scene, ctx: &BuildContext<'_>) -> Result<()> {
        let primary = scene.add_material(Role::Primary);
        let accent = scene.add_material(Role::Accent);
        let [l, r] = self.options.letters;
        let (size, depth) = (self.options.glyph_size, self.options.glyph_depth);

        let left = make_wireframe(&ShapeSpec::glyph(&self.typeface, l, size, depth), accent)?;
        let right = make_wireframe(&ShapeSpec::glyph(&self.typeface, r, size, depth), primary)?;
        self.left = scene.add_shape(left);
        self.right = scene.add_shape(right);

        self.base_x = self.layout(ctx.size.width);
        self.place(scene);
        Ok(())
    }

    fn resized(&mut self, scene: &mut Scene, ctx: &BuildContext<'_>) {
        let base_x = self.layout(ctx.size.width);
        if base_x != self.base_x {
            self.base_x = base_x;
            self.place(scene);
        }
    }

    fn frame(&mut self, scene: &mut Scene, input: &FrameInput) {
        let wave = (input.elapsed * 2.0).sin();
        if let Some(s) = scene.shape_mut(self.left) {
            s.transform.position.y = 0.7 + 0.2 * wave;
            s.transform.set_euler(Vec3::new(0.0, -0.2 * wave, 0.0));
        }
        if let Some(s) = scene.shape_mut(self.right) {
            s.transform.position.y = -0.7 - 0.2 * wave;
            s.transform.set_euler(Vec3::new(0.0, 0.2 * wave, 0.0));
        }
    }
}
