use glam::Vec3;

use crate::camera::CameraSpec;
use crate::error::Result;
use crate::geometry::{make_wireframe, Primitive, ShapeSpec};
use crate::host::Signal;
use crate::scene::{Role, Scene};
use crate::theme::{Palette, ThemeColors};

use super::{BuildContext, FrameInput, Widget};

const PALETTE: Palette = Palette {
    primary: ThemeColors::new(0x0f0f0f, 0xf6f3f0),
    accent: ThemeColors::new(0x0036fe, 0xfec800),
};

/// Pulsing low-poly sphere inside a tumbling icosahedron.
pub struct Sphere {
    hover_speed: f32,
    sphere: usize,
    icosahedron: usize,
    sphere_yaw: f32,
    icosahedron_tumble: f32,
}

impl Sphere {
    pub fn new(hover_speed: f32) -> Self {
        Self { hover_speed, sphere: 0, icosahedron: 0, sphere_yaw: 0.0, icosahedron_tumble: 0.0 }
    }
}

impl Widget for Sphere {
    fn camera(&self) -> CameraSpec {
        CameraSpec::perspective(75.0, 5.0)
    }

    fn palette(&self) -> &Palette {
        &PALETTE
    }

    fn signals(&self) -> &'static [Signal] {
        &[Signal::PointerEnter, Signal::PointerLeave]
    }

    fn build(&mut self, scene: &mut Scene, _ctx: &BuildContext<'_>) -> Result<()> {
        let primary = scene.add_material(Role::Primary);
        let accent = scene.add_material(Role::Accent);
        let sphere = Primitive::Sphere { radius: 2.0, width_segments: 8, height_segments: 12 };
        self.sphere = scene.add_shape(make_wireframe(&ShapeSpec::edges(sphere), primary)?);
        let ico = Primitive::Icosahedron { radius: 3.0 };
        self.icosahedron = scene.add_shape(make_wireframe(&ShapeSpec::edges(ico), accent)?);
        Ok(())
    }

    fn frame(&mut self, scene: &mut Scene, input: &FrameInput) {
        let speed = if input.hovered { self.hover_speed } else { 1.0 };
        self.sphere_yaw -= 0.005 * speed;
        self.icosahedron_tumble -= 0.01 * speed;

        if let Some(sphere) = scene.shape_mut(self.sphere) {
            sphere.transform.set_euler(Vec3::new(0.0, self.sphere_yaw, 0.0));
            sphere.transform.scale = Vec3::splat(0.5 + 0.3 * input.elapsed.sin());
        }
        if let Some(ico) = scene.shape_mut(self.icosahedron) {
            let a = self.icosahedron_tumble;
            ico.transform.set_euler(Vec3::new(a, a, 0.0));
        }
    }
}
