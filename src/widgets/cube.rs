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
    accent: ThemeColors::new(0x0f0f0f, 0xfec800),
};

/// Wireframe cube with an octahedron bobbing inside it.
pub struct Cube {
    hover_speed: f32,
    cube: usize,
    octahedron: usize,
    cube_yaw: f32,
    octahedron_yaw: f32,
}

impl Cube {
    pub fn new(hover_speed: f32) -> Self {
        Self { hover_speed, cube: 0, octahedron: 0, cube_yaw: 0.0, octahedron_yaw: 0.0 }
    }
}

impl Widget for Cube {
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
        let cube = Primitive::Cuboid { width: 3.0, height: 3.0, depth: 3.0 };
        self.cube = scene.add_shape(make_wireframe(&ShapeSpec::edges(cube), primary)?);
        let octahedron = Primitive::Octahedron { radius: 1.25 };
        self.octahedron = scene.add_shape(make_wireframe(&ShapeSpec::edges(octahedron), accent)?);
        Ok(())
    }

    fn frame(&mut self, scene: &mut Scene, input: &FrameInput) {
        let speed = if input.hovered { self.hover_speed } else { 1.0 };
        self.cube_yaw -= 0.01 * speed;
        self.octahedron_yaw += 0.03 * speed;

        if let Some(cube) = scene.shape_mut(self.cube) {
            cube.transform.set_euler(Vec3::new(0.0, self.cube_yaw, 0.0));
        }
        if let Some(oct) = scene.shape_mut(self.octahedron) {
            oct.transform.set_euler(Vec3::new(0.0, self.octahedron_yaw, 0.0));
            oct.transform.position.y = (input.elapsed * 2.0).sin() * 0.2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Size;
    use crate::geometry::GeometryId;
    use crate::widgets::testing::{at, built};
    use crate::widgets::FrameInput;

    #[test]
    fn builds_cube_and_octahedron() {
        let mut w = Cube::new(3.0);
        let (scene, camera) = built(&mut w, Size::new(800.0, 600.0));
        assert!(!camera.is_orthographic());
        assert_eq!(scene.shapes().len(), 2);
        assert_eq!(scene.materials().len(), 2);
        assert_eq!(scene.shapes()[0].geometry.segment_count(), 12);
        assert_eq!(scene.shapes()[1].geometry.segment_count(), 12);
    }

    #[test]
    fn hover_triples_rotation_speed() {
        let mut calm = Cube::new(3.0);
        let mut hovered = Cube::new(3.0);
        let (mut a, _) = built(&mut calm, Size::new(400.0, 400.0));
        let (mut b, _) = built(&mut hovered, Size::new(400.0, 400.0));
        calm.frame(&mut a, &at(0.0));
        hovered.frame(&mut b, &FrameInput { hovered: true, ..at(0.0) });
        assert!((calm.octahedron_yaw - 0.03).abs() < 1e-6);
        assert!((hovered.octahedron_yaw - 0.09).abs() < 1e-6);
        assert!((hovered.cube_yaw + 0.03).abs() < 1e-6);
    }

    #[test]
    fn octahedron_bobs_without_new_geometry() {
        let mut w = Cube::new(3.0);
        let (mut scene, _) = built(&mut w, Size::new(400.0, 400.0));
        let ids: Vec<GeometryId> = scene.shapes().iter().map(|s| s.geometry.id()).collect();
        let t = std::f32::consts::FRAC_PI_4;
        w.frame(&mut scene, &at(t));
        assert!((scene.shapes()[1].transform.position.y - 0.2).abs() < 1e-5);
        let after: Vec<GeometryId> = scene.shapes().iter().map(|s| s.geometry.id()).collect();
        assert_eq!(ids, after);
    }
}
