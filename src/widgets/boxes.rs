use glam::Vec3;

use crate::camera::CameraSpec;
use crate::config::BoxesOptions;
use crate::error::Result;
use crate::geometry::{make_wireframe, LineStyle, Primitive, ShapeSpec};
use crate::host::Signal;
use crate::physics::{BodyDesc, PhysicsLayout, PhysicsWorld};
use crate::scene::{Role, Scene};
use crate::theme::{Palette, ThemeColors};

use super::{BuildContext, FrameInput, Widget};

const PALETTE: Palette = Palette::single(ThemeColors::new(0x111111, 0xffffff));

/// A short stack of tumbling boxes that hop on every scroll.
pub struct Boxes {
    options: BoxesOptions,
    layout: PhysicsLayout,
}

impl Boxes {
    pub fn new(options: BoxesOptions) -> Self {
        Self { options, layout: PhysicsLayout::default() }
    }

    pub fn layout(&self) -> &PhysicsLayout {
        &self.layout
    }
}

impl Widget for Boxes {
    fn camera(&self) -> CameraSpec {
        CameraSpec::orthographic(self.options.frustum, self.options.eye_z)
    }

    fn palette(&self) -> &Palette {
        &PALETTE
    }

    fn signals(&self) -> &'static [Signal] {
        &[Signal::Scroll]
    }

    fn build(&mut self, scene: &mut Scene, _ctx: &BuildContext<'_>) -> Result<()> {
        let opts = &self.options;
        let [w, h, d] = opts.size;
        let material = scene.add_material(Role::Primary);
        let mut world = PhysicsWorld::new(opts.gravity);
        world.add_ground(opts.ground_y);

        for i in 0..opts.count {
            let x = match opts.offsets_x.as_slice() {
                [] => 0.0,
                xs => xs[i % xs.len()],
            };
            let position = Vec3::new(x, i as f32 * (h + opts.spacing), 0.0);
            let spec = ShapeSpec::Primitive {
                primitive: Primitive::Cuboid { width: w, height: h, depth: d },
                style: LineStyle::Triangles,
            };
            let mut shape = make_wireframe(&spec, material)?;
            shape.transform.position = position;
            scene.add_shape(shape);
            world.add_body(BodyDesc {
                position,
                half_extents: Vec3::new(w, h, d) / 2.0,
                mass: 1.0,
                angular_damping: opts.angular_damping,
                planar: false,
            });
        }

        self.layout.seed(world)
    }

    fn frame(&mut self, scene: &mut Scene, _input: &FrameInput) {
        self.layout.advance(scene.shapes_mut());
    }

    fn scroll(&mut self, _scene: &mut Scene, delta: f32) {
        if delta == 0.0 {
            return;
        }
        let vy = self.options.scroll_velocity * delta.signum();
        if let Some(world) = self.layout.world_mut() {
            world.set_vertical_velocity(vy);
        }
    }

    fn dispose(&mut self) {
        self.layout.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Size;
    use crate::widgets::testing::{at, built};

    #[test]
    fn boxes_start_stacked_at_their_offsets() {
        let mut w = Boxes::new(BoxesOptions::default());
        let (scene, camera) = built(&mut w, Size::new(800.0, 400.0));
        assert!(camera.is_orthographic());
        let starts: Vec<Vec3> = scene.shapes().iter().map(|s| s.transform.position).collect();
        assert_eq!(
            starts,
            vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(-2.0, 14.0, 0.0), Vec3::new(2.0, 28.0, 0.0)]
        );
        assert_eq!(scene.shapes()[0].geometry.segment_count(), 18);
    }

    #[test]
    fn scroll_direction_sets_vertical_speed() {
        let mut w = Boxes::new(BoxesOptions::default());
        let (mut scene, _) = built(&mut w, Size::new(800.0, 400.0));
        w.scroll(&mut scene, 120.0);
        let world = w.layout().world().unwrap();
        assert!((0..3).all(|i| world.velocity(i).unwrap().y == 8.0));

        w.scroll(&mut scene, -3.0);
        let world = w.layout().world().unwrap();
        assert!((0..3).all(|i| world.velocity(i).unwrap().y == -8.0));
    }

    #[test]
    fn boxes_come_to_rest_on_the_ground() {
        let mut w = Boxes::new(BoxesOptions::default());
        let (mut scene, _) = built(&mut w, Size::new(800.0, 400.0));
        for i in 0..600 {
            w.frame(&mut scene, &at(i as f32 / 60.0));
        }
        let lowest = scene
            .shapes()
            .iter()
            .map(|s| s.transform.position.y)
            .fold(f32::INFINITY, f32::min);
        // the first box falls 10 units and stops on its 5-unit half height
        assert!((lowest - (-10.0)).abs() < 0.2, "lowest box at {lowest}");
    }
}
