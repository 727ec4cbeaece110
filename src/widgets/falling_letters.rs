use std::rc::Rc;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::camera::CameraSpec;
use crate::config::FallingLettersOptions;
use crate::error::{Result, SceneError};
use crate::geometry::{make_wireframe, ShapeSpec};
use crate::host::Signal;
use crate::physics::{
    pointer_to_world, seed_letters, stack_top, BodyDesc, LetterPlacement, PhysicsLayout, PhysicsWorld,
};
use crate::scene::{Role, Scene};
use crate::theme::{Palette, ThemeColors};
use crate::typeface::Typeface;

use super::{BuildContext, FrameInput, Widget};

const PALETTE: Palette = Palette::single(ThemeColors::new(0x0f0f0f, 0xffffff));

/// Glyph whose box sizes the layout grid and every letter body.
const GRID_GLYPH: char = 'O';

/// Letters dropped from above the view onto a floor, pushed around by the
/// pointer.
pub struct FallingLetters {
    typeface: Rc<Typeface>,
    options: FallingLettersOptions,
    seed: u64,
    layout: PhysicsLayout,
    extent: Vec2,
    placements: Vec<LetterPlacement>,
}

impl FallingLetters {
    pub fn new(typeface: Rc<Typeface>, options: FallingLettersOptions, seed: u64) -> Self {
        Self {
            typeface,
            options,
            seed,
            layout: PhysicsLayout::default(),
            extent: Vec2::ZERO,
            placements: Vec::new(),
        }
    }

    /// Letter picks and starting positions of the current build.
    pub fn placements(&self) -> &[LetterPlacement] {
        &self.placements
    }

    /// Layout area in world units: view width by `layout_height_scale` frustums.
    pub fn extent(&self) -> Vec2 {
        self.extent
    }

    pub fn layout(&self) -> &PhysicsLayout {
        &self.layout
    }
}

impl Widget for FallingLetters {
    fn camera(&self) -> CameraSpec {
        CameraSpec::orthographic(self.options.frustum, 10.0)
    }

    fn palette(&self) -> &Palette {
        &PALETTE
    }

    fn signals(&self) -> &'static [Signal] {
        &[Signal::PointerMove]
    }

    fn build(&mut self, scene: &mut Scene, ctx: &BuildContext<'_>) -> Result<()> {
        let opts = &self.options;
        let face = &*self.typeface;
        let alphabet: Vec<char> = opts.alphabet.chars().filter(|c| face.has_glyph(*c)).collect();
        let Some(&first) = alphabet.first() else {
            return Err(SceneError::MissingGlyph(opts.alphabet.chars().next().unwrap_or(GRID_GLYPH)));
        };
        let grid_glyph = if face.has_glyph(GRID_GLYPH) { GRID_GLYPH } else { first };
        let cell = face.glyph_bounds(grid_glyph, opts.glyph_size, opts.glyph_depth)?.size().truncate();

        let view = ctx.camera.view_extent();
        let extent = Vec2::new(view.x, opts.frustum * opts.layout_height_scale);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let count = opts.letters.pick(&mut rng);
        let placements = seed_letters(&alphabet, count, extent, cell, opts.row_jitter, &mut rng);

        let mut world = PhysicsWorld::new(opts.gravity);
        world.add_ground(opts.ground_y);
        // Walls run from the floor to the top of the highest row.
        let t = opts.wall_thickness;
        let top = stack_top(&placements, cell, extent.y / 2.0);
        let wall = Vec3::new(t / 2.0, (top - opts.ground_y) / 2.0, opts.wall_depth / 2.0);
        let wall_y = (top + opts.ground_y) / 2.0;
        world.add_wall(Vec2::new(-extent.x / 2.0 - t / 2.0, wall_y), wall);
        world.add_wall(Vec2::new(extent.x / 2.0 + t / 2.0, wall_y), wall);
        world.add_repulsor(opts.repulsor_radius);

        let material = scene.add_material(Role::Primary);
        let half_extents = Vec3::new(cell.x / 2.0, cell.y / 2.0, opts.glyph_depth / 2.0);
        for p in &placements {
            let spec = ShapeSpec::glyph(face, p.ch, opts.glyph_size, opts.glyph_depth);
            let mut shape = make_wireframe(&spec, material)?;
            shape.transform.position = p.position.extend(0.0);
            scene.add_shape(shape);
            world.add_body(BodyDesc {
                position: p.position.extend(0.0),
                half_extents,
                mass: 1.0,
                angular_damping: 1.0,
                planar: true,
            });
        }

        log::debug!(
            "dropping {} letters over {:.1}x{:.1} world units",
            placements.len(),
            extent.x,
            extent.y
        );
        self.layout.seed(world)?;
        self.extent = extent;
        self.placements = placements;
        Ok(())
    }

    fn frame(&mut self, scene: &mut Scene, input: &FrameInput) {
        self.layout.advance(scene.shapes_mut());
        if let (Some(world), Some(pointer)) = (self.layout.world_mut(), input.pointer) {
            world.move_repulsor(pointer_to_world(pointer, self.extent));
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
    use crate::config::CountRange;
    use crate::widgets::testing::{at, block_face, built};

    fn letters(seed: u64) -> FallingLetters {
        FallingLetters::new(block_face(), FallingLettersOptions::default(), seed)
    }

    #[test]
    fn same_seed_and_size_give_the_same_layout() {
        let size = Size::new(1200.0, 800.0);
        let mut a = letters(11);
        let mut b = letters(11);
        built(&mut a, size);
        built(&mut b, size);
        assert_eq!(a.placements().len(), 50);
        assert_eq!(a.placements(), b.placements());

        let mut c = letters(12);
        built(&mut c, size);
        assert_ne!(a.placements(), c.placements());
    }

    #[test]
    fn grid_columns_come_from_the_o_glyph() {
        let mut w = letters(3);
        let (scene, camera) = built(&mut w, Size::new(1200.0, 800.0));
        // O is 700 units wide at size 3
        let view_width = camera.view_extent().x;
        let columns = (view_width / 2.1).floor() as usize;
        assert_eq!(w.extent(), Vec2::new(view_width, 22.5));
        assert!(w.placements().iter().all(|p| p.column < columns));
        assert_eq!(scene.shapes().len(), w.placements().len());
        assert_eq!(w.layout().world().map(PhysicsWorld::body_count), Some(50));
    }

    #[test]
    fn letters_outside_the_face_are_skipped() {
        let options = FallingLettersOptions {
            alphabet: "é€O".into(),
            letters: CountRange::fixed(4),
            ..Default::default()
        };
        let mut w = FallingLetters::new(block_face(), options, 1);
        built(&mut w, Size::new(600.0, 600.0));
        assert!(w.placements().iter().all(|p| p.ch == 'O'));
    }

    #[test]
    fn settled_letters_stay_above_the_ground() {
        let mut w = letters(5);
        let (mut scene, _) = built(&mut w, Size::new(1000.0, 700.0));
        for i in 0..900 {
            w.frame(&mut scene, &at(i as f32 / 60.0));
        }
        let ground = w.options.ground_y;
        for shape in scene.shapes() {
            let bottom = shape.transform.position.y + shape.geometry.bounds().min.y;
            assert!(bottom >= ground - 0.1, "letter bottom at {bottom}");
        }
    }

    #[test]
    fn portrait_container_keeps_every_letter_inside() {
        let mut w = letters(17);
        let (mut scene, _) = built(&mut w, Size::new(400.0, 800.0));
        let ground = w.options.ground_y;
        let half_width = w.extent().x / 2.0;
        assert!(w.placements().iter().all(|p| p.position.y - 1.5 > ground));

        for i in 0..1800 {
            w.frame(&mut scene, &at(i as f32 / 60.0));
        }
        // bodies are O-sized: 2.1 wide, 3 tall
        for shape in scene.shapes() {
            let p = shape.transform.position;
            assert!(p.y - 1.5 >= ground - 0.1, "letter bottom at {}", p.y - 1.5);
            assert!(p.x.abs() + 1.05 <= half_width + 0.1, "letter escaped to x = {}", p.x);
        }
    }

    #[test]
    fn centered_pointer_puts_the_repulsor_at_the_origin() {
        let mut w = letters(5);
        let (mut scene, _) = built(&mut w, Size::new(800.0, 600.0));
        w.frame(&mut scene, &FrameInput { pointer: Some(Vec2::ZERO), ..at(0.0) });
        let target = w.layout().world().and_then(PhysicsWorld::repulsor_target);
        assert_eq!(target, Some(Vec2::ZERO));
    }

    #[test]
    fn dispose_drops_the_world() {
        let mut w = letters(5);
        let (mut scene, _) = built(&mut w, Size::new(800.0, 600.0));
        w.dispose();
        assert!(!w.layout().is_running());
        w.frame(&mut scene, &at(0.0));
    }
}
