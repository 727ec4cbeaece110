//! Rigid-body layout for the falling-letters and stacked-boxes widgets.

use glam::{Quat, Vec2, Vec3};
use rand::seq::SliceRandom;
use rand::Rng;
use rapier3d::prelude::*;

use crate::error::{Result, SceneError};
use crate::scene::Shape;

/// Simulation step per rendered frame, independent of the real frame interval.
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;

pub const GRAVITY: f32 = -9.82;

/// Dynamic body paired with one shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyDesc {
    pub position: Vec3,
    pub half_extents: Vec3,
    pub mass: f32,
    pub angular_damping: f32,
    /// Lock z translation and every rotation axis.
    pub planar: bool,
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    paired: Vec<RigidBodyHandle>,
    repulsor: Option<RigidBodyHandle>,
    repulsor_target: Vec2,
}

impl PhysicsWorld {
    pub fn new(gravity_y: f32) -> Self {
        let mut params = IntegrationParameters::default();
        params.dt = FIXED_TIMESTEP as Real;
        Self {
            gravity: vector![0.0, gravity_y as Real, 0.0],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            paired: Vec::new(),
            repulsor: None,
            repulsor_target: Vec2::ZERO,
        }
    }

    /// Infinite floor whose surface sits at `y`, normal pointing up.
    pub fn add_ground(&mut self, y: f32) {
        let body = self.bodies.insert(
            RigidBodyBuilder::fixed()
                .translation(vector![0.0, y as Real, 0.0])
                .build(),
        );
        let col = ColliderBuilder::halfspace(Vector::y_axis()).build();
        self.colliders.insert_with_parent(col, body, &mut self.bodies);
    }

    pub fn add_wall(&mut self, center: Vec2, half_extents: Vec3) {
        let body = self.bodies.insert(
            RigidBodyBuilder::fixed()
                .translation(vector![center.x as Real, center.y as Real, 0.0])
                .build(),
        );
        let col = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build();
        self.colliders.insert_with_parent(col, body, &mut self.bodies);
    }

    /// Kinematic ball that pushes dynamic bodies but is never pushed.
    pub fn add_repulsor(&mut self, radius: f32) {
        let body = self
            .bodies
            .insert(RigidBodyBuilder::kinematic_position_based().build());
        let col = ColliderBuilder::ball(radius).build();
        self.colliders.insert_with_parent(col, body, &mut self.bodies);
        self.repulsor = Some(body);
    }

    /// Add a dynamic cuboid; returns its pairing index.
    pub fn add_body(&mut self, desc: BodyDesc) -> usize {
        let mut builder = RigidBodyBuilder::dynamic()
            .translation(vector![desc.position.x, desc.position.y, desc.position.z])
            .angular_damping(desc.angular_damping);
        if desc.planar {
            builder = builder.locked_axes(LockedAxes::TRANSLATION_LOCKED_Z | LockedAxes::ROTATION_LOCKED);
        }
        let body = self.bodies.insert(builder.build());
        let h = desc.half_extents;
        let col = ColliderBuilder::cuboid(h.x, h.y, h.z).mass(desc.mass).build();
        self.colliders.insert_with_parent(col, body, &mut self.bodies);
        self.paired.push(body);
        self.paired.len() - 1
    }

    pub fn body_count(&self) -> usize {
        self.paired.len()
    }

    pub fn step(&mut self) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    pub fn pose(&self, index: usize) -> Option<(Vec3, Quat)> {
        let rb = self.bodies.get(*self.paired.get(index)?)?;
        let t = rb.translation();
        let q = rb.rotation();
        Some((Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(q.i, q.j, q.k, q.w)))
    }

    pub fn velocity(&self, index: usize) -> Option<Vec3> {
        let rb = self.bodies.get(*self.paired.get(index)?)?;
        let v = rb.linvel();
        Some(Vec3::new(v.x, v.y, v.z))
    }

    /// Copy body poses onto their paired shapes.
    pub fn sync(&self, shapes: &mut [Shape]) {
        for (i, shape) in shapes.iter_mut().enumerate().take(self.paired.len()) {
            if let Some((position, rotation)) = self.pose(i) {
                shape.transform.position = position;
                shape.transform.rotation = rotation;
            }
        }
    }

    /// Queue the repulsor's position for the next step.
    pub fn move_repulsor(&mut self, target: Vec2) {
        let Some(handle) = self.repulsor else {
            return;
        };
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.set_next_kinematic_translation(vector![target.x, target.y, 0.0]);
            self.repulsor_target = target;
        }
    }

    pub fn repulsor_target(&self) -> Option<Vec2> {
        self.repulsor.map(|_| self.repulsor_target)
    }

    /// Overwrite every paired body's vertical velocity.
    pub fn set_vertical_velocity(&mut self, vy: f32) {
        for &handle in &self.paired {
            if let Some(rb) = self.bodies.get_mut(handle) {
                let mut v = *rb.linvel();
                v.y = vy;
                rb.set_linvel(v, true);
            }
        }
    }
}

/// `Unseeded → Running → Disposed`.
#[derive(Default)]
pub enum PhysicsLayout {
    #[default]
    Unseeded,
    Running(Box<PhysicsWorld>),
    Disposed,
}

impl PhysicsLayout {
    pub fn seed(&mut self, world: PhysicsWorld) -> Result<()> {
        match self {
            PhysicsLayout::Unseeded => {
                *self = PhysicsLayout::Running(Box::new(world));
                Ok(())
            }
            PhysicsLayout::Running(_) => Err(SceneError::InvalidState("physics layout already seeded")),
            PhysicsLayout::Disposed => Err(SceneError::InvalidState("physics layout disposed")),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, PhysicsLayout::Running(_))
    }

    pub fn world(&self) -> Option<&PhysicsWorld> {
        match self {
            PhysicsLayout::Running(w) => Some(&**w),
            _ => None,
        }
    }

    pub fn world_mut(&mut self) -> Option<&mut PhysicsWorld> {
        match self {
            PhysicsLayout::Running(w) => Some(&mut **w),
            _ => None,
        }
    }

    /// One fixed step followed by the pose copy-back.
    pub fn advance(&mut self, shapes: &mut [Shape]) {
        if let Some(world) = self.world_mut() {
            world.step();
            world.sync(shapes);
        }
    }

    pub fn dispose(&mut self) {
        *self = PhysicsLayout::Disposed;
    }
}

/// Normalized pointer to layout world units.
pub fn pointer_to_world(ndc: Vec2, extent: Vec2) -> Vec2 {
    ndc * extent / 2.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LetterPlacement {
    pub ch: char,
    pub row: usize,
    pub column: usize,
    pub position: Vec2,
}

/// Pick `count` letters and lay them out in a grid filling `extent.x`.
/// Row 0 sits just under the top edge and later rows stack upward, so no
/// letter starts below `extent.y / 2 - cell.y`. Rows are `cell.y + jitter`
/// apart and each gets a random upward offset in `[0, jitter)`.
pub fn seed_letters<R: Rng + ?Sized>(
    alphabet: &[char],
    count: usize,
    extent: Vec2,
    cell: Vec2,
    jitter: f32,
    rng: &mut R,
) -> Vec<LetterPlacement> {
    if alphabet.is_empty() || !(cell.x > 0.0 && cell.y > 0.0) {
        return Vec::new();
    }
    let mut letters = alphabet.to_vec();
    let picks: Vec<char> = (0..count)
        .map(|i| {
            letters.shuffle(rng);
            letters[i % letters.len()]
        })
        .collect();

    let columns = ((extent.x / cell.x).floor() as usize).max(1);
    let rows = count.div_ceil(columns);
    let row_jitter: Vec<f32> = (0..rows)
        .map(|_| if jitter > 0.0 { rng.gen_range(0.0..jitter) } else { 0.0 })
        .collect();
    let pitch = cell.y + jitter.max(0.0);

    picks
        .into_iter()
        .enumerate()
        .map(|(i, ch)| {
            let column = i % columns;
            let row = i / columns;
            let x = -extent.x / 2.0 + column as f32 * cell.x + cell.x / 2.0;
            let y = extent.y / 2.0 - cell.y / 2.0 + row as f32 * pitch + row_jitter[row];
            LetterPlacement { ch, row, column, position: Vec2::new(x, y) }
        })
        .collect()
}

/// Highest point reached by any placed letter, never below `floor`.
pub fn stack_top(placements: &[LetterPlacement], cell: Vec2, floor: f32) -> f32 {
    placements
        .iter()
        .map(|p| p.position.y + cell.y / 2.0)
        .fold(floor, f32::max)
}
