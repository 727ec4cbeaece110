//! Scene contents: shapes, shared materials, transforms.

use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::geometry::LineGeometry;

/// 0xRRGGBB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub fn to_rgba(self) -> [f32; 4] {
        let r = ((self.0 >> 16) & 0xff) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xff) as f32 / 255.0;
        let b = (self.0 & 0xff) as f32 / 255.0;
        [r, g, b, 1.0]
    }
}

/// Visual role a material plays inside one widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Primary,
    Accent,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

/// Line-drawing style; shared by id across shapes of the same role.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub role: Role,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn at(position: Vec3) -> Self {
        Self { position, ..Default::default() }
    }

    /// Set rotation from XYZ Euler angles in radians.
    pub fn set_euler(&mut self, euler: Vec3) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

/// Wireframe instance. Owns its geometry; references a material.
#[derive(Debug)]
pub struct Shape {
    pub geometry: LineGeometry,
    pub material: MaterialId,
    pub transform: Transform,
}

#[derive(Debug, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
    materials: Vec<Material>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a material for `role`. The color is assigned by the theme pass.
    pub fn add_material(&mut self, role: Role) -> MaterialId {
        self.materials.push(Material { role, color: Color(0) });
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_shape(&mut self, shape: Shape) -> usize {
        self.shapes.push(shape);
        self.shapes.len() - 1
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shapes_mut(&mut self) -> &mut [Shape] {
        &mut self.shapes
    }

    pub fn shape_mut(&mut self, index: usize) -> Option<&mut Shape> {
        self.shapes.get_mut(index)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn materials_mut(&mut self) -> &mut [Material] {
        &mut self.materials
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Drop every shape and material.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.materials.clear();
    }
}
