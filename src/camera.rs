//! Container sizes, pointer normalization and the camera fitted to them.

use glam::{Mat4, Vec2, Vec3};

use crate::error::{Result, SceneError};

/// Container size in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// `width / height`, or `None` while either side is zero.
    pub fn aspect(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width / self.height)
        }
    }
}

/// Client-space bounding box of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Map a client-space point to `[-1, 1]` on both axes, y up.
    pub fn normalize(&self, client: Vec2) -> Option<Vec2> {
        if self.size().is_empty() {
            return None;
        }
        let x = ((client.x - self.left) / self.width) * 2.0 - 1.0;
        let y = -((client.y - self.top) / self.height) * 2.0 + 1.0;
        Some(Vec2::new(x, y))
    }
}

/// How a widget wants its camera built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraSpec {
    /// Free-rotating scenes.
    Perspective { fov_y_deg: f32, near: f32, far: f32, eye: Vec3 },
    /// "2D-looking" layouts. `frustum` is the visible height in world units.
    Orthographic { frustum: f32, near: f32, far: f32, eye: Vec3 },
}

impl CameraSpec {
    pub const fn perspective(fov_y_deg: f32, eye_z: f32) -> Self {
        CameraSpec::Perspective {
            fov_y_deg,
            near: 0.1,
            far: 1000.0,
            eye: Vec3::new(0.0, 0.0, eye_z),
        }
    }

    pub const fn orthographic(frustum: f32, eye_z: f32) -> Self {
        CameraSpec::Orthographic {
            frustum,
            near: 1.0,
            far: 1000.0,
            eye: Vec3::new(0.0, 0.0, eye_z),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Projection {
    Perspective { fov_y: f32, aspect: f32, near: f32, far: f32 },
    Orthographic { frustum: f32, left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32 },
}

/// Camera looking at the origin down negative z.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    projection: Projection,
    eye: Vec3,
    target: Vec3,
}

impl Camera {
    pub fn new(spec: CameraSpec, size: Size) -> Result<Self> {
        let aspect = size.aspect().ok_or(SceneError::ZeroSize {
            width: size.width,
            height: size.height,
        })?;
        let (projection, eye) = match spec {
            CameraSpec::Perspective { fov_y_deg, near, far, eye } => (
                Projection::Perspective { fov_y: fov_y_deg.to_radians(), aspect, near, far },
                eye,
            ),
            CameraSpec::Orthographic { frustum, near, far, eye } => {
                let half_w = frustum * aspect / 2.0;
                (
                    Projection::Orthographic {
                        frustum,
                        left: -half_w,
                        right: half_w,
                        top: frustum / 2.0,
                        bottom: -frustum / 2.0,
                        near,
                        far,
                    },
                    eye,
                )
            }
        };
        Ok(Self { projection, eye, target: Vec3::ZERO })
    }

    /// Update projection parameters for a new container size. Returns `false`
    /// and leaves the camera untouched when the size is empty.
    pub fn resize(&mut self, size: Size) -> bool {
        let Some(new_aspect) = size.aspect() else {
            return false;
        };
        match &mut self.projection {
            Projection::Perspective { aspect, .. } => *aspect = new_aspect,
            Projection::Orthographic { frustum, left, right, top, bottom, .. } => {
                let half_w = *frustum * new_aspect / 2.0;
                *left = -half_w;
                *right = half_w;
                *top = *frustum / 2.0;
                *bottom = -*frustum / 2.0;
            }
        }
        true
    }

    /// Aspect ratio the projection is currently built with.
    pub fn aspect(&self) -> f32 {
        match self.projection {
            Projection::Perspective { aspect, .. } => aspect,
            Projection::Orthographic { left, right, top, bottom, .. } => {
                (right - left) / (top - bottom)
            }
        }
    }

    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, Projection::Orthographic { .. })
    }

    /// World-space width and height visible at the target plane.
    pub fn view_extent(&self) -> Vec2 {
        match self.projection {
            Projection::Perspective { fov_y, aspect, .. } => {
                let h = 2.0 * (fov_y / 2.0).tan() * self.eye.distance(self.target);
                Vec2::new(h * aspect, h)
            }
            Projection::Orthographic { left, right, top, bottom, .. } => {
                Vec2::new(right - left, top - bottom)
            }
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov_y, aspect, near, far } => {
                Mat4::perspective_rh_gl(fov_y, aspect, near, far)
            }
            Projection::Orthographic { left, right, top, bottom, near, far, .. } => {
                Mat4::orthographic_rh_gl(left, right, bottom, top, near, far)
            }
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
