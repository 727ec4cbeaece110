//! Platform seam: what a scene needs from its environment.
//!
//! The browser binding lives in `wasm::host`; `headless` implements the same
//! trait in memory for tests and for host-side tooling.

use glam::Vec2;

use crate::camera::{Camera, Rect, Size};
use crate::error::Result;
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Signal {
    /// Window resize.
    Resize,
    /// Window pointer move.
    PointerMove,
    /// Pointer enters the container.
    PointerEnter,
    /// Pointer leaves the container.
    PointerLeave,
    /// Window scroll.
    Scroll,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    /// `rect` is the container measured at dispatch time.
    Resize { rect: Rect },
    PointerMove { client: Vec2, rect: Rect },
    PointerEnter,
    PointerLeave,
    Scroll { scroll_y: f32 },
}

impl HostEvent {
    pub fn signal(&self) -> Signal {
        match self {
            HostEvent::Resize { .. } => Signal::Resize,
            HostEvent::PointerMove { .. } => Signal::PointerMove,
            HostEvent::PointerEnter => Signal::PointerEnter,
            HostEvent::PointerLeave => Signal::PointerLeave,
            HostEvent::Scroll { .. } => Signal::Scroll,
        }
    }
}

/// Called once per display refresh with a millisecond timestamp.
pub type FrameCallback = Box<dyn FnMut(f64)>;
pub type EventCallback = Box<dyn FnMut(HostEvent)>;

/// Pixel output attached to a container.
pub trait RenderSurface {
    fn resize(&mut self, size: Size);
    fn render(&mut self, scene: &Scene, camera: &Camera);
    /// Free native resources and detach from the container. Called once.
    fn release(&mut self);
}

pub trait Host: Clone + 'static {
    type Container: Clone + 'static;
    type Surface: RenderSurface + 'static;
    type Frames;
    type Listener;

    fn measure(&self, container: &Self::Container) -> Rect;

    fn scroll_position(&self) -> f32;

    fn create_surface(&self, container: &Self::Container, size: Size) -> Result<Self::Surface>;

    /// Run `tick` every frame until `stop_frames`.
    fn start_frames(&self, tick: FrameCallback) -> Result<Self::Frames>;

    fn stop_frames(&self, frames: Self::Frames);

    fn listen(
        &self,
        container: &Self::Container,
        signal: Signal,
        handler: EventCallback,
    ) -> Result<Self::Listener>;

    fn unlisten(&self, listener: Self::Listener);
}
