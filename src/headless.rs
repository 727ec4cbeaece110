//! In-memory [`Host`]: counts live surfaces, frame loops and listeners, and
//! lets callers drive frames and events by hand.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use glam::Vec2;

use crate::camera::{Camera, Rect, Size};
use crate::error::{Result, SceneError};
use crate::host::{EventCallback, FrameCallback, Host, HostEvent, RenderSurface, Signal};
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u32);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HostStats {
    pub live_surfaces: usize,
    pub surfaces_created: usize,
    pub frame_loops: usize,
    pub listeners: usize,
    pub renders: usize,
}

/// Last state seen by a surface.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceRecord {
    pub container: Option<ContainerId>,
    pub size: Size,
    pub renders: usize,
    pub aspect: Option<f32>,
    pub segments: usize,
    pub released: bool,
}

type SharedFrame = Rc<RefCell<FrameCallback>>;
type SharedHandler = Rc<RefCell<EventCallback>>;

#[derive(Default)]
struct Inner {
    next_id: u64,
    rects: BTreeMap<ContainerId, Rect>,
    scroll_y: f32,
    surfaces: BTreeMap<u64, SurfaceRecord>,
    frames: BTreeMap<u64, SharedFrame>,
    listeners: BTreeMap<u64, (ContainerId, Signal, SharedHandler)>,
    renders: usize,
    fail_surfaces: bool,
}

impl Inner {
    fn id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub struct HeadlessHost {
    inner: Rc<RefCell<Inner>>,
}

pub struct HeadlessSurface {
    id: u64,
    inner: Rc<RefCell<Inner>>,
}

pub struct HeadlessFrames(u64);

pub struct HeadlessListener(u64);

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn container(&self, rect: Rect) -> ContainerId {
        let mut inner = self.inner.borrow_mut();
        let id = ContainerId(inner.rects.len() as u32 + 1);
        inner.rects.insert(id, rect);
        id
    }

    /// Change a container's layout without dispatching anything.
    pub fn set_rect(&self, container: ContainerId, rect: Rect) {
        self.inner.borrow_mut().rects.insert(container, rect);
    }

    /// Make subsequent `create_surface` calls fail.
    pub fn fail_surfaces(&self, fail: bool) {
        self.inner.borrow_mut().fail_surfaces = fail;
    }

    pub fn stats(&self) -> HostStats {
        let inner = self.inner.borrow();
        HostStats {
            live_surfaces: inner.surfaces.values().filter(|s| !s.released).count(),
            surfaces_created: inner.surfaces.len(),
            frame_loops: inner.frames.len(),
            listeners: inner.listeners.len(),
            renders: inner.renders,
        }
    }

    /// Most recently created surface for `container`.
    pub fn surface(&self, container: ContainerId) -> Option<SurfaceRecord> {
        self.inner
            .borrow()
            .surfaces
            .values()
            .rev()
            .find(|s| s.container == Some(container))
            .cloned()
    }

    /// Run every frame loop once.
    pub fn pump(&self, timestamp_ms: f64) {
        let frames: Vec<SharedFrame> = self.inner.borrow().frames.values().cloned().collect();
        for f in frames {
            (f.borrow_mut())(timestamp_ms);
        }
    }

    /// Run frame loops `n` times at 60 Hz starting from `start_ms`.
    pub fn pump_n(&self, n: usize, start_ms: f64) {
        for i in 0..n {
            self.pump(start_ms + i as f64 * 1000.0 / 60.0);
        }
    }

    pub fn resize(&self, container: ContainerId, rect: Rect) {
        self.set_rect(container, rect);
        self.dispatch(Signal::Resize, None, |rect| HostEvent::Resize { rect });
    }

    pub fn pointer_move(&self, client: Vec2) {
        self.dispatch(Signal::PointerMove, None, |rect| HostEvent::PointerMove { client, rect });
    }

    pub fn hover(&self, container: ContainerId, inside: bool) {
        let (signal, event) = if inside {
            (Signal::PointerEnter, HostEvent::PointerEnter)
        } else {
            (Signal::PointerLeave, HostEvent::PointerLeave)
        };
        self.dispatch(signal, Some(container), |_| event);
    }

    pub fn scroll_to(&self, scroll_y: f32) {
        self.inner.borrow_mut().scroll_y = scroll_y;
        self.dispatch(Signal::Scroll, None, |_| HostEvent::Scroll { scroll_y });
    }

    fn dispatch(&self, signal: Signal, only: Option<ContainerId>, event: impl Fn(Rect) -> HostEvent) {
        let targets: Vec<(Rect, SharedHandler)> = {
            let inner = self.inner.borrow();
            inner
                .listeners
                .values()
                .filter(|(c, s, _)| *s == signal && only.map_or(true, |o| o == *c))
                .map(|(c, _, h)| (inner.rects.get(c).copied().unwrap_or_default(), h.clone()))
                .collect()
        };
        for (rect, handler) in targets {
            (handler.borrow_mut())(event(rect));
        }
    }
}

impl Host for HeadlessHost {
    type Container = ContainerId;
    type Surface = HeadlessSurface;
    type Frames = HeadlessFrames;
    type Listener = HeadlessListener;

    fn measure(&self, container: &ContainerId) -> Rect {
        self.inner.borrow().rects.get(container).copied().unwrap_or_default()
    }

    fn scroll_position(&self) -> f32 {
        self.inner.borrow().scroll_y
    }

    fn create_surface(&self, container: &ContainerId, size: Size) -> Result<HeadlessSurface> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_surfaces {
            return Err(SceneError::Surface("headless surface creation disabled".into()));
        }
        let id = inner.id();
        inner.surfaces.insert(
            id,
            SurfaceRecord { container: Some(*container), size, ..Default::default() },
        );
        Ok(HeadlessSurface { id, inner: self.inner.clone() })
    }

    fn start_frames(&self, tick: FrameCallback) -> Result<HeadlessFrames> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.id();
        inner.frames.insert(id, Rc::new(RefCell::new(tick)));
        Ok(HeadlessFrames(id))
    }

    fn stop_frames(&self, frames: HeadlessFrames) {
        self.inner.borrow_mut().frames.remove(&frames.0);
    }

    fn listen(&self, container: &ContainerId, signal: Signal, handler: EventCallback) -> Result<HeadlessListener> {
        let mut inner = self.inner.borrow_mut();
        let id = inner.id();
        inner
            .listeners
            .insert(id, (*container, signal, Rc::new(RefCell::new(handler))));
        Ok(HeadlessListener(id))
    }

    fn unlisten(&self, listener: HeadlessListener) {
        self.inner.borrow_mut().listeners.remove(&listener.0);
    }
}

impl RenderSurface for HeadlessSurface {
    fn resize(&mut self, size: Size) {
        if let Some(s) = self.inner.borrow_mut().surfaces.get_mut(&self.id) {
            s.size = size;
        }
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        let mut inner = self.inner.borrow_mut();
        inner.renders += 1;
        if let Some(s) = inner.surfaces.get_mut(&self.id) {
            s.renders += 1;
            s.aspect = Some(camera.aspect());
            s.segments = scene.shapes().iter().map(|sh| sh.geometry.segment_count()).sum();
        }
    }

    fn release(&mut self) {
        if let Some(s) = self.inner.borrow_mut().surfaces.get_mut(&self.id) {
            s.released = true;
            s.container = None;
        }
    }
}
