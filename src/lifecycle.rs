//! Scene lifecycle: one creation call returning an owned resource bundle,
//! one teardown call consuming it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use glam::Vec2;

use crate::camera::{Camera, Size};
use crate::error::Result;
use crate::host::{Host, HostEvent, RenderSurface, Signal};
use crate::scene::Scene;
use crate::theme::{apply_theme, Theme};
use crate::widgets::{BuildContext, FrameInput, Widget};

struct LiveScene<S> {
    scene: Scene,
    camera: Option<Camera>,
    surface: S,
    widget: Box<dyn Widget>,
    theme: Theme,
    pointer: Option<Vec2>,
    hovered: bool,
    last_scroll: f32,
    started_at: Option<f64>,
    built: bool,
    failed: bool,
    released: bool,
}

impl<S: RenderSurface> LiveScene<S> {
    /// Apply a measured container size. Empty sizes are ignored; the first
    /// valid one builds the camera and the widget's shapes.
    fn observe(&mut self, size: Size) {
        if self.released || size.is_empty() {
            return;
        }
        match &mut self.camera {
            Some(camera) => {
                camera.resize(size);
            }
            None => match Camera::new(self.widget.camera(), size) {
                Ok(camera) => self.camera = Some(camera),
                Err(e) => {
                    log::debug!("camera deferred: {e}");
                    return;
                }
            },
        }
        self.surface.resize(size);

        let Some(camera) = &self.camera else {
            return;
        };
        let ctx = BuildContext { camera, size };
        if self.built {
            self.widget.resized(&mut self.scene, &ctx);
        } else if !self.failed {
            match self.widget.build(&mut self.scene, &ctx) {
                Ok(()) => {
                    apply_theme(self.scene.materials_mut(), self.widget.palette(), self.theme);
                    self.built = true;
                    log::debug!("scene built with {} shapes", self.scene.shapes().len());
                }
                Err(e) => {
                    log::warn!("scene build failed, widget stays empty: {e}");
                    self.failed = true;
                }
            }
        }
    }

    fn handle(&mut self, event: HostEvent) {
        if self.released {
            return;
        }
        match event {
            HostEvent::Resize { rect } => self.observe(rect.size()),
            HostEvent::PointerMove { client, rect } => {
                if let Some(p) = rect.normalize(client) {
                    self.pointer = Some(p);
                }
            }
            HostEvent::PointerEnter => self.hovered = true,
            HostEvent::PointerLeave => self.hovered = false,
            HostEvent::Scroll { scroll_y } => {
                let delta = scroll_y - self.last_scroll;
                self.last_scroll = scroll_y;
                if self.built && delta != 0.0 {
                    self.widget.scroll(&mut self.scene, delta);
                }
            }
        }
    }

    fn frame(&mut self, timestamp_ms: f64) {
        if self.released || !self.built {
            return;
        }
        let start = *self.started_at.get_or_insert(timestamp_ms);
        let input = FrameInput {
            elapsed: ((timestamp_ms - start) / 1000.0) as f32,
            pointer: self.pointer,
            hovered: self.hovered,
        };
        self.widget.frame(&mut self.scene, &input);
        if let Some(camera) = &self.camera {
            self.surface.render(&self.scene, camera);
        }
    }

    fn restyle(&mut self, theme: Theme) {
        self.theme = theme;
        if self.built {
            apply_theme(self.scene.materials_mut(), self.widget.palette(), theme);
        }
    }

    fn teardown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.widget.dispose();
        self.surface.release();
        self.scene.clear();
        self.camera = None;
    }
}

/// Every resource a live widget owns. Released by [`SceneHandle::destroy`]
/// or, failing that, on drop.
pub struct SceneHandle<H: Host> {
    host: H,
    live: Rc<RefCell<LiveScene<H::Surface>>>,
    frames: Option<H::Frames>,
    listeners: Vec<H::Listener>,
}

/// Measure the container, attach a render surface, subscribe to resize and
/// the widget's signals, and start the frame loop.
pub fn create_scene<H: Host>(
    host: &H,
    container: &H::Container,
    widget: Box<dyn Widget>,
    theme: Theme,
) -> Result<SceneHandle<H>> {
    let size = host.measure(container).size();
    let surface = host.create_surface(container, size)?;
    let signals = widget.signals();

    let live = Rc::new(RefCell::new(LiveScene {
        scene: Scene::new(),
        camera: None,
        surface,
        widget,
        theme,
        pointer: None,
        hovered: false,
        last_scroll: host.scroll_position(),
        started_at: None,
        built: false,
        failed: false,
        released: false,
    }));
    live.borrow_mut().observe(size);

    // Partially built handles release through Drop when a later step fails.
    let mut handle = SceneHandle {
        host: host.clone(),
        live: live.clone(),
        frames: None,
        listeners: Vec::new(),
    };

    let mut wanted = vec![Signal::Resize];
    wanted.extend(signals.iter().copied().filter(|s| *s != Signal::Resize));
    for signal in wanted {
        let weak = Rc::downgrade(&live);
        let listener = host.listen(
            container,
            signal,
            Box::new(move |event| {
                if let Some(live) = weak.upgrade() {
                    live.borrow_mut().handle(event);
                }
            }),
        )?;
        handle.listeners.push(listener);
    }

    let weak: Weak<RefCell<LiveScene<H::Surface>>> = Rc::downgrade(&live);
    let measure_host = host.clone();
    let container = container.clone();
    handle.frames = Some(host.start_frames(Box::new(move |timestamp_ms| {
        let Some(live) = weak.upgrade() else {
            return;
        };
        let mut live = live.borrow_mut();
        if live.camera.is_none() {
            live.observe(measure_host.measure(&container).size());
        }
        live.frame(timestamp_ms);
    }))?);

    Ok(handle)
}

impl<H: Host> SceneHandle<H> {
    /// Recolor materials in place.
    pub fn restyle(&self, theme: Theme) {
        self.live.borrow_mut().restyle(theme);
    }

    pub fn is_built(&self) -> bool {
        self.live.borrow().built
    }

    pub fn is_failed(&self) -> bool {
        self.live.borrow().failed
    }

    pub fn camera_aspect(&self) -> Option<f32> {
        self.live.borrow().camera.as_ref().map(Camera::aspect)
    }

    pub fn with_scene<R>(&self, f: impl FnOnce(&Scene) -> R) -> R {
        f(&self.live.borrow().scene)
    }

    /// Stop the frame loop, drop listeners, release the surface and drop the
    /// scene's shapes, materials and physics.
    pub fn destroy(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(frames) = self.frames.take() {
            self.host.stop_frames(frames);
        }
        for listener in self.listeners.drain(..) {
            self.host.unlisten(listener);
        }
        match self.live.try_borrow_mut() {
            Ok(mut live) => live.teardown(),
            Err(_) => log::warn!("scene busy during teardown; surface release skipped"),
        }
    }
}

impl<H: Host> Drop for SceneHandle<H> {
    fn drop(&mut self) {
        self.release();
    }
}
