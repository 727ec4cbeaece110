//! [`Host`] on web-sys: requestAnimationFrame loop, window/container
//! listeners and WebGL2 canvases appended to the container.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Event, EventTarget, HtmlCanvasElement, HtmlElement, MouseEvent, Window};

use crate::camera::{Camera, Rect, Size};
use crate::error::{Result, SceneError};
use crate::host::{EventCallback, FrameCallback, Host, HostEvent, RenderSurface, Signal};
use crate::scene::Scene;

use super::render::LineRenderer;

pub(crate) fn js_err(e: JsValue) -> SceneError {
    SceneError::Host(format!("{e:?}"))
}

#[derive(Clone)]
pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or(SceneError::Host("no window".into()))?;
        let document = window.document().ok_or(SceneError::Host("no document".into()))?;
        Ok(Self { window, document })
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.window.device_pixel_ratio().max(1.0) as f32
    }
}

type FrameSlot = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Running rAF chain. The closure re-requests itself until the slot is
/// emptied.
pub struct FrameLoop {
    slot: FrameSlot,
    pending: Rc<Cell<Option<i32>>>,
}

pub struct BrowserListener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    renderer: LineRenderer,
    pixel_ratio: f32,
}

impl Host for BrowserHost {
    type Container = HtmlElement;
    type Surface = CanvasSurface;
    type Frames = FrameLoop;
    type Listener = BrowserListener;

    fn measure(&self, container: &HtmlElement) -> Rect {
        let r = container.get_bounding_client_rect();
        Rect::new(r.left() as f32, r.top() as f32, r.width() as f32, r.height() as f32)
    }

    fn scroll_position(&self) -> f32 {
        self.window.scroll_y().unwrap_or(0.0) as f32
    }

    fn create_surface(&self, container: &HtmlElement, size: Size) -> Result<CanvasSurface> {
        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| SceneError::Surface("created element is not a canvas".into()))?;
        let style = canvas.style();
        style.set_property("display", "block").map_err(js_err)?;
        style.set_property("width", "100%").map_err(js_err)?;
        style.set_property("height", "100%").map_err(js_err)?;
        container.append_child(&canvas).map_err(js_err)?;

        let renderer = match LineRenderer::new(&canvas) {
            Ok(r) => r,
            Err(e) => {
                canvas.remove();
                return Err(e);
            }
        };
        let mut surface = CanvasSurface { canvas, renderer, pixel_ratio: self.device_pixel_ratio() };
        surface.resize(size);
        Ok(surface)
    }

    fn start_frames(&self, tick: FrameCallback) -> Result<FrameLoop> {
        let slot: FrameSlot = Rc::new(RefCell::new(None));
        let pending = Rc::new(Cell::new(None));

        let weak = Rc::downgrade(&slot);
        let window = self.window.clone();
        let next = pending.clone();
        let mut tick = tick;
        *slot.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp: f64| {
            next.set(None);
            tick(timestamp);
            let Some(slot) = weak.upgrade() else {
                return;
            };
            let slot = slot.borrow();
            if let Some(cb) = slot.as_ref() {
                match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                    Ok(id) => next.set(Some(id)),
                    Err(e) => log::warn!("requestAnimationFrame failed: {e:?}"),
                }
            }
        }) as Box<dyn FnMut(f64)>));

        let id = {
            let first = slot.borrow();
            let cb = first.as_ref().ok_or(SceneError::InvalidState("frame closure missing"))?;
            self.window
                .request_animation_frame(cb.as_ref().unchecked_ref())
                .map_err(js_err)?
        };
        pending.set(Some(id));
        Ok(FrameLoop { slot, pending })
    }

    fn stop_frames(&self, frames: FrameLoop) {
        if let Some(id) = frames.pending.take() {
            if let Err(e) = self.window.cancel_animation_frame(id) {
                log::warn!("cancelAnimationFrame failed: {e:?}");
            }
        }
        frames.slot.borrow_mut().take();
    }

    fn listen(&self, container: &HtmlElement, signal: Signal, mut handler: EventCallback) -> Result<BrowserListener> {
        let (target, event): (EventTarget, &'static str) = match signal {
            Signal::Resize => (self.window.clone().into(), "resize"),
            Signal::PointerMove => (self.window.clone().into(), "mousemove"),
            Signal::PointerEnter => (container.clone().into(), "mouseenter"),
            Signal::PointerLeave => (container.clone().into(), "mouseleave"),
            Signal::Scroll => (self.window.clone().into(), "scroll"),
        };

        let host = self.clone();
        let container = container.clone();
        let closure = Closure::wrap(Box::new(move |e: Event| {
            let event = match signal {
                Signal::Resize => HostEvent::Resize { rect: host.measure(&container) },
                Signal::PointerMove => {
                    let Some(m) = e.dyn_ref::<MouseEvent>() else {
                        return;
                    };
                    HostEvent::PointerMove {
                        client: Vec2::new(m.client_x() as f32, m.client_y() as f32),
                        rect: host.measure(&container),
                    }
                }
                Signal::PointerEnter => HostEvent::PointerEnter,
                Signal::PointerLeave => HostEvent::PointerLeave,
                Signal::Scroll => HostEvent::Scroll { scroll_y: host.scroll_position() },
            };
            handler(event);
        }) as Box<dyn FnMut(Event)>);

        target
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(js_err)?;
        Ok(BrowserListener { target, event, closure })
    }

    fn unlisten(&self, listener: BrowserListener) {
        let BrowserListener { target, event, closure } = listener;
        if let Err(e) = target.remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref()) {
            log::warn!("removing {event} listener failed: {e:?}");
        }
    }
}

impl RenderSurface for CanvasSurface {
    fn resize(&mut self, size: Size) {
        let w = (size.width * self.pixel_ratio).round().max(1.0) as u32;
        let h = (size.height * self.pixel_ratio).round().max(1.0) as u32;
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        self.renderer.set_viewport(w as i32, h as i32);
    }

    fn render(&mut self, scene: &Scene, camera: &Camera) {
        self.renderer.draw(scene, camera);
    }

    fn release(&mut self) {
        self.renderer.release();
        self.canvas.remove();
    }
}
