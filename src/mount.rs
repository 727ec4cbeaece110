//! Per-container widget state: kind, typeface arrival, cancellation,
//! restyle and rebuild.

use std::cell::Cell;
use std::rc::Rc;

use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::host::Host;
use crate::lifecycle::{create_scene, SceneHandle};
use crate::theme::Theme;
use crate::typeface::Typeface;
use crate::widgets::{create_widget, WidgetKind};

/// Set once the owning mount is gone; async completions check it first.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

enum State<H: Host> {
    /// Waiting for the typeface.
    Loading,
    Live(SceneHandle<H>),
    /// Renders nothing.
    Failed,
    Unmounted,
}

pub struct Mount<H: Host> {
    host: H,
    container: H::Container,
    kind: WidgetKind,
    config: SceneConfig,
    theme: Theme,
    cancel: CancelToken,
    state: State<H>,
}

impl<H: Host> Mount<H> {
    /// Procedural widgets go live immediately; text widgets wait in
    /// `Loading` for [`Mount::typeface_loaded`].
    pub fn new(host: &H, container: &H::Container, kind: WidgetKind, config: SceneConfig, theme: Theme) -> Self {
        let mut mount = Self {
            host: host.clone(),
            container: container.clone(),
            kind,
            config,
            theme,
            cancel: CancelToken::default(),
            state: State::Loading,
        };
        if !kind.needs_typeface() {
            mount.state = mount.start(None);
        }
        mount
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn start(&self, typeface: Option<Rc<Typeface>>) -> State<H> {
        let scene = create_widget(self.kind, &self.config, typeface)
            .and_then(|widget| create_scene(&self.host, &self.container, widget, self.theme));
        match scene {
            Ok(handle) => State::Live(handle),
            Err(e) => {
                log::warn!("{} widget failed to start: {e}", self.kind);
                State::Failed
            }
        }
    }

    /// Deliver the typeface fetch result. No-op once unmounted. A live scene
    /// is destroyed and rebuilt with the new face.
    pub fn typeface_loaded(&mut self, typeface: Result<Rc<Typeface>>) {
        if self.cancel.is_cancelled() || matches!(self.state, State::Unmounted) {
            return;
        }
        if !self.kind.needs_typeface() {
            return;
        }
        if let State::Live(handle) = std::mem::replace(&mut self.state, State::Loading) {
            handle.destroy();
        }
        self.state = match typeface {
            Ok(face) => self.start(Some(face)),
            Err(e) => {
                log::warn!("typeface for {} widget unavailable: {e}", self.kind);
                State::Failed
            }
        };
    }

    /// Recolor the live scene; later builds use `theme` too.
    pub fn restyle(&mut self, theme: Theme) {
        self.theme = theme;
        if let State::Live(handle) = &self.state {
            handle.restyle(theme);
        }
    }

    pub fn unmount(&mut self) {
        self.cancel.cancel();
        if let State::Live(handle) = std::mem::replace(&mut self.state, State::Unmounted) {
            handle.destroy();
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.state, State::Live(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, State::Loading)
    }

    pub fn is_failed(&self) -> bool {
        match &self.state {
            State::Failed => true,
            State::Live(handle) => handle.is_failed(),
            _ => false,
        }
    }

    pub fn handle(&self) -> Option<&SceneHandle<H>> {
        match &self.state {
            State::Live(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn require_live(&self) -> Result<&SceneHandle<H>> {
        self.handle().ok_or(SceneError::InvalidState("widget not live"))
    }
}

impl<H: Host> Drop for Mount<H> {
    fn drop(&mut self) {
        self.unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Rect;
    use crate::headless::HeadlessHost;
    use crate::widgets::testing::block_face;

    fn setup() -> (HeadlessHost, crate::headless::ContainerId) {
        let host = HeadlessHost::new();
        let c = host.container(Rect::new(0.0, 0.0, 800.0, 600.0));
        (host, c)
    }

    #[test]
    fn procedural_widgets_are_live_at_once() {
        let (host, c) = setup();
        let m = Mount::new(&host, &c, WidgetKind::Cube, SceneConfig::default(), Theme::Light);
        assert!(m.is_live());
        assert_eq!(host.stats().live_surfaces, 1);
    }

    #[test]
    fn text_widgets_wait_for_the_typeface() {
        let (host, c) = setup();
        let mut m = Mount::new(&host, &c, WidgetKind::Initials, SceneConfig::default(), Theme::Dark);
        assert!(m.is_loading());
        assert_eq!(host.stats().surfaces_created, 0);
        m.typeface_loaded(Ok(block_face()));
        assert!(m.is_live());
        assert!(m.require_live().unwrap().is_built());
    }

    #[test]
    fn reloading_the_typeface_rebuilds_in_place() {
        let (host, c) = setup();
        let mut m = Mount::new(&host, &c, WidgetKind::Initials, SceneConfig::default(), Theme::Light);
        m.typeface_loaded(Ok(block_face()));
        m.typeface_loaded(Ok(block_face()));
        let stats = host.stats();
        assert_eq!(stats.surfaces_created, 2);
        assert_eq!(stats.live_surfaces, 1);
        assert_eq!(stats.frame_loops, 1);
    }

    #[test]
    fn failed_font_renders_nothing() {
        let (host, c) = setup();
        let mut m = Mount::new(&host, &c, WidgetKind::FallingLetters, SceneConfig::default(), Theme::Light);
        m.typeface_loaded(Err(SceneError::Typeface("404".into())));
        assert!(m.is_failed());
        assert_eq!(host.stats().live_surfaces, 0);
    }

    #[test]
    fn surface_failure_degrades_to_failed() {
        let (host, c) = setup();
        host.fail_surfaces(true);
        let m = Mount::new(&host, &c, WidgetKind::Boxes, SceneConfig::default(), Theme::Light);
        assert!(m.is_failed());
        assert!(m.require_live().is_err());
    }

    #[test]
    fn late_typeface_after_unmount_creates_nothing() {
        let (host, c) = setup();
        let mut m = Mount::new(&host, &c, WidgetKind::Initials, SceneConfig::default(), Theme::Light);
        let token = m.cancel_token();
        m.unmount();
        assert!(token.is_cancelled());
        m.typeface_loaded(Ok(block_face()));
        assert!(!m.is_live());
        assert_eq!(host.stats().surfaces_created, 0);
    }
}
