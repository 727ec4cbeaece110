//! Animated wireframe scene widgets for a portfolio page.
//!
//! The core (geometry, camera, physics, theme, lifecycle) is platform
//! neutral and tested on the host through [`headless::HeadlessHost`]. The
//! `wasm` module binds it to the browser.

pub mod camera;
pub mod config;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod lifecycle;
pub mod mount;
pub mod physics;
pub mod scene;
pub mod theme;
pub mod typeface;
pub mod widgets;

pub use error::{Result, SceneError};

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::HtmlElement;

    use crate::config::SceneConfig;
    use crate::mount::Mount;
    use crate::theme::Theme;
    use crate::widgets::WidgetKind;

    mod dom;
    mod fetch;
    mod host;
    mod render;

    pub use host::BrowserHost;

    type SharedMount = Rc<RefCell<Mount<BrowserHost>>>;

    thread_local! {
        static MOUNTS: RefCell<Vec<SharedMount>> = RefCell::new(Vec::new());
        static THEME: Cell<Theme> = Cell::new(Theme::Light);
    }

    fn to_js(e: crate::SceneError) -> JsValue {
        JsValue::from_str(&e.to_string())
    }

    fn random_seed() -> u64 {
        (js_sys::Math::random() * u32::MAX as f64) as u64
    }

    /// A mounted widget, returned to JavaScript.
    #[wasm_bindgen]
    pub struct WidgetHandle {
        mount: SharedMount,
    }

    #[wasm_bindgen]
    impl WidgetHandle {
        pub fn restyle(&self, dark: bool) {
            self.mount.borrow_mut().restyle(Theme::from_dark(dark));
        }

        pub fn unmount(&self) {
            self.mount.borrow_mut().unmount();
            MOUNTS.with(|m| m.borrow_mut().retain(|x| !Rc::ptr_eq(x, &self.mount)));
        }

        #[wasm_bindgen(getter)]
        pub fn live(&self) -> bool {
            self.mount.borrow().is_live()
        }
    }

    /// Mount a widget of `kind` into `container`. `options` is a JSON
    /// `SceneConfig`; omitted fields keep their defaults.
    #[wasm_bindgen]
    pub fn mount(container: HtmlElement, kind: &str, options: Option<String>) -> Result<WidgetHandle, JsValue> {
        let kind: WidgetKind = kind.parse().map_err(to_js)?;
        let mut config = match options.as_deref().map(str::trim) {
            Some(json) if !json.is_empty() => SceneConfig::from_json(json).map_err(to_js)?,
            _ => SceneConfig::default(),
        };
        config.seed.get_or_insert_with(random_seed);

        let host = BrowserHost::new().map_err(to_js)?;
        let theme = THEME.with(Cell::get);
        let url = config.typeface_url.clone();
        let mount: SharedMount = Rc::new(RefCell::new(Mount::new(&host, &container, kind, config, theme)));

        if kind.needs_typeface() {
            let token = mount.borrow().cancel_token();
            let weak = Rc::downgrade(&mount);
            wasm_bindgen_futures::spawn_local(async move {
                let result = fetch::load_typeface(&url).await;
                if token.is_cancelled() {
                    return;
                }
                if let Some(mount) = weak.upgrade() {
                    mount.borrow_mut().typeface_loaded(result);
                }
            });
        }

        MOUNTS.with(|m| m.borrow_mut().push(mount.clone()));
        Ok(WidgetHandle { mount })
    }

    /// Persist `dark`, update the document class and restyle every widget.
    #[wasm_bindgen(js_name = setTheme)]
    pub fn set_theme(dark: bool) {
        let theme = Theme::from_dark(dark);
        THEME.with(|t| t.set(theme));
        dom::store_theme(theme);
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            dom::apply_document_theme(&document, theme);
        }
        let mounts: Vec<SharedMount> = MOUNTS.with(|m| m.borrow().clone());
        for mount in mounts {
            mount.borrow_mut().restyle(theme);
        }
    }

    #[wasm_bindgen(start)]
    pub fn main() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let page = SceneConfig::default().with_log_level(dom::root_attr(&document, dom::LOG_LEVEL_ATTR));
        if console_log::init_with_level(page.log_level()).is_err() {
            web_sys::console::warn_1(&"logger already initialized".into());
        }

        let theme = dom::stored_theme();
        THEME.with(|t| t.set(theme));
        dom::apply_document_theme(&document, theme);

        for container in dom::scene_containers(&document) {
            let kind = container.get_attribute(dom::SCENE_ATTR).unwrap_or_default();
            let options = container.get_attribute(dom::OPTIONS_ATTR);
            // Page-lifetime widgets stay registered in MOUNTS.
            if let Err(e) = mount(container, &kind, options) {
                log::warn!("skipping [{}={kind:?}]: {e:?}", dom::SCENE_ATTR);
            }
        }

        if let Some(toggle) = document.get_element_by_id(dom::TOGGLE_ID) {
            let on_click = Closure::wrap(Box::new(move || {
                set_theme(!THEME.with(Cell::get).is_dark());
            }) as Box<dyn FnMut()>);
            toggle.add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            on_click.forget();
        }

        log::info!("scene widgets started");
        Ok(())
    }
}
