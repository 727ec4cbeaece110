use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Storage};

use crate::theme::{Theme, THEME_STORAGE_KEY};

pub const SCENE_ATTR: &str = "data-scene";
pub const OPTIONS_ATTR: &str = "data-options";
pub const LOG_LEVEL_ATTR: &str = "data-log-level";
pub const TOGGLE_ID: &str = "theme-toggle";

fn storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn stored_theme() -> Theme {
    let value = storage().and_then(|s| s.get_item(THEME_STORAGE_KEY).ok().flatten());
    Theme::from_stored(value.as_deref())
}

pub fn store_theme(theme: Theme) {
    let Some(s) = storage() else {
        return;
    };
    if let Err(e) = s.set_item(THEME_STORAGE_KEY, theme.as_stored()) {
        log::warn!("theme not persisted: {e:?}");
    }
}

/// Toggle the `dark` class on `<html>`.
pub fn apply_document_theme(document: &Document, theme: Theme) {
    let Some(root) = document.document_element() else {
        return;
    };
    if let Err(e) = root.class_list().toggle_with_force("dark", theme.is_dark()) {
        log::warn!("theme class not applied: {e:?}");
    }
}

pub fn root_attr(document: &Document, name: &str) -> Option<String> {
    document.document_element()?.get_attribute(name)
}

/// Every element carrying `data-scene`, in document order.
pub fn scene_containers(document: &Document) -> Vec<HtmlElement> {
    let Ok(nodes) = document.query_selector_all(&format!("[{SCENE_ATTR}]")) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|n| n.dyn_into::<HtmlElement>().ok())
        .collect()
}
