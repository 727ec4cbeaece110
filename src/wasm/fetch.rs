use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::error::{Result, SceneError};
use crate::typeface::Typeface;

use super::host::js_err;

thread_local! {
    static TYPEFACES: RefCell<HashMap<String, Rc<Typeface>>> = RefCell::new(HashMap::new());
}

/// Fetch and parse a typeface JSON, once per URL for the page's lifetime.
pub async fn load_typeface(url: &str) -> Result<Rc<Typeface>> {
    if let Some(face) = TYPEFACES.with(|c| c.borrow().get(url).cloned()) {
        return Ok(face);
    }
    let text = fetch_text(url).await?;
    let face = Rc::new(Typeface::from_json(&text)?);
    log::info!("loaded typeface {:?} from {url}", face.family());
    TYPEFACES.with(|c| c.borrow_mut().insert(url.to_string(), face.clone()));
    Ok(face)
}

async fn fetch_text(url: &str) -> Result<String> {
    let window = web_sys::window().ok_or(SceneError::Host("no window".into()))?;
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::SameOrigin);
    let request = Request::new_with_str_and_init(url, &opts).map_err(js_err)?;

    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_err)?
        .dyn_into()
        .map_err(|_| SceneError::Host("fetch did not return a Response".into()))?;
    if !resp.ok() {
        return Err(SceneError::Typeface(format!("HTTP {} for {url}", resp.status())));
    }
    JsFuture::from(resp.text().map_err(js_err)?)
        .await
        .map_err(js_err)?
        .as_string()
        .ok_or(SceneError::Typeface("response body is not text".into()))
}
