#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlElement;

use folio_scenes::wasm::mount;

wasm_bindgen_test_configure!(run_in_browser);

fn container(width: u32, height: u32) -> HtmlElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let el: HtmlElement = document.create_element("div").unwrap().dyn_into().unwrap();
    el.style().set_property("width", &format!("{width}px")).unwrap();
    el.style().set_property("height", &format!("{height}px")).unwrap();
    document.body().unwrap().append_child(&el).unwrap();
    el
}

fn canvases(el: &HtmlElement) -> u32 {
    el.query_selector_all("canvas").unwrap().length()
}

#[wasm_bindgen_test]
fn mount_attaches_a_canvas_and_unmount_removes_it() {
    let el = container(320, 200);
    let handle = mount(el.clone(), "cube", None).unwrap();
    assert!(handle.live());
    assert_eq!(canvases(&el), 1);

    handle.restyle(true);
    handle.unmount();
    assert!(!handle.live());
    assert_eq!(canvases(&el), 0);
}

#[wasm_bindgen_test]
fn repeated_mounts_do_not_accumulate_canvases() {
    let el = container(200, 200);
    for _ in 0..10 {
        let handle = mount(el.clone(), "boxes", Some(r#"{ "seed": 4 }"#.into())).unwrap();
        handle.unmount();
    }
    assert_eq!(canvases(&el), 0);
}

#[wasm_bindgen_test]
fn unknown_kind_and_bad_options_are_rejected() {
    let el = container(100, 100);
    assert!(mount(el.clone(), "teapot", None).is_err());
    assert!(mount(el.clone(), "cube", Some("{ not json".into())).is_err());
    assert_eq!(canvases(&el), 0);
}

#[wasm_bindgen_test]
fn text_widgets_wait_for_their_font() {
    let el = container(400, 300);
    let options = r#"{ "typeface_url": "/does-not-exist.typeface.json" }"#;
    let handle = mount(el.clone(), "initials", Some(options.into())).unwrap();
    assert!(!handle.live());
    assert_eq!(canvases(&el), 0);
    handle.unmount();
}
