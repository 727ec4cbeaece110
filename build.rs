// Packages the static site: copies `static/` (page, fonts, and the wasm-pack
// output in `static/pkg`) into `dist/`.
use std::fs;
use std::path::Path;

use fs_extra::dir::{self, CopyOptions};

fn main() {
    println!("cargo:rerun-if-changed=static");

    let static_dir = Path::new("static");
    let out_dir = Path::new("dist");
    if !static_dir.exists() {
        println!("cargo:warning=static/ not found, dist/ left untouched");
        return;
    }

    if out_dir.exists() {
        if let Err(e) = dir::remove(out_dir) {
            println!("cargo:warning=could not clear dist/: {e}");
        }
    }
    if let Err(e) = fs::create_dir_all(out_dir) {
        println!("cargo:warning=could not create dist/: {e}");
        return;
    }

    let mut options = CopyOptions::new();
    options.content_only = true;
    options.overwrite = true;
    if let Err(e) = dir::copy(static_dir, out_dir, &options) {
        println!("cargo:warning=copying static/ to dist/ failed: {e}");
    }
}
