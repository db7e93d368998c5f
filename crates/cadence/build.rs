//! Build script for the `cadence` firmware crate.
//!
//! When building inside a workspace, the linker may not find `memory.x` if it
//! only exists at the workspace root. This script copies `config/memory.x` from the
//! workspace root into `OUT_DIR` and adds that directory to the link search
//! path so `cortex-m-rt`'s `link.x` can include it. It also sets the linker
//! arguments required by `cortex-m-rt`.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let l_crate_dir =
        PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let l_workspace_root = l_crate_dir
        .parent()
        .and_then(|l_p| l_p.parent())
        .expect("cadence crate must live two levels under the workspace root")
        .to_path_buf();

    // ---- Ensure the linker can find memory.x ----
    let l_memory_x_src = l_workspace_root.join("config").join("memory.x");
    if !l_memory_x_src.exists() {
        panic!(
            "Expected linker memory script at {:?}. \
             Make sure `memory.x` exists in config folder.",
            l_memory_x_src
        );
    }

    let l_out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR not set"));
    let l_memory_x_dst = l_out_dir.join("memory.x");
    fs::copy(&l_memory_x_src, &l_memory_x_dst).unwrap_or_else(|e| {
        panic!(
            "Failed to copy {:?} to {:?}: {}",
            l_memory_x_src, l_memory_x_dst, e
        )
    });

    println!("cargo:rustc-link-search={}", l_out_dir.display());
    println!("cargo:rerun-if-changed={}", l_memory_x_src.display());
    println!("cargo:rerun-if-env-changed=CADENCE_LOG");

    // ---- Linker arguments required for cortex-m-rt embedded targets ----
    // `--nmagic` is required when memory regions are not aligned to 0x10000.
    println!("cargo:rustc-link-arg=--nmagic");
    println!("cargo:rustc-link-arg=-Tlink.x");
}
