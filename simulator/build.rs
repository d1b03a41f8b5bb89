//! Build script for vape-timer-simulator
//!
//! On Windows, points the linker at a local SDL2 and copies SDL2.dll next to
//! the binary. The SDL2 directory is `$SDL2_DIR`, or `../vendor/sdl2`.

use std::path::{Path, PathBuf};
use std::{env, fs};

fn main() {
    println!("cargo:rerun-if-env-changed=SDL2_DIR");

    // Only run SDL2 setup on Windows
    if env::var("CARGO_CFG_TARGET_OS").unwrap_or_default() != "windows" {
        return;
    }

    let Some(sdl2_dir) = sdl2_dir() else {
        println!("cargo:warning=SDL2 not found; set SDL2_DIR or put SDL2.lib and SDL2.dll in vendor/sdl2/");
        return;
    };
    println!("cargo:rerun-if-changed={}", sdl2_dir.display());
    println!("cargo:rustc-link-search=native={}", sdl2_dir.display());

    if let Err(e) = copy_dll(&sdl2_dir) {
        println!("cargo:warning=Failed to copy SDL2.dll: {e}");
    }
}

/// First existing SDL2 directory.
fn sdl2_dir() -> Option<PathBuf> {
    let from_env = env::var_os("SDL2_DIR").map(PathBuf::from);
    let vendored = env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .and_then(|dir| dir.parent().map(|root| root.join("vendor").join("sdl2")));

    from_env.into_iter().chain(vendored).find(|dir| dir.exists())
}

/// Copy SDL2.dll into the profile directory (`target/<profile>`), above OUT_DIR.
fn copy_dll(sdl2_dir: &Path) -> std::io::Result<()> {
    let out_dir = PathBuf::from(env::var_os("OUT_DIR").unwrap_or_default());
    let Some(target_dir) = out_dir
        .ancestors()
        .find(|p| p.file_name().is_some_and(|n| n == "release" || n == "debug"))
    else {
        return Ok(());
    };

    let dll_src = sdl2_dir.join("SDL2.dll");
    let dll_dst = target_dir.join("SDL2.dll");
    if dll_src.exists() && !dll_dst.exists() {
        fs::copy(&dll_src, &dll_dst)?;
    }
    Ok(())
}
