//! Locates the compiled flexible pool for the deployment tests.
//!
//! `create_pool` deploys from uploaded wasm, so those tests need the pool
//! built for a wasm target first (`make test` does this). Without it they
//! are compiled out and a warning is printed.

use std::{env, fs, path::PathBuf};

const POOL_WASM: &str = "flexible_pool.wasm";

fn main() {
    println!("cargo:rustc-check-cfg=cfg(pool_wasm)");
    println!("cargo:rerun-if-env-changed=CARGO_TARGET_DIR");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").unwrap_or_default());
    let target_dir = env::var("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| manifest_dir.join("../../target"));

    for triple in ["wasm32v1-none", "wasm32-unknown-unknown"] {
        let candidate = target_dir.join(triple).join("release").join(POOL_WASM);
        println!("cargo:rerun-if-changed={}", candidate.display());
        if candidate.exists() {
            let out = PathBuf::from(env::var("OUT_DIR").unwrap_or_default()).join(POOL_WASM);
            if fs::copy(&candidate, &out).is_ok() {
                println!("cargo:rustc-cfg=pool_wasm");
                return;
            }
        }
    }
    println!("cargo:warning={POOL_WASM} not found; pool deployment tests are skipped");
}
