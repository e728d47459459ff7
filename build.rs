use std::env;

fn main() {
    // Reported by `dreamworld version`
    println!(
        "cargo:rustc-env=DREAMWORLD_RUSTC_VERSION={}",
        env::var("RUSTC_VERSION").unwrap_or_else(|_| "unknown".to_string())
    );
    println!(
        "cargo:rustc-env=DREAMWORLD_BUILD_TARGET={}",
        env::var("TARGET").unwrap_or_else(|_| "unknown".to_string())
    );
    println!("cargo:rerun-if-env-changed=RUSTC_VERSION");
}
