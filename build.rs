//! Marks the `.shared` section read/write/shared so every process that maps
//! the DLL sees the same target window.

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    let env = std::env::var("CARGO_CFG_TARGET_ENV").unwrap_or_default();

    // Only link.exe understands /section; GNU ld has no equivalent flag.
    if os == "windows" && env == "msvc" {
        println!("cargo:rustc-cdylib-link-arg=/section:.shared,RWS");
    } else if os == "windows" {
        println!("cargo:warning=.shared section is only marked shared on MSVC targets");
    }
}
