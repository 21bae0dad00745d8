use std::env;
use std::process::Command;

fn main() {
    // libvirt dynamic library
    if env::var_os("CARGO_FEATURE_LIBVIRT").is_some() {
        println!("cargo:rustc-link-lib=dylib=virt");
    }

    // git hash
    let git_hash = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
}
