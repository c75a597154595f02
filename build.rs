// build.rs
use std::{env, fs, path::Path, process::Command};

fn main() {
    generate_version();
}

/// Write OUT_DIR/version.rs with the package version plus the short git
/// hash when a repository is present. Included from src/lib.rs.
fn generate_version() {
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest = Path::new(&out_dir).join("version.rs");

    let pkg = env::var("CARGO_PKG_VERSION").unwrap();
    let version = match git_short_hash() {
        Some(hash) => format!("{} ({})", pkg, hash),
        None => pkg,
    };

    fs::write(&dest, format!("pub const VERSION: &str = \"{}\";\n", version))
        .unwrap_or_else(|e| panic!("Failed to write {}: {}", dest.display(), e));

    println!("cargo:rerun-if-changed=build.rs");
}

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    if hash.is_empty() {
        None
    } else {
        Some(hash.to_string())
    }
}
