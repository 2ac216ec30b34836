use std::path::Path;
use std::process::Command;

/// Exposes the short commit hash as `GIT_HASH` when building from a git
/// checkout. Source tarballs build without it.
fn main() {
    let git_dir = Path::new(".git");
    if !git_dir.exists() {
        return;
    }
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");

    let hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    if let Some(hash) = hash {
        println!("cargo:rustc-env=GIT_HASH={}", hash);
    }
}
