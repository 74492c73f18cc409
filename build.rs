fn main() {
    // Release builds set TICK_VERSION (e.g., "0.1.0-abc1234"); otherwise derive from git.
    println!("cargo:rerun-if-env-changed=TICK_VERSION");
    if let Ok(version) = std::env::var("TICK_VERSION") {
        println!("cargo:rustc-env=TICK_VERSION={version}");
        return;
    }

    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .unwrap_or_default()
        .trim()
        .to_string();

    let pkg = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();
    if hash.is_empty() {
        println!("cargo:rustc-env=TICK_VERSION={pkg}");
    } else {
        println!("cargo:rustc-env=TICK_VERSION={pkg}-{hash}");
    }
}
