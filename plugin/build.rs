use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs");

    let git_hash = git_output(&["rev-parse", "--short=8", "HEAD"])
        .unwrap_or_else(|| "unknown".to_string());

    // Empty unless building a tagged commit
    let git_tag = git_output(&["describe", "--tags", "--exact-match"]).unwrap_or_default();

    let build_timestamp = chrono::Utc::now().to_rfc3339();

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=GIT_TAG={}", git_tag);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp);
}

/// Run a git command and return its trimmed stdout on success.
fn git_output(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}
