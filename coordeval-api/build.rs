//! Build script for coordeval-api
//!
//! Captures the short git hash, build timestamp and build profile for the
//! startup banner and `/api/buildinfo`. Deployments built from a source
//! archive have no `.git`; they can pass `COORDEVAL_GIT_HASH` instead, and
//! `SOURCE_DATE_EPOCH` pins the timestamp for reproducible images.

use std::process::Command;

fn git_hash() -> String {
    if let Some(hash) = std::env::var("COORDEVAL_GIT_HASH").ok().filter(|h| !h.trim().is_empty()) {
        return hash.trim().to_string();
    }

    Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn build_timestamp() -> String {
    let pinned = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0));

    pinned
        .unwrap_or_else(chrono::Utc::now)
        .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn main() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp());
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    // No rerun-if-changed: the script reruns on every build so the hash stays current
}
