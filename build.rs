//! Build script that embeds the version string into the binary.

use std::process::Command;

fn main() {
    // Prefer AWAY_VERSION when set by a release build, otherwise describe the
    // checkout so local builds report where they came from.
    if let Ok(version) = std::env::var("AWAY_VERSION") {
        println!("cargo:rustc-env=AWAY_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=AWAY_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=AWAY_VERSION");
}
