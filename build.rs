use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

fn main() {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());
    let rustc_version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");
    let dest_path = Path::new(&out_dir).join("rustc_version.rs");
    fs::write(
        &dest_path,
        format!("pub const RUSTC_VERSION: &str = {:?};\n", rustc_version),
    )
    .expect("failed to write rustc_version.rs");

    println!("cargo:rerun-if-changed=build.rs");
}
