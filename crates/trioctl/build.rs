// Build script for trioctl - embeds version at compile time

fn main() {
    // Release builds may set TRIO_VERSION; otherwise use Cargo.toml
    let version =
        std::env::var("TRIO_VERSION").unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string());

    println!("cargo:rustc-env=TRIO_VERSION={}", version);

    println!("cargo:rerun-if-changed=Cargo.toml");
    println!("cargo:rerun-if-env-changed=TRIO_VERSION");
}
