use std::env;

fn main() {
    println!("cargo::rustc-check-cfg=cfg(armv6m)");
    println!("cargo::rustc-check-cfg=cfg(armv7m)");
    println!("cargo::rerun-if-changed=build.rs");

    let target = env::var("TARGET").unwrap_or_default();

    // ARMv6-M has no exclusive-access instructions; ARMv8-M baseline regained them.
    if target.starts_with("thumbv6m-") {
        println!("cargo::rustc-cfg=armv6m");
    } else if target.starts_with("thumbv7m-")
        || target.starts_with("thumbv7em-")
        || target.starts_with("thumbv8m.")
    {
        println!("cargo::rustc-cfg=armv7m");
    }
}
