// Linking flags for the libtorch shared libraries resolved by `torch-sys`, so that test,
// bench and demo binaries find them at run time without `LD_LIBRARY_PATH`.
fn main() {
    println!("cargo:rerun-if-env-changed=DEP_TCH_LIBTORCH_LIB");
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "linux" && target_os != "windows" {
        return;
    }
    if let Some(libtorch_lib) = std::env::var_os("DEP_TCH_LIBTORCH_LIB") {
        println!(
            "cargo:rustc-link-arg=-Wl,-rpath={}",
            libtorch_lib.to_string_lossy()
        );
    }
    for flag in ["--no-as-needed", "--copy-dt-needed-entries"] {
        println!("cargo:rustc-link-arg=-Wl,{}", flag);
    }
    println!("cargo:rustc-link-arg=-ltorch");
}
