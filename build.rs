fn main() {
    println!("cargo:rerun-if-changed=resources/app.rc");
    println!("cargo:rerun-if-changed=resources/app.manifest");

    // Build scripts run on the host, so check the target explicitly.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("windows") {
        // Common controls v6 for the error dialog and per-monitor DPI awareness
        // so the icon metric reflects the real scale factor.
        embed_resource::compile("resources/app.rc", embed_resource::NONE)
            .manifest_required()
            .expect("failed to compile resources");
    }
}
