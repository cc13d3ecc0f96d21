fn main() {
    // Standard Tauri build. Headless builds (no `gui` feature) have nothing
    // to do here.
    #[cfg(feature = "gui")]
    tauri_build::build();
}
