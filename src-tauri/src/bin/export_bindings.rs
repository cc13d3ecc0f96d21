//! TypeScript bindings exporter (tauri-specta).
//!
//! Generates `src/bindings.ts` from the Rust command/type surface. Kept out
//! of the main app runtime path.

use std::path::PathBuf;

use specta_typescript::{BigIntExportBehavior, Typescript};
use tauri_specta::Builder;

fn main() {
    // Collect all commands exposed to the frontend.
    let mut builder = Builder::<tauri::Wry>::new().commands(maskview_lib::collect_commands!());

    // Event payloads are emitted via stringly-typed event names; register
    // them so the frontend type system still sees them.
    builder = builder
        .typ::<maskview_lib::ipc::UploadProgressEvent>()
        .typ::<maskview_lib::ipc::JobStatusEvent>()
        .typ::<maskview_lib::ipc::JobCompletedEvent>()
        .typ::<maskview_lib::ipc::JobFailedEvent>();

    let out_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("src")
        .join("bindings.ts");

    builder
        .export(
            Typescript::new().bigint(BigIntExportBehavior::Number),
            &out_path,
        )
        .unwrap_or_else(|e| panic!("Failed to export TypeScript bindings: {e}"));

    println!("Exported TypeScript bindings to {}", out_path.display());
}
