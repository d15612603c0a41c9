//! Generates Kotlin and Swift bindings for `keyfile-core`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
