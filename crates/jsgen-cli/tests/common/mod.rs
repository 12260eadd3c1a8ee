pub mod golden;

use std::path::PathBuf;

/// The crate directory, which holds `testdata/`.
pub fn crate_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Absolute path of a schema under `testdata/schemas`, as a string URI.
pub fn schema(relative: &str) -> String {
    crate_root()
        .join("testdata/schemas")
        .join(relative)
        .to_string_lossy()
        .into_owned()
}
