use std::path::PathBuf;

/// Compare `actual` against `testdata/golden/<name>`.
///
/// Set `UPDATE_GOLDEN=1` to rewrite the file instead. A missing golden file
/// is written on first run.
pub fn assert_golden(name: &str, actual: &str) {
    let path: PathBuf = super::crate_root().join("testdata/golden").join(name);
    if std::env::var_os("UPDATE_GOLDEN").is_some() || !path.exists() {
        std::fs::write(&path, actual).unwrap();
        return;
    }
    let expected = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        actual,
        expected,
        "output differs from {}; rerun with UPDATE_GOLDEN=1 to accept",
        path.display()
    );
}
