//! Unicode-normalization-safe file lookup.
//!
//! File names written on macOS usually arrive in NFD (decomposed Hangul jamo,
//! combining accents) while names typed in configuration or source code are
//! NFC. Every comparison in this crate goes through [`normalize_name`] so both
//! forms collapse to one key.
//!
//! Known ambiguity: if two directory entries normalize to the same NFC form,
//! [`find_file_by_normalized_name`] returns whichever the directory iterator
//! yields first. The order is filesystem dependent and is not corrected here.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use unicode_normalization::UnicodeNormalization;

// ---

/// Canonical composition (NFC) of `name`.
pub fn normalize_name(name: &str) -> String {
    name.nfc().collect()
}

/// Find the entry in `directory` whose NFC name equals the NFC form of `target`.
///
/// Returns `Ok(None)` when no entry matches. `Err` means the directory itself
/// could not be listed, which callers treat differently from "absent".
pub fn find_file_by_normalized_name(directory: &Path, target: &str) -> io::Result<Option<PathBuf>> {
    // ---
    let target_norm = normalize_name(target);

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            tracing::debug!("Skipping non UTF-8 entry {:?}", file_name);
            continue;
        };
        if normalize_name(name) == target_norm {
            return Ok(Some(entry.path()));
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use unicode_normalization::UnicodeNormalization;

    fn nfd(s: &str) -> String {
        s.nfd().collect()
    }

    #[test]
    fn test_normalize_collapses_forms() {
        // ---
        let composed = "하늘고_환경데이터.csv";
        let decomposed = nfd(composed);

        assert_ne!(composed, decomposed);
        assert_eq!(normalize_name(composed), normalize_name(&decomposed));
        assert_eq!(normalize_name(&decomposed), composed);
    }

    #[test]
    fn test_finds_decomposed_file_from_composed_target() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let on_disk = nfd("송도고_환경데이터.csv");
        fs::write(dir.path().join(&on_disk), "x").unwrap();

        let found = find_file_by_normalized_name(dir.path(), "송도고_환경데이터.csv").unwrap();
        assert_eq!(found, Some(dir.path().join(&on_disk)));
    }

    #[test]
    fn test_finds_composed_file_from_decomposed_target() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Café.csv"), "x").unwrap();

        let found = find_file_by_normalized_name(dir.path(), &nfd("Café.csv")).unwrap();
        assert_eq!(found, Some(dir.path().join("Café.csv")));
    }

    #[test]
    fn test_both_forms_on_disk_yield_one_match() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let composed = "동산고_환경데이터.csv";
        let decomposed = nfd(composed);
        fs::write(dir.path().join(composed), "nfc").unwrap();
        fs::write(dir.path().join(&decomposed), "nfd").unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);

        let found = find_file_by_normalized_name(dir.path(), composed).unwrap().unwrap();

        // either entry may win; it is one of the two and the lookup is stable
        assert!(found == dir.path().join(composed) || found == dir.path().join(&decomposed));
        let again = find_file_by_normalized_name(dir.path(), &decomposed).unwrap();
        assert_eq!(again, Some(found));
    }

    #[test]
    fn test_absent_is_none_not_error() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("아라고_환경데이터.csv"), "x").unwrap();

        let found = find_file_by_normalized_name(dir.path(), "동산고_환경데이터.csv").unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_missing_directory_is_error() {
        // ---
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(find_file_by_normalized_name(&missing, "a.csv").is_err());
    }
}
