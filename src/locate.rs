use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PloopError, PloopResult};

/// Extensions recognized as still images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "tif", "tiff"];

pub fn is_image_path(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
}

/// Walk `root` recursively and collect every recognized image file.
///
/// The returned order is the encode order. With `sort_by_name` false that is raw
/// directory-walk order, which is not guaranteed stable across platforms; callers
/// relying on chronology should name files so that lexicographic order matches and
/// pass `sort_by_name = true`.
///
/// A walk failure anywhere in the tree (missing root, unreadable directory) is a
/// setup error: no partial listing is returned.
pub fn locate_images(root: &Path, sort_by_name: bool) -> PloopResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            PloopError::setup(format!("cannot walk '{}': {e}", root.display()))
        })?;
        if entry.file_type().is_file() && is_image_path(entry.path()) {
            files.push(entry.into_path());
        }
    }

    if sort_by_name {
        files.sort();
    }

    tracing::debug!(
        root = %root.display(),
        count = files.len(),
        sorted = sort_by_name,
        "located images"
    );
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_predicate_is_case_insensitive() {
        assert!(is_image_path(Path::new("a/b/c.jpg")));
        assert!(is_image_path(Path::new("a/b/c.JPEG")));
        assert!(is_image_path(Path::new("c.Png")));
        assert!(is_image_path(Path::new("c.TIF")));
        assert!(is_image_path(Path::new("c.tiff")));
    }

    #[test]
    fn extension_predicate_rejects_non_images() {
        assert!(!is_image_path(Path::new("c.gif")));
        assert!(!is_image_path(Path::new("c.mp4")));
        assert!(!is_image_path(Path::new("c.jpg.txt")));
        assert!(!is_image_path(Path::new("noextension")));
        assert!(!is_image_path(Path::new(".jpg/dir_named_like_ext")));
    }

    #[test]
    fn missing_root_is_a_setup_error() {
        let err = locate_images(Path::new("target/definitely_missing_dir_xyz"), false)
            .unwrap_err();
        assert!(err.to_string().contains("setup error:"));
    }
}
