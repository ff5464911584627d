use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbImage};

use crate::errors::{Result, ScreeningError};

/// Extensions picked up when scanning a directory
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Raw bytes of a photo read from disk
pub struct InputFile {
    pub bytes: Vec<u8>,
    /// Guessed from the extension; advisory only
    pub content_type: Option<&'static str>,
}

/// Get all supported photo files from a directory (recursively), sorted by path
pub fn get_image_files_in_dir<P: AsRef<Path>>(dir_path: P) -> Result<Vec<PathBuf>> {
    let dir_path = dir_path.as_ref();

    if !dir_path.exists() {
        return Err(ScreeningError::InvalidPath(dir_path.to_path_buf()));
    }

    if !dir_path.is_dir() {
        return Err(ScreeningError::Config(format!(
            "{} is not a directory",
            dir_path.display()
        )));
    }

    let mut files = Vec::new();
    find_image_files_recursive(dir_path, &mut files)?;
    files.sort();

    Ok(files)
}

fn find_image_files_recursive(dir_path: &Path, result: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir_path)? {
        let path = entry?.path();

        if path.is_dir() {
            find_image_files_recursive(&path, result)?;
        } else if path.is_file() && has_image_extension(&path) {
            result.push(path);
        }
    }

    Ok(())
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// MIME type implied by a file extension
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Read a photo's raw bytes without decoding; the pipeline validates them
pub fn read_input_file<P: AsRef<Path>>(path: P) -> Result<InputFile> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    Ok(InputFile {
        bytes,
        content_type: content_type_for(path),
    })
}

/// Path of a photo relative to the scanned root, or just its file name when
/// it lies outside the root
pub fn source_name(path: &Path, root: &Path) -> PathBuf {
    match path.strip_prefix(root) {
        Ok(relative) if relative.file_name().is_some() => relative.to_path_buf(),
        _ => PathBuf::from(path.file_name().unwrap_or_default()),
    }
}

/// Base name for a photo's reports: its path under `root` with the extension
/// folded into the stem, so `week2/a.jpg` becomes `week2/a_jpg`
pub fn report_name(path: &Path, root: &Path) -> PathBuf {
    let relative = source_name(path, root);
    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let name = match relative.extension() {
        Some(ext) => format!("{}_{}", stem, ext.to_string_lossy()),
        None => stem,
    };

    relative.with_file_name(name)
}

/// Save an RGB image as PNG, creating parent directories as needed
pub fn save_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    image.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_supported_extensions() {
        assert!(has_image_extension(Path::new("a/b/rash.JPG")));
        assert!(has_image_extension(Path::new("mole.webp")));
        assert!(!has_image_extension(Path::new("scan.bmp")));
        assert!(!has_image_extension(Path::new("README")));
    }

    #[test]
    fn content_type_from_extension() {
        assert_eq!(content_type_for(Path::new("x.jpeg")), Some("image/jpeg"));
        assert_eq!(content_type_for(Path::new("x.PNG")), Some("image/png"));
        assert_eq!(content_type_for(Path::new("x.gif")), None);
    }

    #[test]
    fn scans_nested_directories_in_sorted_order() {
        let root = std::env::temp_dir().join(format!("derma_screen_scan_{}", std::process::id()));
        let nested = root.join("week2");
        fs::create_dir_all(&nested).unwrap();
        fs::write(root.join("b.png"), b"x").unwrap();
        fs::write(root.join("a.jpg"), b"x").unwrap();
        fs::write(root.join("notes.txt"), b"x").unwrap();
        fs::write(nested.join("c.webp"), b"x").unwrap();

        let files = get_image_files_in_dir(&root).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(&root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("a.jpg"),
                PathBuf::from("b.png"),
                PathBuf::from("week2").join("c.webp"),
            ]
        );
        fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn report_names_stay_distinct_across_extensions_and_folders() {
        let root = Path::new("/photos");
        let names: Vec<PathBuf> = [
            "/photos/lesion.jpg",
            "/photos/lesion.png",
            "/photos/week1/a.jpg",
            "/photos/week2/a.jpg",
            "/photos/week2/a.JPEG",
        ]
        .iter()
        .map(|p| report_name(Path::new(p), root))
        .collect();

        assert_eq!(
            names,
            vec![
                PathBuf::from("lesion_jpg"),
                PathBuf::from("lesion_png"),
                PathBuf::from("week1").join("a_jpg"),
                PathBuf::from("week2").join("a_jpg"),
                PathBuf::from("week2").join("a_JPEG"),
            ]
        );
    }

    #[test]
    fn single_file_input_is_named_after_the_file() {
        let path = Path::new("/tmp/arm/rash.webp");
        let root = path.parent().unwrap();
        assert_eq!(source_name(path, root), PathBuf::from("rash.webp"));
        assert_eq!(report_name(path, root), PathBuf::from("rash_webp"));

        // Outside the root only the file name is kept
        assert_eq!(report_name(path, Path::new("/elsewhere")), PathBuf::from("rash_webp"));
    }

    #[test]
    fn reads_raw_bytes_with_content_type() {
        let dir = std::env::temp_dir().join(format!("derma_screen_read_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("elbow.PNG");
        fs::write(&path, b"not decoded here").unwrap();

        let input = read_input_file(&path).unwrap();
        assert_eq!(input.bytes, b"not decoded here");
        assert_eq!(input.content_type, Some("image/png"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_directory_is_invalid_path() {
        let result = get_image_files_in_dir("/no/such/photos");
        assert!(matches!(result, Err(ScreeningError::InvalidPath(_))));
    }
}
