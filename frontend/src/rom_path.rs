//! ROM image resolution: a plain file, or the first image entry of a ZIP
//! archive.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use beamline_machines::rom_loader::RomLoadError;

/// File extensions recognised as ROM images inside an archive.
const IMAGE_EXTENSIONS: &[&str] = &["bin", "vec", "rom", "gam"];

/// Load one ROM image from `path`.
///
/// A `.zip` path yields its first entry with a recognised image extension,
/// or its first file if none match.
pub fn load_image(path: &Path) -> Result<Vec<u8>, RomLoadError> {
    if !path.exists() {
        return Err(RomLoadError::MissingFile(path.display().to_string()));
    }
    let data = if path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"))
    {
        load_from_zip(path)?
    } else {
        std::fs::read(path)?
    };
    if data.is_empty() {
        return Err(RomLoadError::Empty(path.display().to_string()));
    }
    Ok(data)
}

fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|x| ext.eq_ignore_ascii_case(x)))
}

fn load_from_zip(path: &Path) -> Result<Vec<u8>, RomLoadError> {
    let reader = BufReader::new(File::open(path)?);
    let mut archive = zip::ZipArchive::new(reader).map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("invalid ZIP: {e}"))
    })?;

    let mut first_file = None;
    let mut chosen = None;
    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("ZIP entry error: {e}"),
            )
        })?;
        if entry.is_dir() {
            continue;
        }
        first_file.get_or_insert(i);
        if is_image_name(entry.name()) {
            chosen = Some(i);
            break;
        }
    }

    let Some(index) = chosen.or(first_file) else {
        return Err(RomLoadError::MissingFile(format!(
            "{} (archive has no files)",
            path.display()
        )));
    };
    let mut entry = archive.by_index(index).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("ZIP entry error: {e}"),
        )
    })?;
    log::debug!("using {} from {}", entry.name(), path.display());
    let mut data = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut data)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn create_test_zip(dir: &Path, name: &str, files: &[(&str, &[u8])]) -> std::path::PathBuf {
        let zip_path = dir.join(name);
        let file = File::create(&zip_path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for (fname, data) in files {
            zip.start_file(*fname, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
        zip_path
    }

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn plain_file_is_read_directly() {
        let dir = scratch_dir("beamline_rompath_plain");
        let path = dir.join("game.vec");
        std::fs::write(&path, [0xAA; 16]).unwrap();

        assert_eq!(load_image(&path).unwrap(), vec![0xAA; 16]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn zip_prefers_image_entries() {
        let dir = scratch_dir("beamline_rompath_zip");
        let zip_path = create_test_zip(
            &dir,
            "game.zip",
            &[("readme.txt", b"hello"), ("game.bin", &[0xBB; 8])],
        );

        assert_eq!(load_image(&zip_path).unwrap(), vec![0xBB; 8]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn zip_without_image_extension_uses_first_file() {
        let dir = scratch_dir("beamline_rompath_zip_plain");
        let zip_path = create_test_zip(&dir, "game.zip", &[("GAME", &[0xCC; 4])]);

        assert_eq!(load_image(&zip_path).unwrap(), vec![0xCC; 4]);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_and_empty_files_are_errors() {
        let dir = scratch_dir("beamline_rompath_errors");
        assert!(matches!(
            load_image(&dir.join("nope.bin")),
            Err(RomLoadError::MissingFile(_))
        ));
        let empty = dir.join("empty.bin");
        std::fs::write(&empty, [0u8; 0]).unwrap();
        assert!(matches!(load_image(&empty), Err(RomLoadError::Empty(_))));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
