use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

// @module: File and directory utilities

/// Prefix given to every translated output file
pub const OUTPUT_PREFIX: &str = "translated_";

/// Extension of the documents this tool reads and writes
pub const DOCX_EXTENSION: &str = "docx";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {:?}", path))?;
        }
        Ok(())
    }

    // @checks: `.docx` extension, case-insensitive
    pub fn is_docx<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(DOCX_EXTENSION))
    }

    // @checks: Name produced by a previous run
    pub fn is_translated_output<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with(OUTPUT_PREFIX))
    }

    // @generates: Output path `translated_<name>` for a translated document
    // @params: input_file, output_dir (defaults to the input's directory)
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, output_dir: Option<&Path>) -> PathBuf {
        let input_file = input_file.as_ref();
        let file_name = input_file.file_name().unwrap_or_default().to_string_lossy();
        let output_name = format!("{}{}", OUTPUT_PREFIX, file_name);

        match output_dir {
            Some(dir) => dir.join(output_name),
            None => input_file.with_file_name(output_name),
        }
    }

    /// Find `.docx` files under a directory, skipping earlier outputs and Word lock files
    pub fn find_docx_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            let name = entry.file_name().to_string_lossy();
            if path.is_file() && Self::is_docx(path) && !Self::is_translated_output(path) && !name.starts_with("~$") {
                result.push(path.to_path_buf());
            }
        }

        Ok(result)
    }

    /// Write bytes through a temporary file in the target directory, then rename
    ///
    /// A partially written document never appears under the final name.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
        let path = path.as_ref();
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        Self::ensure_dir(parent)?;

        let mut temp = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {:?}", parent))?;
        temp.write_all(content)
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        temp.persist(path)
            .with_context(|| format!("Failed to move output into place: {:?}", path))?;

        Ok(())
    }
}
