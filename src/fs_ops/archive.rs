//! Archive detection and extraction (zip, tar, tar.gz).

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use tracing::{debug, info};

use super::helpers::io_error_with_help;
use super::remove::RmtreeOptions;
use crate::errors::SuperPathError;
use crate::path::SuperPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    GzTar,
}

impl ArchiveFormat {
    /// File-name endings recognised for this format, longest first.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            ArchiveFormat::Zip => &[".zip"],
            ArchiveFormat::Tar => &[".tar"],
            ArchiveFormat::GzTar => &[".tar.gz", ".tgz"],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::Tar => "tar",
            ArchiveFormat::GzTar => "gztar",
        }
    }

    fn from_file_name(name: &str) -> Option<Self> {
        [ArchiveFormat::GzTar, ArchiveFormat::Zip, ArchiveFormat::Tar]
            .into_iter()
            .find(|f| f.extensions().iter().any(|ext| name.ends_with(ext)))
    }
}

/// Options for [`SuperPath::unpack`].
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Where to extract; defaults to [`SuperPath::extraction_directory`].
    pub extraction_directory: Option<SuperPath>,
    /// Delete whatever is at the extraction directory first.
    pub remove_existing: bool,
    /// Copy the archive's tag and mtime onto everything extracted.
    pub preserve_properties: bool,
    /// Delete the archive afterwards.
    pub remove_original: bool,
    /// Overrides detection from the file name.
    pub format: Option<ArchiveFormat>,
    /// Also unpack archives found inside the extracted tree.
    pub recursive: bool,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            extraction_directory: None,
            remove_existing: true,
            preserve_properties: true,
            remove_original: true,
            format: None,
            recursive: true,
        }
    }
}

impl UnpackOptions {
    pub fn into_dir(dir: impl Into<SuperPath>) -> Self {
        Self {
            extraction_directory: Some(dir.into()),
            ..Self::default()
        }
    }
}

impl SuperPath {
    pub fn archive_format(&self) -> Option<ArchiveFormat> {
        self.name().and_then(ArchiveFormat::from_file_name)
    }

    /// Sibling named after the archive with its archive extension removed.
    pub fn extraction_directory(&self) -> Option<SuperPath> {
        self.extraction_directory_for(self.archive_format()?)
    }

    fn extraction_directory_for(&self, format: ArchiveFormat) -> Option<SuperPath> {
        let name = self.name()?;
        let stripped = format
            .extensions()
            .iter()
            .find_map(|ext| name.strip_suffix(ext))
            .unwrap_or(name);
        Some(self.with_name(stripped))
    }

    /// [`SuperPath::unpack`] when this is a recognised archive; `Ok(None)` otherwise.
    pub fn unpack_if_archive(&self, options: UnpackOptions) -> Result<Option<SuperPath>> {
        if self.archive_format().is_none() && options.format.is_none() {
            return Ok(None);
        }
        self.unpack(options).map(Some)
    }

    /// Extract this archive and return the extraction directory.
    ///
    /// After extraction a `__MACOSX` folder is dropped, and a single wrapper
    /// folder with the same name as the extraction directory is flattened.
    pub fn unpack(&self, options: UnpackOptions) -> Result<SuperPath> {
        let format = options
            .format
            .or_else(|| self.archive_format())
            .ok_or_else(|| SuperPathError::UnsupportedArchive(self.to_path_buf()))?;
        let dest = match options.extraction_directory {
            Some(dir) => dir,
            None => self
                .extraction_directory_for(format)
                .ok_or_else(|| SuperPathError::UnsupportedArchive(self.to_path_buf()))?,
        };

        if options.remove_existing {
            if dest.is_dir() && !dest.is_symlink() {
                dest.rmtree(RmtreeOptions::missing_ok())?;
            } else {
                dest.unlink(true)?;
            }
        }
        fs::create_dir_all(&dest).map_err(io_error_with_help("create extraction directory", &dest))?;

        match format {
            ArchiveFormat::Zip => extract_zip(self, &dest)?,
            ArchiveFormat::Tar => extract_tar(open(self)?, self, &dest)?,
            ArchiveFormat::GzTar => extract_tar(GzDecoder::new(open(self)?), self, &dest)?,
        }
        info!(archive = %self, dest = %dest, format = format.name(), "unpacked archive");

        tidy_extraction(&dest)?;
        if options.preserve_properties {
            self.copy_properties_to(&dest)?;
        }
        if options.remove_original {
            self.unlink(false)?;
        }

        if options.recursive {
            let nested: Vec<SuperPath> = dest
                .find()
                .condition(|p| p.is_file() && p.archive_format().is_some())
                .into_iter()
                .collect();
            for archive in nested {
                debug!(archive = %archive, "unpacking nested archive");
                archive.unpack(UnpackOptions::default())?;
            }
        }
        Ok(dest)
    }
}

fn open(path: &SuperPath) -> Result<BufReader<File>> {
    let f = File::open(path).map_err(io_error_with_help("open archive", path))?;
    Ok(BufReader::new(f))
}

fn extract_zip(archive_path: &SuperPath, dest: &Path) -> Result<()> {
    let mut archive = zip::ZipArchive::new(open(archive_path)?)
        .with_context(|| format!("read zip archive '{}'", archive_path))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("read entry {i} of '{}'", archive_path))?;
        // Entries escaping the destination (absolute or `..`) are skipped.
        let Some(name) = entry.enclosed_name().map(Path::to_path_buf) else {
            debug!(archive = %archive_path, entry = entry.name(), "skipping unsafe zip entry");
            continue;
        };
        let out_path = dest.join(name);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(io_error_with_help("create directory", &out_path))?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(io_error_with_help("create directory", parent))?;
        }
        let mut out_file =
            File::create(&out_path).map_err(io_error_with_help("create file", &out_path))?;
        io::copy(&mut entry, &mut out_file).map_err(io_error_with_help("extract file", &out_path))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let _ = fs::set_permissions(&out_path, fs::Permissions::from_mode(mode & 0o7777));
        }
    }
    Ok(())
}

fn extract_tar<R: io::Read>(reader: R, archive_path: &SuperPath, dest: &Path) -> Result<()> {
    let mut archive = tar::Archive::new(reader);
    archive.set_preserve_mtime(true);
    archive
        .unpack(dest)
        .with_context(|| format!("extract tar archive '{}' into '{}'", archive_path, dest.display()))
}

fn tidy_extraction(dest: &SuperPath) -> Result<()> {
    dest.join("__MACOSX").rmtree(RmtreeOptions::missing_ok())?;
    let Some(name) = dest.file_name() else {
        return Ok(());
    };
    let wrapper = dest.join(name);
    if wrapper.exists() && dest.number_of_children() == 1 {
        debug!(wrapper = %wrapper, "flattening single wrapper folder");
        wrapper.pop_parent()?;
    }
    Ok(())
}
