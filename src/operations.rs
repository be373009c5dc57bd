//! Filesystem operations that build the organised database.
//!
//! - Vendor names are turned into safe folder names
//! - Category and vendor folders are created if missing
//! - Descriptor/companion pairs are copied as a unit

use crate::error::{CopyError, OrganiseError};
use crate::plugin::{PluginCategory, PluginPair};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};

/// Characters Windows refuses in folder names.
pub const PROHIBITED_FOLDER_NAME_CHARS: &[char] = &[':', '/', '\\', '"', '*', '|', '?', '<', '>'];

/// Suffix for copies that haven't been moved into place yet.
const PARTIAL_SUFFIX: &str = ".partial";

/// Suffix for files being replaced while a pair is moved into place.
const PREVIOUS_SUFFIX: &str = ".previous";

/// Strips characters that can't appear in a folder name.
///
/// Besides [`PROHIBITED_FOLDER_NAME_CHARS`] this drops control characters and
/// trailing dots and spaces, which Windows silently removes.
pub fn sanitize_vendor_name(vendor: &str) -> String {
    let cleaned: String = vendor
        .chars()
        .filter(|c| !PROHIBITED_FOLDER_NAME_CHARS.contains(c) && !c.is_control())
        .collect();
    cleaned.trim_end_matches(['.', ' ']).to_string()
}

/// Creates the top-level category folders under `output_dir`.
pub fn ensure_category_folders(output_dir: &Path) -> Result<Vec<PathBuf>, OrganiseError> {
    let mut created = Vec::new();
    for category in [PluginCategory::Generator, PluginCategory::Effect] {
        let dir = output_dir.join(category.folder_name());
        ensure_folder(&dir)?;
        created.push(dir);
    }
    Ok(created)
}

/// Creates `dir` unless it already exists.
pub fn ensure_folder(dir: &Path) -> Result<(), OrganiseError> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| OrganiseError::Destination {
        path: dir.to_path_buf(),
        source,
    })
}

/// Copies both files of `pair` into `vendor_dir`.
///
/// Either both new files end up in `vendor_dir` or the folder is left as it
/// was. Files already there with the same names are replaced, and restored if
/// the pair can't be placed. Timestamps and permissions are carried over, and
/// each copy is checked against its source before being moved into place.
pub fn copy_pair(pair: &PluginPair, vendor_dir: &Path) -> Result<(), CopyError> {
    let companion = stage_copy(&pair.companion, vendor_dir)?;
    let descriptor = match stage_copy(&pair.descriptor, vendor_dir) {
        Ok(staged) => staged,
        Err(e) => {
            companion.discard();
            return Err(e);
        }
    };

    let staged = [companion, descriptor];
    let targets: Vec<PathBuf> = staged.iter().map(|copy| copy.target.clone()).collect();
    let mut displaced: Vec<Displaced> = Vec::new();
    for target in &targets {
        match Displaced::move_aside(target) {
            Ok(Some(previous)) => displaced.push(previous),
            Ok(None) => {}
            Err(e) => {
                displaced.into_iter().for_each(Displaced::restore);
                staged.into_iter().for_each(StagedCopy::discard);
                return Err(e);
            }
        }
    }

    let mut placed: Vec<PathBuf> = Vec::new();
    let mut failure = None;
    for copy in staged {
        if failure.is_some() {
            copy.discard();
            continue;
        }
        match copy.commit() {
            Ok(target) => placed.push(target),
            Err(e) => failure = Some(e),
        }
    }

    if let Some(e) = failure {
        // Only files this call put in place are removed.
        for target in &placed {
            let _ = remove_writable(target);
        }
        displaced.into_iter().for_each(Displaced::restore);
        return Err(e);
    }

    displaced.into_iter().for_each(Displaced::drop_previous);
    Ok(())
}

/// Removes copies a killed run left behind in `vendor_dir`.
///
/// Unfinished `*.partial` copies are deleted. Moved-aside `*.previous` files
/// go back to their name if nothing replaced them, and are deleted otherwise.
/// Returns how many files were cleaned up.
pub fn clean_stale_copies(vendor_dir: &Path) -> io::Result<usize> {
    let mut cleaned = 0;

    for entry in fs::read_dir(vendor_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        if name.ends_with(PARTIAL_SUFFIX) {
            tracing::debug!(path = ?path, "Removing unfinished copy");
            remove_writable(&path)?;
            cleaned += 1;
        } else if let Some(original) = name.strip_suffix(PREVIOUS_SUFFIX) {
            let target = vendor_dir.join(original);
            if target.exists() {
                tracing::debug!(path = ?path, "Removing replaced file");
                remove_writable(&path)?;
            } else {
                tracing::debug!(path = ?path, "Restoring replaced file");
                fs::rename(&path, &target)?;
            }
            cleaned += 1;
        }
    }

    Ok(cleaned)
}

/// A finished copy sitting next to its final name.
struct StagedCopy {
    staged: PathBuf,
    target: PathBuf,
}

impl StagedCopy {
    fn commit(self) -> Result<PathBuf, CopyError> {
        match fs::rename(&self.staged, &self.target) {
            Ok(()) => Ok(self.target),
            Err(e) => {
                let _ = remove_writable(&self.staged);
                Err(CopyError::io(&self.target, e))
            }
        }
    }

    fn discard(self) {
        let _ = remove_writable(&self.staged);
    }
}

/// An earlier copy moved out of the way while its replacement goes in.
struct Displaced {
    previous: PathBuf,
    original: PathBuf,
}

impl Displaced {
    fn move_aside(target: &Path) -> Result<Option<Self>, CopyError> {
        if !target.is_file() {
            return Ok(None);
        }
        let previous = with_suffix(target, PREVIOUS_SUFFIX);
        fs::rename(target, &previous).map_err(|e| CopyError::io(target, e))?;
        Ok(Some(Self {
            previous,
            original: target.to_path_buf(),
        }))
    }

    fn restore(self) {
        if let Err(e) = fs::rename(&self.previous, &self.original) {
            tracing::warn!(path = ?self.previous, "Failed to restore replaced file: {e}");
        }
    }

    fn drop_previous(self) {
        if let Err(e) = remove_writable(&self.previous) {
            tracing::warn!(path = ?self.previous, "Failed to remove replaced file: {e}");
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Deletes a file even if it is marked read-only, which Windows refuses otherwise.
fn remove_writable(path: &Path) -> io::Result<()> {
    let mut permissions = fs::metadata(path)?.permissions();
    if permissions.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        permissions.set_readonly(false);
        fs::set_permissions(path, permissions)?;
    }
    fs::remove_file(path)
}

fn stage_copy(source: &Path, dest_dir: &Path) -> Result<StagedCopy, CopyError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| CopyError::io(source, io::Error::other("path has no file name")))?;
    let target = dest_dir.join(file_name);
    let staged = with_suffix(&target, PARTIAL_SUFFIX);

    let result = copy_with_metadata(source, &staged).and_then(|()| verify_copy(source, &staged));
    match result {
        Ok(()) => Ok(StagedCopy { staged, target }),
        Err(e) => {
            if staged.is_file() {
                let _ = remove_writable(&staged);
            }
            Err(e)
        }
    }
}

/// Copies contents, then timestamps, then permissions.
///
/// Permissions go last so a read-only source doesn't stop the times from
/// being set on the copy.
fn copy_with_metadata(source: &Path, dest: &Path) -> Result<(), CopyError> {
    let mut input = File::open(source).map_err(|e| CopyError::io(source, e))?;
    let metadata = input.metadata().map_err(|e| CopyError::io(source, e))?;

    let mut output = File::create(dest).map_err(|e| CopyError::io(dest, e))?;
    io::copy(&mut input, &mut output).map_err(|e| CopyError::io(dest, e))?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    output.set_times(times).map_err(|e| CopyError::io(dest, e))?;
    drop(output);

    fs::set_permissions(dest, metadata.permissions()).map_err(|e| CopyError::io(dest, e))
}

fn verify_copy(source: &Path, copy: &Path) -> Result<(), CopyError> {
    let expected = digest(source)?;
    let actual = digest(copy)?;
    if expected == actual {
        Ok(())
    } else {
        Err(CopyError::DigestMismatch {
            path: source.to_path_buf(),
        })
    }
}

fn digest(path: &Path) -> Result<md5::Digest, CopyError> {
    let bytes = fs::read(path).map_err(|e| CopyError::io(path, e))?;
    Ok(md5::compute(bytes))
}
