//! Locating FL Studio's installed plugin database and reading it.
//!
//! FL Studio keeps one descriptor (`.nfo`) and one shortcut (`.fst`) per
//! plugin under `Documents/Image-Line/FL Studio/Presets/Plugin database/Installed`,
//! split by category and format:
//!
//! ```text
//! Installed/
//!   Generators/VST/   Generators/VST3/
//!   Effects/VST/      Effects/VST3/
//! ```

use crate::console::Reporter;
use crate::descriptor::Descriptor;
use crate::error::OrganiseError;
use crate::plugin::{PluginCategory, PluginFormat, PluginPair, SourceFolder, VendorGroup, DESCRIPTOR_EXTENSION};
use crate::report::Warning;
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the installed plugin database relative to the documents folder.
const DATABASE_SUBPATH: [&str; 5] = [
    "Image-Line",
    "FL Studio",
    "Presets",
    "Plugin database",
    "Installed",
];

/// Scan order of the database subfolders.
const SOURCE_LAYOUT: [(PluginCategory, PluginFormat); 4] = [
    (PluginCategory::Generator, PluginFormat::VST2),
    (PluginCategory::Generator, PluginFormat::VST3),
    (PluginCategory::Effect, PluginFormat::VST2),
    (PluginCategory::Effect, PluginFormat::VST3),
];

/// Root of the installed plugin database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseLocation {
    root: PathBuf,
}

impl DatabaseLocation {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves the database under the current user's documents folder.
    pub fn discover() -> Result<Self, OrganiseError> {
        let documents = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .ok_or_else(|| OrganiseError::DatabaseNotFound {
                path: DATABASE_SUBPATH.iter().collect(),
            })?;
        Ok(Self::under(&documents))
    }

    /// Database location inside a given documents folder.
    pub fn under(documents: &Path) -> Self {
        let mut root = documents.to_path_buf();
        root.extend(DATABASE_SUBPATH);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder FL Studio reads the organised `Generators`/`Effects` from.
    pub fn plugin_database_dir(&self) -> &Path {
        self.root.parent().unwrap_or(&self.root)
    }

    pub fn verify(&self) -> Result<(), OrganiseError> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(OrganiseError::DatabaseNotFound {
                path: self.root.clone(),
            })
        }
    }

    pub fn source_folders(&self) -> Vec<SourceFolder> {
        SOURCE_LAYOUT
            .iter()
            .map(|(category, format)| SourceFolder::new(&self.root, *category, *format))
            .collect()
    }
}

/// Vendor grouping of one source folder plus everything that got skipped.
#[derive(Debug, Default)]
pub struct FolderScan {
    pub group: VendorGroup,
    pub warnings: Vec<Warning>,
}

/// Reads every descriptor in `folder` and groups the complete pairs by vendor.
pub fn scan_folder(folder: &SourceFolder, reporter: &Reporter) -> FolderScan {
    let mut scan = FolderScan::default();
    let path = &folder.path;

    reporter.info(|p| format!("Scanning {}", p.location(&path.display().to_string())));

    if !path.is_dir() {
        reporter.warn(|p| {
            format!(
                "{} doesn't exist or isn't a folder",
                p.caution(&path.display().to_string())
            )
        });
        scan.warnings.push(Warning::MissingSourceFolder { path: path.clone() });
        return scan;
    }

    let descriptors = match list_descriptors(path) {
        Ok(descriptors) => descriptors,
        Err(e) => {
            reporter.warn(|p| {
                format!(
                    "Failed to read {}: {}",
                    p.caution(&path.display().to_string()),
                    e
                )
            });
            scan.warnings.push(Warning::UnreadableSourceFolder {
                path: path.clone(),
                reason: e.to_string(),
            });
            return scan;
        }
    };

    reporter.info(|_| "Finding vendor names...".to_string());
    for descriptor_path in descriptors {
        let descriptor = match Descriptor::load(&descriptor_path) {
            Ok(descriptor) => descriptor,
            Err(e) => {
                reporter.warn(|p| p.caution(&e.to_string()));
                scan.warnings.push(Warning::UnreadableDescriptor {
                    path: descriptor_path,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let Some(vendor) = descriptor.vendor() else {
            reporter.warn(|p| {
                format!(
                    "Couldn't find vendor name from {}",
                    p.caution(&descriptor_path.display().to_string())
                )
            });
            scan.warnings.push(Warning::MissingVendor {
                descriptor: descriptor_path,
            });
            continue;
        };

        match PluginPair::locate(&descriptor_path) {
            Some(pair) => {
                tracing::debug!(vendor, descriptor = ?pair.descriptor, "Found plugin pair");
                scan.group.insert(vendor, pair);
            }
            None => {
                reporter.warn(|p| {
                    format!(
                        "No corresponding .fst found for {}",
                        p.caution(&descriptor_path.display().to_string())
                    )
                });
                scan.warnings.push(Warning::MissingCompanion {
                    descriptor: descriptor_path,
                });
            }
        }
    }

    let vendors = scan.group.vendor_names();
    reporter.info(|p| {
        format!(
            "Found {} vendors: {:?}",
            p.highlight(&vendors.len().to_string()),
            vendors
        )
    });

    scan
}

/// Descriptor files directly inside `dir`, sorted by path.
fn list_descriptors(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut descriptors = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_descriptor = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(DESCRIPTOR_EXTENSION));
        if is_descriptor {
            descriptors.push(path);
        }
    }

    descriptors.sort();
    Ok(descriptors)
}
