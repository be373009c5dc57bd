//! The organising pipeline: locate, parse, group, copy.

use crate::console::Reporter;
use crate::error::OrganiseError;
use crate::operations::{
    clean_stale_copies, copy_pair, ensure_category_folders, ensure_folder, sanitize_vendor_name,
};
use crate::plugin::{SourceFolder, VendorGroup};
use crate::registry::{scan_folder, DatabaseLocation};
use crate::report::{Failure, FolderReport, RunReport, Warning};
use std::path::{Path, PathBuf};

/// Everything a run needs besides its inputs.
pub struct RunContext {
    pub reporter: Reporter,
}

impl RunContext {
    pub fn new(reporter: Reporter) -> Self {
        Self { reporter }
    }
}

/// Builds a vendor-sorted copy of the plugin database under an output folder.
pub struct Organiser {
    database: DatabaseLocation,
    output_dir: PathBuf,
}

impl Organiser {
    pub fn new(database: DatabaseLocation, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            database,
            output_dir: output_dir.into(),
        }
    }

    /// Runs the whole pipeline.
    ///
    /// Fails only if the plugin database is missing or the category folders
    /// can't be created. Everything else is recorded in the report and the
    /// run carries on.
    pub fn run(&self, ctx: &RunContext) -> Result<RunReport, OrganiseError> {
        let started_at = chrono::Local::now();
        let reporter = &ctx.reporter;

        self.database.verify()?;

        for category_dir in ensure_category_folders(&self.output_dir)? {
            reporter.info(|p| {
                format!(
                    "Creating {} folder",
                    p.highlight(&category_dir.display().to_string())
                )
            });
        }

        let mut folders = Vec::new();
        for folder in self.database.source_folders() {
            folders.push(self.process_folder(&folder, reporter));
        }

        let report = RunReport {
            database_root: self.database.root().to_path_buf(),
            output_dir: self.output_dir.clone(),
            started_at,
            finished_at: chrono::Local::now(),
            folders,
        };

        reporter.info(|p| {
            format!(
                "Copied {} plugins with {} warnings and {} failures",
                p.highlight(&report.copied().to_string()),
                p.caution(&report.warnings().count().to_string()),
                p.failure(&report.failures().count().to_string()),
            )
        });
        let install_dir = self.database.plugin_database_dir().display().to_string();
        reporter.info(|p| {
            p.highlight(&format!(
                "Finished creating database, copy the 'Effects' and 'Generators' folders to {install_dir} to see them in FL Studio. Don't forget to take a backup first :)"
            ))
        });

        Ok(report)
    }

    fn process_folder(&self, folder: &SourceFolder, reporter: &Reporter) -> FolderReport {
        let scan = scan_folder(folder, reporter);
        let destination = self.output_dir.join(folder.category.folder_name());

        let mut report = FolderReport {
            category: folder.category,
            format: folder.format,
            source: folder.path.clone(),
            destination: destination.clone(),
            vendors: scan.group.vendor_names(),
            copied: 0,
            warnings: scan.warnings,
            failures: Vec::new(),
        };

        if !scan.group.is_empty() {
            reporter.info(|p| {
                format!(
                    "Creating new plugin database at {}",
                    p.location(&destination.display().to_string())
                )
            });
            materialize(&scan.group, &destination, reporter, &mut report);
        }

        report
    }
}

/// Copies every vendor's pairs into `<category_dir>/<vendor>/`.
fn materialize(group: &VendorGroup, category_dir: &Path, reporter: &Reporter, report: &mut FolderReport) {
    for (vendor, pairs) in group.iter() {
        let folder_name = sanitize_vendor_name(vendor);

        if folder_name.is_empty() {
            reporter.warn(|p| {
                format!(
                    "Vendor name '{}' has no usable characters, skipping its plugins",
                    p.caution(vendor)
                )
            });
            report.warnings.push(Warning::UnusableVendor {
                original: vendor.to_string(),
            });
            continue;
        }

        if folder_name != vendor {
            reporter.warn(|p| {
                format!(
                    "Vendor name '{}' contains prohibited characters, using '{}'",
                    p.caution(vendor),
                    p.highlight(&folder_name)
                )
            });
            report.warnings.push(Warning::SanitizedVendor {
                original: vendor.to_string(),
                sanitized: folder_name.clone(),
            });
        }

        let vendor_dir = category_dir.join(&folder_name);
        if !vendor_dir.is_dir() {
            reporter.detail(|p| format!("Creating vendor folder {}", p.highlight(&folder_name)));
        }
        if let Err(e) = ensure_folder(&vendor_dir) {
            reporter.error(|p| p.failure(&e.to_string()));
            report.failures.push(Failure {
                vendor: vendor.to_string(),
                path: vendor_dir.clone(),
                reason: e.to_string(),
            });
            continue;
        }
        match clean_stale_copies(&vendor_dir) {
            Ok(0) => {}
            Ok(count) => reporter.detail(|p| {
                format!(
                    "Removed {} leftover files from an interrupted run in {}",
                    p.caution(&count.to_string()),
                    p.highlight(&folder_name)
                )
            }),
            Err(e) => reporter.warn(|p| {
                format!(
                    "Failed to clean up {}: {}",
                    p.caution(&vendor_dir.display().to_string()),
                    e
                )
            }),
        }

        for pair in pairs {
            reporter.detail(|p| {
                format!(
                    "Copying {} to {}",
                    p.location(&pair.name()),
                    p.highlight(&folder_name)
                )
            });
            match copy_pair(pair, &vendor_dir) {
                Ok(()) => report.copied += 1,
                Err(e) => {
                    reporter.error(|p| p.failure(&e.to_string()));
                    report.failures.push(Failure {
                        vendor: vendor.to_string(),
                        path: pair.descriptor.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
    }
}
