//! Run configuration resolved from command-line flags and the environment.

use std::path::{Path, PathBuf};

/// Program name, also the default log file stem.
pub const PROGRAM_NAME: &str = "fl-plugindb-organiser";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganiserConfig {
    /// Absolute folder that receives `Generators` and `Effects`.
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    pub color: bool,
    pub report_file: Option<PathBuf>,
}

impl OrganiserConfig {
    /// Resolves raw CLI values against `cwd`.
    ///
    /// `.` (or any relative path) is taken relative to `cwd`. Colour is off
    /// when `no_color` is set or `NO_COLOR` is present in the environment.
    pub fn resolve(
        cwd: &Path,
        output: &Path,
        log: Option<&Path>,
        no_color: bool,
        report: Option<&Path>,
    ) -> Self {
        let output_dir = absolute(cwd, output);
        let log_file = log
            .map(|l| absolute(cwd, l))
            .unwrap_or_else(|| cwd.join(format!("{PROGRAM_NAME}.log")));
        let color = !no_color && std::env::var_os("NO_COLOR").is_none();

        Self {
            output_dir,
            log_file,
            color,
            report_file: report.map(|r| absolute(cwd, r)),
        }
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path == Path::new(".") {
        cwd.to_path_buf()
    } else if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Fails unless running on Windows, the only place FL Studio keeps its
/// plugin database in the expected layout.
pub fn ensure_supported_platform() -> Result<(), crate::OrganiseError> {
    if cfg!(windows) {
        Ok(())
    } else {
        Err(crate::OrganiseError::UnsupportedPlatform {
            os: std::env::consts::OS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_resolves_to_cwd_and_log_defaults_there() {
        let cwd = Path::new("/work");
        let config = OrganiserConfig::resolve(cwd, Path::new("."), None, true, None);

        assert_eq!(config.output_dir, cwd);
        assert_eq!(config.log_file, cwd.join("fl-plugindb-organiser.log"));
        assert!(!config.color);
        assert_eq!(config.report_file, None);
    }

    #[test]
    fn relative_paths_are_joined_to_cwd() {
        let cwd = Path::new("/work");
        let config = OrganiserConfig::resolve(
            cwd,
            Path::new("out"),
            Some(Path::new("logs/run.log")),
            true,
            Some(Path::new("report.json")),
        );

        assert_eq!(config.output_dir, cwd.join("out"));
        assert_eq!(config.log_file, cwd.join("logs/run.log"));
        assert_eq!(config.report_file, Some(cwd.join("report.json")));
    }

    #[test]
    fn platform_check_matches_target() {
        assert_eq!(ensure_supported_platform().is_ok(), cfg!(windows));
    }
}
