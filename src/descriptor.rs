//! Parser for FL Studio plugin descriptor (`.nfo`) files.
//!
//! Descriptors are INI-like files without a section header:
//!
//! ```text
//! ps_name=Serum
//! ps_file_vendorname_0=Xfer Records
//! ps_file_category_0=Synth
//! ```
//!
//! Only the vendor key is needed for organising, the rest is kept so callers
//! can inspect it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Key holding the plugin's vendor name.
pub const VENDOR_KEY: &str = "ps_file_vendorname_0";

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Failed to read descriptor {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parsed key-value contents of a descriptor file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    entries: HashMap<String, String>,
}

impl Descriptor {
    /// Reads and parses a descriptor from disk.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, FL Studio writes these
    /// files in whatever code page the plugin reported.
    pub fn load(path: &Path) -> Result<Self, DescriptorError> {
        let bytes = fs::read(path).map_err(|source| DescriptorError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Parses descriptor text.
    ///
    /// Keys are case-insensitive, `=` and `:` both separate key from value,
    /// `#`/`;` start comment lines and indented lines continue the previous
    /// value. Section headers and lines without a separator are ignored.
    pub fn parse(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut entries: HashMap<String, String> = HashMap::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                current = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = line.starts_with(|c: char| c.is_whitespace());
            if indented {
                if let Some(value) = current.as_ref().and_then(|key| entries.get_mut(key)) {
                    if !value.is_empty() {
                        value.push('\n');
                    }
                    value.push_str(trimmed);
                    continue;
                }
            }

            if trimmed.starts_with('[') && trimmed.ends_with(']') {
                current = None;
                continue;
            }

            match trimmed.find(['=', ':']) {
                Some(index) => {
                    let key = trimmed[..index].trim().to_lowercase();
                    let value = trimmed[index + 1..].trim().to_string();
                    if key.is_empty() {
                        current = None;
                        continue;
                    }
                    entries.insert(key.clone(), value);
                    current = Some(key);
                }
                None => current = None,
            }
        }

        Self { entries }
    }

    /// Looks up a key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&key.to_lowercase()).map(String::as_str)
    }

    /// Vendor name, if present and non-empty.
    pub fn vendor(&self) -> Option<&str> {
        self.get(VENDOR_KEY).filter(|v| !v.is_empty())
    }
}
