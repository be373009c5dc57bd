use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extension of the descriptor files FL Studio writes for each plugin.
pub const DESCRIPTOR_EXTENSION: &str = "nfo";

/// Extension of the shortcut files FL Studio loads plugins from.
pub const COMPANION_EXTENSION: &str = "fst";

/// Kind of plugin, which decides the top-level destination folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginCategory {
    Generator,
    Effect,
}

impl PluginCategory {
    /// Folder name used both inside the plugin database and in the output tree.
    pub fn folder_name(&self) -> &'static str {
        match self {
            PluginCategory::Generator => "Generators",
            PluginCategory::Effect => "Effects",
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PluginFormat {
    VST2,
    VST3,
}

impl PluginFormat {
    /// Subfolder FL Studio keeps this format's database entries in.
    pub fn folder_name(&self) -> &'static str {
        match self {
            PluginFormat::VST2 => "VST",
            PluginFormat::VST3 => "VST3",
        }
    }
}

/// One of the category/format folders inside the installed plugin database,
/// e.g. `Generators/VST3`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFolder {
    pub category: PluginCategory,
    pub format: PluginFormat,
    pub path: PathBuf,
}

impl SourceFolder {
    pub fn new(database_root: &Path, category: PluginCategory, format: PluginFormat) -> Self {
        let path = database_root
            .join(category.folder_name())
            .join(format.folder_name());
        Self { category, format, path }
    }
}

/// A descriptor and the companion file sharing its base name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PluginPair {
    pub descriptor: PathBuf,
    pub companion: PathBuf,
}

impl PluginPair {
    /// Pairs `descriptor` with its companion if one exists next to it.
    pub fn locate(descriptor: &Path) -> Option<Self> {
        let companion = descriptor.with_extension(COMPANION_EXTENSION);
        if companion.is_file() {
            Some(Self {
                descriptor: descriptor.to_path_buf(),
                companion,
            })
        } else {
            None
        }
    }

    /// Base name shared by both files, used in console output.
    pub fn name(&self) -> String {
        self.descriptor
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Vendor name to plugin pairs, for a single source folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorGroup {
    vendors: BTreeMap<String, Vec<PluginPair>>,
}

impl VendorGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, vendor: impl Into<String>, pair: PluginPair) {
        self.vendors.entry(vendor.into()).or_default().push(pair);
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }

    pub fn vendor_names(&self) -> Vec<String> {
        self.vendors.keys().cloned().collect()
    }

    pub fn pairs(&self, vendor: &str) -> &[PluginPair] {
        self.vendors.get(vendor).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PluginPair])> {
        self.vendors
            .iter()
            .map(|(vendor, pairs)| (vendor.as_str(), pairs.as_slice()))
    }
}
