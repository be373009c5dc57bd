//! FL Plugin Database Organiser
//!
//! Reads the plugin database files (`.nfo` descriptors and `.fst` shortcuts)
//! FL Studio creates for installed plugins and copies them into folders named
//! after each plugin's vendor, split into `Generators` and `Effects`.
//!
//! # Modules
//!
//! ## Plugin database (`registry`, `descriptor`)
//! - `DatabaseLocation` - Finds `Documents/Image-Line/FL Studio/Presets/Plugin database/Installed`
//! - `scan_folder()` - Groups descriptor/shortcut pairs of one database folder by vendor
//! - `Descriptor` - Parser for the key-value `.nfo` format
//!
//! ## Output (`operations`, `organiser`)
//! - `sanitize_vendor_name()` - Makes vendor names safe to use as folder names
//! - `copy_pair()` - Copies a descriptor and its shortcut as one unit
//! - `Organiser::run()` - The whole scan, group and copy pass
//!
//! ## Data structures (`plugin`, `report`)
//! - `PluginCategory`, `PluginFormat`, `SourceFolder` - Database layout
//! - `PluginPair`, `VendorGroup` - What gets copied where
//! - `RunReport`, `Warning`, `Failure` - What a run did
//!
//! ## Ambient (`console`, `logging`, `config`, `error`)
//! - `Reporter` - Console output, optionally coloured, mirrored to `tracing`
//! - `file_subscriber()` - Append-mode log file
//! - `OrganiserConfig` - CLI and environment settings

pub mod config;
pub mod console;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod operations;
pub mod organiser;
pub mod plugin;
pub mod registry;
pub mod report;

pub use config::OrganiserConfig;
pub use console::Reporter;
pub use descriptor::Descriptor;
pub use error::{CopyError, OrganiseError};
pub use organiser::{Organiser, RunContext};
pub use plugin::{PluginCategory, PluginFormat, PluginPair, SourceFolder, VendorGroup};
pub use registry::DatabaseLocation;
pub use report::{Failure, FolderReport, RunReport, Warning};
