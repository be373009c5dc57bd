use anyhow::Result;
use plugindb_organiser::{DatabaseLocation, OrganiseError, Organiser, Reporter, RunContext, Warning};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fake FL Studio plugin database plus an empty output folder.
struct DatabaseFixture {
    _temp_dir: TempDir,
    database_root: PathBuf,
    output_dir: PathBuf,
}

impl DatabaseFixture {
    fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_root = temp_dir.path().join("Plugin database").join("Installed");
        let output_dir = temp_dir.path().join("out");

        for sub in ["Generators/VST", "Generators/VST3", "Effects/VST", "Effects/VST3"] {
            fs::create_dir_all(database_root.join(sub))?;
        }
        fs::create_dir_all(&output_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            database_root,
            output_dir,
        })
    }

    /// Adds `<name>.nfo` (and `<name>.fst` when `with_companion`) to a database folder.
    fn add_plugin(&self, folder: &str, name: &str, nfo: &str, with_companion: bool) -> Result<()> {
        let dir = self.database_root.join(folder);
        fs::write(dir.join(format!("{name}.nfo")), nfo)?;
        if with_companion {
            fs::write(dir.join(format!("{name}.fst")), format!("FST shortcut for {name}"))?;
        }
        Ok(())
    }

    fn organiser(&self) -> Organiser {
        Organiser::new(DatabaseLocation::new(&self.database_root), &self.output_dir)
    }

    fn run(&self) -> Result<plugindb_organiser::RunReport> {
        let ctx = RunContext::new(Reporter::silent());
        Ok(self.organiser().run(&ctx)?)
    }

    /// Every file under the output folder, relative to it.
    fn output_files(&self) -> BTreeSet<PathBuf> {
        fn walk(dir: &Path, base: &Path, files: &mut BTreeSet<PathBuf>) {
            for entry in fs::read_dir(dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    walk(&path, base, files);
                } else {
                    files.insert(path.strip_prefix(base).unwrap().to_path_buf());
                }
            }
        }
        let mut files = BTreeSet::new();
        walk(&self.output_dir, &self.output_dir, &mut files);
        files
    }
}

fn vendor(name: &str) -> String {
    format!("ps_name=Plugin\r\nps_file_vendorname_0={name}\r\nps_file_category_0=Synth\r\n")
}

#[test]
fn pair_is_copied_into_vendor_folder() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Generators/VST", "pluginX", &vendor("Acme Corp"), true)?;

    let report = fixture.run()?;

    let vendor_dir = fixture.output_dir.join("Generators").join("Acme Corp");
    let source_dir = fixture.database_root.join("Generators/VST");
    assert_eq!(
        fs::read(vendor_dir.join("pluginX.nfo"))?,
        fs::read(source_dir.join("pluginX.nfo"))?
    );
    assert_eq!(
        fs::read(vendor_dir.join("pluginX.fst"))?,
        fs::read(source_dir.join("pluginX.fst"))?
    );
    assert_eq!(report.copied(), 1);
    assert_eq!(report.warnings().count(), 0);
    assert_eq!(report.failures().count(), 0);
    Ok(())
}

#[test]
fn prohibited_characters_are_stripped_from_vendor_folder() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Generators/VST", "pluginY", &vendor("Weird:Name"), true)?;

    let report = fixture.run()?;

    let vendor_dir = fixture.output_dir.join("Generators").join("WeirdName");
    assert!(vendor_dir.join("pluginY.nfo").is_file());
    assert!(vendor_dir.join("pluginY.fst").is_file());
    assert!(report.warnings().any(|w| *w
        == Warning::SanitizedVendor {
            original: "Weird:Name".to_string(),
            sanitized: "WeirdName".to_string(),
        }));
    Ok(())
}

#[test]
fn descriptor_without_vendor_is_skipped_with_warning() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Effects/VST3", "Anonymous", "ps_name=Anonymous\n", true)?;

    let report = fixture.run()?;

    assert_eq!(report.copied(), 0);
    assert!(report.warnings().any(|w| matches!(
        w,
        Warning::MissingVendor { descriptor } if descriptor.ends_with("Anonymous.nfo")
    )));
    let effects: Vec<_> = fs::read_dir(fixture.output_dir.join("Effects"))?.collect();
    assert!(effects.is_empty());
    Ok(())
}

#[test]
fn missing_companion_is_skipped_with_warning() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Effects/VST", "Orphan", &vendor("Lonely Audio"), false)?;

    let report = fixture.run()?;

    assert_eq!(report.copied(), 0);
    assert!(report
        .warnings()
        .any(|w| matches!(w, Warning::MissingCompanion { .. })));
    assert!(!fixture.output_dir.join("Effects").join("Lonely Audio").exists());
    Ok(())
}

#[test]
fn categories_and_formats_land_in_the_right_folders() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Generators/VST", "Serum", &vendor("Xfer Records"), true)?;
    fixture.add_plugin("Effects/VST3", "OTT", &vendor("Xfer Records"), true)?;
    fixture.add_plugin("Generators/VST3", "Pigments", &vendor("Arturia"), true)?;
    fixture.add_plugin("Effects/VST", "Valhalla", &vendor("Valhalla DSP"), true)?;

    let report = fixture.run()?;

    let expected: BTreeSet<PathBuf> = [
        "Effects/Valhalla DSP/Valhalla.fst",
        "Effects/Valhalla DSP/Valhalla.nfo",
        "Effects/Xfer Records/OTT.fst",
        "Effects/Xfer Records/OTT.nfo",
        "Generators/Arturia/Pigments.fst",
        "Generators/Arturia/Pigments.nfo",
        "Generators/Xfer Records/Serum.fst",
        "Generators/Xfer Records/Serum.nfo",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(fixture.output_files(), expected);
    assert_eq!(report.copied(), 4);
    assert_eq!(report.folders.len(), 4);
    Ok(())
}

#[test]
fn running_twice_gives_the_same_tree() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Generators/VST", "Serum", &vendor("Xfer Records"), true)?;
    fixture.add_plugin("Effects/VST", "Pro-Q 3", &vendor("FabFilter"), true)?;

    let first = fixture.run()?;
    let files_after_first = fixture.output_files();
    let second = fixture.run()?;

    assert_eq!(fixture.output_files(), files_after_first);
    assert_eq!(first.copied(), second.copied());
    assert_eq!(second.failures().count(), 0);
    Ok(())
}

#[test]
fn missing_source_folders_are_warnings() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fs::remove_dir_all(fixture.database_root.join("Effects"))?;
    fixture.add_plugin("Generators/VST", "Serum", &vendor("Xfer Records"), true)?;

    let report = fixture.run()?;

    let missing = report
        .warnings()
        .filter(|w| matches!(w, Warning::MissingSourceFolder { .. }))
        .count();
    assert_eq!(missing, 2);
    assert_eq!(report.copied(), 1);
    Ok(())
}

#[test]
fn missing_database_aborts_before_creating_folders() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fs::remove_dir_all(&fixture.database_root)?;

    let ctx = RunContext::new(Reporter::silent());
    let err = fixture.organiser().run(&ctx).unwrap_err();

    assert!(matches!(err, OrganiseError::DatabaseNotFound { .. }));
    assert_eq!(err.exit_code(), 2);
    assert!(!fixture.output_dir.join("Generators").exists());
    assert!(!fixture.output_dir.join("Effects").exists());
    Ok(())
}

#[test]
fn vendors_that_sanitise_to_nothing_are_skipped() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Generators/VST", "Mystery", &vendor("???"), true)?;

    let report = fixture.run()?;

    assert_eq!(report.copied(), 0);
    assert!(report.warnings().any(|w| *w
        == Warning::UnusableVendor {
            original: "???".to_string()
        }));
    assert!(fixture.output_files().is_empty());
    Ok(())
}

#[test]
fn report_serialises_to_json() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Generators/VST", "pluginY", &vendor("Weird:Name"), true)?;

    let report = fixture.run()?;
    let json: serde_json::Value = serde_json::from_str(&report.to_json()?)?;

    let first = &json["folders"][0];
    assert_eq!(first["category"], "Generator");
    assert_eq!(first["vendors"][0], "Weird:Name");
    assert_eq!(first["copied"], 1);
    assert_eq!(first["warnings"][0]["kind"], "sanitized_vendor");
    Ok(())
}

#[test]
fn vendor_folder_failure_does_not_stop_other_vendors() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Generators/VST", "pluginX", &vendor("Acme Corp"), true)?;
    fixture.add_plugin("Generators/VST", "Serum", &vendor("Xfer Records"), true)?;
    // a plain file where the vendor folder should go
    let generators = fixture.output_dir.join("Generators");
    fs::create_dir_all(&generators)?;
    fs::write(generators.join("Acme Corp"), "in the way")?;

    let report = fixture.run()?;

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].vendor, "Acme Corp");
    assert_eq!(failures[0].path, generators.join("Acme Corp"));
    assert_eq!(report.copied(), 1);
    assert!(generators.join("Xfer Records").join("Serum.nfo").is_file());
    assert!(generators.join("Xfer Records").join("Serum.fst").is_file());
    Ok(())
}

#[test]
fn failed_pair_does_not_stop_its_siblings() -> Result<()> {
    let fixture = DatabaseFixture::new()?;
    fixture.add_plugin("Generators/VST", "OTT", &vendor("Xfer Records"), true)?;
    fixture.add_plugin("Generators/VST", "Serum", &vendor("Xfer Records"), true)?;
    // a directory where Serum's staged copy would be written
    let vendor_dir = fixture.output_dir.join("Generators").join("Xfer Records");
    fs::create_dir_all(vendor_dir.join("Serum.fst.partial"))?;
    fs::write(vendor_dir.join("Serum.fst.partial").join("keep"), "")?;

    let report = fixture.run()?;

    let failures: Vec<_> = report.failures().collect();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].path.ends_with("Serum.nfo"));
    assert_eq!(report.copied(), 1);
    assert!(vendor_dir.join("OTT.nfo").is_file());
    assert!(vendor_dir.join("OTT.fst").is_file());
    assert!(!vendor_dir.join("Serum.nfo").exists());
    assert!(!vendor_dir.join("Serum.fst").exists());
    Ok(())
}
