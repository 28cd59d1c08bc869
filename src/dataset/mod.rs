//! FDC dataset handling
//!
//! Each configured dataset goes through three phases: download the archive,
//! extract its JSON member into an NDJSON scratch file, and stream
//! ingredients out of that file.

pub mod download;
pub mod extract;
pub mod records;
pub mod scratch;

use std::path::{Path, PathBuf};

use reqwest::blocking::Client;

use crate::error::PipelineResult;
use crate::utils::measure;

pub use download::{download_to, http_client};
pub use extract::{extract_member, ExtractError, ExtractResult};
pub use records::Ingredients;
pub use scratch::ScratchFile;

/// Published FDC dataset families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DatasetKind {
    Foundation,
    Survey,
    Branded,
    Legacy,
    SrLegacy,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 5] = [
        DatasetKind::Foundation,
        DatasetKind::Survey,
        DatasetKind::Branded,
        DatasetKind::Legacy,
        DatasetKind::SrLegacy,
    ];

    /// Name used in archive file names and configuration keys
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::Foundation => "foundation",
            DatasetKind::Survey => "survey",
            DatasetKind::Branded => "branded",
            DatasetKind::Legacy => "legacy",
            DatasetKind::SrLegacy => "sr_legacy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

/// One dataset edition and where its files live
#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub edition: String,
    tempdir: PathBuf,
    base_url: String,
}

impl Dataset {
    pub fn new(kind: DatasetKind, edition: impl Into<String>, tempdir: &Path, base_url: &str) -> Self {
        Self {
            kind,
            edition: edition.into(),
            tempdir: tempdir.to_path_buf(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    /// `FoodData_Central_{name}_food_json_{edition}`
    pub fn source_stem(&self) -> String {
        format!("FoodData_Central_{}_food_json_{}", self.name(), self.edition)
    }

    /// Name of the JSON member inside the archive
    pub fn member_name(&self) -> String {
        format!("{}.json", self.source_stem())
    }

    pub fn url(&self) -> String {
        format!("{}/{}.zip", self.base_url, self.source_stem())
    }

    pub fn zip_path(&self) -> PathBuf {
        self.tempdir.join(format!("{}.zip", self.name()))
    }

    pub fn ndjson_path(&self) -> PathBuf {
        self.tempdir.join(format!("{}.ndjson", self.name()))
    }

    /// Fetch the archive unless it is already present
    pub fn download(&self, client: &Client, force: bool) -> PipelineResult<()> {
        let dest = self.zip_path();
        if dest.exists() && !force {
            tracing::info!(dataset = self.name(), path = %dest.display(), "archive present, skipping download");
            return Ok(());
        }

        let url = self.url();
        measure(&format!("downloading {}", self.name()), || {
            download_to(client, &url, &dest).map(|_| ())
        })
    }

    /// Produce the NDJSON scratch file unless it is already present
    pub fn extract(&self, force: bool) -> PipelineResult<()> {
        let output = self.ndjson_path();
        if output.exists() && !force {
            tracing::info!(dataset = self.name(), path = %output.display(), "records present, skipping extraction");
            return Ok(());
        }

        measure(&format!("extracting {}", self.name()), || {
            let records =
                extract_member(&self.zip_path(), &self.member_name(), &self.tempdir, &output)?;
            tracing::info!(dataset = self.name(), records, "extracted records");
            Ok(())
        })
    }

    /// Stream ingredients from the extracted records
    pub fn ingredients(&self) -> PipelineResult<Ingredients<std::io::BufReader<std::fs::File>>> {
        Ingredients::open(&self.ndjson_path(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;
    use std::fs::{self, File};
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::{CompressionMethod, ZipWriter};

    fn foundation(tempdir: &Path) -> Dataset {
        Dataset::new(
            DatasetKind::Foundation,
            "2022-04-28",
            tempdir,
            "https://fdc.nal.usda.gov/fdc-datasets/",
        )
    }

    #[test]
    fn test_kind_names() {
        for kind in DatasetKind::ALL {
            assert_eq!(DatasetKind::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(DatasetKind::from_name("sr_legacy"), Some(DatasetKind::SrLegacy));
        assert_eq!(DatasetKind::from_name("Foundation"), None);
    }

    #[test]
    fn test_source_names() {
        let dataset = foundation(Path::new("/tmp/fdc"));
        assert_eq!(
            dataset.member_name(),
            "FoodData_Central_foundation_food_json_2022-04-28.json"
        );
        assert_eq!(
            dataset.url(),
            "https://fdc.nal.usda.gov/fdc-datasets/FoodData_Central_foundation_food_json_2022-04-28.zip"
        );
        assert_eq!(dataset.zip_path(), PathBuf::from("/tmp/fdc/foundation.zip"));
        assert_eq!(dataset.ndjson_path(), PathBuf::from("/tmp/fdc/foundation.ndjson"));
    }

    #[test]
    fn test_download_skipped_when_archive_exists() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = foundation(dir.path());
        fs::write(dataset.zip_path(), b"cached").unwrap();

        let client = http_client().unwrap();
        dataset.download(&client, false).unwrap();
        assert_eq!(fs::read(dataset.zip_path()).unwrap(), b"cached");
    }

    #[test]
    fn test_extract_then_parse() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = foundation(dir.path());

        let record = r#"{"foodClass":"FinalFood","description":"Apple, raw","fdcId":9,"publicationDate":"04/28/2022","foodNutrients":[],"foodPortions":[]}"#;
        let mut zip = ZipWriter::new(File::create(dataset.zip_path()).unwrap());
        let options = FileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(dataset.member_name(), options).unwrap();
        write!(zip, "[\n{},\n{}\n]\n", record, record).unwrap();
        zip.finish().unwrap();

        dataset.extract(false).unwrap();
        let ingredients: Vec<Ingredient> = dataset
            .ingredients()
            .unwrap()
            .collect::<PipelineResult<_>>()
            .unwrap();
        assert_eq!(ingredients.len(), 2);
        assert_eq!(ingredients[0].title, "Apple, raw");
        assert_eq!(ingredients[0].fdc_date, "2022-04-28");

        // existing records are reused without touching the archive
        let first = fs::read(dataset.ndjson_path()).unwrap();
        fs::remove_file(dataset.zip_path()).unwrap();
        dataset.extract(false).unwrap();
        assert_eq!(fs::read(dataset.ndjson_path()).unwrap(), first);
        assert!(dataset.extract(true).is_err());
    }
}
