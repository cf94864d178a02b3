//! Master item catalog
//!
//! The catalog maps item names to the sprite-sheet cell that draws them.
//! It is built once from the game's object XML (see [`normalize`]) and then
//! only read by the renderer.

pub mod normalize;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use normalize::{
    parse_document, parse_document_with, NameKind, Registration, UNLOCK_BLUEPRINT,
};

/// Sheets shipped with the tool rather than fetched from the game.
pub const CUSTOM_SHEETS: &[&str] = &["custom8x8", "custom16x16", "custom32x32"];

/// Error while building, loading or saving a catalog.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    /// The document is not well-formed XML
    #[error("Invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),
    /// An object element has no `id` attribute
    #[error("Object on line {line} has no 'id' attribute")]
    MissingId { line: u32 },
    /// The texture tree lacks the file or index child
    #[error("Object '{id}' has an incomplete texture (expected file and index children)")]
    IncompleteTexture { id: String },
    /// The cell index token is not a decimal or `0x` hex integer
    #[error("Object '{id}' has malformed index '{token}'")]
    MalformedIndex { id: String, token: String },
    /// Scaling the index by its sheet multiplier overflowed
    #[error("Object '{id}' index {index} overflows when scaled by {multiplier}")]
    IndexOverflow { id: String, index: u32, multiplier: u32 },
    /// A document failed to parse; wraps the cause with its path
    #[error("{}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: Box<CatalogError>,
    },
    /// File I/O error
    #[error("Failed to read or write catalog: {0}")]
    Io(#[from] std::io::Error),
    /// Catalog JSON could not be encoded or decoded
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A directory could not be turned into a file search pattern
    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// Pixel size of one cell in a sprite sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CellSize {
    /// 8x8 items, the default
    Small,
    /// 16x16 pets and large items
    Medium,
    /// 32x32 skins. Classified but not yet validated through the icon pipeline.
    Large,
}

impl CellSize {
    /// Side length in pixels.
    pub fn pixels(self) -> u32 {
        match self {
            CellSize::Small => 8,
            CellSize::Medium => 16,
            CellSize::Large => 32,
        }
    }

    /// Classify a sheet by the markers in its file name.
    ///
    /// `32` wins over everything; otherwise `big`/`divine` (any case) or `16`
    /// mean 16 pixels; anything else is an 8 pixel sheet.
    pub fn from_sheet_name(sheet: &str) -> Self {
        let lower = sheet.to_lowercase();
        if sheet.contains("32") {
            CellSize::Large
        } else if lower.contains("big") || lower.contains("divine") || sheet.contains("16") {
            CellSize::Medium
        } else {
            CellSize::Small
        }
    }
}

impl From<CellSize> for u32 {
    fn from(size: CellSize) -> u32 {
        size.pixels()
    }
}

impl TryFrom<u32> for CellSize {
    type Error = String;

    fn try_from(pixels: u32) -> Result<Self, Self::Error> {
        match pixels {
            8 => Ok(CellSize::Small),
            16 => Ok(CellSize::Medium),
            32 => Ok(CellSize::Large),
            other => Err(format!("unsupported cell size {} (expected 8, 16 or 32)", other)),
        }
    }
}

impl fmt::Display for CellSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let px = self.pixels();
        write!(f, "{}x{}", px, px)
    }
}

/// Where an item's sprite lives and how to decorate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredEntry")]
pub struct CatalogEntry {
    /// Sheet name without extension
    #[serde(rename = "File")]
    pub sheet_file: String,
    /// Row-major cell index, already scaled for sub-sheet layouts
    #[serde(rename = "Index")]
    pub cell_index: u32,
    #[serde(rename = "Size")]
    pub cell_size: CellSize,
    /// Badge number; 0 means no badge
    #[serde(rename = "Quantity")]
    pub quantity: u32,
    /// Items drawn as small badges on top of this one (blueprint contents)
    #[serde(rename = "Contained", default)]
    pub contained: Vec<String>,
}

/// A catalog entry as read from JSON, before validation.
#[derive(Deserialize)]
struct StoredEntry {
    #[serde(rename = "File")]
    sheet_file: String,
    #[serde(rename = "Index")]
    cell_index: u32,
    #[serde(rename = "Size")]
    cell_size: CellSize,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Contained", default)]
    contained: Vec<String>,
}

impl TryFrom<StoredEntry> for CatalogEntry {
    type Error = String;

    fn try_from(stored: StoredEntry) -> Result<Self, Self::Error> {
        if stored.sheet_file.trim().is_empty() {
            return Err("empty sheet name in 'File'".to_string());
        }
        Ok(CatalogEntry {
            sheet_file: stored.sheet_file,
            cell_index: stored.cell_index,
            cell_size: stored.cell_size,
            quantity: stored.quantity,
            contained: stored.contained,
        })
    }
}

/// How a write treats a name that is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Keep the existing entry
    FirstWriterWins,
    /// Replace the existing entry
    LastWriterWins,
}

/// Name → entry mapping for every renderable item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a single XML document.
    pub fn from_xml(xml: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        catalog.merge(parse_document(xml)?);
        Ok(catalog)
    }

    /// Parse a document and write it into this catalog.
    ///
    /// Display names this catalog already holds count as claimed, so merging
    /// documents one by one gives the same result as one combined document.
    /// Nothing is written when the document fails to parse.
    ///
    /// # Returns
    /// - `Ok(count)` with the number of registrations written or attempted
    /// - `Err(CatalogError)` if the document is malformed
    pub fn absorb_document(&mut self, xml: &str) -> Result<usize, CatalogError> {
        let registrations = parse_document_with(xml, |name| self.contains(name))?;
        let count = registrations.len();
        self.merge(registrations);
        Ok(count)
    }

    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Write one entry under `name` following `policy`.
    ///
    /// Returns `true` if the entry was stored.
    pub fn insert(&mut self, name: &str, entry: CatalogEntry, policy: OverwritePolicy) -> bool {
        if policy == OverwritePolicy::FirstWriterWins && self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_string(), entry);
        true
    }

    /// Fold a document's registrations into this catalog.
    ///
    /// Display names are first-writer-wins, raw ids last-writer-wins.
    pub fn merge(&mut self, registrations: Vec<Registration>) {
        for registration in registrations {
            let policy = registration.kind.policy();
            let stored = self.insert(&registration.name, registration.entry, policy);
            if !stored {
                tracing::debug!(
                    name = %registration.name,
                    "display name already claimed, keeping earlier entry"
                );
            }
        }
    }

    /// Sheets the renderer needs, excluding the locally provided custom sheets.
    pub fn required_sheets(&self) -> BTreeSet<&str> {
        self.entries
            .values()
            .map(|entry| entry.sheet_file.as_str())
            .filter(|sheet| !CUSTOM_SHEETS.contains(sheet))
            .collect()
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON produced by [`Catalog::to_json`].
    ///
    /// Entries with an empty `File` are rejected.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - A master or per-document catalog written by [`Catalog::save`]
    ///
    /// # Returns
    ///
    /// * `Ok(Catalog)` on success
    /// * `Err(CatalogError::Io)` if the file cannot be read
    /// * `Err(CatalogError::Json)` if it is not a valid catalog
    ///
    /// # Example
    /// ```ignore
    /// let catalog = Catalog::load(Path::new("assets/json/master.json"))?;
    /// let coin = catalog.get("Coin x 5");
    /// ```
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Save as pretty-printed JSON, creating parent directories as needed.
    ///
    /// # Arguments
    ///
    /// * `path` - The output file path
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Find every `*.xml` file directly inside `dir`, sorted by file name.
///
/// The directory name is matched literally, so `[`, `]`, `*` and `?` in it
/// are not treated as wildcards.
///
/// # Returns
/// - `Ok(files)`, empty when the directory holds no XML
/// - `Err(CatalogError::Pattern)` if no search pattern can be built
pub fn find_xml_files(dir: &Path) -> Result<Vec<PathBuf>, CatalogError> {
    let pattern = Path::new(&Pattern::escape(&dir.to_string_lossy())).join("*.xml");
    let mut files = Vec::new();
    for entry in glob(&pattern.to_string_lossy())? {
        match entry {
            Ok(path) => files.push(path),
            Err(e) => tracing::warn!("cannot read {}: {}", e.path().display(), e.error()),
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Result of building a master catalog from several documents.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub catalog: Catalog,
    /// Documents skipped in keep-going mode, with the reason
    pub skipped: Vec<CatalogError>,
}

/// Read a document and write it into `catalog`, returning its text.
fn absorb_file(catalog: &mut Catalog, path: &Path) -> Result<(String, usize), CatalogError> {
    let wrap = |source: CatalogError| CatalogError::Document {
        path: path.to_path_buf(),
        source: Box::new(source),
    };
    let xml = fs::read_to_string(path).map_err(|e| wrap(e.into()))?;
    let count = catalog.absorb_document(&xml).map_err(wrap)?;
    Ok((xml, count))
}

/// Parse and merge documents in the given order.
///
/// Each document is written into the master as it is read, so a display name
/// claimed by an earlier document stays with it.
///
/// # Arguments
///
/// * `paths` - XML documents, in merge order
/// * `keep_going` - Log and skip documents that fail to parse instead of
///   returning the first failure
/// * `per_document` - If set, also save each document's own catalog there as
///   `<stem>.json`
///
/// # Returns
///
/// * `Ok(BuildReport)` with the master catalog and any skipped documents
/// * `Err(CatalogError::Document)` for the first failing document
/// * `Err(CatalogError::Io)` if a per-document catalog cannot be written
pub fn build_master<P: AsRef<Path>>(
    paths: &[P],
    keep_going: bool,
    per_document: Option<&Path>,
) -> Result<BuildReport, CatalogError> {
    let mut report = BuildReport::default();

    for path in paths {
        let path = path.as_ref();
        let (xml, count) = match absorb_file(&mut report.catalog, path) {
            Ok(absorbed) => absorbed,
            Err(e) if keep_going => {
                tracing::warn!("skipping document: {}", e);
                report.skipped.push(e);
                continue;
            }
            Err(e) => return Err(e),
        };

        if let Some(dir) = per_document {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            Catalog::from_xml(&xml)?.save(&dir.join(format!("{}.json", stem)))?;
        }

        tracing::info!(document = %path.display(), registrations = count, "merged document");
    }

    Ok(report)
}

/// Build a master catalog from every `*.xml` in `dir`, in file-name order.
///
/// # Example
/// ```ignore
/// let report = parse_directory(Path::new("xml"), true)?;
/// for skipped in &report.skipped {
///     eprintln!("Warning: skipped {}", skipped);
/// }
/// report.catalog.save(Path::new("assets/json/master.json"))?;
/// ```
pub fn parse_directory(dir: &Path, keep_going: bool) -> Result<BuildReport, CatalogError> {
    build_master(&find_xml_files(dir)?, keep_going, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(sheet: &str, index: u32) -> CatalogEntry {
        CatalogEntry {
            sheet_file: sheet.to_string(),
            cell_index: index,
            cell_size: CellSize::Small,
            quantity: 0,
            contained: Vec::new(),
        }
    }

    #[test]
    fn test_cell_size_precedence() {
        assert_eq!(CellSize::from_sheet_name("item32"), CellSize::Large);
        assert_eq!(CellSize::from_sheet_name("BigPet"), CellSize::Medium);
        assert_eq!(CellSize::from_sheet_name("plain"), CellSize::Small);
        assert_eq!(CellSize::from_sheet_name("lofiObj16"), CellSize::Medium);
        assert_eq!(CellSize::from_sheet_name("petsDivine"), CellSize::Medium);
        // 32 outranks the 16 markers
        assert_eq!(CellSize::from_sheet_name("bigSkins32"), CellSize::Large);
    }

    #[test]
    fn test_cell_size_serde_as_pixels() {
        assert_eq!(serde_json::to_string(&CellSize::Medium).unwrap(), "16");
        assert_eq!(serde_json::from_str::<CellSize>("32").unwrap(), CellSize::Large);
        assert!(serde_json::from_str::<CellSize>("12").is_err());
    }

    #[test]
    fn test_insert_policies() {
        let mut catalog = Catalog::new();
        assert!(catalog.insert("Z", entry("a", 1), OverwritePolicy::FirstWriterWins));
        assert!(!catalog.insert("Z", entry("b", 2), OverwritePolicy::FirstWriterWins));
        assert_eq!(catalog.get("Z").unwrap().sheet_file, "a");

        assert!(catalog.insert("Z", entry("c", 3), OverwritePolicy::LastWriterWins));
        assert_eq!(catalog.get("Z").unwrap().sheet_file, "c");
    }

    #[test]
    fn test_required_sheets_skips_custom() {
        let mut catalog = Catalog::new();
        catalog.insert("A", entry("lofiObj", 0), OverwritePolicy::LastWriterWins);
        catalog.insert("B", entry("custom8x8", 0), OverwritePolicy::LastWriterWins);
        catalog.insert("C", entry("lofiObj", 3), OverwritePolicy::LastWriterWins);
        catalog.insert("D", entry("custom16x16", 0), OverwritePolicy::LastWriterWins);

        let sheets: Vec<&str> = catalog.required_sheets().into_iter().collect();
        assert_eq!(sheets, vec!["lofiObj"]);
    }

    #[test]
    fn test_json_field_names() {
        let mut catalog = Catalog::new();
        let mut blueprint = entry("misc", 4);
        blueprint.quantity = 3;
        blueprint.contained = vec!["Sword".to_string()];
        catalog.insert("Blueprint x3", blueprint.clone(), OverwritePolicy::LastWriterWins);

        let json = catalog.to_json().unwrap();
        assert!(json.contains("\"File\": \"misc\""));
        assert!(json.contains("\"Index\": 4"));
        assert!(json.contains("\"Size\": 8"));
        assert!(json.contains("\"Quantity\": 3"));

        let loaded = Catalog::from_json(&json).unwrap();
        assert_eq!(loaded.get("Blueprint x3"), Some(&blueprint));
    }

    #[test]
    fn test_json_contained_defaults_to_empty() {
        let json = r#"{"Coin": {"File": "misc", "Index": 0, "Size": 8, "Quantity": 5}}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert!(catalog.get("Coin").unwrap().contained.is_empty());
    }

    #[test]
    fn test_json_rejects_empty_sheet() {
        let json = r#"{"Coin": {"File": "", "Index": 0, "Size": 8, "Quantity": 5}}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::Json(_)));
        assert!(err.to_string().contains("empty sheet name"));
    }

    #[test]
    fn test_absorb_document_seeds_claims() {
        let mut catalog = Catalog::new();
        let gem = |id: &str, index: u32| {
            format!(
                r#"<Objects><Object id="{}"><DisplayId>Gem x 5</DisplayId>
                <Texture><File>lofiObj</File><Index>{}</Index></Texture></Object></Objects>"#,
                id, index
            )
        };
        catalog.absorb_document(&gem("common", 1)).unwrap();
        let count = catalog.absorb_document(&gem("shiny", 2)).unwrap();

        assert_eq!(count, 1);
        assert_eq!(catalog.get("Gem x 5").unwrap().cell_index, 1);
        assert_eq!(catalog.get("shiny").unwrap().quantity, 0);
    }

    #[test]
    fn test_absorb_document_failure_writes_nothing() {
        let mut catalog = Catalog::new();
        let xml = r#"<Objects>
            <Object id="Good"><Texture><File>misc</File><Index>0</Index></Texture></Object>
            <Object id="Bad"><Texture><File>misc</File><Index>nope</Index></Texture></Object>
        </Objects>"#;
        assert!(catalog.absorb_document(xml).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("json").join("master.json");

        let mut catalog = Catalog::new();
        catalog.insert("Coin", entry("misc", 0), OverwritePolicy::LastWriterWins);
        catalog.save(&path).unwrap();

        assert_eq!(Catalog::load(&path).unwrap(), catalog);
    }
}
