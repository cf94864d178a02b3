//! Object XML → catalog registrations
//!
//! Each object element in a document becomes one [`CatalogEntry`], registered
//! under its raw `id` and, when present and unclaimed, its `DisplayId`.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use roxmltree::Document;

use super::{CatalogEntry, CatalogError, CellSize, OverwritePolicy};
use crate::xml::Element;

/// `Activate` text marking a blueprint that unlocks forge recipes.
pub const UNLOCK_BLUEPRINT: &str = "UnlockForgeBlueprint";

/// Player sheets pack 21 cells per character.
const PLAYER_INDEX_MULTIPLIER: u32 = 21;
/// Pet sheets pack 7 cells per pet.
const PETS_INDEX_MULTIPLIER: u32 = 7;

/// Which identifier a registration was made under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    /// The `DisplayId` text
    Display,
    /// The `id` attribute
    Raw,
}

impl NameKind {
    /// Overwrite policy applied when merging into a catalog.
    pub fn policy(self) -> OverwritePolicy {
        match self {
            NameKind::Display => OverwritePolicy::FirstWriterWins,
            NameKind::Raw => OverwritePolicy::LastWriterWins,
        }
    }
}

/// One name → entry write produced by a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub name: String,
    pub kind: NameKind,
    pub entry: CatalogEntry,
}

fn quantity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r" x ?(\d+)$").expect("quantity pattern is valid"))
}

/// Parse a cell index token: `0x`-prefixed hex, otherwise decimal.
pub fn parse_index_token(token: &str) -> Option<u32> {
    match token.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => token.parse().ok(),
    }
}

/// Index multiplier for sheets that embed several cells per object.
pub fn index_multiplier(sheet: &str) -> u32 {
    if sheet.contains("player") {
        PLAYER_INDEX_MULTIPLIER
    } else if sheet.contains("pets") || sheet.contains("Pets") {
        PETS_INDEX_MULTIPLIER
    } else {
        1
    }
}

/// Quantity suffix of an item name (`"Gem x 10"` → 10), 0 when absent.
pub fn parse_quantity(name: &str) -> u32 {
    quantity_regex()
        .captures(name)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// The texture tree of an object: `Texture` first, then `AnimatedTexture`.
/// A tree with no children carries no image and does not count.
fn find_texture<'a, 'input>(object: &Element<'a, 'input>) -> Option<Element<'a, 'input>> {
    ["Texture", "AnimatedTexture"]
        .iter()
        .filter_map(|tag| object.child(tag))
        .find(Element::has_children)
}

fn contained_items(object: &Element<'_, '_>, id: &str) -> Vec<String> {
    let Some(activate) = object.child("Activate") else {
        return Vec::new();
    };
    if activate.text() != Some(UNLOCK_BLUEPRINT) {
        return Vec::new();
    }
    match activate.attr("id") {
        Some(ids) => ids.split(',').map(str::to_string).collect(),
        None => {
            tracing::warn!(object = id, "blueprint activation without an 'id' list");
            Vec::new()
        }
    }
}

/// Parse one object-definition document into registrations, in write order.
///
/// Objects without a texture are skipped. A `DisplayId` already claimed
/// earlier in the same document is not registered again.
pub fn parse_document(xml: &str) -> Result<Vec<Registration>, CatalogError> {
    parse_document_with(xml, |_| false)
}

/// Parse a document that is being written into an existing catalog.
///
/// `is_claimed` reports names the catalog already holds. A `DisplayId` it
/// claims is dropped exactly like one claimed earlier in the document, so
/// the object's quantity then comes from its raw id.
pub fn parse_document_with<F>(
    xml: &str,
    is_claimed: F,
) -> Result<Vec<Registration>, CatalogError>
where
    F: Fn(&str) -> bool,
{
    let doc = Document::parse(xml)?;
    let root = Element::root(&doc);

    let mut registrations = Vec::new();
    let mut claimed: HashSet<String> = HashSet::new();
    let mut skipped = 0usize;

    for object in root.children() {
        let id = object.attr("id").ok_or(CatalogError::MissingId { line: object.line() })?;

        let mut names: Vec<(String, NameKind)> = Vec::with_capacity(2);
        if let Some(display) = object.child("DisplayId").and_then(|d| d.text()) {
            if !claimed.contains(display) && !is_claimed(display) {
                names.push((display.to_string(), NameKind::Display));
            }
        }
        names.push((id.to_string(), NameKind::Raw));

        let Some(texture) = find_texture(&object) else {
            tracing::debug!(object = id, "no texture, skipping");
            skipped += 1;
            continue;
        };

        let incomplete = || CatalogError::IncompleteTexture { id: id.to_string() };
        let sheet = texture.nth_child(0).and_then(|e| e.text()).ok_or_else(incomplete)?;
        let token = texture.nth_child(1).and_then(|e| e.text()).ok_or_else(incomplete)?;

        let raw_index = parse_index_token(token).ok_or_else(|| CatalogError::MalformedIndex {
            id: id.to_string(),
            token: token.to_string(),
        })?;
        let multiplier = index_multiplier(sheet);
        let cell_index =
            raw_index.checked_mul(multiplier).ok_or_else(|| CatalogError::IndexOverflow {
                id: id.to_string(),
                index: raw_index,
                multiplier,
            })?;

        let entry = CatalogEntry {
            sheet_file: sheet.to_string(),
            cell_index,
            cell_size: CellSize::from_sheet_name(sheet),
            quantity: parse_quantity(&names[0].0),
            contained: contained_items(&object, id),
        };

        for (name, kind) in names {
            claimed.insert(name.clone());
            registrations.push(Registration { name, kind, entry: entry.clone() });
        }
    }

    tracing::debug!(registrations = registrations.len(), skipped, "parsed document");
    Ok(registrations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn object(id: &str, display: Option<&str>, file: &str, index: &str) -> String {
        let display = display.map(|d| format!("<DisplayId>{}</DisplayId>", d)).unwrap_or_default();
        format!(
            r#"<Object id="{}">{}<Texture><File>{}</File><Index>{}</Index></Texture></Object>"#,
            id, display, file, index
        )
    }

    fn doc(objects: &[String]) -> String {
        format!("<Objects>{}</Objects>", objects.concat())
    }

    #[test]
    fn test_parse_index_token() {
        assert_eq!(parse_index_token("12"), Some(12));
        assert_eq!(parse_index_token("0x1f"), Some(31));
        assert_eq!(parse_index_token("0x"), None);
        assert_eq!(parse_index_token("abc"), None);
        assert_eq!(parse_index_token("-3"), None);
    }

    #[test]
    fn test_index_multiplier() {
        assert_eq!(index_multiplier("players"), 21);
        assert_eq!(index_multiplier("playerskins16"), 21);
        assert_eq!(index_multiplier("petsDivine"), 7);
        assert_eq!(index_multiplier("bigPets"), 7);
        assert_eq!(index_multiplier("lofiObj3"), 1);
        // case-sensitive for the player marker
        assert_eq!(index_multiplier("Players"), 1);
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("Gem x 10"), 10);
        assert_eq!(parse_quantity("Gem x10"), 10);
        assert_eq!(parse_quantity("Gem"), 0);
        assert_eq!(parse_quantity("Gem x"), 0);
        assert_eq!(parse_quantity("Box"), 0);
        assert_eq!(parse_quantity("Gem x 10 extra"), 0);
    }

    #[test]
    fn test_raw_and_display_names() {
        let xml = doc(&[object("gem_raw", Some("Gem x 5"), "lofiObj", "0x10")]);
        let catalog = Catalog::from_xml(&xml).unwrap();

        let raw = catalog.get("gem_raw").unwrap();
        let display = catalog.get("Gem x 5").unwrap();
        assert_eq!(raw, display);
        assert_eq!(raw.cell_index, 16);
        assert_eq!(raw.quantity, 5);
        assert_eq!(raw.cell_size, CellSize::Small);
    }

    #[test]
    fn test_quantity_uses_first_name() {
        // display name carries the quantity, raw id does not
        let xml = doc(&[object("gem", Some("Gem x 3"), "lofiObj", "1")]);
        let regs = parse_document(&xml).unwrap();
        assert!(regs.iter().all(|r| r.entry.quantity == 3));

        // no display name: the raw id is inspected
        let xml = doc(&[object("Gem x 7", None, "lofiObj", "1")]);
        let regs = parse_document(&xml).unwrap();
        assert_eq!(regs[0].entry.quantity, 7);
    }

    #[test]
    fn test_claimed_display_name_not_registered_again() {
        let xml = doc(&[
            object("common", Some("Shared"), "lofiObj", "1"),
            object("shiny", Some("Shared"), "lofiObj", "2"),
        ]);
        let regs = parse_document(&xml).unwrap();
        let names: Vec<&str> = regs.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Shared", "common", "shiny"]);

        let catalog = Catalog::from_xml(&xml).unwrap();
        assert_eq!(catalog.get("Shared").unwrap().cell_index, 1);
    }

    #[test]
    fn test_externally_claimed_display_name() {
        let xml = doc(&[object("gem_shiny", Some("Gem x 5"), "lofiObj", "2")]);
        let regs = parse_document_with(&xml, |name| name == "Gem x 5").unwrap();
        assert_eq!(regs.len(), 1);
        assert_eq!(regs[0].name, "gem_shiny");
        assert_eq!(regs[0].kind, NameKind::Raw);
        assert_eq!(regs[0].entry.quantity, 0);
    }

    #[test]
    fn test_skips_objects_without_texture() {
        let xml = r#"<Objects>
            <Object id="Wall"><Class>Wall</Class></Object>
            <Object id="Hollow"><Texture/></Object>
            <Object id="Coin"><Texture><File>misc</File><Index>0</Index></Texture></Object>
        </Objects>"#;
        let catalog = Catalog::from_xml(xml).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.contains("Coin"));
    }

    #[test]
    fn test_animated_texture_fallback() {
        let xml = r#"<Objects>
            <Object id="Pet">
                <AnimatedTexture><File>petsBig</File><Index>3</Index></AnimatedTexture>
            </Object>
        </Objects>"#;
        let catalog = Catalog::from_xml(xml).unwrap();
        let pet = catalog.get("Pet").unwrap();
        assert_eq!(pet.cell_index, 21);
        assert_eq!(pet.cell_size, CellSize::Medium);
    }

    #[test]
    fn test_texture_preferred_over_animated() {
        let xml = r#"<Objects>
            <Object id="Both">
                <AnimatedTexture><File>anim</File><Index>9</Index></AnimatedTexture>
                <Texture><File>still</File><Index>2</Index></Texture>
            </Object>
        </Objects>"#;
        let catalog = Catalog::from_xml(xml).unwrap();
        assert_eq!(catalog.get("Both").unwrap().sheet_file, "still");
    }

    #[test]
    fn test_player_index_scaling() {
        let xml = doc(&[object("Wizard", None, "players", "2")]);
        let catalog = Catalog::from_xml(&xml).unwrap();
        assert_eq!(catalog.get("Wizard").unwrap().cell_index, 42);
    }

    #[test]
    fn test_blueprint_contents() {
        let xml = r#"<Objects>
            <Object id="Forge Blueprint">
                <Texture><File>lofiObj</File><Index>5</Index></Texture>
                <Activate id="Sword,Shield">UnlockForgeBlueprint</Activate>
            </Object>
            <Object id="Potion">
                <Texture><File>lofiObj</File><Index>6</Index></Texture>
                <Activate id="Heal">Heal</Activate>
            </Object>
        </Objects>"#;
        let catalog = Catalog::from_xml(xml).unwrap();
        assert_eq!(catalog.get("Forge Blueprint").unwrap().contained, vec!["Sword", "Shield"]);
        assert!(catalog.get("Potion").unwrap().contained.is_empty());
    }

    #[test]
    fn test_malformed_index_is_error() {
        let xml = doc(&[object("Bad", None, "lofiObj", "0xZZ")]);
        let err = parse_document(&xml).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedIndex { ref id, ref token } if id == "Bad" && token == "0xZZ"
        ));
    }

    #[test]
    fn test_missing_id_is_error() {
        let xml = r#"<Objects>
<Object><Texture><File>misc</File><Index>0</Index></Texture></Object>
</Objects>"#;
        let err = parse_document(xml).unwrap_err();
        assert!(matches!(err, CatalogError::MissingId { line: 2 }));
    }

    #[test]
    fn test_incomplete_texture_is_error() {
        let xml = r#"<Objects>
            <Object id="Half"><Texture><File>misc</File></Texture></Object>
        </Objects>"#;
        assert!(matches!(
            parse_document(xml),
            Err(CatalogError::IncompleteTexture { .. })
        ));
    }

    #[test]
    fn test_index_overflow_is_error() {
        let xml = doc(&[object("Huge", None, "players", "0xFFFFFFFF")]);
        assert!(matches!(
            parse_document(&xml),
            Err(CatalogError::IndexOverflow { multiplier: 21, .. })
        ));
    }

    #[test]
    fn test_invalid_xml_is_error() {
        assert!(matches!(parse_document("<Objects><Object"), Err(CatalogError::Xml(_))));
    }
}
