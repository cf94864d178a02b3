//! Quest entries as authored in the quest form

use serde::{Deserialize, Deserializer, Serialize};

/// One quest card to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestEntry {
    /// Item names consumed by the quest, in display order
    #[serde(rename = "Input", default)]
    pub inputs: Vec<String>,
    /// Item names rewarded by the quest, in display order
    #[serde(rename = "Output", default)]
    pub outputs: Vec<String>,
    #[serde(rename = "Title")]
    pub title: String,
    /// Category icon name, e.g. `Once Per Day`
    #[serde(rename = "Icon")]
    pub icon: String,
    /// Whether the player picks one reward among the outputs
    #[serde(rename = "Chooseable", default, deserialize_with = "bool_or_flag")]
    pub chooseable: bool,
}

/// Accept `true`/`false` as well as the `1`/`0` the quest form stores.
fn bool_or_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

impl QuestEntry {
    /// Build an entry from the raw multi-line text fields of the quest form.
    pub fn from_form(
        title: &str,
        icon: &str,
        chooseable: bool,
        input_text: &str,
        output_text: &str,
    ) -> Self {
        Self {
            inputs: Self::parse_item_list(input_text),
            outputs: Self::parse_item_list(output_text),
            title: title.to_string(),
            icon: icon.trim().to_string(),
            chooseable,
        }
    }

    /// One item name per line; lines are trimmed, typographic apostrophes
    /// normalized to `'`, blank lines dropped.
    pub fn parse_item_list(text: &str) -> Vec<String> {
        text.lines()
            .map(|line| line.trim().replace('\u{2019}', "'"))
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Parse a JSON array of quest entries.
    pub fn list_from_json(json: &str) -> Result<Vec<QuestEntry>, serde_json::Error> {
        serde_json::from_str(json)
    }
}
