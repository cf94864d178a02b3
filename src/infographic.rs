//! Infographic composition
//!
//! Resolves quest items through the catalog, renders their icons, lays the
//! inputs and outputs out as groups and draws everything onto the card
//! template. Several cards are stacked into one image.

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::assets::{AssetError, AssetStore};
use crate::blend::alpha_composite;
use crate::catalog::{Catalog, CatalogEntry};
use crate::config::QuestcardConfig;
use crate::icon::{overlay_contained, IconRenderer};
use crate::layout::{combine_images_vertically, generate_image_group, GroupLayout, LayoutError};
use crate::quest::QuestEntry;
use crate::sprite::{extract_entry, ExtractError};
use crate::text::{Face, Stroke};

/// Icon name of the badge drawn on chooseable quests.
pub const CHOOSEABLE_ICON: &str = "Chooseable";

const TITLE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TITLE_SHADOW: Rgba<u8> = Rgba([128, 128, 128, 255]);
const TITLE_STROKE: Stroke = Stroke { width: 1, color: Rgba([0, 0, 0, 255]) };

/// Error rendering an icon or infographic.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A quest names an item the catalog does not know
    #[error("Unknown item '{name}'")]
    UnknownItem { name: String },
    /// A sheet, icon, template or font could not be loaded
    #[error(transparent)]
    Asset(#[from] AssetError),
    /// The catalog points outside its sheet
    #[error("Cannot extract '{name}' from sheet '{sheet}': {source}")]
    Extract {
        name: String,
        sheet: String,
        #[source]
        source: ExtractError,
    },
    /// Too many icons in a group, or nothing to draw
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Draws item icons and quest cards from a catalog and an asset store.
pub struct Compositor<'a, A: AssetStore> {
    catalog: &'a Catalog,
    assets: &'a A,
    config: &'a QuestcardConfig,
    group: GroupLayout,
}

impl<'a, A: AssetStore> Compositor<'a, A> {
    pub fn new(catalog: &'a Catalog, assets: &'a A, config: &'a QuestcardConfig) -> Self {
        Self {
            catalog,
            assets,
            config,
            group: GroupLayout::from_config(&config.render, &config.layout),
        }
    }

    fn lookup(&self, name: &str) -> Result<&'a CatalogEntry, RenderError> {
        self.catalog.get(name).ok_or_else(|| RenderError::UnknownItem { name: name.to_string() })
    }

    fn render_entry(
        &self,
        name: &str,
        entry: &CatalogEntry,
        renderer: &IconRenderer<'_>,
        upscale: u32,
    ) -> Result<RgbaImage, RenderError> {
        let sheet = self.assets.sheet(&entry.sheet_file)?;
        let sprite = extract_entry(&sheet, entry).map_err(|source| RenderError::Extract {
            name: name.to_string(),
            sheet: entry.sheet_file.clone(),
            source,
        })?;
        Ok(renderer.render(&sprite, entry.quantity, upscale))
    }

    fn render_item_with(
        &self,
        name: &str,
        renderer: &IconRenderer<'_>,
    ) -> Result<RgbaImage, RenderError> {
        let entry = self.lookup(name)?;
        let upscale = self.config.render.upscale;
        let mut icon = self.render_entry(name, entry, renderer, upscale)?;

        if !entry.contained.is_empty() {
            // contained items are drawn at half scale and shrunk to badges;
            // their own contents are not drawn
            let badge_upscale = (upscale / 2).max(1);
            let badges = entry
                .contained
                .iter()
                .map(|contained| {
                    let contained_entry = self.lookup(contained)?;
                    self.render_entry(contained, contained_entry, renderer, badge_upscale)
                })
                .collect::<Result<Vec<_>, _>>()?;
            overlay_contained(&mut icon, &badges, self.config.render.blueprint_size);
        }

        Ok(icon)
    }

    /// Render one item's icon, with contained-item badges when it has any.
    pub fn render_item(&self, name: &str) -> Result<RgbaImage, RenderError> {
        let face = self.assets.quantity_face()?;
        let renderer = IconRenderer::new(&face, self.config.render.quantity_font_size);
        self.render_item_with(name, &renderer)
    }

    fn render_group(
        &self,
        names: &[String],
        renderer: &IconRenderer<'_>,
    ) -> Result<RgbaImage, RenderError> {
        let icons = names
            .iter()
            .map(|name| self.render_item_with(name, renderer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(generate_image_group(&icons, &self.group)?)
    }

    /// Icon group for a list of item names, laid out on the group canvas.
    pub fn item_group(&self, names: &[String]) -> Result<RgbaImage, RenderError> {
        let face = self.assets.quantity_face()?;
        let renderer = IconRenderer::new(&face, self.config.render.quantity_font_size);
        self.render_group(names, &renderer)
    }

    fn compose_with(
        &self,
        quest: &QuestEntry,
        template: &RgbaImage,
        title_face: &Face,
        renderer: &IconRenderer<'_>,
    ) -> Result<RgbaImage, RenderError> {
        let layout = &self.config.layout;
        let title_size = self.config.render.title_font_size;

        let inputs = self.render_group(&quest.inputs, renderer)?;
        let outputs = self.render_group(&quest.outputs, renderer)?;

        let mut card = template.clone();

        title_face.draw(
            &mut card,
            &quest.title,
            title_size,
            layout.title_x,
            layout.title_y + layout.title_shadow_offset,
            TITLE_SHADOW,
            Some(TITLE_STROKE),
        );
        title_face.draw(
            &mut card,
            &quest.title,
            title_size,
            layout.title_x,
            layout.title_y,
            TITLE_FILL,
            Some(TITLE_STROKE),
        );

        let icon = self.assets.icon(&quest.icon)?;
        let icon_x = title_face.measure(&quest.title, title_size) as i64 + layout.icon_gap;
        alpha_composite(&mut card, &icon, icon_x, layout.icon_y);

        if quest.chooseable {
            let badge = self.assets.icon(CHOOSEABLE_ICON)?;
            alpha_composite(&mut card, &badge, icon_x + layout.chooseable_dx, layout.chooseable_y);
        }

        alpha_composite(&mut card, &inputs, layout.input_x, layout.input_y);
        alpha_composite(&mut card, &outputs, layout.output_x, layout.output_y);

        tracing::debug!(
            title = %quest.title,
            inputs = quest.inputs.len(),
            outputs = quest.outputs.len(),
            "composed card"
        );
        Ok(card)
    }

    /// Compose one quest card.
    pub fn compose(&self, quest: &QuestEntry) -> Result<RgbaImage, RenderError> {
        let template = self.assets.template()?;
        let title_face = self.assets.title_face()?;
        let face = self.assets.quantity_face()?;
        let renderer = IconRenderer::new(&face, self.config.render.quantity_font_size);
        self.compose_with(quest, &template, &title_face, &renderer)
    }

    /// Compose every quest and stack the cards in order.
    ///
    /// A single quest yields its card unchanged; any failing quest aborts
    /// the whole image.
    pub fn compose_all(&self, quests: &[QuestEntry]) -> Result<RgbaImage, RenderError> {
        let template = self.assets.template()?;
        let title_face = self.assets.title_face()?;
        let face = self.assets.quantity_face()?;
        let renderer = IconRenderer::new(&face, self.config.render.quantity_font_size);

        let mut cards = quests
            .iter()
            .map(|quest| self.compose_with(quest, &template, &title_face, &renderer))
            .collect::<Result<Vec<_>, _>>()?;

        if cards.len() == 1 {
            return Ok(cards.remove(0));
        }
        Ok(combine_images_vertically(&cards, self.config.layout.stack_overlap)?)
    }
}
