//! Questcard - Item catalogs and quest infographics for a 2D game
//!
//! This library provides functionality to:
//! - Normalize object-definition XML into a catalog of item names
//! - Cut item sprites out of fixed-grid sprite sheets
//! - Render upscaled item icons with glow, outline and quantity badges
//! - Compose quest cards from a template and stack them into one image

pub mod assets;
pub mod blend;
pub mod blur;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod icon;
pub mod infographic;
pub mod layout;
pub mod output;
pub mod quest;
pub mod sprite;
pub mod text;
pub mod xml;

pub use catalog::{Catalog, CatalogEntry, CatalogError, CellSize};
pub use infographic::{Compositor, RenderError};
pub use quest::QuestEntry;
