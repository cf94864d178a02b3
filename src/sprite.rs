//! Sprite extraction - crops one cell out of a row-major sprite sheet

use image::{imageops, RgbaImage};
use thiserror::Error;

use crate::catalog::CatalogEntry;

/// Error when a cell cannot be cut from a sheet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Cell size is zero or wider than the sheet
    #[error("Cell size {cell_size} does not fit sheet width {sheet_width}")]
    InvalidCellSize { cell_size: u32, sheet_width: u32 },
    /// Index lands past the last row of the sheet
    #[error(
        "Cell {index} (row {row}) is outside a {sheet_width}x{sheet_height} sheet \
         of {cell_size}px cells"
    )]
    OutOfBounds {
        index: u32,
        row: u32,
        cell_size: u32,
        sheet_width: u32,
        sheet_height: u32,
    },
}

/// Top-left pixel of cell `index` in a sheet `sheet_width` wide.
///
/// `column = index % columns`, `row = index / columns` where
/// `columns = sheet_width / cell_size`.
pub fn cell_origin(
    sheet_width: u32,
    index: u32,
    cell_size: u32,
) -> Result<(u32, u32), ExtractError> {
    if cell_size == 0 || cell_size > sheet_width {
        return Err(ExtractError::InvalidCellSize { cell_size, sheet_width });
    }
    let columns = sheet_width / cell_size;
    let column = index % columns;
    let row = index / columns;
    Ok((column * cell_size, row * cell_size))
}

/// Crop cell `index` out of `sheet`.
pub fn extract_cell(
    sheet: &RgbaImage,
    index: u32,
    cell_size: u32,
) -> Result<RgbaImage, ExtractError> {
    let (sheet_width, sheet_height) = sheet.dimensions();
    let (x, y) = cell_origin(sheet_width, index, cell_size)?;

    // the last row must fit completely
    if y.checked_add(cell_size).map_or(true, |bottom| bottom > sheet_height) {
        return Err(ExtractError::OutOfBounds {
            index,
            row: y / cell_size,
            cell_size,
            sheet_width,
            sheet_height,
        });
    }

    Ok(imageops::crop_imm(sheet, x, y, cell_size, cell_size).to_image())
}

/// Crop the cell a catalog entry points at.
pub fn extract_entry(sheet: &RgbaImage, entry: &CatalogEntry) -> Result<RgbaImage, ExtractError> {
    extract_cell(sheet, entry.cell_index, entry.cell_size.pixels())
}
