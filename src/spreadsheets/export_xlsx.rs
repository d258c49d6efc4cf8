use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::domain::listing::CleanedListing;
use crate::errors::{PipelineError, Result};

fn xlsx_err(what: &str, e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Xlsx(format!("failed to write {what}: {e}"))
}

/// Writes one cleaned dataset to an .xlsx workbook, columns in published
/// order.
pub fn export_listings_xlsx(rows: &[CleanedListing], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in CleanedListing::COLUMNS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| xlsx_err(header, e))?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = (i + 1) as u32;

        worksheet
            .write_string(r, 0, &row.prop_id)
            .map_err(|e| xlsx_err("prop id", e))?;
        write_opt_str(worksheet, r, 1, row.city.as_deref())?;
        worksheet
            .write_number(r, 2, row.price)
            .map_err(|e| xlsx_err("price", e))?;
        write_opt_num(worksheet, r, 3, row.area)?;
        write_opt_str(worksheet, r, 4, row.property_type.as_deref())?;
        write_opt_str(worksheet, r, 5, row.furnish.as_deref())?;
        write_opt_str(worksheet, r, 6, row.facing.as_deref())?;
        write_opt_str(worksheet, r, 7, row.age.as_deref())?;
        write_opt_num(worksheet, r, 8, row.bedroom_num)?;
        write_opt_num(worksheet, r, 9, row.balcony_num)?;
        write_opt_str(worksheet, r, 10, row.floor_num.as_deref())?;
        write_opt_str(worksheet, r, 11, row.locality_name.as_deref())?;
        worksheet
            .write_number(r, 12, row.luxury_category as f64)
            .map_err(|e| xlsx_err("luxury category", e))?;
        write_opt_str(worksheet, r, 13, row.prop_heading.as_deref())?;
        write_opt_str(worksheet, r, 14, row.description.as_deref())?;
        write_opt_str(worksheet, r, 15, row.prop_name.as_deref())?;
        write_opt_num(worksheet, r, 16, row.latitude)?;
        write_opt_num(worksheet, r, 17, row.longitude)?;
        write_opt_str(worksheet, r, 18, row.society_name.as_deref())?;
    }

    workbook
        .save(path)
        .map_err(|e| PipelineError::Xlsx(format!("failed to save workbook: {e}")))?;
    Ok(())
}

fn write_opt_str(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    r: u32,
    c: u16,
    v: Option<&str>,
) -> Result<()> {
    worksheet
        .write_string(r, c, v.unwrap_or(""))
        .map_err(|e| xlsx_err("cell", e))?;
    Ok(())
}

fn write_opt_num(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    r: u32,
    c: u16,
    v: Option<f64>,
) -> Result<()> {
    if let Some(v) = v {
        worksheet
            .write_number(r, c, v)
            .map_err(|e| xlsx_err("cell", e))?;
    }
    Ok(())
}
