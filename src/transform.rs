use anyhow::{Context, Result};

use crate::layout::RunLayout;
use crate::model::{DestinationRow, RawMetricRow};

/// Reshape source rows into destination rows, one field per layout column.
pub fn transform_rows(layout: &RunLayout, rows: &[RawMetricRow]) -> Result<Vec<DestinationRow>> {
  rows
    .iter()
    .enumerate()
    .map(|(i, row)| transform_row(layout, row).with_context(|| format!("transforming result row #{}", i)))
    .collect()
}

pub fn transform_row(layout: &RunLayout, row: &RawMetricRow) -> Result<DestinationRow> {
  layout.columns.iter().map(|c| c.value(layout.mode, row)).collect()
}
