// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: File-backed SourceClient for offline runs (hidden --fixtures flag; integration tests)
// role: source/fixture
// inputs: <dir>/source_rows.json: { "YYYY-MM-DD": [RawMetricRow, ...] }
// outputs: Pages sliced by start_row/row_limit, as the real endpoint would return them
// invariants: Missing file or missing date yields empty pages
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use super::{SourceClient, SourceQuery};
use crate::model::RawMetricRow;

pub const SOURCE_ROWS_FILE: &str = "source_rows.json";

pub struct FixtureSource {
  rows_by_date: BTreeMap<String, Vec<RawMetricRow>>,
}

impl FixtureSource {
  pub fn load(dir: &Path) -> Result<Self> {
    let path = dir.join(SOURCE_ROWS_FILE);

    if !path.exists() {
      return Ok(Self {
        rows_by_date: BTreeMap::new(),
      });
    }

    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    let rows_by_date = serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))?;

    Ok(Self { rows_by_date })
  }
}

impl SourceClient for FixtureSource {
  fn query(&self, query: &SourceQuery<'_>) -> Result<Vec<RawMetricRow>> {
    let Some(rows) = self.rows_by_date.get(query.date) else {
      return Ok(Vec::new());
    };

    Ok(rows.iter().skip(query.start_row).take(query.row_limit).cloned().collect())
  }
}
