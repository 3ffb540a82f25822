use serde_json::Value;

use crate::domain::lead::LeadRecord;

/// Number of spreadsheet columns one lead occupies.
pub const LEAD_COLUMNS: usize = 20;

/// One encoded spreadsheet row.
pub type LeadRow = [String; LEAD_COLUMNS];

fn cell(value: &Value) -> String {
    match value {
        // Strings go in bare, everything else via its JSON rendering so the
        // sheet always receives text cells.
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl LeadRecord {
    /// Encodes the record into its fixed column layout. Pure and
    /// deterministic: the same record always yields the same cells.
    pub fn to_cells(&self) -> LeadRow {
        [
            cell(&self.created_at),
            cell(&self.email),
            cell(&self.name),
            cell(&self.opportunity),
            cell(&self.first_conversion_date),
            cell(&self.first_conversion_identifier),
            cell(&self.first_conversion_source),
            cell(&self.first_conversion_medium),
            cell(&self.first_conversion_campaign),
            cell(&self.first_conversion_channel),
            cell(&self.last_conversion_date),
            cell(&self.last_conversion_identifier),
            cell(&self.last_conversion_source),
            cell(&self.last_conversion_medium),
            cell(&self.last_conversion_channel),
            cell(&self.last_conversion_campaign),
            cell(&self.lead_stage),
            cell(&self.last_marked_opportunity_date),
            cell(&self.fit_score),
            cell(&self.interest),
        ]
    }
}
