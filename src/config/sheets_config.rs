#[derive(serde::Deserialize, Debug, Clone)]
pub struct SpreadsheetConfig {
    /// Path to the Google service account key file.
    pub priv_key: Box<str>,
    pub spreadsheet_id: Box<str>,
    /// A1 range the lead rows are appended under, e.g. `Leads!A2:T`.
    pub append_range: Box<str>,
}
