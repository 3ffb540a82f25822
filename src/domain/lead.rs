use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Webhook body as RD Station posts it: a `leads` array of raw entries.
#[derive(Debug, Deserialize)]
pub struct RdStationPayload {
    #[serde(default)]
    pub leads: Option<Vec<RawLead>>,
}

/// One raw lead entry. Scalar fields stay as JSON values so numeric or null
/// source data survives until row encoding; both conversion objects are
/// required, so an entry without them fails the whole payload.
#[derive(Debug, Deserialize)]
pub struct RawLead {
    pub created_at: Value,
    pub email: Value,
    pub name: Value,
    pub opportunity: Value,
    pub first_conversion: RawConversion,
    pub last_conversion: RawConversion,
    pub lead_stage: Value,
    #[serde(default)]
    pub last_marked_opportunity_date: Option<Value>,
    pub fit_score: Value,
    pub interest: Value,
}

#[derive(Debug, Deserialize)]
pub struct RawConversion {
    pub content: RawConversionContent,
    pub conversion_origin: RawConversionOrigin,
}

#[derive(Debug, Deserialize)]
pub struct RawConversionContent {
    pub created_at: Value,
    // RD Station ships this field name in Portuguese.
    pub identificador: Value,
}

#[derive(Debug, Deserialize)]
pub struct RawConversionOrigin {
    pub source: Value,
    pub medium: Value,
    pub campaign: Value,
    pub channel: Value,
}

/// One normalized lead. Declaration order is the spreadsheet column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub created_at: Value,
    pub email: Value,
    pub name: Value,
    pub opportunity: Value,
    pub first_conversion_date: Value,
    pub first_conversion_identifier: Value,
    pub first_conversion_source: Value,
    pub first_conversion_medium: Value,
    pub first_conversion_campaign: Value,
    pub first_conversion_channel: Value,
    pub last_conversion_date: Value,
    pub last_conversion_identifier: Value,
    pub last_conversion_source: Value,
    pub last_conversion_medium: Value,
    pub last_conversion_channel: Value,
    pub last_conversion_campaign: Value,
    pub lead_stage: Value,
    pub last_marked_opportunity_date: Value,
    pub fit_score: Value,
    pub interest: Value,
}

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("empty input: payload carries no leads")]
    EmptyPayload,
}

/// Flattens every lead entry of the payload into a [`LeadRecord`]. An absent
/// or empty `leads` array is the "nothing to do" case and reported as
/// [`NormalizeError::EmptyPayload`].
pub fn normalize(payload: RdStationPayload) -> Result<Vec<LeadRecord>, NormalizeError> {
    let leads = payload.leads.unwrap_or_default();
    if leads.is_empty() {
        return Err(NormalizeError::EmptyPayload);
    }
    Ok(leads.into_iter().map(LeadRecord::from).collect())
}

impl From<RawLead> for LeadRecord {
    fn from(raw: RawLead) -> Self {
        LeadRecord {
            created_at: raw.created_at,
            email: raw.email,
            name: raw.name,
            opportunity: raw.opportunity,
            first_conversion_date: raw.first_conversion.content.created_at,
            first_conversion_identifier: raw.first_conversion.content.identificador,
            first_conversion_source: raw.first_conversion.conversion_origin.source,
            first_conversion_medium: raw.first_conversion.conversion_origin.medium,
            first_conversion_campaign: raw.first_conversion.conversion_origin.campaign,
            first_conversion_channel: raw.first_conversion.conversion_origin.channel,
            last_conversion_date: raw.last_conversion.content.created_at,
            last_conversion_identifier: raw.last_conversion.content.identificador,
            last_conversion_source: raw.last_conversion.conversion_origin.source,
            last_conversion_medium: raw.last_conversion.conversion_origin.medium,
            last_conversion_channel: raw.last_conversion.conversion_origin.channel,
            last_conversion_campaign: raw.last_conversion.conversion_origin.campaign,
            lead_stage: raw.lead_stage,
            // The sheet historically shows the literal text "null" here, not
            // an empty cell.
            last_marked_opportunity_date: raw
                .last_marked_opportunity_date
                .filter(|date| !date.is_null())
                .unwrap_or_else(|| Value::String("null".to_owned())),
            fit_score: raw.fit_score,
            interest: raw.interest,
        }
    }
}

/// Fully populated record for tests across the crate.
#[cfg(test)]
pub(crate) fn test_record(email: &str) -> LeadRecord {
    use serde_json::json;
    LeadRecord {
        created_at: json!("2021-01-01"),
        email: json!(email),
        name: json!("A"),
        opportunity: json!("deal1"),
        first_conversion_date: json!("t1"),
        first_conversion_identifier: json!("id1"),
        first_conversion_source: json!("s1"),
        first_conversion_medium: json!("m1"),
        first_conversion_campaign: json!("c1"),
        first_conversion_channel: json!("ch1"),
        last_conversion_date: json!("t2"),
        last_conversion_identifier: json!("id2"),
        last_conversion_source: json!("s2"),
        last_conversion_medium: json!("m2"),
        last_conversion_channel: json!("ch2"),
        last_conversion_campaign: json!("c2"),
        lead_stage: json!("Lead"),
        last_marked_opportunity_date: json!("null"),
        fit_score: json!("Hot"),
        interest: json!("high"),
    }
}
