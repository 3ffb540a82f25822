use std::path::PathBuf;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct StagingConfig {
    /// Directory holding one JSON file per staged lead.
    pub dir: PathBuf,
}
