use serde::{Deserialize, Deserializer, Serialize};

/// Body of the per-upload hook, sent once the host has stored a release file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadEvent {
    /// `user/index`
    pub index: String,
    pub project: String,
    pub version: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default = "default_file_exists")]
    pub file_exists: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub application_url: Option<String>,
    /// The index's `rss_active` setting, when the host has one
    #[serde(default, deserialize_with = "deserialize_index_flag")]
    pub rss_active: Option<bool>,
}

/// Body of the upload-sync hook, which carries the server's public URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadSyncEvent {
    pub application_url: String,
    #[serde(default)]
    pub index: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfigDefaults {
    pub rss_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    Recorded { items: usize },
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedDocument {
    Rendered(Vec<u8>),
    Placeholder,
}

fn default_file_exists() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IndexFlag {
    Bool(bool),
    Text(String),
}

// Index configs written by older hosts store the flag as "True"/"False".
fn deserialize_index_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let flag = Option::<IndexFlag>::deserialize(deserializer)?;
    match flag {
        None => Ok(None),
        Some(IndexFlag::Bool(value)) => Ok(Some(value)),
        Some(IndexFlag::Text(text)) => match text.trim().to_lowercase().as_str() {
            "true" => Ok(Some(true)),
            "false" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "invalid rss_active value: {}",
                other
            ))),
        },
    }
}
