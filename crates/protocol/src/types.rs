use serde::{Deserialize, Serialize};

/// How the provider handles an existing file at the commit path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Never overwrite; combined with `autorename` a conflict yields a new name.
    #[default]
    Add,
    Overwrite,
}

/// Destination and collision policy for a committed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub path: String,
    pub mode: WriteMode,
    pub autorename: bool,
    pub mute: bool,
}

impl CommitInfo {
    /// Add mode with autorename on conflict and client notifications left on.
    pub fn add(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mode: WriteMode::Add,
            autorename: true,
            mute: false,
        }
    }
}

/// Position within an open upload session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSessionCursor {
    pub session_id: String,
    pub offset: u64,
}

/// Metadata of a file as stored by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub path_display: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_modified: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_info_add_policy() {
        let commit = CommitInfo::add("/Uploads/a.tar.gz");
        let json = serde_json::to_value(&commit).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "path": "/Uploads/a.tar.gz",
                "mode": "add",
                "autorename": true,
                "mute": false,
            })
        );
    }

    #[test]
    fn file_metadata_tolerates_unknown_and_missing_fields() {
        let json = r#"{
            ".tag": "file",
            "name": "20240101_a_b.tar.gz",
            "path_display": "/Uploads/20240101_a_b.tar.gz",
            "size": 42,
            "is_downloadable": true
        }"#;
        let meta: FileMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(meta.size, 42);
        assert!(meta.id.is_empty());
        assert!(meta.content_hash.is_none());
    }
}
