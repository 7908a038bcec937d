use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::orchestrator::OutcomeReport;

/// JSON body returned to the submitting client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
}

impl RelayResponse {
    pub fn success(report: &OutcomeReport) -> Self {
        Self {
            success: true,
            message: format!(
                "Uploaded {} file(s) as {}",
                report.file_count, report.destination_name
            ),
            archive_name: Some(report.destination_name.clone()),
            files_count: Some(report.file_count),
            total_size: Some(report.total_bytes),
        }
    }

    pub fn failure(error: &RelayError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            archive_name: None,
            files_count: None,
            total_size: None,
        }
    }

    /// Status code and body for a relay outcome.
    pub fn from_result(result: &Result<OutcomeReport, RelayError>) -> (u16, Self) {
        match result {
            Ok(report) => (200, Self::success(report)),
            Err(e) => (e.status_code(), Self::failure(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stemrelay_transfer::FileMetadata;

    fn report() -> OutcomeReport {
        OutcomeReport {
            destination_name: "20240131_Ana_Song.tar.gz".into(),
            remote_path: "/Stem Uploads/20240131_Ana_Song.tar.gz".into(),
            file_count: 3,
            total_bytes: 10_000,
            archive_bytes: 4_000,
            remote: FileMetadata::default(),
        }
    }

    #[test]
    fn success_json_shape() {
        let (status, body) = RelayResponse::from_result(&Ok(report()));
        assert_eq!(status, 200);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["archiveName"], "20240131_Ana_Song.tar.gz");
        assert_eq!(json["filesCount"], 3);
        assert_eq!(json["totalSize"], 10_000);
        assert!(json["message"].as_str().unwrap().contains("3 file(s)"));
    }

    #[test]
    fn failure_json_omits_report_fields() {
        let (status, body) = RelayResponse::from_result(&Err(RelayError::NoInput));
        assert_eq!(status, 400);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "no files were provided"})
        );
    }
}
