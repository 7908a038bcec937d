use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stemrelay_archive::Manifest;

const MANIFEST_TITLE: &str = "Stem Submission";

/// Text fields submitted alongside the files.
///
/// Every field is optional; missing ones show up in the manifest as a
/// placeholder rather than failing the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormFields {
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(alias = "projectName")]
    pub track_name: Option<String>,
    pub artist: Option<String>,
    pub tempo: Option<String>,
    pub time_signature: Option<String>,
    pub duration: Option<String>,
    pub stem_list: Option<String>,
    pub reference_stems: Option<String>,
    pub constraints: Option<String>,
}

impl FormFields {
    /// Labelled fields in manifest order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 11] {
        [
            ("Contact Name", self.contact_name.as_deref()),
            ("Email", self.email.as_deref()),
            ("Phone", self.phone.as_deref()),
            ("Project / Track Name", self.track_name.as_deref()),
            ("Artist", self.artist.as_deref()),
            ("Tempo (BPM)", self.tempo.as_deref()),
            ("Time Signature", self.time_signature.as_deref()),
            ("Duration", self.duration.as_deref()),
            ("Stem List", self.stem_list.as_deref()),
            ("Reference Stems", self.reference_stems.as_deref()),
            ("Constraints", self.constraints.as_deref()),
        ]
    }

    /// Manifest with every field filled in; file entries are added by the
    /// archive producer.
    pub fn to_manifest(&self, submitted_at: DateTime<Utc>) -> Manifest {
        self.entries()
            .into_iter()
            .fold(Manifest::new(MANIFEST_TITLE, submitted_at), |m, (label, value)| {
                m.field(label, value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deserializes_camel_case() {
        let form: FormFields = serde_json::from_str(
            r#"{"contactName":"Ana","trackName":"Night Drive","timeSignature":"4/4"}"#,
        )
        .unwrap();
        assert_eq!(form.contact_name.as_deref(), Some("Ana"));
        assert_eq!(form.track_name.as_deref(), Some("Night Drive"));
        assert_eq!(form.time_signature.as_deref(), Some("4/4"));
        assert!(form.email.is_none());
    }

    #[test]
    fn project_name_alias() {
        let form: FormFields = serde_json::from_str(r#"{"projectName":"Album"}"#).unwrap();
        assert_eq!(form.track_name.as_deref(), Some("Album"));
    }

    #[test]
    fn manifest_has_all_fields_with_placeholders() {
        let form = FormFields {
            contact_name: Some("Ana".into()),
            tempo: Some("".into()),
            ..Default::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let manifest = form.to_manifest(at);

        assert_eq!(manifest.fields().len(), 11);
        let text = manifest.render();
        assert!(text.starts_with("Stem Submission\n"));
        assert!(text.contains("Submitted: 2024-05-01T08:00:00Z"));
        assert!(text.contains("Contact Name: Ana\n"));
        assert!(text.contains("Tempo (BPM): Not provided\n"));
        assert!(text.contains("Constraints: Not provided\n"));
    }
}
