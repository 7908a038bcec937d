use chrono::{DateTime, Utc};

use crate::form::FormFields;

/// Builds `{YYYYMMDD}_{contact}_{track}.{extension}` from the UTC date and
/// the sanitized contact and track names.
pub fn destination_name(form: &FormFields, now: DateTime<Utc>, extension: &str) -> String {
    format!(
        "{}_{}_{}.{}",
        now.format("%Y%m%d"),
        sanitize(form.contact_name.as_deref().unwrap_or_default()),
        sanitize(form.track_name.as_deref().unwrap_or_default()),
        extension.trim_start_matches('.')
    )
}

/// Keeps ASCII alphanumerics, `-` and `_`. Whitespace runs collapse to one
/// `_`; anything else is dropped. Yields `unknown` when nothing survives.
pub fn sanitize(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_sep = false;
    for c in value.trim().chars() {
        if c.is_whitespace() {
            pending_sep = true;
        } else if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c);
        }
    }
    if out.is_empty() {
        "unknown".to_string()
    } else {
        out
    }
}

/// Joins the destination folder and file name into an absolute remote path.
pub fn remote_path(folder: &str, name: &str) -> String {
    let folder = folder.trim().trim_matches('/');
    if folder.is_empty() {
        format!("/{name}")
    } else {
        format!("/{folder}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form(contact: &str, track: &str) -> FormFields {
        FormFields {
            contact_name: Some(contact.into()),
            track_name: Some(track.into()),
            ..Default::default()
        }
    }

    #[test]
    fn name_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
        let f = form("Ana Souza", "Night Drive (v2)");
        let a = destination_name(&f, now, "tar.gz");
        let b = destination_name(&f, now, ".tar.gz");
        assert_eq!(a, "20240131_Ana_Souza_Night_Drive_v2.tar.gz");
        assert_eq!(a, b);
    }

    #[test]
    fn missing_fields_become_unknown() {
        let now = Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap();
        let name = destination_name(&FormFields::default(), now, "tar.gz");
        assert_eq!(name, "20231201_unknown_unknown.tar.gz");
    }

    #[test]
    fn sanitize_rules() {
        assert_eq!(sanitize("  DJ   Shadow "), "DJ_Shadow");
        assert_eq!(sanitize("a/b\\c..d"), "abcd");
        assert_eq!(sanitize("lo-fi_beats"), "lo-fi_beats");
        assert_eq!(sanitize("Café Müller"), "Caf_Mller");
        assert_eq!(sanitize("!!!"), "unknown");
        assert_eq!(sanitize(""), "unknown");
    }

    #[test]
    fn remote_path_joins_folder() {
        assert_eq!(remote_path("/Stem Uploads", "x.tar.gz"), "/Stem Uploads/x.tar.gz");
        assert_eq!(remote_path("Stem Uploads/", "x.tar.gz"), "/Stem Uploads/x.tar.gz");
        assert_eq!(remote_path("/", "x.tar.gz"), "/x.tar.gz");
        assert_eq!(remote_path("", "x.tar.gz"), "/x.tar.gz");
    }
}
