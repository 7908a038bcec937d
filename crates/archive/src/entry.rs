use std::collections::HashSet;

use crate::ArchiveError;
use crate::manifest::MANIFEST_ENTRY_NAME;

/// Reduces an uploaded file name to its final path component.
///
/// Both `/` and `\` count as separators, since browsers on either platform
/// may send a full client-side path.
pub fn entry_name(file_name: &str) -> Result<String, ArchiveError> {
    let trimmed = file_name.trim_end_matches(['/', '\\']);
    let last = trimmed.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    validate_entry_name(last)?;
    Ok(last.to_string())
}

/// Validates a flat archive entry name.
///
/// Rejects:
/// - Empty names
/// - `.` and `..`
/// - Names still containing a separator or a NUL byte
pub fn validate_entry_name(name: &str) -> Result<(), ArchiveError> {
    if name.is_empty() {
        return Err(ArchiveError::InvalidEntryName("empty name".into()));
    }

    if name == "." || name == ".." {
        return Err(ArchiveError::InvalidEntryName(format!(
            "directory reference not allowed: {name}"
        )));
    }

    if name.contains(['/', '\\', '\0']) {
        return Err(ArchiveError::InvalidEntryName(format!(
            "separator not allowed: {name}"
        )));
    }

    Ok(())
}

/// Hands out unique entry names within one archive.
///
/// The manifest name is reserved up front. A repeated name gets ` (n)`
/// inserted before its extension: `take.wav`, `take (1).wav`, ...
#[derive(Debug)]
pub struct EntryNames {
    used: HashSet<String>,
}

impl Default for EntryNames {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryNames {
    pub fn new() -> Self {
        let mut used = HashSet::new();
        used.insert(MANIFEST_ENTRY_NAME.to_string());
        Self { used }
    }

    /// Returns the entry name to use for `file_name`.
    pub fn assign(&mut self, file_name: &str) -> Result<String, ArchiveError> {
        let name = entry_name(file_name)?;
        if self.used.insert(name.clone()) {
            return Ok(name);
        }

        let (stem, ext) = split_extension(&name);
        let mut n = 1;
        loop {
            let candidate = format!("{stem} ({n}){ext}");
            if self.used.insert(candidate.clone()) {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

/// Splits `name` into stem and extension (with its dot). A leading dot is
/// part of the stem.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(entry_name("kick.wav").unwrap(), "kick.wav");
        assert_eq!(entry_name("Lead Vox (dry).flac").unwrap(), "Lead Vox (dry).flac");
    }

    #[test]
    fn strips_client_directories() {
        assert_eq!(entry_name("stems/drums/kick.wav").unwrap(), "kick.wav");
        assert_eq!(entry_name("C:\\Users\\me\\bass.wav").unwrap(), "bass.wav");
        assert_eq!(entry_name("../../etc/passwd").unwrap(), "passwd");
    }

    #[test]
    fn rejects_empty_and_dot_names() {
        assert!(entry_name("").is_err());
        assert!(entry_name("   ").is_err());
        assert!(entry_name("..").is_err());
        assert!(entry_name("a/..").is_err());
        assert!(entry_name(".").is_err());
        assert!(entry_name("dir/").is_ok());
    }

    #[test]
    fn validate_rejects_separators() {
        assert!(validate_entry_name("a/b").is_err());
        assert!(validate_entry_name("a\\b").is_err());
        assert!(validate_entry_name("a\0b").is_err());
        assert!(validate_entry_name(".hidden").is_ok());
    }

    #[test]
    fn duplicates_get_numbered_before_extension() {
        let mut names = EntryNames::new();
        assert_eq!(names.assign("take.wav").unwrap(), "take.wav");
        assert_eq!(names.assign("a/take.wav").unwrap(), "take (1).wav");
        assert_eq!(names.assign("b/take.wav").unwrap(), "take (2).wav");
        assert_eq!(names.assign("README").unwrap(), "README");
        assert_eq!(names.assign("README").unwrap(), "README (1)");
        assert_eq!(names.assign(".env").unwrap(), ".env");
        assert_eq!(names.assign(".env").unwrap(), ".env (1)");
    }

    #[test]
    fn manifest_name_is_reserved() {
        let mut names = EntryNames::new();
        assert_eq!(
            names.assign("project_info.txt").unwrap(),
            "project_info (1).txt"
        );
    }
}
