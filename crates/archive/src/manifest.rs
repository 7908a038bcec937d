use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

/// Archive entry that carries the rendered manifest.
pub const MANIFEST_ENTRY_NAME: &str = "project_info.txt";

/// Stand-in for a missing or blank field.
pub const PLACEHOLDER: &str = "Not provided";

/// One file listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub name: String,
    pub size: u64,
}

/// Human-readable summary of a submission, embedded in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    title: String,
    created_at: DateTime<Utc>,
    fields: Vec<(String, String)>,
    files: Vec<ManifestFile>,
}

impl Manifest {
    pub fn new(title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            created_at,
            fields: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Adds a labelled field. `None` and blank values render as [`PLACEHOLDER`].
    pub fn field(mut self, label: impl Into<String>, value: Option<&str>) -> Self {
        let value = match value.map(str::trim) {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => PLACEHOLDER.to_string(),
        };
        self.fields.push((label.into(), value));
        self
    }

    pub fn add_file(&mut self, name: impl Into<String>, size: u64) {
        self.files.push(ManifestFile {
            name: name.into(),
            size,
        });
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[ManifestFile] {
        &self.files
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count()));
        let _ = writeln!(
            out,
            "Submitted: {}",
            self.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        out.push('\n');

        for (label, value) in &self.fields {
            // Multi-line values (stem lists, notes) are indented under the label.
            let mut lines = value.lines();
            let first = lines.next().unwrap_or_default();
            let _ = writeln!(out, "{label}: {first}");
            for line in lines {
                let _ = writeln!(out, "    {line}");
            }
        }

        if !self.files.is_empty() {
            out.push('\n');
            let _ = writeln!(out, "Files ({}):", self.files.len());
            for file in &self.files {
                let _ = writeln!(out, "  - {} ({} bytes)", file.name, file.size);
            }
        }
        out
    }
}
