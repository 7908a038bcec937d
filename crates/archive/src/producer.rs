use std::fs::File;
use std::future::Future;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{Builder, EntryType, Header};
use tracing::{debug, info};

use crate::ArchiveError;
use crate::entry::EntryNames;
use crate::manifest::{MANIFEST_ENTRY_NAME, Manifest};

/// Future returned by [`ArchiveProducer::produce`].
pub type ArchiveFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ProducedArchive, ArchiveError>> + Send + 'a>>;

/// A staged file to include in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveInput {
    pub path: PathBuf,
    /// Name the client sent; reduced to a flat entry name when packed.
    pub file_name: String,
}

/// A finished archive on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedArchive {
    pub path: PathBuf,
    pub size: u64,
    /// Entry names in archive order, manifest first.
    pub entries: Vec<String>,
}

/// Packs input files and a manifest into one archive.
pub trait ArchiveProducer: Send + Sync {
    /// File extension of produced archives, without a leading dot.
    fn extension(&self) -> &'static str;

    /// Writes the archive to `output`.
    ///
    /// The manifest gets the final entry names and sizes appended before it
    /// is rendered. A partially written `output` is left for the caller to
    /// remove.
    fn produce<'a>(
        &'a self,
        inputs: Vec<ArchiveInput>,
        manifest: Manifest,
        output: &'a Path,
    ) -> ArchiveFuture<'a>;
}

/// Gzip-compressed tar producer.
#[derive(Debug, Clone, Copy)]
pub struct TarGzProducer {
    level: u32,
}

impl Default for TarGzProducer {
    fn default() -> Self {
        Self::new(6)
    }
}

impl TarGzProducer {
    /// Levels above 9 are clamped to 9.
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(9),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl ArchiveProducer for TarGzProducer {
    fn extension(&self) -> &'static str {
        "tar.gz"
    }

    fn produce<'a>(
        &'a self,
        inputs: Vec<ArchiveInput>,
        manifest: Manifest,
        output: &'a Path,
    ) -> ArchiveFuture<'a> {
        let level = self.level;
        let output = output.to_path_buf();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || write_tar_gz(inputs, manifest, &output, level))
                .await?
        })
    }
}

fn write_tar_gz(
    inputs: Vec<ArchiveInput>,
    mut manifest: Manifest,
    output: &Path,
    level: u32,
) -> Result<ProducedArchive, ArchiveError> {
    let mut names = EntryNames::new();
    let mut planned = Vec::with_capacity(inputs.len());
    for input in inputs {
        let name = names.assign(&input.file_name)?;
        let size = std::fs::metadata(&input.path)?.len();
        manifest.add_file(name.clone(), size);
        planned.push((name, input.path, size));
    }

    let mtime = manifest.created_at().timestamp().max(0) as u64;
    let file = File::create(output)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::new(level));
    let mut builder = Builder::new(encoder);

    let text = manifest.render();
    append_entry(
        &mut builder,
        MANIFEST_ENTRY_NAME,
        text.len() as u64,
        mtime,
        text.as_bytes(),
    )?;
    let mut entries = vec![MANIFEST_ENTRY_NAME.to_string()];

    for (name, path, size) in planned {
        let mut source = File::open(&path)?;
        let actual = source.metadata()?.len();
        if actual != size {
            return Err(ArchiveError::Io(io::Error::other(format!(
                "{} changed size while packing",
                path.display()
            ))));
        }
        append_entry(&mut builder, &name, size, mtime, &mut source)?;
        debug!(entry = %name, size, "packed entry");
        entries.push(name);
    }

    let encoder = builder.into_inner()?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    drop(writer);

    let size = std::fs::metadata(output)?.len();
    info!(
        path = %output.display(),
        entries = entries.len(),
        size,
        level,
        "archive written"
    );

    Ok(ProducedArchive {
        path: output.to_path_buf(),
        size,
        entries,
    })
}

fn append_entry<W: Write, R: Read>(
    builder: &mut Builder<W>,
    name: &str,
    size: u64,
    mtime: u64,
    data: R,
) -> Result<(), ArchiveError> {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_mode(0o644);
    header.set_mtime(mtime);
    header.set_size(size);
    // Writes a GNU long-name record for names over 100 bytes.
    builder.append_data(&mut header, name, data)?;
    Ok(())
}
