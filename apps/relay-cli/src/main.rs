//! stemrelay entry point.
//!
//! `stemrelay <config.toml> <form.toml> <file>...`
//!
//! Copies the given files into the staging directory, relays them as one
//! archive and prints the JSON response.

use std::path::{Path, PathBuf};

use anyhow::Context;
use stemrelay_relay::{
    ArchiveInput, FormFields, Relay, RelayConfig, RelayRequest, RelayResponse, StagedFiles,
    stage_file,
};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: stemrelay <config.toml> <form.toml> <file>...";

struct Args {
    config: PathBuf,
    form: PathBuf,
    files: Vec<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Option<Args> {
    let config = PathBuf::from(args.next()?);
    let form = PathBuf::from(args.next()?);
    Some(Args {
        config,
        form,
        files: args.map(PathBuf::from).collect(),
    })
}

fn load_form(path: &Path) -> anyhow::Result<FormFields> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read form {}", path.display()))?;
    let form = toml::from_str(&content)
        .with_context(|| format!("failed to parse form {}", path.display()))?;
    Ok(form)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = parse_args(std::env::args().skip(1)) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = RelayConfig::load(&args.config)?;
    config.validate()?;
    tracing::info!(
        destination = %config.destination_folder,
        chunk_size = config.chunk_size,
        "configuration loaded"
    );
    let form = load_form(&args.form)?;

    let rt = tokio::runtime::Runtime::new()?;
    let (status, response) = rt.block_on(run(config, form, args.files))?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    if status != 200 {
        std::process::exit(1);
    }
    Ok(())
}

async fn run(
    config: RelayConfig,
    form: FormFields,
    files: Vec<PathBuf>,
) -> anyhow::Result<(u16, RelayResponse)> {
    let relay = Relay::from_config(&config)?;

    // Covers copies made before a later copy fails; the relay removes the
    // rest itself.
    let mut staged = StagedFiles::new();
    let mut inputs = Vec::with_capacity(files.len());
    for source in &files {
        let path = stage_file(&config.staging_dir, source)
            .await
            .with_context(|| format!("failed to stage {}", source.display()))?;
        staged.register(&path);
        inputs.push(ArchiveInput {
            path,
            file_name: display_name(source),
        });
    }

    let result = relay.relay(RelayRequest { files: inputs, form }).await;
    Ok(RelayResponse::from_result(&result))
}

fn display_name(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string())
}
