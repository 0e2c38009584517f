//! Write the OpenAPI document as pretty-printed JSON, to stdout or a file.

use std::fs;
use std::io::Write;
use std::path::PathBuf;

use backend::ApiDoc;
use clap::Parser;
use color_eyre::eyre::WrapErr;
use utoipa::OpenApi;

/// Dump the REST API description for client generators.
#[derive(Debug, Parser)]
#[command(name = "openapi-dump", version)]
struct Args {
    /// Write to this path instead of stdout.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .wrap_err("failed to serialise OpenAPI document")?;

    match args.output {
        Some(path) => fs::write(&path, format!("{json}\n"))
            .wrap_err_with(|| format!("failed to write {}", path.display())),
        None => writeln!(std::io::stdout().lock(), "{json}")
            .wrap_err("failed to write OpenAPI document"),
    }
}
