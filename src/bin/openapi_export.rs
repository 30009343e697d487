use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use procurement_api::openapi::ApiDocV1;
use utoipa::OpenApi;

#[derive(Parser)]
#[command(name = "openapi-export", about = "Write the OpenAPI document for the procurement API")]
struct Cli {
    /// Output file; `-` writes to stdout
    #[arg(default_value = "openapi/procurement-api.v1.json")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let json = serde_json::to_string_pretty(&ApiDocV1::openapi())?;

    if cli.output.as_os_str() == "-" {
        println!("{}", json);
        return Ok(());
    }

    if let Some(dir) = cli.output.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(&cli.output, json).with_context(|| format!("writing {}", cli.output.display()))?;

    eprintln!("OpenAPI document written to {}", cli.output.display());
    Ok(())
}
