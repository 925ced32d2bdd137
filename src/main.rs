mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::Cli;
use img2palette::{export, extract_palette_from_path};
use log::{error, info};
use rayon::prelude::*;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Join per-input renderings into one document.
///
/// A lone input's failure is returned as is. With several inputs, failures are
/// logged and counted, and the call fails only when none succeeded so that no
/// empty output gets written.
fn collect_output(inputs: &[PathBuf], results: &[Result<String>]) -> Result<(String, usize)> {
    if let [single] = results {
        return match single {
            Ok(rendered) => Ok((rendered.clone(), 0)),
            Err(e) => bail!("{:#}", e),
        };
    }

    let mut output = String::new();
    let mut failures = 0;
    for (input, result) in inputs.iter().zip(results) {
        match result {
            Ok(rendered) => {
                writeln!(output, "== {} ==", input.display())?;
                output.push_str(rendered);
                if !rendered.ends_with('\n') {
                    output.push('\n');
                }
            }
            Err(e) => {
                error!("{:#}", e);
                failures += 1;
            }
        }
    }

    if failures == results.len() {
        bail!("all {} images failed", failures);
    }
    Ok((output, failures))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let options = cli.options();
    let format = cli.export_format();

    info!(
        "Extracting {} colors from {} image(s)...",
        options.palette_size,
        cli.inputs.len()
    );

    let results: Vec<Result<String>> = cli
        .inputs
        .par_iter()
        .map(|input| {
            let palette = extract_palette_from_path(input, &options)
                .with_context(|| format!("failed to extract palette from {}", input.display()))?;
            Ok(export(&palette, format)?)
        })
        .collect();

    let (output, failures) = collect_output(&cli.inputs, &results)?;

    match &cli.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Palette written to {}", path.display());
        }
        None => {
            print!("{}", output);
            if !output.is_empty() && !output.ends_with('\n') {
                println!();
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} images failed", failures, cli.inputs.len());
    }
    Ok(())
}
