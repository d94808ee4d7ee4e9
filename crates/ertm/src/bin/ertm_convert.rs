//! Convert resource files to OBJ/MTL (meshes, props, scenes) or text (language tables).
//!
//! Directories are expanded one level to the files they contain with a known
//! extension. Referenced files are looked up next to each input.
//!
//! Run: `cargo run -p ertm --features tools --bin ertm-convert -- <paths...> [--out DIR] [--textures DIR]`

use std::env;
use std::path::PathBuf;

use ertm::{Converter, Output};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let (inputs, converter) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("Usage: ertm-convert <paths...> [--out DIR] [--textures DIR]");
            std::process::exit(2);
        }
    };

    let outcomes = converter.convert_all(&inputs);
    let mut failed = 0usize;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(Output::Model {
                obj,
                chunks,
                vertices,
                skipped,
                missing_textures,
                ..
            }) => {
                println!(
                    "OK      {} -> {} ({chunks} chunks, {vertices} vertices)",
                    outcome.input.display(),
                    obj.display()
                );
                if *skipped > 0 {
                    println!("        {skipped} referenced file(s) skipped");
                }
                if !missing_textures.is_empty() {
                    println!("        missing textures: {}", missing_textures.join(", "));
                }
            }
            Ok(Output::Strings { path, entries }) => {
                println!(
                    "OK      {} -> {} ({entries} entries)",
                    outcome.input.display(),
                    path.display()
                );
            }
            Err(e) => {
                failed += 1;
                println!("FAILED  {}: {e}", outcome.input.display());
            }
        }
    }

    println!(
        "\n{} converted, {failed} failed",
        outcomes.len().saturating_sub(failed)
    );
    if failed > 0 {
        std::process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<(Vec<PathBuf>, Converter), String> {
    let mut inputs = Vec::new();
    let mut converter = Converter::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--out" | "-o" => {
                let dir = iter.next().ok_or("--out needs a directory")?;
                converter = converter.with_out_dir(dir);
            }
            "--textures" | "-t" => {
                let dir = iter.next().ok_or("--textures needs a directory")?;
                converter = converter.with_texture_dir(dir);
            }
            flag if flag.starts_with('-') => return Err(format!("unknown option {flag}")),
            path => inputs.push(PathBuf::from(path)),
        }
    }
    if inputs.is_empty() {
        return Err("no input files given".to_owned());
    }
    Ok((inputs, converter))
}
