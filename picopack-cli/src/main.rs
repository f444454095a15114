//! PicoPack CLI - tiny-codec compression tool
//!
//! A thin adapter over the `picopack-codecs` crate: compress or decompress
//! single files with one of the four codecs, inspect a stream's declared
//! size, or round-trip a set of files through every codec to compare
//! ratios.
//!
//! PicoPack streams carry no codec identifier (the formats are built for
//! decoders that already know what they are reading), so `decompress`
//! needs the same `--method` that produced the stream.

use clap::{Parser, Subcommand, ValueEnum};
use indicatif::ProgressBar;
use picopack_codecs::{Method, decoded_len};
use picopack_core::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// File extension for compressed output.
const EXTENSION: &str = "ppk";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    /// Canonical Huffman.
    Huffman,
    /// Static arithmetic coding.
    Arith,
    /// LZ77 back-references.
    Lz77,
    /// LZ77 sub-streams under per-stream sub-codecs.
    Lzcl,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Huffman => Method::Huffman,
            MethodArg::Arith => Method::Arithmetic,
            MethodArg::Lz77 => Method::Lz77,
            MethodArg::Lzcl => Method::Lzcl,
        }
    }
}

#[derive(Parser)]
#[command(name = "picopack")]
#[command(version, about = "Tiny-codec compression for constrained targets")]
#[command(long_about = "
PicoPack compresses with one of four codecs sharing a self-describing
bit-stream format: huffman, arith, lz77 and lzcl.

Examples:
  picopack compress firmware.bin
  picopack compress -m lz77 logo.raw -o logo.lz
  picopack decompress -m lzcl firmware.bin.ppk
  picopack info firmware.bin.ppk
  picopack verify assets/*.bin
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file
    #[command(alias = "c")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output path (default: input path + .ppk)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Codec to use
        #[arg(short, long, value_enum, default_value = "lzcl")]
        method: MethodArg,
    },

    /// Decompress a file
    #[command(alias = "x")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output path (default: input path without .ppk)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Codec the stream was compressed with
        #[arg(short, long, value_enum)]
        method: MethodArg,
    },

    /// Print the decompressed size a stream declares
    Info {
        /// Compressed file
        input: PathBuf,
    },

    /// Round-trip files through every codec and report ratios
    #[command(alias = "t")]
    Verify {
        /// Files to test
        files: Vec<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("picopack: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    match Cli::parse().command {
        Commands::Compress {
            input,
            output,
            method,
        } => compress(&input, output, method.into()),
        Commands::Decompress {
            input,
            output,
            method,
        } => decompress(&input, output, method.into()),
        Commands::Info { input } => info(&input),
        Commands::Verify { files } => verify(&files),
    }
}

fn compress(input: &Path, output: Option<PathBuf>, method: Method) -> Result<()> {
    let data = fs::read(input)?;
    let packed = method.compress(&data)?;
    let output = output.unwrap_or_else(|| {
        let mut path = input.to_path_buf();
        path.as_mut_os_string().push(".");
        path.as_mut_os_string().push(EXTENSION);
        path
    });
    fs::write(&output, &packed)?;
    println!(
        "{} -> {} ({} -> {} bytes, {:.1}%, {method})",
        input.display(),
        output.display(),
        data.len(),
        packed.len(),
        ratio_percent(packed.len(), data.len()),
    );
    Ok(())
}

fn decompress(input: &Path, output: Option<PathBuf>, method: Method) -> Result<()> {
    let packed = fs::read(input)?;
    let length = decoded_len(&packed)? as usize;
    let data = method.decompress(&packed, length)?;
    let output = output.unwrap_or_else(|| default_decompressed_path(input));
    fs::write(&output, &data)?;
    println!(
        "{} -> {} ({} bytes, {method})",
        input.display(),
        output.display(),
        data.len(),
    );
    Ok(())
}

/// Strip the `.ppk` extension, or append `.out` when it is absent.
fn default_decompressed_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext == EXTENSION) {
        input.with_extension("")
    } else {
        let mut path = input.to_path_buf();
        path.as_mut_os_string().push(".out");
        path
    }
}

fn info(input: &Path) -> Result<()> {
    let packed = fs::read(input)?;
    println!(
        "{}: {} compressed bytes, {} decompressed",
        input.display(),
        packed.len(),
        decoded_len(&packed)?
    );
    Ok(())
}

fn verify(files: &[PathBuf]) -> Result<()> {
    println!(
        "{:<28} {:>10} {:>10} {:>7}  {}",
        "File", "Size", "Packed", "Ratio", "Codec"
    );
    let bar = ProgressBar::new((files.len() * Method::ALL.len()) as u64);
    let mut failures = 0usize;

    for file in files {
        let data = fs::read(file)?;
        for method in Method::ALL {
            bar.inc(1);
            let packed = method.compress(&data)?;
            let restored = method.decompress(&packed, data.len())?;
            let status = if restored == data { "" } else { "  MISMATCH" };
            if !status.is_empty() {
                failures += 1;
            }
            bar.suspend(|| {
                println!(
                    "{:<28} {:>10} {:>10} {:>6.1}%  {method}{status}",
                    file.display(),
                    data.len(),
                    packed.len(),
                    ratio_percent(packed.len(), data.len()),
                );
            });
        }
    }
    bar.finish_and_clear();

    if failures > 0 {
        return Err(picopack_core::PicoPackError::invalid_header(format!(
            "{failures} round-trip failure(s)"
        )));
    }
    println!("All round-trips passed.");
    Ok(())
}

fn ratio_percent(packed: usize, original: usize) -> f64 {
    if original == 0 {
        100.0
    } else {
        packed as f64 * 100.0 / original as f64
    }
}
