use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};

use tiffgrayscaler::image_pipeline::{
    ConversionConfig, ResampleFilter, TiffCompression, TiffGrayscalePipeline,
};
use tiffgrayscaler::logger::{self, error, info};

/// Converts multi-page TIFF files to indexed grayscale at a fixed resolution.
#[derive(Parser, Debug)]
#[command(name = "tiffgrayscaler", version, about)]
struct Cli {
    /// Number of gray levels in the output palette (1-16)
    #[arg(value_parser = clap::value_parser!(u8).range(1..=16))]
    levels: u8,

    /// Multi-page TIFF to read
    infile: PathBuf,

    /// TIFF to write; replaced only when the conversion succeeds
    outfile: PathBuf,

    /// Horizontal resolution every page is scaled to
    #[arg(long, default_value_t = 150, value_parser = clap::value_parser!(u32).range(1..))]
    target_dpi: u32,

    /// Resampling filter used for pages at another resolution
    #[arg(long, value_enum, default_value_t = FilterArg::Nearest)]
    filter: FilterArg,

    /// Deflate compression level
    #[arg(long, value_enum, default_value_t = CompressionArg::Balanced)]
    compression: CompressionArg,

    /// Log per-page details
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FilterArg {
    Nearest,
    Triangle,
    CatmullRom,
    Lanczos3,
}

impl From<FilterArg> for ResampleFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::Nearest => ResampleFilter::Nearest,
            FilterArg::Triangle => ResampleFilter::Triangle,
            FilterArg::CatmullRom => ResampleFilter::CatmullRom,
            FilterArg::Lanczos3 => ResampleFilter::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompressionArg {
    Fast,
    Balanced,
    Best,
}

impl From<CompressionArg> for TiffCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::Fast => TiffCompression::DeflateFast,
            CompressionArg::Balanced => TiffCompression::DeflateBalanced,
            CompressionArg::Best => TiffCompression::DeflateBest,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(if cli.verbose { "debug" } else { "info" });

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Conversion failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = ConversionConfig::builder()
        .gray_levels(cli.levels)
        .target_dpi(cli.target_dpi)
        .resample_filter(cli.filter.into())
        .compression(cli.compression.into())
        .build();
    let pipeline = TiffGrayscalePipeline::new(config)?;

    info!("TIFF grayscale pipeline initialized");
    info!("Gray levels: {}", pipeline.palette().len());
    info!("Target resolution: {} dpi", pipeline.config().target_dpi);
    info!("Compression: {:?}", pipeline.config().compression);

    let report = pipeline
        .convert_file(&cli.infile, &cli.outfile)
        .with_context(|| {
            format!(
                "converting {} to {}",
                cli.infile.display(),
                cli.outfile.display()
            )
        })?;

    info!(
        "Conversion successful: {} page(s) written to {}",
        report.page_count(),
        cli.outfile.display()
    );
    Ok(())
}
