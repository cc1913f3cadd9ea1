use crate::config::{Config, load_config};
use crate::ir::SlideContent;
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::render::write_output;
use crate::{generate_with, render_svg_with};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "enslide", version, about = "Renders the Dependencies Dilemma enablement slide")]
pub struct Args {
    /// Output file. Defaults to the configured file name for pptx and to stdout for SVG.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "pptx")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width in inches
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height in inches
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Canvas margin in inches
    #[arg(short = 'm', long = "margin")]
    pub margin: Option<f32>,

    /// Write the computed layout as JSON
    #[arg(long = "dumpLayout")]
    pub dump_layout: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pptx,
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = resolve_config(&args)?;
    let content = SlideContent::default();

    if let Some(path) = &args.dump_layout {
        let layout = compute_layout(&content, &config.canvas, &config.layout)?;
        write_layout_dump(path, &layout)?;
        info!(path = %path.display(), "layout dumped");
    }

    match args.output_format {
        OutputFormat::Pptx => {
            let bytes = generate_with(&config, &content)?;
            let output = args
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&config.render.file_name));
            write_output(&bytes, Some(&output))?;
            info!(path = %output.display(), bytes = bytes.len(), "wrote presentation");
        }
        OutputFormat::Svg => {
            let svg = render_svg_with(&config, &content)?;
            write_output(svg.as_bytes(), args.output.as_deref())?;
        }
        OutputFormat::Png => write_png(&args, &config, &content)?,
    }

    Ok(())
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.canvas.width = width;
    }
    if let Some(height) = args.height {
        config.canvas.height = height;
    }
    if let Some(margin) = args.margin {
        config.canvas.margin = margin;
    }
    Ok(config)
}

#[cfg(feature = "png")]
fn write_png(args: &Args, config: &Config, content: &SlideContent) -> Result<()> {
    let output = args
        .output
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
    let svg = render_svg_with(config, content)?;
    crate::render::write_output_png(&svg, &output, &config.theme.font_family)?;
    info!(path = %output.display(), "wrote preview");
    Ok(())
}

#[cfg(not(feature = "png"))]
fn write_png(_args: &Args, _config: &Config, _content: &SlideContent) -> Result<()> {
    Err(anyhow::anyhow!("png output requires the `png` feature"))
}
