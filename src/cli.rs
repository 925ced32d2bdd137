use clap::{Parser, ValueEnum};
use img2palette::{ExportFormat, ExtractOptions};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per color: hex, rgb, count, share
    Text,
    /// `{"colors": [...]}` as returned by the extraction API
    Response,
    /// Named entries with rgb/hsl strings and percentages
    Json,
    /// CSS custom properties on `:root`
    Css,
    /// Tailwind `theme.extend.colors` config
    Tailwind,
    /// Proportional swatch strip
    Svg,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ExportFormat::Text,
            OutputFormat::Response => ExportFormat::Response,
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Css => ExportFormat::Css,
            OutputFormat::Tailwind => ExportFormat::Tailwind,
            OutputFormat::Svg => ExportFormat::Svg,
        }
    }
}

#[derive(Parser)]
#[command(name = "img2palette")]
#[command(about = "Extract the dominant color palette of PNG and JPEG images")]
#[command(version)]
pub struct Cli {
    /// Input image files
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Write the palette here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Number of colors in the palette (default: 6)
    #[arg(short = 'n', long, default_value = "6")]
    pub colors: usize,

    /// Downscale images wider than this before sampling (0 disables, default: 200)
    #[arg(long, default_value = "200")]
    pub max_width: u32,

    /// Channel quantization step (1-255, default: 32)
    #[arg(short, long, default_value = "32", value_parser = clap::value_parser!(u8).range(1..))]
    pub step: u8,

    /// Alpha cutoff on a 16-bit scale; more transparent pixels are ignored (default: 32768)
    #[arg(short, long, default_value = "32768")]
    pub threshold: u16,

    /// Reject input files larger than this many bytes (default: 10 MiB)
    #[arg(long, default_value = "10485760")]
    pub max_upload: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl Cli {
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions {
            max_width: self.max_width,
            transparency_threshold: self.threshold,
            quantization_step: self.step,
            palette_size: self.colors,
            max_upload: self.max_upload,
        }
    }

    pub fn export_format(&self) -> ExportFormat {
        self.format.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_library() {
        let cli = Cli::try_parse_from(["img2palette", "photo.jpg"]).unwrap();
        assert_eq!(cli.options(), ExtractOptions::default());
        assert_eq!(cli.export_format(), ExportFormat::Text);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "img2palette", "a.png", "b.png", "-n", "3", "--step", "16", "-f", "css",
        ])
        .unwrap();
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.options().palette_size, 3);
        assert_eq!(cli.options().quantization_step, 16);
        assert_eq!(cli.export_format(), ExportFormat::Css);
    }

    #[test]
    fn test_every_format_maps_to_exporter() {
        for (name, expected) in [
            ("text", ExportFormat::Text),
            ("response", ExportFormat::Response),
            ("json", ExportFormat::Json),
            ("css", ExportFormat::Css),
            ("tailwind", ExportFormat::Tailwind),
            ("svg", ExportFormat::Svg),
        ] {
            let cli = Cli::try_parse_from(["img2palette", "a.png", "--format", name]).unwrap();
            assert_eq!(cli.export_format(), expected);
        }
    }

    #[test]
    fn test_zero_step_is_refused() {
        assert!(Cli::try_parse_from(["img2palette", "a.png", "--step", "0"]).is_err());
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["img2palette"]).is_err());
    }
}
