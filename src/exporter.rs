use crate::error::Result;
use crate::palette::{Palette, Rgb};
use serde::Serialize;
use std::fmt::Write;

const SWATCH_WIDTH: u32 = 600;
const SWATCH_HEIGHT: u32 = 100;

/// Output formats a palette can be rendered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
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

#[derive(Debug, Serialize)]
struct ExportEntry {
    name: String,
    hex: String,
    rgb: String,
    hsl: String,
    percentage: u32,
}

/// Render `palette` in the requested format.
pub fn export(palette: &Palette, format: ExportFormat) -> Result<String> {
    let out = match format {
        ExportFormat::Text => to_text(palette),
        ExportFormat::Response => serde_json::to_string_pretty(palette)?,
        ExportFormat::Json => to_json(palette)?,
        ExportFormat::Css => to_css(palette),
        ExportFormat::Tailwind => to_tailwind(palette),
        ExportFormat::Svg => to_svg(palette),
    };
    Ok(out)
}

/// Convert to `(hue degrees, saturation %, lightness %)`, each rounded.
pub fn rgb_to_hsl(rgb: Rgb) -> (u32, u32, u32) {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    let (mut h, mut s) = (0.0, 0.0);

    if max != min {
        let d = max - min;
        s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        h = if max == r {
            ((g - b) / d + if g < b { 6.0 } else { 0.0 }) / 6.0
        } else if max == g {
            ((b - r) / d + 2.0) / 6.0
        } else {
            ((r - g) / d + 4.0) / 6.0
        };
    }

    (
        (h * 360.0).round() as u32,
        (s * 100.0).round() as u32,
        (l * 100.0).round() as u32,
    )
}

pub fn to_text(palette: &Palette) -> String {
    let mut out = String::new();
    for color in palette {
        let _ = writeln!(
            out,
            "{}  rgb({:>3}, {:>3}, {:>3})  {:>8}  {:>5.1}%",
            color.hex,
            color.rgb.r,
            color.rgb.g,
            color.rgb.b,
            color.count,
            palette.percentage(color)
        );
    }
    out
}

pub fn to_css(palette: &Palette) -> String {
    let mut out = String::from(":root {\n");
    for (i, color) in palette.iter().enumerate() {
        let _ = writeln!(out, "  --color-{}: {};", i + 1, color.hex);
    }
    out.push('}');
    out
}

pub fn to_json(palette: &Palette) -> Result<String> {
    let entries: Vec<ExportEntry> = palette
        .iter()
        .enumerate()
        .map(|(i, color)| {
            let (h, s, l) = rgb_to_hsl(color.rgb);
            ExportEntry {
                name: format!("color-{}", i + 1),
                hex: color.hex.clone(),
                rgb: format!("rgb({}, {}, {})", color.rgb.r, color.rgb.g, color.rgb.b),
                hsl: format!("hsl({}, {}%, {}%)", h, s, l),
                percentage: palette.percentage(color).round() as u32,
            }
        })
        .collect();

    Ok(serde_json::to_string_pretty(&entries)?)
}

pub fn to_tailwind(palette: &Palette) -> String {
    let mut out = String::from("module.exports = {\n  theme: {\n    extend: {\n      colors: {\n");
    for (i, color) in palette.iter().enumerate() {
        let _ = writeln!(out, "        'palette-{}': '{}',", i + 1, color.hex);
    }
    out.push_str("      },\n    },\n  },\n}");
    out
}

/// Swatch strip where each color's width is proportional to its count.
pub fn to_svg(palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"#,
        SWATCH_WIDTH, SWATCH_HEIGHT, SWATCH_WIDTH, SWATCH_HEIGHT
    );

    let total = palette.total_count();
    if total > 0 {
        // Edges are placed on cumulative counts so the strip always fills the full width
        let mut seen = 0u64;
        let mut x = 0u32;
        for color in palette {
            seen += color.count;
            let next = ((seen * SWATCH_WIDTH as u64 + total / 2) / total) as u32;
            if next > x {
                let _ = writeln!(
                    out,
                    r#"  <rect x="{}" y="0" width="{}" height="{}" fill="{}"/>"#,
                    x,
                    next - x,
                    SWATCH_HEIGHT,
                    color.hex
                );
            }
            x = next;
        }
    }

    out.push_str("</svg>\n");
    out
}
