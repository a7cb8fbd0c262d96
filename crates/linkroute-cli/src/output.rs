//! Output formatting for route rendering.
//!
//! This module renders route summaries as styled text, one-line compact
//! paths or JSON.

use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;

use linkroute_lib::{RouteRenderMode, RouteSummary};

use crate::terminal::ColorPalette;

/// Output format shared by the subcommands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Header plus one vertex per line.
    #[default]
    Text,
    /// One line per link with the full drawable path.
    Compact,
    /// Pretty-printed JSON array of route summaries.
    Json,
}

/// Render `summaries` in the requested format.
pub fn render_summaries(
    format: OutputFormat,
    summaries: &[RouteSummary],
    palette: &ColorPalette,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(summaries)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Compact => Ok(summaries
            .iter()
            .map(|summary| summary.render(RouteRenderMode::Compact))
            .collect()),
        OutputFormat::Text => Ok(summaries
            .iter()
            .map(|summary| render_text(summary, palette))
            .collect()),
    }
}

/// Plain-text rendering with the header highlighted; fallback routes are
/// shown in yellow.
fn render_text(summary: &RouteSummary, palette: &ColorPalette) -> String {
    let plain = summary.render(RouteRenderMode::PlainText);
    let (header, vertices) = plain.split_once('\n').unwrap_or((plain.as_str(), ""));
    let color = if summary.fallback {
        palette.yellow
    } else {
        palette.white_bold
    };
    format!("{color}{header}{}\n{vertices}", palette.reset)
}

/// Write `summaries` to stdout.
pub fn print_summaries(format: OutputFormat, summaries: &[RouteSummary]) -> Result<()> {
    let rendered = render_summaries(format, summaries, &ColorPalette::detect())?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkroute_lib::{Point, Route, RouterKind};

    fn summary(fallback: bool) -> RouteSummary {
        let route = Route {
            router: RouterKind::Metro,
            points: vec![Point::new(60.0, 20.0)],
            fallback,
            last_direction: None,
        };
        RouteSummary::from_route(
            Some("l1"),
            &route,
            Point::new(20.0, 20.0),
            Point::new(60.0, 80.0),
        )
    }

    #[test]
    fn text_lists_header_and_vertices() {
        let text = render_summaries(
            OutputFormat::Text,
            &[summary(false)],
            &ColorPalette::plain(),
        )
        .expect("render");
        assert_eq!(
            text,
            "Route l1: (20, 20) -> (60, 80) (1 vertices, 1 bends, length 100.0, router: metro)\n  0: (60, 20)\n"
        );
    }

    #[test]
    fn fallback_is_flagged() {
        let text = render_summaries(
            OutputFormat::Text,
            &[summary(true)],
            &ColorPalette::plain(),
        )
        .expect("render");
        assert!(text.lines().next().unwrap_or_default().ends_with(", fallback)"));
    }

    #[test]
    fn fallback_header_is_yellow() {
        let palette = ColorPalette::colored();
        let text = render_summaries(OutputFormat::Text, &[summary(true)], &palette).expect("render");
        assert!(text.starts_with(palette.yellow));
        assert!(text.contains(&format!("fallback){}\n", palette.reset)));
    }

    #[test]
    fn json_is_an_array_of_summaries() {
        let json = render_summaries(
            OutputFormat::Json,
            &[summary(false)],
            &ColorPalette::plain(),
        )
        .expect("render");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value[0]["link"], "l1");
        assert_eq!(value[0]["router"], "metro");
        assert_eq!(value[0]["points"][0]["x"], 60.0);
    }
}
