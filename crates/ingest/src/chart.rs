use anyhow::{anyhow, Context, Result};
use election_core::{file_stem, with_extension, ResultSet, TOP_PARTIES};
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue, SegmentedCoord};
use plotters::coord::types::RangedCoordu32;
use plotters::prelude::*;
use plotters::style::{FontStyle, FontTransform};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const CHART_SIZE: (u32, u32) = (1800, 1200);
const FONT_FAMILY: &str = "sans-serif";
const TITLE: &str = "Top 10 Political Parties by Number of Votes";
const Y_DESC: &str = "Total Number of Votes";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_LOADED: OnceLock<bool> = OnceLock::new();

pub fn chart_path(results_dir: &Path, name: &str) -> PathBuf {
    let file = format!("Top_{TOP_PARTIES}_Parties_of_{}", file_stem(name));
    results_dir.join(with_extension(&file, "png"))
}

/// Renders the parties with the most votes across all districts as a bar
/// chart next to the CSV export.
pub fn render_top_parties(
    results: &ResultSet,
    results_dir: &Path,
    name: &str,
    font: Option<&Path>,
) -> Result<PathBuf> {
    let top = results.party_totals().top(TOP_PARTIES);
    if top.is_empty() {
        tracing::warn!("no party votes to plot, writing an empty chart");
    }

    fs::create_dir_all(results_dir)
        .with_context(|| format!("failed to create directory {}", results_dir.display()))?;
    let path = chart_path(results_dir, name);

    let labelled = load_font(font);
    draw_bar_chart(&path, &top, labelled)
        .with_context(|| format!("failed to render chart {}", path.display()))?;

    tracing::info!(path = %path.display(), parties = top.len(), "bar plot successfully created");
    Ok(path)
}

/// Registers a TrueType font for chart text once per process. Returns
/// whether text can be drawn.
fn load_font(configured: Option<&Path>) -> bool {
    *FONT_LOADED.get_or_init(|| {
        let candidates = configured
            .map(Path::to_path_buf)
            .into_iter()
            .chain(FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            if register_font_file(&path) {
                return true;
            }
        }

        tracing::warn!("no usable font found, chart will be drawn without text");
        false
    })
}

fn register_font_file(path: &Path) -> bool {
    let Ok(bytes) = fs::read(path) else {
        return false;
    };
    // plotters keeps registered font data for the life of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => {
            tracing::debug!(font = %path.display(), "registered chart font");
            true
        }
        Err(_) => {
            tracing::warn!(font = %path.display(), error = "invalid font data", "unusable chart font");
            false
        }
    }
}

/// One segment per bar. Segmented integer ranges are inclusive, so the last
/// bar index closes the axis.
fn bar_axis(bars: usize) -> SegmentedCoord<RangedCoordu32> {
    let last = (bars as u32).max(2) - 1;
    (0u32..last).into_segmented()
}

fn draw_bar_chart(path: &Path, top: &[(String, u64)], labelled: bool) -> Result<()> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(draw_error)?;

    let max = top.iter().map(|(_, votes)| *votes).max().unwrap_or(0).max(1);
    let y_top = max + max / 10 + 1;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(40);
    if labelled {
        builder
            .caption(TITLE, (FONT_FAMILY, 44))
            .x_label_area_size(320)
            .y_label_area_size(150);
    }
    let mut chart = builder
        .build_cartesian_2d(bar_axis(top.len()), 0u64..y_top)
        .map_err(draw_error)?;

    if labelled {
        let party_label = |value: &SegmentValue<u32>| match value {
            SegmentValue::CenterOf(idx) => top
                .get(*idx as usize)
                .map(|(party, _)| party.clone())
                .unwrap_or_default(),
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(top.len().max(1))
            .x_label_formatter(&party_label)
            .x_label_style(
                (FONT_FAMILY, 22)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_label_style((FONT_FAMILY, 22))
            .y_desc(Y_DESC)
            .axis_desc_style((FONT_FAMILY, 30))
            .draw()
            .map_err(draw_error)?;
    } else {
        let (width, height) = CHART_SIZE;
        root.draw(&Rectangle::new(
            [(0, 0), (width as i32 - 1, height as i32 - 1)],
            BLACK.stroke_width(2),
        ))
        .map_err(draw_error)?;
    }

    chart
        .draw_series(top.iter().enumerate().map(|(idx, (_, votes))| {
            let idx = idx as u32;
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(idx), 0), (SegmentValue::Exact(idx + 1), *votes)],
                BLUE.mix(0.7).filled(),
            );
            bar.set_margin(0, 0, 14, 14);
            bar
        }))
        .map_err(draw_error)?;

    root.present().map_err(draw_error)?;
    Ok(())
}

fn draw_error(err: impl std::fmt::Display) -> anyhow::Error {
    anyhow!("drawing failed: {err}")
}
