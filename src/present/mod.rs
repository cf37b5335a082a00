use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder};
use plotters::prelude::{BitMapBackend, IntoDrawingArea, SVGBackend};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

pub(crate) mod chart;
pub(crate) mod compare;
mod plot;
mod scorecard;
mod table;

pub(crate) use chart::{build_team_chart, TeamChart};
pub(crate) use compare::{head_to_head, Comparison};

const TEAM_CHART_STEM: &str = "team_points";
const COMPARISON_STEM: &str = "comparison";


#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct ChartStyle {
    #[validate(range(min = 320, max = 8000))]
    pub(crate) width: u32,
    #[validate(range(min = 240, max = 8000))]
    pub(crate) height: u32,
    pub(crate) title: String,
    pub(crate) y_label: String,
    pub(crate) legend_title: String,
    /// Needs CJK glyphs for the default labels
    pub(crate) font: String,
}


impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 900,
            title: "チームポイント".into(),
            y_label: "ポイント".into(),
            legend_title: "メンバー (ポイント)".into(),
            font: "sans-serif".into(),
        }
    }
}


#[derive(Debug, Error)]
pub(crate) enum RenderError {
    #[error("failed to draw chart: {0}")]
    Draw(String),
    #[error("failed to encode png: {0}")]
    Png(#[from] image::ImageError),
}


/// A rendered file, not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Artifact {
    pub(crate) file_name: String,
    pub(crate) contents: Vec<u8>,
}


impl Artifact {
    fn new(stem: &str, extension: &str, contents: impl Into<Vec<u8>>) -> Self {
        Self { file_name: format!("{stem}.{extension}"), contents: contents.into() }
    }
}


pub(crate) trait Renderer {
    fn render_team_chart(&self, chart: &TeamChart) -> Result<Artifact, RenderError>;
    fn render_comparison(&self, comparison: &Comparison) -> Result<Artifact, RenderError>;
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    Svg,
    Png,
    Table,
}


impl OutputFormat {
    pub(crate) fn renderer(self, style: &ChartStyle) -> Box<dyn Renderer> {
        match self {
            Self::Svg => Box::new(SvgRenderer { style: style.clone() }),
            Self::Png => Box::new(PngRenderer { style: style.clone() }),
            Self::Table => Box::new(TableRenderer),
        }
    }
}


struct SvgRenderer {
    style: ChartStyle,
}


impl Renderer for SvgRenderer {
    fn render_team_chart(&self, chart: &TeamChart) -> Result<Artifact, RenderError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.style.width, self.style.height)).into_drawing_area();
            plot::draw_team_chart(root, chart, &self.style).map_err(|e| RenderError::Draw(e.to_string()))?;
        }
        Ok(Artifact::new(TEAM_CHART_STEM, "svg", svg))
    }

    fn render_comparison(&self, comparison: &Comparison) -> Result<Artifact, RenderError> {
        Ok(Artifact::new(COMPARISON_STEM, "svg", scorecard::comparison_svg(comparison)))
    }
}


struct PngRenderer {
    style: ChartStyle,
}


impl Renderer for PngRenderer {
    fn render_team_chart(&self, chart: &TeamChart) -> Result<Artifact, RenderError> {
        let (width, height) = (self.style.width, self.style.height);
        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
            plot::draw_team_chart(root, chart, &self.style).map_err(|e| RenderError::Draw(e.to_string()))?;
        }

        let mut png = Vec::new();
        PngEncoder::new(&mut png).write_image(&pixels, width, height, ExtendedColorType::Rgb8)?;
        Ok(Artifact::new(TEAM_CHART_STEM, "png", png))
    }

    /// The scorecard has no raster layout of its own.
    fn render_comparison(&self, comparison: &Comparison) -> Result<Artifact, RenderError> {
        Ok(Artifact::new(COMPARISON_STEM, "svg", scorecard::comparison_svg(comparison)))
    }
}


struct TableRenderer;


impl Renderer for TableRenderer {
    fn render_team_chart(&self, chart: &TeamChart) -> Result<Artifact, RenderError> {
        Ok(Artifact::new(TEAM_CHART_STEM, "txt", table::standings_table(chart)))
    }

    fn render_comparison(&self, comparison: &Comparison) -> Result<Artifact, RenderError> {
        Ok(Artifact::new(COMPARISON_STEM, "txt", table::comparison_table(comparison)))
    }
}
