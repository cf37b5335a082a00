use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

use super::{
    chart::{group_thousands, TeamChart},
    ChartStyle,
};

const SEGMENT_OPACITY: f64 = 0.9;
const LEGEND_SHARE: f64 = 0.3;
const LEGEND_ROW_HEIGHT: i32 = 18;


/// Draws the stacked team chart with the legend on the right.
pub(super) fn draw_team_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    chart: &TeamChart,
    style: &ChartStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;
    let (width, _) = root.dim_in_pixel();
    let (plot_area, legend_area) = root.split_horizontally((width as f64 * (1.0 - LEGEND_SHARE)) as i32);

    let font = FontFamily::Name(&style.font);
    let teams = chart.bars.len().max(1);
    let y_max = (chart.max_total() * 1.1).max(1.0);

    let mut plot = ChartBuilder::on(&plot_area)
        .caption(&style.title, FontDesc::new(font, 28.0, FontStyle::Bold))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d((0..teams).into_segmented(), 0.0..y_max)?;

    let team_label = |x: &SegmentValue<usize>| match x {
        SegmentValue::CenterOf(i) => chart.bars.get(*i).map(|bar| bar.team.clone()).unwrap_or_default(),
        _ => String::new(),
    };
    let points_label = |y: &f64| group_thousands(y.max(0.0) as u64);
    plot.configure_mesh()
        .disable_x_mesh()
        .light_line_style(TRANSPARENT)
        .bold_line_style(BLACK.mix(0.1))
        .x_labels(teams)
        .x_label_formatter(&team_label)
        .y_label_formatter(&points_label)
        .y_desc(&style.y_label)
        .label_style(FontDesc::new(font, 14.0, FontStyle::Normal))
        .axis_desc_style(FontDesc::new(font, 16.0, FontStyle::Normal))
        .draw()?;

    for (i, bar) in chart.bars.iter().enumerate() {
        let mut bottom = 0.0;
        for segment in &bar.segments {
            let top = bottom + segment.points;
            let mut rect = Rectangle::new(
                [(SegmentValue::Exact(i), bottom), (SegmentValue::Exact(i + 1), top)],
                segment.color.to_plotters().mix(SEGMENT_OPACITY).filled(),
            );
            rect.set_margin(0, 0, 10, 10);
            plot.draw_series(std::iter::once(rect))?;
            bottom = top;
        }

        let total_label = FontDesc::new(font, 14.0, FontStyle::Bold)
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        plot.draw_series(std::iter::once(Text::new(
            group_thousands(bar.total.max(0.0) as u64),
            (SegmentValue::CenterOf(i), bar.total * 1.02),
            total_label,
        )))?;
    }

    draw_legend(&legend_area, chart, style)?;
    root.present()
}


fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    chart: &TeamChart,
    style: &ChartStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let font = FontFamily::Name(&style.font);
    let (_, height) = area.dim_in_pixel();
    let entries = chart.legend().count() as i32;
    // vertically centered, title row included
    let top = ((height as i32 - (entries + 1) * LEGEND_ROW_HEIGHT) / 2).max(10);

    area.draw(&Text::new(
        style.legend_title.clone(),
        (10, top),
        FontDesc::new(font, 14.0, FontStyle::Bold).color(&BLACK),
    ))?;
    for (row, segment) in chart.legend().enumerate() {
        let y = top + (row as i32 + 1) * LEGEND_ROW_HEIGHT;
        area.draw(&Rectangle::new(
            [(10, y + 2), (24, y + 14)],
            segment.color.to_plotters().mix(SEGMENT_OPACITY).filled(),
        ))?;
        area.draw(&Text::new(
            segment.label(),
            (30, y + 2),
            FontDesc::new(font, 12.0, FontStyle::Normal).color(&BLACK),
        ))?;
    }
    Ok(())
}
