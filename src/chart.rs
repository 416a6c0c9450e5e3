use crate::models::{Macro, MacroEntry, TARGET_BAND};
use chrono::NaiveDate;
use plotters::coord::Shift;
use plotters::prelude::*;

const CHART_SIZE: (u32, u32) = (900, 420);
const VIOLET: RGBColor = RGBColor(238, 130, 238);
const GUIDE_GREY: RGBColor = RGBColor(128, 128, 128);

pub type ChartResult<T> = Result<T, DrawingAreaErrorKind<std::io::Error>>;

pub const TREND_TITLE: &str = "Macronutrient Intake (g) Over Time";

pub fn weekly_title(week_label: &str) -> String {
    format!("Macro Trends: Week of {week_label}")
}

/// Draws the three macro series plus the target guides as an SVG document.
pub fn render_macro_chart(title: &str, entries: &[MacroEntry]) -> ChartResult<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        root.fill(&WHITE)?;
        if entries.is_empty() {
            draw_placeholder(&root, title)?;
        } else {
            draw_series_chart(&root, title, entries)?;
        }
        root.present()?;
    }
    Ok(svg)
}

fn draw_placeholder(root: &DrawingArea<SVGBackend<'_>, Shift>, title: &str) -> ChartResult<()> {
    let body = root.titled(title, ("sans-serif", 22).into_font())?;
    let (width, height) = body.dim_in_pixel();
    body.draw(&Text::new(
        "No data yet",
        (width as i32 / 2 - 45, height as i32 / 2),
        ("sans-serif", 18).into_font().color(&GUIDE_GREY),
    ))?;
    Ok(())
}

fn draw_series_chart(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    title: &str,
    entries: &[MacroEntry],
) -> ChartResult<()> {
    let (start, end) = date_span(entries);
    let y_max = y_ceiling(entries);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 22).into_font())
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(RangedDate::from(start..end), 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Grams")
        .x_labels(8)
        .x_label_formatter(&|date: &NaiveDate| date.format("%b %d").to_string())
        .draw()?;

    for kind in Macro::ALL {
        let color = series_color(kind);
        let points: Vec<(NaiveDate, f64)> = entries
            .iter()
            .map(|entry| (entry.date, f64::from(entry.value(kind))))
            .collect();

        chart
            .draw_series(LineSeries::new(points.clone(), color.stroke_width(2)))?
            .label(kind.label())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        chart.draw_series(
            points
                .into_iter()
                .map(|point| Circle::new(point, 4, color.filled())),
        )?;
    }

    for guide in [*TARGET_BAND.start(), *TARGET_BAND.end()] {
        let level = f64::from(guide);
        chart
            .draw_series(LineSeries::new(
                vec![(start, level), (end, level)],
                GUIDE_GREY.stroke_width(1),
            ))?
            .label(format!("{guide}g Guide"))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GUIDE_GREY));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

fn series_color(kind: Macro) -> RGBColor {
    match kind {
        Macro::Protein => VIOLET,
        Macro::Carbs => BLUE,
        Macro::Fat => RED,
    }
}

// A lone day gets a day of padding each side so the axis has width.
fn date_span(entries: &[MacroEntry]) -> (NaiveDate, NaiveDate) {
    let first = entries.iter().map(|entry| entry.date).min();
    let last = entries.iter().map(|entry| entry.date).max();
    match (first, last) {
        (Some(first), Some(last)) if first < last => (first, last),
        (Some(day), _) | (_, Some(day)) => (
            day.pred_opt().unwrap_or(day),
            day.succ_opt().unwrap_or(day),
        ),
        (None, None) => {
            let epoch = NaiveDate::default();
            (epoch, epoch.succ_opt().unwrap_or(epoch))
        }
    }
}

fn y_ceiling(entries: &[MacroEntry]) -> f64 {
    let peak = entries
        .iter()
        .flat_map(|entry| Macro::ALL.map(|kind| entry.value(kind)))
        .max()
        .unwrap_or(0)
        .max(*TARGET_BAND.end());
    let peak = f64::from(peak);
    peak + (peak / 10.0).floor()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(day: u32, protein: u32, carbs: u32, fat: u32) -> MacroEntry {
        MacroEntry {
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            protein,
            carbs,
            fat,
        }
    }

    #[test]
    fn renders_full_history_with_legend() {
        let entries = vec![entry(2, 100, 200, 50), entry(3, 150, 260, 70), entry(4, 140, 0, 80)];

        let svg = render_macro_chart(TREND_TITLE, &entries).unwrap();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Protein"));
        assert!(svg.contains("Carbs"));
        assert!(svg.contains("Fat"));
        assert!(svg.contains("125g Guide"));
        assert!(svg.contains("250g Guide"));
    }

    #[test]
    fn renders_single_point_without_failing() {
        let svg = render_macro_chart(&weekly_title("Mar 02, 2026"), &[entry(2, 10, 20, 30)]).unwrap();

        assert!(svg.contains("<circle"));
    }

    #[test]
    fn renders_placeholder_for_empty_series() {
        let svg = render_macro_chart(TREND_TITLE, &[]).unwrap();

        assert!(svg.contains("No data yet"));
    }

    #[test]
    fn y_axis_always_shows_upper_guide() {
        assert_eq!(y_ceiling(&[entry(2, 10, 20, 30)]), 275.0);
        assert_eq!(y_ceiling(&[entry(2, 10, 400, 30)]), 440.0);
    }

    #[test]
    fn oversized_logged_values_still_render() {
        let entries = [entry(2, 4_000_000_000, 0, 0), entry(3, u32::MAX, 1, 1)];

        assert_eq!(y_ceiling(&entries), f64::from(u32::MAX) + 429_496_729.0);
        let svg = render_macro_chart(TREND_TITLE, &entries).unwrap();
        assert!(svg.contains("<svg"));
    }
}
