//! Health trend chart rendering.
//!
//! Renders a patient's history as a PNG with three stacked panels:
//! blood pressure, glucose, and BMI. When no row carries a BMI value
//! the third panel shows a placeholder instead of a series.

use crate::{Error, Result, TrendPoint};
use plotters::prelude::*;
use std::path::Path;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 1500;

/// Render trend charts for one patient to a PNG file
pub fn render_trends(name: &str, points: &[TrendPoint], output: &Path) -> Result<()> {
    if points.is_empty() {
        return Err(Error::Chart("no data to chart".to_string()));
    }

    let root = BitMapBackend::new(output, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(to_chart_error)?;

    let panels = root.split_evenly((3, 1));

    let bp_series: Vec<(i32, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as i32, f64::from(p.blood_pressure)))
        .collect();
    draw_panel(
        &panels[0],
        &format!("Blood Pressure Trend for {name}"),
        "Blood Pressure",
        points,
        &bp_series,
        &RED,
    )?;

    let glucose_series: Vec<(i32, f64)> = points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as i32, f64::from(p.glucose)))
        .collect();
    draw_panel(
        &panels[1],
        &format!("Glucose Trend for {name}"),
        "Glucose Level",
        points,
        &glucose_series,
        &GREEN,
    )?;

    let bmi_series: Vec<(i32, f64)> = points
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.bmi.map(|bmi| (i as i32, bmi)))
        .collect();
    if bmi_series.is_empty() {
        panels[2]
            .draw(&Text::new(
                "No BMI data available",
                (WIDTH as i32 / 2 - 100, HEIGHT as i32 / 6),
                ("sans-serif", 24),
            ))
            .map_err(to_chart_error)?;
    } else {
        draw_panel(
            &panels[2],
            &format!("BMI Trend for {name}"),
            "BMI",
            points,
            &bmi_series,
            &BLUE,
        )?;
    }

    root.present().map_err(to_chart_error)?;
    tracing::info!("Rendered health trends for {} to {:?}", name, output);
    Ok(())
}

/// Default chart file name for a patient, matching the stored CSV naming
pub fn default_chart_path(root: &Path, name: &str) -> std::path::PathBuf {
    root.join(format!("{name}_health_trends.png"))
}

fn draw_panel(
    area: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    title: &str,
    y_label: &str,
    points: &[TrendPoint],
    series: &[(i32, f64)],
    colour: &RGBColor,
) -> Result<()> {
    let y_min = series.iter().map(|(_, y)| *y).fold(f64::INFINITY, f64::min);
    let y_max = series
        .iter()
        .map(|(_, y)| *y)
        .fold(f64::NEG_INFINITY, f64::max);
    let pad = ((y_max - y_min) * 0.1).max(1.0);

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(0..points.len() as i32, (y_min - pad)..(y_max + pad))
        .map_err(to_chart_error)?;

    chart
        .configure_mesh()
        .x_labels(points.len().min(10))
        .x_label_formatter(&|x| {
            if *x >= 0 && (*x as usize) < points.len() {
                points[*x as usize].date.format("%Y-%m-%d").to_string()
            } else {
                String::new()
            }
        })
        .y_desc(y_label)
        .draw()
        .map_err(to_chart_error)?;

    chart
        .draw_series(LineSeries::new(
            series.iter().copied(),
            colour.stroke_width(2),
        ))
        .map_err(to_chart_error)?;

    chart
        .draw_series(
            series
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 3, colour.filled())),
        )
        .map_err(to_chart_error)?;

    Ok(())
}

fn to_chart_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Chart(e.to_string())
}
