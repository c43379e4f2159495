/*!
 * iotop2stats: Series Export & Graphing
 * -------------------------------------------------------------------
 * Copyright (C) 2025 Laurence Oberman <loberman@redhat.com>
 * License: GPL v3+
 */

//! # analyze.rs
//!
//! Takes the aggregated bandwidth series and produces the output artifacts:
//! a `time,reads,writes` CSV, an avg/peak summary on stdout, and a 900x300
//! PNG line graph with the read and write series.

use std::fs::File;
use std::path::Path;

use plotters::prelude::*;

use crate::error::{Result, StatsError};
use crate::parse::SeriesRecord;

/// Output files are named after the input log: `run3.log` -> `run3`.
pub fn output_stem(file: &str) -> String {
    Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("iotop")
        .to_string()
}

/// Writes the series as `time,reads,writes` rows, raw KB/sec magnitudes.
pub fn write_csv(series: &[SeriesRecord], csv_path: &str) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(File::create(csv_path)?);
    wtr.write_record(["time", "reads", "writes"])?;
    for record in series {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Arithmetic mean of the read and write totals, None for an empty series
/// (averaging an empty series would divide by zero).
pub fn series_averages(series: &[SeriesRecord]) -> Option<(f64, f64)> {
    if series.is_empty() {
        return None;
    }
    let n = series.len() as f64;
    let avg_rd = series.iter().map(|r| r.reads_kb).sum::<f64>() / n;
    let avg_wr = series.iter().map(|r| r.writes_kb).sum::<f64>() / n;
    Some((avg_rd, avg_wr))
}

/// Prints interval count plus avg/peak bandwidth for both directions.
pub fn report_averages(series: &[SeriesRecord]) {
    let Some((avg_rd, avg_wr)) = series_averages(series) else {
        return;
    };
    let peak_rd = series.iter().map(|r| r.reads_kb).fold(0.0, f64::max);
    let peak_wr = series.iter().map(|r| r.writes_kb).fold(0.0, f64::max);
    println!("Intervals: {}", series.len());
    println!("Reads:  avg {:>10.2} KB/s   peak {:>10.2} KB/s", avg_rd, peak_rd);
    println!("Writes: avg {:>10.2} KB/s   peak {:>10.2} KB/s", avg_wr, peak_wr);
}

/// Renders the two-series line graph to a PNG file.
pub fn plot_series(series: &[SeriesRecord], png_path: &str, command: &str) -> Result<()> {
    render_chart(series, png_path, command).map_err(|e| StatsError::Chart(e.to_string()))
}

fn render_chart(
    series: &[SeriesRecord],
    png_path: &str,
    command: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let x_min = series.iter().map(|r| r.seconds).min().unwrap_or(0).min(0);
    let x_max = series.iter().map(|r| r.seconds).max().unwrap_or(0).max(1);
    let y_max = series
        .iter()
        .map(|r| r.reads_kb.max(r.writes_kb))
        .fold(f64::NEG_INFINITY, f64::max)
        .max(1.0);
    let caption = if command.is_empty() {
        "Disk I/O - all processes".to_string()
    } else {
        format!("Disk I/O - {}", command)
    };

    let root = BitMapBackend::new(png_path, (900, 300)).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .x_desc("Elapsed (sec)")
        .y_desc("KB/s")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            series.iter().map(|r| (r.seconds, r.reads_kb)),
            &RED,
        ))?
        .label("reads")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], &RED));
    chart.draw_series(
        series
            .iter()
            .map(|r| Circle::new((r.seconds, r.reads_kb), 3, RED.filled())),
    )?;

    chart
        .draw_series(LineSeries::new(
            series.iter().map(|r| (r.seconds, r.writes_kb)),
            &BLUE,
        ))?
        .label("writes")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 25, y)], &BLUE));
    chart.draw_series(
        series
            .iter()
            .map(|r| Circle::new((r.seconds, r.writes_kb), 3, BLUE.filled())),
    )?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(seconds: i64, reads_kb: f64, writes_kb: f64) -> SeriesRecord {
        SeriesRecord {
            seconds,
            reads_kb,
            writes_kb,
        }
    }

    #[test]
    fn test_output_stem_strips_dir_and_extension() {
        assert_eq!(output_stem("logs/run3.log"), "run3");
        assert_eq!(output_stem("iotop.log"), "iotop");
        assert_eq!(output_stem("plain"), "plain");
    }

    #[test]
    fn test_write_csv_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let series = vec![record(0, 20.0, 0.0), record(1, 20.0, 2.5)];

        write_csv(&series, path.to_str().unwrap()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "time,reads,writes\n0,20.0,0.0\n1,20.0,2.5\n");
    }

    #[test]
    fn test_write_csv_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        let series = vec![record(0, 1.25, 0.0), record(5, 0.0, 7.0)];

        write_csv(&series, a.to_str().unwrap()).unwrap();
        write_csv(&series, b.to_str().unwrap()).unwrap();

        let first = std::fs::read(&a).unwrap();
        let second = std::fs::read(&b).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_series_averages() {
        let series = vec![record(0, 10.0, 2.0), record(1, 30.0, 4.0)];
        let (avg_rd, avg_wr) = series_averages(&series).unwrap();
        assert_eq!(avg_rd, 20.0);
        assert_eq!(avg_wr, 3.0);
    }

    #[test]
    fn test_series_averages_empty_is_none() {
        assert!(series_averages(&[]).is_none());
    }
}
