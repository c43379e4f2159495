/*!
 * iotop2stats: iotop Batch Log Time-Series Extractor & Plotter
 * --------------------------------------------------------------------------------
 * Copyright (C) 2025 Laurence Oberman <loberman@redhat.com>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 *
 * ChatGPT (OpenAI) assisted with the design, implementation, and documentation
 * of this tool.
 *
 * --------------------------------------------------------------------------------
 * DESCRIPTION:
 *
 * `iotop2stats` converts the text output of iotop run in batch mode
 * (`iotop -obtkq`) into a per-second bandwidth time series for one command.
 *
 * FEATURES:
 *  - Sums DISK READ / DISK WRITE bandwidth per timestamp block for every
 *    process whose command field contains the requested substring.
 *  - Normalizes the mixed B/s, K/s, M/s, G/s, T/s units iotop emits into
 *    KB/sec before summing.
 *  - Writes a `time,reads,writes` CSV and a two-series PNG line graph named
 *    after the input file, plus an avg/peak summary on stdout.
 *
 * USAGE:
 *    iotop2stats --file <iotop.log> --command <name>
 *    iotop2stats -i <iotop.log> -c <name>
 *
 * AUTHOR:
 *    Laurence Oberman <loberman@redhat.com>
 *    With code, ideas, and documentation support from ChatGPT (OpenAI)
 */

mod analyze;
mod error;
mod parse;

// Increment as tool evolves
const VERSION_NUMBER: &str = "1.0.1";

use std::env;
use std::path::Path;

use error::Result;

/// Prints command-line usage.
fn usage() {
    println!("iotop2stats {}", VERSION_NUMBER);
    eprintln!(
"Usage:
    iotop2stats --file <iotop.log> --command <name>   # Aggregate, CSV + PNG graph
    iotop2stats -i <iotop.log> -c <name>              # Same, short flags
    iotop2stats -h                                    # Show this help/usage

    <iotop.log> is the output of iotop run in batch mode, e.g.:
        iotop -obtkq > iotop.log
    One block per tick, one line per process seen doing I/O.

    <name> selects processes whose command field contains the substring
    (case-sensitive). An empty string (-c \"\") aggregates every process.

    Output: <logstem>.csv and <logstem>.png in the working directory.
"
    );
}

/// Full pipeline for one log: parse, aggregate, export, report, graph.
fn run(file: &str, command: &str) -> Result<()> {
    println!("Parsing iotop log: {} (command filter: \"{}\")", file, command);
    let lines = parse::read_log(Path::new(file))?;
    let series = parse::build_series(&lines, command)?;
    println!("Aggregated {} log lines into {} intervals", lines.len(), series.len());

    let stem = analyze::output_stem(file);
    let csv_path = format!("{}.csv", stem);
    let png_path = format!("{}.png", stem);

    analyze::write_csv(&series, &csv_path)?;
    println!("Wrote {}", csv_path);

    analyze::report_averages(&series);

    analyze::plot_series(&series, &png_path, command)?;
    println!("Wrote {}", png_path);
    Ok(())
}

/// Main program entrypoint and argument parser.
fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
        std::process::exit(1);
    }

    let mut file_arg: Option<String> = None;
    let mut command_arg: Option<String> = None;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                usage();
                return;
            }
            "-i" | "--file" if i + 1 < args.len() => {
                file_arg = Some(args[i + 1].clone());
                i += 2;
            }
            "-c" | "--command" if i + 1 < args.len() => {
                command_arg = Some(args[i + 1].clone());
                i += 2;
            }
            _ => {
                usage();
                std::process::exit(1);
            }
        }
    }

    let (file, command) = match (file_arg, command_arg) {
        (Some(f), Some(c)) => (f, c),
        _ => {
            eprintln!("ERROR: both --file and --command are required");
            usage();
            std::process::exit(1);
        }
    };

    println!("iotop2stats Version {}", VERSION_NUMBER);
    if let Err(e) = run(&file, &command) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
