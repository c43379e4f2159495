/*!
 * iotop2stats: Log Parsing & Time-Bucket Aggregation
 * -------------------------------------------------------------------
 * Copyright (C) 2025 Laurence Oberman <loberman@redhat.com>
 * License: GPL v3+
 */

//! # parse.rs
//!
//! Reads an iotop batch log and folds it into a per-timestamp bandwidth
//! series:
//!
//! - Classifies each line as blank, the TIME column header, a
//!   Total/Current DISK summary line, or a per-process sample.
//! - Normalizes sample bandwidth into KB/sec.
//! - Sums read/write bandwidth per timestamp block for samples whose
//!   command field contains the caller's filter substring.
//!
//! Lines that are none of the known shapes fail the whole run rather than
//! being skipped, so a truncated or mangled log cannot silently
//! under-count.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{NaiveTime, Timelike};

use crate::error::{Result, StatsError};

// Column layout of one `iotop -obtkq` sample line:
//   TIME TID PRIO USER DISK_READ/s <unit> DISK_WRITE/s <unit> SWAPIN % IO % COMMAND
const IDX_READ_VALUE: usize = 4;
const IDX_READ_UNIT: usize = 5;
const IDX_WRITE_VALUE: usize = 6;
const IDX_WRITE_UNIT: usize = 7;
const IDX_COMMAND: usize = 12;
// A sample line must at least reach the command field.
const MIN_SAMPLE_FIELDS: usize = 13;

/// One per-process sample row from the log.
#[derive(Debug, Clone)]
pub struct ProcessSample {
    pub time: String,
    pub read_value: f64,
    pub read_unit: String,
    pub write_value: f64,
    pub write_unit: String,
    pub command: String,
}

/// Classification of one raw log line.
#[derive(Debug, Clone)]
pub enum LogLine {
    Blank,
    ColumnHeader,
    Summary,
    Sample(ProcessSample),
}

/// One finalized output row: seconds relative to the first sample, plus the
/// summed bandwidth for that timestamp block.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SeriesRecord {
    pub seconds: i64,
    pub reads_kb: f64,
    pub writes_kb: f64,
}

/// Reads the whole log into ordered lines. No parsing here.
pub fn read_log(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|source| StatsError::LogRead {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.map_err(|source| StatsError::LogRead {
            path: path.to_path_buf(),
            source,
        })?);
    }
    Ok(lines)
}

/// Classifies one raw line against the iotop batch column layout.
/// `line_no` is 1-based and only used for error reporting.
pub fn classify_line(line: &str, line_no: usize) -> Result<LogLine> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(LogLine::Blank);
    }
    if fields[0] == "TIME" {
        return Ok(LogLine::ColumnHeader);
    }
    // "10:00:01 Total DISK READ: ..." / "10:00:01 Current DISK READ: ..."
    // cover all processes at once and are not per-process data.
    if fields.len() > 3 {
        let label = [fields[1], fields[2], fields[3]].concat();
        if label == "TotalDISKREAD:" || label == "CurrentDISKREAD:" {
            return Ok(LogLine::Summary);
        }
    }
    if fields.len() < MIN_SAMPLE_FIELDS {
        return Err(StatsError::Malformed {
            line: line_no,
            reason: format!(
                "expected at least {} fields, found {}",
                MIN_SAMPLE_FIELDS,
                fields.len()
            ),
        });
    }
    Ok(LogLine::Sample(ProcessSample {
        time: fields[0].to_string(),
        read_value: parse_value(fields[IDX_READ_VALUE], line_no)?,
        read_unit: fields[IDX_READ_UNIT].to_string(),
        write_value: parse_value(fields[IDX_WRITE_VALUE], line_no)?,
        write_unit: fields[IDX_WRITE_UNIT].to_string(),
        command: fields[IDX_COMMAND].to_string(),
    }))
}

fn parse_value(raw: &str, line_no: usize) -> Result<f64> {
    raw.parse::<f64>().map_err(|_| StatsError::Malformed {
        line: line_no,
        reason: format!("throughput value \"{}\" is not numeric", raw),
    })
}

/// Converts a bandwidth value with an iotop unit suffix into KB/sec.
/// Any suffix outside the five iotop emits is an error, never a zero.
pub fn to_kb_per_sec(value: f64, unit: &str) -> Result<f64> {
    match unit {
        "B/s" => Ok(value / 1024.0),
        "K/s" => Ok(value),
        "M/s" => Ok(value * 1024.0),
        "G/s" => Ok(value * 1024.0 * 1024.0),
        "T/s" => Ok(value * 1024.0 * 1024.0 * 1024.0),
        other => Err(StatsError::UnknownUnit(other.to_string())),
    }
}

/// Parses "HH:MM:SS" into seconds from midnight.
/// No day rollover: a log spanning midnight yields negative relative times.
pub fn time_to_seconds(ts: &str) -> Result<i64> {
    let t = NaiveTime::parse_from_str(ts, "%H:%M:%S")
        .map_err(|_| StatsError::TimestampParse(ts.to_string()))?;
    Ok(t.num_seconds_from_midnight() as i64)
}

/// Accumulator for the timestamp block currently being scanned.
#[derive(Debug)]
struct OpenBucket {
    time: String,
    seconds: i64,
    reads_kb: f64,
    writes_kb: f64,
}

impl OpenBucket {
    fn open(time: &str) -> Result<Self> {
        Ok(Self {
            time: time.to_string(),
            seconds: time_to_seconds(time)?,
            reads_kb: 0.0,
            writes_kb: 0.0,
        })
    }

    fn add(&mut self, sample: &ProcessSample) -> Result<()> {
        self.reads_kb += to_kb_per_sec(sample.read_value, &sample.read_unit)?;
        self.writes_kb += to_kb_per_sec(sample.write_value, &sample.write_unit)?;
        Ok(())
    }

    fn close(self, begin_seconds: i64) -> SeriesRecord {
        SeriesRecord {
            seconds: self.seconds - begin_seconds,
            reads_kb: self.reads_kb,
            writes_kb: self.writes_kb,
        }
    }
}

/// Folds the log lines into one record per timestamp block, in encounter
/// order. Samples whose command field contains `command` contribute their
/// normalized bandwidth; the rest belong to the block but add nothing. An
/// empty filter matches every sample.
pub fn build_series(lines: &[String], command: &str) -> Result<Vec<SeriesRecord>> {
    let mut records: Vec<SeriesRecord> = Vec::new();
    let mut bucket: Option<OpenBucket> = None;
    let mut begin_seconds = 0i64;

    for (index, line) in lines.iter().enumerate() {
        let sample = match classify_line(line, index + 1)? {
            LogLine::Sample(sample) => sample,
            _ => continue,
        };

        let mut open = match bucket.take() {
            None => {
                let fresh = OpenBucket::open(&sample.time)?;
                begin_seconds = fresh.seconds;
                fresh
            }
            // New timestamp closes the current block; the triggering sample
            // counts toward the fresh one.
            Some(open) if open.time != sample.time => {
                records.push(open.close(begin_seconds));
                OpenBucket::open(&sample.time)?
            }
            Some(open) => open,
        };

        if sample.command.contains(command) {
            open.add(&sample)?;
        }
        bucket = Some(open);
    }

    // Flush the final block; losing it would drop the last interval.
    match bucket {
        Some(open) => records.push(open.close(begin_seconds)),
        None => return Err(StatsError::EmptySeries),
    }
    Ok(records)
}
