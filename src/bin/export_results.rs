//! Batch reporting tool: pivots a historical match-attempt log into a
//! spreadsheet-style CSV.
//!
//! Input is a JSON array of attempt records; output is one row per distinct
//! image file with identity/distance/elapsed/error columns for each of the
//! six fixed thresholds. The output filename is fixed and always overwritten.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

const THRESHOLDS: [f64; 6] = [0.3, 0.5, 0.7, 0.9, 1.1, 1.3];
const OUTPUT_PATH: &str = "results.csv";

#[derive(Deserialize)]
struct AttemptRecord {
    file: String,
    threshold: f64,
    #[serde(default)]
    response: Option<AttemptResponse>,
    #[serde(default)]
    erro: Option<String>,
    #[serde(default)]
    elapsed_ms: Option<f64>,
}

#[derive(Deserialize)]
struct AttemptResponse {
    #[serde(default)]
    identity: Option<String>,
    #[serde(default)]
    distance: Option<f64>,
}

#[derive(Default, Clone)]
struct Cell {
    identity: Option<String>,
    distance: Option<f64>,
    elapsed: Option<f64>,
    error: Option<String>,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: export_results <results.json>");
        std::process::exit(1);
    }

    if let Err(error) = run(&args[1]) {
        eprintln!("Error: {}", error);
        std::process::exit(1);
    }
}

fn run(input_path: &str) -> Result<(), String> {
    let file = File::open(input_path)
        .map_err(|e| format!("cannot open '{}': {}", input_path, e))?;
    let records: Vec<AttemptRecord> = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format!("cannot parse '{}': {}", input_path, e))?;

    let rows = pivot(records);
    write_csv(OUTPUT_PATH, &rows)
        .map_err(|e| format!("cannot write '{}': {}", OUTPUT_PATH, e))?;

    println!("Wrote {}", OUTPUT_PATH);
    Ok(())
}

/// Groups attempts by file in first-seen order, one cell per fixed threshold.
/// Attempts at a threshold outside the fixed set are ignored.
fn pivot(records: Vec<AttemptRecord>) -> Vec<(String, [Cell; 6])> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, [Cell; 6]> = HashMap::new();

    for record in records {
        let Some(slot) = THRESHOLDS.iter().position(|t| (t - record.threshold).abs() < 1e-9) else {
            continue;
        };

        if !grouped.contains_key(&record.file) {
            order.push(record.file.clone());
        }
        let cells = grouped.entry(record.file.clone()).or_default();

        let (identity, distance) = match record.response {
            Some(response) => (response.identity, response.distance),
            None => (None, None),
        };

        cells[slot] = Cell {
            identity,
            distance,
            elapsed: record.elapsed_ms,
            error: record.erro,
        };
    }

    order
        .into_iter()
        .map(|file| {
            let cells = grouped.remove(&file).unwrap_or_default();
            (file, cells)
        })
        .collect()
}

fn write_csv(path: &str, rows: &[(String, [Cell; 6])]) -> Result<(), std::io::Error> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    let mut header = vec!["file".to_string()];
    for threshold in THRESHOLDS {
        header.push(format!("{} identity", threshold));
        header.push(format!("{} distance", threshold));
        header.push(format!("{} elapsed", threshold));
        header.push(format!("{} error", threshold));
    }
    writeln!(writer, "{}", header.join(","))?;

    for (file_name, cells) in rows {
        let mut row = vec![csv_field(file_name)];
        for cell in cells {
            row.push(cell.identity.as_deref().map(csv_field).unwrap_or_default());
            row.push(cell.distance.map(|d| d.to_string()).unwrap_or_default());
            row.push(cell.elapsed.map(|e| e.to_string()).unwrap_or_default());
            row.push(cell.error.as_deref().map(csv_field).unwrap_or_default());
        }
        writeln!(writer, "{}", row.join(","))?;
    }

    writer.flush()
}

/// Quotes a field when it contains a delimiter, quote or newline.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}
