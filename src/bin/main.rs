// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use token_console_rs::{Address, Console, LifecycleState, MemoryLedger, units};

/// Token Console - replay an operations CSV against an in-memory ledger
///
/// Reads reward/transfer operations from a CSV file, drives them through
/// the console controllers, and writes per-operation outcomes to stdout.
#[derive(Parser, Debug)]
#[command(name = "token-console-rs")]
#[command(about = "Replays a token operations CSV through the console", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: kind,target,amount
    /// Example: cargo run -- operations.csv > outcomes.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Privileged owner of the in-memory ledger
    #[arg(long, default_value = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")]
    owner: String,

    /// Connected identity driving the console (defaults to the owner)
    #[arg(long)]
    identity: Option<String>,

    /// Initial confirmed balance of the connected identity, in display units
    #[arg(long, default_value = "1000")]
    balance: Decimal,
}

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    let owner = match Address::parse(&args.owner) {
        Ok(owner) => owner,
        Err(e) => {
            eprintln!("Invalid --owner '{}': {}", args.owner, e);
            process::exit(1);
        }
    };
    let identity = match &args.identity {
        Some(input) => match Address::parse(input) {
            Ok(identity) => identity,
            Err(e) => {
                eprintln!("Invalid --identity '{}': {}", input, e);
                process::exit(1);
            }
        },
        None => owner.clone(),
    };
    let seed = match units::to_base_units(args.balance) {
        Ok(seed) => seed,
        Err(e) => {
            eprintln!("Invalid --balance '{}': {}", args.balance, e);
            process::exit(1);
        }
    };

    let ledger = MemoryLedger::new(owner, identity.clone());
    ledger.credit(&identity, seed);

    let mut console = match Console::connect(Arc::new(ledger), identity) {
        Ok(console) => console,
        Err(e) => {
            eprintln!("Error connecting console: {}", e);
            process::exit(1);
        }
    };

    // Open input file
    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    // Replay operations from CSV
    let outcomes = match process_operations(BufReader::new(file), &mut console) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("Error processing operations: {}", e);
            process::exit(1);
        }
    };

    // Write results to stdout
    if let Err(e) = write_outcomes(&outcomes, std::io::stdout()) {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `kind, target, amount`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    kind: String,
    target: String,
    amount: String,
}

/// One row of the outcome report.
#[derive(Debug, Serialize)]
struct OutcomeRecord {
    kind: String,
    target: String,
    amount: String,
    state: String,
    reference: String,
    detail: String,
}

/// Replays operations from a CSV reader through the console.
///
/// Each row is submitted through the matching controller and, when the
/// ledger accepts it, driven to finalization; the terminal record is then
/// cleared so the next row starts from a fresh form. Malformed rows and
/// unknown kinds are silently skipped.
///
/// # CSV Format
///
/// Expected columns: `kind, target, amount`
/// - `kind`: `reward` or `transfer`
/// - `target`: recipient account address
/// - `amount`: display-unit decimal string
///
/// # Example
///
/// ```csv
/// kind,target,amount
/// transfer,0xde709f2102306220921060314715629080e2fb77,12.5
/// reward,0xde709f2102306220921060314715629080e2fb77,0.25
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails or the CSV structure is
/// invalid. Per-operation failures don't stop processing; they land in
/// the outcome report instead.
pub fn process_operations<R: Read>(
    reader: R,
    console: &mut Console,
) -> Result<Vec<OutcomeRecord>, csv::Error> {
    let mut outcomes = Vec::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All) // Handle whitespace in fields like " transfer "
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for result in rdr.deserialize::<CsvRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                // Skip malformed rows
                #[cfg(debug_assertions)]
                eprintln!("Skipping malformed row: {}", e);
                continue;
            }
        };

        let controller = match record.kind.to_lowercase().as_str() {
            "reward" => &mut console.reward,
            "transfer" => &mut console.transfer,
            _ => {
                #[cfg(debug_assertions)]
                eprintln!("Skipping unknown operation kind '{}'", record.kind);
                continue;
            }
        };

        let (reference, detail) = match controller.submit(&record.target, &record.amount) {
            Ok(reference) => match controller.confirm() {
                Ok(()) => (reference.to_string(), String::new()),
                Err(error) => (reference.to_string(), error.to_string()),
            },
            Err(error) => (String::new(), error.to_string()),
        };

        // A rejected submit never creates a record, so the lifecycle is
        // still Idle; report that distinctly from an on-ledger failure.
        let state = match controller.state() {
            LifecycleState::Idle => "rejected".to_string(),
            state => state.to_string(),
        };

        outcomes.push(OutcomeRecord {
            kind: controller.kind().to_string(),
            target: record.target,
            amount: record.amount,
            state,
            reference,
            detail,
        });

        controller.clear();
    }

    Ok(outcomes)
}

/// Write the outcome report to a CSV writer.
///
/// # CSV Format
///
/// Columns: `kind, target, amount, state, reference, detail`
///
/// # Errors
///
/// Returns a CSV error if writing fails.
pub fn write_outcomes<W: Write>(outcomes: &[OutcomeRecord], writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for outcome in outcomes {
        wtr.serialize(outcome)?;
    }

    wtr.flush()?;
    Ok(())
}
