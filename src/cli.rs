use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use crate::domain::{Formation, SegmentResult};
use crate::error::Result;
use crate::pricing::RefreshReport;
use crate::services::SolveResponse;

#[derive(Parser)]
#[command(name = "sbc-solver")]
#[command(version = "0.1.0")]
#[command(about = "Squad-building challenge solver", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory
    #[arg(short, long, default_value = "config")]
    pub config: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Solve every segment in a request file
    Solve {
        /// Path to a JSON solve request
        #[arg(short, long)]
        request: PathBuf,
        /// Fixed reshuffle seed
        #[arg(long)]
        seed: Option<u64>,
        /// Attempts per segment
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Fetch fresh prices for candidate ids
    Prices {
        /// Comma separated candidate ids
        #[arg(long, value_delimiter = ',', required = true)]
        ids: Vec<String>,
        /// Simultaneous requests
        #[arg(long)]
        concurrency: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Show the slot list of a formation
    Formation {
        /// Formation name (4-3-3, 4-4-2, 4-2-3-1, 3-5-2)
        name: String,
    },
}

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Coins with thousands separators, `—` when unknown
pub fn format_coins(coins: Option<u64>) -> String {
    let Some(coins) = coins else {
        return "—".to_string();
    };

    let digits = coins.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('c');
    out
}

#[derive(Debug, Serialize, Tabled)]
pub struct SlotRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub slot: String,
    pub player: String,
    pub rating: u8,
    pub club: String,
    pub league: String,
    pub nation: String,
    pub price: String,
    #[tabled(rename = "match")]
    pub tier: String,
}

pub fn slot_rows(result: &SegmentResult) -> Vec<SlotRow> {
    result
        .assignment
        .slots
        .iter()
        .enumerate()
        .map(|(i, s)| SlotRow {
            index: i + 1,
            slot: s.slot.to_string(),
            player: s.candidate.display_name.clone(),
            rating: s.candidate.rating,
            club: s.candidate.club.clone(),
            league: s.candidate.league.clone(),
            nation: s.candidate.nation.clone(),
            price: format_coins(s.candidate.price),
            tier: format!("{:?}", s.tier),
        })
        .collect()
}

/// Human-readable block for one segment
pub fn render_segment(result: &SegmentResult) -> String {
    let mut out = format!(
        "{} [{:?}] attempts={} cost={} avg={:.1} chem={}\n",
        result.name,
        result.status,
        result.attempts,
        format_coins(Some(result.summary.total_cost)),
        result.summary.average_rating,
        result.summary.chemistry_estimate,
    );
    if let Some(reason) = &result.failure_reason {
        out.push_str(&format!("  reason: {}\n", reason));
    }

    let rows = slot_rows(result);
    if rows.is_empty() {
        out.push_str("(no players assigned)\n");
    } else {
        out.push_str(&Table::new(rows).to_string());
        out.push('\n');
    }
    out
}

pub fn print_solve_response(response: &SolveResponse, mode: OutputMode) -> Result<()> {
    match mode {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(response)?),
        OutputMode::Table => {
            println!("solve {}", response.solve_id);
            for segment in &response.solutions {
                println!("{}", render_segment(segment));
            }
            println!(
                "total: {} across {} players",
                format_coins(Some(response.cumulative_cost)),
                response.consumed_ids.len()
            );
        }
    }
    Ok(())
}

#[derive(Debug, Serialize, Tabled)]
pub struct PriceRow {
    pub id: String,
    pub price: String,
}

pub fn price_rows(ids: &[String], report: &RefreshReport) -> Vec<PriceRow> {
    ids.iter()
        .map(|id| PriceRow {
            id: id.clone(),
            price: format_coins(report.prices.get(id).copied().flatten()),
        })
        .collect()
}

pub fn print_prices(ids: &[String], report: &RefreshReport, mode: OutputMode) -> Result<()> {
    let rows = price_rows(ids, report);
    match mode {
        OutputMode::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputMode::Table => {
            println!("{}", Table::new(&rows));
            if report.failures > 0 || report.cancelled {
                println!(
                    "failures={} cancelled={} waves={}",
                    report.failures, report.cancelled, report.waves
                );
            }
        }
    }
    Ok(())
}

pub fn print_formation(formation: Formation) {
    let slots: Vec<String> = formation.slots().iter().map(|p| p.to_string()).collect();
    println!("{}: {}", formation, slots.join(" "));
}
