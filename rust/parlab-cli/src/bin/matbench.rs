//! Matrix-multiply benchmark runner.
//!
//! Times the device multiply against fixed 160x160 operands, verifies the
//! product against the sequential reference, and prints the report. One
//! optional positional argument selects the output format (`text` default,
//! `json`).

use parlab_cli::bench::{self, BenchConfig};
use parlab_cli::report;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let output_format = args.get(1).map(|s| s.as_str()).unwrap_or("text");

    let config = BenchConfig::default();
    let bench_report = match bench::run(&config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    match output_format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&bench_report).unwrap());
        }
        _ => {
            println!("{}", report::render_text(&bench_report));
        }
    }
}
