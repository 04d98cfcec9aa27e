//! Rank-exchange runner.
//!
//! Spawns one thread per rank, runs the greeting exchange, and prints the
//! coordinator's transcript. The participant count comes from the
//! `PARLAB_RANKS` environment variable (default 4).

use parlab_comm::exchange;

fn main() {
    let size = std::env::var("PARLAB_RANKS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4);

    match exchange::run(size) {
        Ok(transcript) => {
            for line in transcript {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}
