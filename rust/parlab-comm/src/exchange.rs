//! The greeting exchange: every rank reports in, the coordinator reads
//! them out in rank order.
//!
//! Ranks other than the coordinator format one greeting line and send it
//! to rank 0 in a single blocking send. The coordinator emits its own
//! greeting, then collects the others by ascending rank, one blocking
//! receive each, so output order is fixed regardless of which rank reached
//! its send first. A closing line ends the transcript.

use crate::error::CommError;
use crate::fabric::Endpoint;
use crate::group::ProcessGroup;
use crate::rank::{Rank, Tag};

/// Tag carried by every greeting.
pub const GREETING_TAG: Tag = Tag(1);

/// Line the coordinator emits after the last greeting.
pub const CLOSING_LINE: &str = "That is all for now!";

/// The greeting a rank reports with.
pub fn greeting(rank: Rank, size: usize) -> String {
    format!("Hello world: processor {} of {}", rank, size)
}

/// One rank's part of the exchange.
///
/// Non-coordinators return an empty transcript; the coordinator returns
/// every line it emitted, in emission order.
fn participant(endpoint: &mut Endpoint<String>) -> Result<Vec<String>, CommError> {
    let me = endpoint.rank();
    let size = endpoint.size();

    if me.is_coordinator() {
        let mut lines = Vec::with_capacity(size + 1);
        lines.push(greeting(me, size));
        for peer in 1..size as u32 {
            lines.push(endpoint.recv(Rank(peer), GREETING_TAG)?);
        }
        lines.push(CLOSING_LINE.to_string());
        Ok(lines)
    } else {
        endpoint.send(Rank::COORDINATOR, GREETING_TAG, greeting(me, size))?;
        Ok(Vec::new())
    }
}

/// Run the exchange with `size` participants and return the coordinator's
/// transcript: its own greeting, one greeting per other rank in ascending
/// rank order, then the closing line.
pub fn run(size: usize) -> Result<Vec<String>, CommError> {
    let results = ProcessGroup::spawn(size, |mut endpoint| participant(&mut endpoint)).join()?;

    let mut transcript = Vec::new();
    for lines in results {
        transcript.extend(lines?);
    }
    Ok(transcript)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
