//! End-to-end tests for the greeting exchange and process groups: rank
//! ordering under skewed arrival, transcript shape, and failure surfacing.

use parlab_comm::error::CommError;
use parlab_comm::exchange::{self, greeting, CLOSING_LINE, GREETING_TAG};
use parlab_comm::fabric::Endpoint;
use parlab_comm::group::ProcessGroup;
use parlab_comm::rank::Rank;
use std::thread;
use std::time::Duration;

// ===========================================================================
// Exchange transcript shape
// ===========================================================================

#[test]
fn exchange_transcript_is_rank_ordered() {
    let size = 6;
    let transcript = exchange::run(size).unwrap();

    assert_eq!(transcript.len(), size + 1);
    for rank in 0..size {
        assert_eq!(transcript[rank], greeting(Rank(rank as u32), size));
    }
    assert_eq!(transcript[size], CLOSING_LINE);
}

#[test]
fn exchange_closing_line_appears_exactly_once() {
    let transcript = exchange::run(5).unwrap();
    let closings = transcript.iter().filter(|l| *l == CLOSING_LINE).count();
    assert_eq!(closings, 1);
    assert_eq!(transcript.last().map(String::as_str), Some(CLOSING_LINE));
}

#[test]
fn exchange_single_participant() {
    let transcript = exchange::run(1).unwrap();
    assert_eq!(
        transcript,
        vec!["Hello world: processor 0 of 1", "That is all for now!"]
    );
}

// ===========================================================================
// Ordering is by rank, not arrival
// ===========================================================================

#[test]
fn exchange_order_ignores_arrival_skew() {
    // Rank 1 delays its send; ranks 2 and 3 reach theirs immediately and
    // block in the rendezvous until the coordinator works through rank 1.
    let results = ProcessGroup::spawn(4, |mut endpoint: Endpoint<String>| {
        let me = endpoint.rank();
        let size = endpoint.size();
        if me.is_coordinator() {
            let mut lines = Vec::new();
            for peer in 1..size as u32 {
                lines.push(endpoint.recv(Rank(peer), GREETING_TAG).unwrap());
            }
            lines
        } else {
            if me == Rank(1) {
                thread::sleep(Duration::from_millis(80));
            }
            endpoint
                .send(Rank::COORDINATOR, GREETING_TAG, greeting(me, size))
                .unwrap();
            Vec::new()
        }
    })
    .join()
    .unwrap();

    assert_eq!(
        results[0],
        vec![
            greeting(Rank(1), 4),
            greeting(Rank(2), 4),
            greeting(Rank(3), 4),
        ]
    );
}

// ===========================================================================
// Failure surfacing
// ===========================================================================

#[test]
fn group_panic_does_not_wedge_the_exchange() {
    // Rank 1 dies before sending; the coordinator's blocking receive must
    // resolve to a disconnect instead of hanging, and the join must report
    // the panic.
    let err = ProcessGroup::spawn(2, |mut endpoint: Endpoint<String>| {
        if endpoint.rank().is_coordinator() {
            endpoint.recv(Rank(1), GREETING_TAG)
        } else {
            panic!("rank 1 never reported in");
        }
    })
    .join()
    .unwrap_err();

    assert_eq!(
        err,
        CommError::RankPanicked {
            rank: Rank(1),
            message: "rank 1 never reported in".to_string()
        }
    );
}

#[test]
fn group_disconnect_reaches_the_coordinator() {
    // Same shape as above, but the failing rank returns instead of
    // panicking, so the coordinator's error is what the join reports.
    let results = ProcessGroup::spawn(2, |mut endpoint: Endpoint<String>| {
        if endpoint.rank().is_coordinator() {
            endpoint.recv(Rank(1), GREETING_TAG)
        } else {
            // Exit without sending; the endpoint drops and the wire closes.
            Ok("no greeting".to_string())
        }
    })
    .join()
    .unwrap();

    assert_eq!(
        results[0],
        Err(CommError::Disconnected { peer: Rank(1) })
    );
}
