//! The point-to-point message fabric.
//!
//! Every ordered pair of distinct ranks is wired with one zero-capacity
//! rendezvous channel, so a send completes only when the receiving endpoint
//! takes the envelope off the wire. Receives match on (source, tag):
//! envelopes that arrive with a different tag are stashed in a pending queue
//! and satisfy later receives first. Per-pair send order is preserved, both
//! on the wire and through the stash.
//!
//! An [`Endpoint`] is a rank's private view of the fabric and is moved into
//! that rank's thread; nothing here is shared.

use crate::error::CommError;
use crate::rank::{Rank, Tag};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::collections::{HashMap, VecDeque};
use std::fmt;

/// One message on the wire.
struct Envelope<T> {
    tag: Tag,
    payload: T,
}

// ---------------------------------------------------------------------------
// Endpoint
// ---------------------------------------------------------------------------

/// One rank's connection to every peer in the group.
pub struct Endpoint<T> {
    rank: Rank,
    size: usize,
    /// Wires out, keyed by destination. No entry for `self.rank`.
    outgoing: HashMap<Rank, Sender<Envelope<T>>>,
    /// Wires in, keyed by source. No entry for `self.rank`.
    incoming: HashMap<Rank, Receiver<Envelope<T>>>,
    /// Envelopes taken off the wire while waiting for a different tag.
    pending: HashMap<(Rank, Tag), VecDeque<T>>,
}

impl<T> Endpoint<T> {
    /// This endpoint's rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of ranks in the group.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Send `payload` to `dst` under `tag`, blocking until the destination
    /// takes it.
    pub fn send(&self, dst: Rank, tag: Tag, payload: T) -> Result<(), CommError> {
        let wire = match self.outgoing.get(&dst) {
            Some(wire) => wire,
            None if dst == self.rank => {
                return Err(CommError::SelfMessage { rank: self.rank });
            }
            None => {
                return Err(CommError::UnknownPeer {
                    peer: dst,
                    size: self.size,
                });
            }
        };
        wire.send(Envelope { tag, payload })
            .map_err(|_| CommError::Disconnected { peer: dst })
    }

    /// Receive the next payload from `src` carrying `tag`, blocking until
    /// one arrives.
    ///
    /// Envelopes from `src` with other tags are stashed and delivered by
    /// later receives in arrival order. A stashed envelope satisfies a
    /// receive even after `src` disconnects.
    pub fn recv(&mut self, src: Rank, tag: Tag) -> Result<T, CommError> {
        if let Some(queue) = self.pending.get_mut(&(src, tag)) {
            if let Some(payload) = queue.pop_front() {
                if queue.is_empty() {
                    self.pending.remove(&(src, tag));
                }
                return Ok(payload);
            }
        }

        let wire = match self.incoming.get(&src) {
            Some(wire) => wire,
            None if src == self.rank => {
                return Err(CommError::SelfMessage { rank: self.rank });
            }
            None => {
                return Err(CommError::UnknownPeer {
                    peer: src,
                    size: self.size,
                });
            }
        };

        loop {
            let envelope = wire
                .recv()
                .map_err(|_| CommError::Disconnected { peer: src })?;
            if envelope.tag == tag {
                return Ok(envelope.payload);
            }
            self.pending
                .entry((src, envelope.tag))
                .or_default()
                .push_back(envelope.payload);
        }
    }
}

impl<T> fmt::Debug for Endpoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("rank", &self.rank)
            .field("size", &self.size)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

/// Wire a fully-connected group of `size` ranks and return their endpoints
/// in rank order.
pub fn full_mesh<T>(size: usize) -> Vec<Endpoint<T>> {
    let mut outgoing: Vec<HashMap<Rank, Sender<Envelope<T>>>> =
        (0..size).map(|_| HashMap::new()).collect();
    let mut incoming: Vec<HashMap<Rank, Receiver<Envelope<T>>>> =
        (0..size).map(|_| HashMap::new()).collect();

    for src in 0..size {
        for dst in 0..size {
            if src == dst {
                continue;
            }
            let (tx, rx) = bounded(0);
            outgoing[src].insert(Rank(dst as u32), tx);
            incoming[dst].insert(Rank(src as u32), rx);
        }
    }

    outgoing
        .into_iter()
        .zip(incoming)
        .enumerate()
        .map(|(rank, (outgoing, incoming))| Endpoint {
            rank: Rank(rank as u32),
            size,
            outgoing,
            incoming,
            pending: HashMap::new(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, Instant};

    fn pair<T>() -> (Endpoint<T>, Endpoint<T>) {
        let mut endpoints = full_mesh::<T>(2).into_iter();
        let ep0 = endpoints.next().unwrap();
        let ep1 = endpoints.next().unwrap();
        (ep0, ep1)
    }

    // -- wiring -----------------------------------------------------------

    #[test]
    fn fabric_mesh_assigns_ranks_in_order() {
        let endpoints = full_mesh::<u32>(4);
        assert_eq!(endpoints.len(), 4);
        for (i, ep) in endpoints.iter().enumerate() {
            assert_eq!(ep.rank(), Rank(i as u32));
            assert_eq!(ep.size(), 4);
        }
    }

    #[test]
    fn fabric_singleton_has_no_wires() {
        let mut endpoints = full_mesh::<u32>(1);
        let mut ep = endpoints.remove(0);
        assert_eq!(
            ep.send(Rank(0), Tag(1), 5),
            Err(CommError::SelfMessage { rank: Rank(0) })
        );
        assert_eq!(
            ep.recv(Rank(1), Tag(1)),
            Err(CommError::UnknownPeer {
                peer: Rank(1),
                size: 1
            })
        );
    }

    // -- blocking semantics -----------------------------------------------

    #[test]
    fn fabric_send_blocks_until_receive() {
        let (mut ep0, ep1) = pair::<u32>();

        let sender = thread::spawn(move || {
            let started = Instant::now();
            ep1.send(Rank(0), Tag(1), 42).unwrap();
            started.elapsed()
        });

        thread::sleep(Duration::from_millis(60));
        assert_eq!(ep0.recv(Rank(1), Tag(1)).unwrap(), 42);

        let blocked = sender.join().unwrap();
        assert!(blocked >= Duration::from_millis(40), "send returned early");
    }

    #[test]
    fn fabric_round_trip() {
        let (mut ep0, mut ep1) = pair::<String>();

        let peer = thread::spawn(move || {
            ep1.send(Rank(0), Tag(1), "ping".to_string()).unwrap();
            ep1.recv(Rank(0), Tag(2)).unwrap()
        });

        assert_eq!(ep0.recv(Rank(1), Tag(1)).unwrap(), "ping");
        ep0.send(Rank(1), Tag(2), "pong".to_string()).unwrap();
        assert_eq!(peer.join().unwrap(), "pong");
    }

    // -- tag matching ------------------------------------------------------

    #[test]
    fn fabric_recv_stashes_other_tags() {
        let (mut ep0, ep1) = pair::<&str>();

        let sender = thread::spawn(move || {
            ep1.send(Rank(0), Tag(9), "early but unwanted").unwrap();
            ep1.send(Rank(0), Tag(1), "wanted").unwrap();
        });

        // The tag-9 envelope is taken off the wire first and held back.
        assert_eq!(ep0.recv(Rank(1), Tag(1)).unwrap(), "wanted");
        assert_eq!(ep0.recv(Rank(1), Tag(9)).unwrap(), "early but unwanted");
        sender.join().unwrap();
    }

    #[test]
    fn fabric_preserves_per_pair_order() {
        let (mut ep0, ep1) = pair::<u32>();

        let sender = thread::spawn(move || {
            for n in [1, 2, 3] {
                ep1.send(Rank(0), Tag(1), n).unwrap();
            }
        });

        assert_eq!(ep0.recv(Rank(1), Tag(1)).unwrap(), 1);
        assert_eq!(ep0.recv(Rank(1), Tag(1)).unwrap(), 2);
        assert_eq!(ep0.recv(Rank(1), Tag(1)).unwrap(), 3);
        sender.join().unwrap();
    }

    #[test]
    fn fabric_stash_survives_disconnect() {
        let (mut ep0, ep1) = pair::<&str>();

        let sender = thread::spawn(move || {
            ep1.send(Rank(0), Tag(9), "stashed").unwrap();
            // ep1 drops here.
        });

        // Pulls the tag-9 envelope into the stash, then sees the wire close.
        assert_eq!(
            ep0.recv(Rank(1), Tag(1)),
            Err(CommError::Disconnected { peer: Rank(1) })
        );
        assert_eq!(ep0.recv(Rank(1), Tag(9)).unwrap(), "stashed");
        sender.join().unwrap();
    }

    // -- addressing errors -------------------------------------------------

    #[test]
    fn fabric_rejects_self_messages() {
        let (mut ep0, _ep1) = pair::<u32>();
        assert_eq!(
            ep0.send(Rank(0), Tag(1), 1),
            Err(CommError::SelfMessage { rank: Rank(0) })
        );
        assert_eq!(
            ep0.recv(Rank(0), Tag(1)),
            Err(CommError::SelfMessage { rank: Rank(0) })
        );
    }

    #[test]
    fn fabric_rejects_unknown_peers() {
        let (ep0, _ep1) = pair::<u32>();
        assert_eq!(
            ep0.send(Rank(7), Tag(1), 1),
            Err(CommError::UnknownPeer {
                peer: Rank(7),
                size: 2
            })
        );
    }

    #[test]
    fn fabric_send_to_dropped_peer_disconnects() {
        let (ep0, ep1) = pair::<u32>();
        drop(ep1);
        assert_eq!(
            ep0.send(Rank(1), Tag(1), 1),
            Err(CommError::Disconnected { peer: Rank(1) })
        );
    }
}
