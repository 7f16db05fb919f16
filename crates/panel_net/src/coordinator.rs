use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::{Channel, NetError, Outcome};

#[derive(Default)]
struct Slot {
    generation: u64,
    token: Option<CancellationToken>,
}

/// Enforces the single-flight rule: at most one request per channel is
/// meaningfully outstanding. Issuing a new request cancels the prior one on
/// the same channel; a completion from a superseded request resolves to
/// [`Outcome::Cancelled`] and must never surface as an error.
#[derive(Default)]
pub struct RequestCoordinator {
    slots: Mutex<HashMap<Channel, Slot>>,
}

/// Claim on a channel slot, taken before the request future is built so that
/// issue order decides which request wins, not task scheduling order.
pub struct Reservation {
    channel: Channel,
    generation: u64,
    token: CancellationToken,
}

impl RequestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `channel`, superseding whatever was in flight on it.
    pub fn reserve(&self, channel: Channel) -> Reservation {
        let (generation, token) = self.begin(channel);
        Reservation {
            channel,
            generation,
            token,
        }
    }

    /// Runs `request` as the sole occupant of `channel`.
    pub async fn run<T, F>(&self, channel: Channel, request: F) -> Outcome<T>
    where
        F: Future<Output = Result<T, NetError>>,
    {
        let reservation = self.reserve(channel);
        self.run_reserved(reservation, request).await
    }

    /// Runs `request` under a slot claimed earlier with [`reserve`].
    ///
    /// [`reserve`]: RequestCoordinator::reserve
    pub async fn run_reserved<T, F>(&self, reservation: Reservation, request: F) -> Outcome<T>
    where
        F: Future<Output = Result<T, NetError>>,
    {
        let Reservation {
            channel,
            generation,
            token,
        } = reservation;

        let result = tokio::select! {
            _ = token.cancelled() => return Outcome::Cancelled,
            result = request => result,
        };

        // Out-of-order completion guard: a newer request may have claimed the
        // slot between our last poll and now.
        if self.is_stale(channel, generation) {
            return Outcome::Cancelled;
        }

        match result {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Failed(err),
        }
    }

    /// Abandons whatever is in flight on `channel` without starting anything.
    pub fn cancel(&self, channel: Channel) {
        let mut slots = self.slots.lock().expect("coordinator slots lock");
        if let Some(slot) = slots.get_mut(&channel) {
            if let Some(token) = slot.token.take() {
                token.cancel();
            }
            slot.generation += 1;
        }
    }

    fn begin(&self, channel: Channel) -> (u64, CancellationToken) {
        let mut slots = self.slots.lock().expect("coordinator slots lock");
        let slot = slots.entry(channel).or_default();
        if let Some(prior) = slot.token.take() {
            prior.cancel();
        }
        slot.generation += 1;
        let token = CancellationToken::new();
        slot.token = Some(token.clone());
        (slot.generation, token)
    }

    fn is_stale(&self, channel: Channel, generation: u64) -> bool {
        let slots = self.slots.lock().expect("coordinator slots lock");
        slots
            .get(&channel)
            .map(|slot| slot.generation != generation)
            .unwrap_or(true)
    }
}
