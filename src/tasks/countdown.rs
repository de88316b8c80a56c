//! Countdown ticker background task

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::controller::{Envelope, Event};

/// Post a `CountdownTick` for `generation` every `period` until aborted.
///
/// The first tick fires one period after spawning; the caller renders the
/// starting value itself.
pub fn spawn_countdown_ticker(
    events: mpsc::UnboundedSender<Envelope>,
    generation: u64,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if events.send(Envelope::event(Event::CountdownTick { generation })).is_err() {
                debug!("Popup event loop closed, stopping countdown {}", generation);
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period_with_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_countdown_ticker(tx, 7, Duration::from_secs(1));

        time::advance(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        for _ in 0..3 {
            let envelope = rx.recv().await.unwrap();
            assert_eq!(envelope.event, Event::CountdownTick { generation: 7 });
            assert!(envelope.reply.is_none());
        }
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_ticker_goes_quiet() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_countdown_ticker(tx, 1, Duration::from_secs(1));
        handle.abort();

        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = spawn_countdown_ticker(tx, 1, Duration::from_secs(1));
        drop(rx);

        time::sleep(Duration::from_secs(2)).await;
        assert!(handle.is_finished());
    }
}
