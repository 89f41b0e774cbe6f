use super::Direction;
use anyhow::Result;
use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};
use std::thread::JoinHandle;

pub type ChordAction = Box<dyn Fn() + Send + Sync>;

/// Runs navigation actions on a dedicated worker. The queue holds a single
/// pending request; chords arriving while it is occupied are dropped.
#[derive(Debug)]
pub struct ActionDispatcher {
    tx: Option<SyncSender<Direction>>,
    join: Option<JoinHandle<()>>,
}

impl ActionDispatcher {
    pub fn spawn(left: ChordAction, right: ChordAction) -> Result<Self> {
        let (tx, rx) = sync_channel::<Direction>(1);
        let join = std::thread::Builder::new()
            .name("chord-actions".into())
            .spawn(move || {
                while let Ok(direction) = rx.recv() {
                    match direction {
                        Direction::Left => left(),
                        Direction::Right => right(),
                    }
                }
            })?;
        Ok(Self {
            tx: Some(tx),
            join: Some(join),
        })
    }

    /// Queue `direction` without blocking. Returns `false` when the request
    /// was dropped.
    pub fn dispatch(&self, direction: Direction) -> bool {
        let Some(tx) = &self.tx else {
            return false;
        };
        match tx.try_send(direction) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(?direction, "navigation already pending; chord dropped");
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!(?direction, "chord worker is gone");
                false
            }
        }
    }

    /// Close the queue and wait for the worker to finish its current action.
    pub fn shutdown(&mut self) {
        self.tx = None;
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for ActionDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;
    use std::sync::{Arc, Barrier};
    use std::time::Duration;

    #[test]
    fn runs_the_matching_action() {
        let (tx, rx) = channel();
        let left_tx = tx.clone();
        let mut dispatcher = ActionDispatcher::spawn(
            Box::new(move || left_tx.send(Direction::Left).unwrap()),
            Box::new(move || tx.send(Direction::Right).unwrap()),
        )
        .unwrap();

        assert!(dispatcher.dispatch(Direction::Right));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            Direction::Right
        );
        assert!(dispatcher.dispatch(Direction::Left));
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(2)).unwrap(),
            Direction::Left
        );
        dispatcher.shutdown();
        assert!(!dispatcher.dispatch(Direction::Left));
    }

    #[test]
    fn drops_requests_while_the_slot_is_full() {
        let gate = Arc::new(Barrier::new(2));
        let worker_gate = gate.clone();
        let (started_tx, started_rx) = channel();
        let mut dispatcher = ActionDispatcher::spawn(
            Box::new(move || {
                let _ = started_tx.send(());
                worker_gate.wait();
            }),
            Box::new(|| {}),
        )
        .unwrap();

        // First request occupies the worker, second fills the slot.
        assert!(dispatcher.dispatch(Direction::Left));
        started_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(dispatcher.dispatch(Direction::Right));
        assert!(!dispatcher.dispatch(Direction::Right));

        gate.wait();
        dispatcher.shutdown();
    }
}
