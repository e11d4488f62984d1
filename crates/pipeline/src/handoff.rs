// ABOUTME: Rendezvous (unbuffered) channel used between pipeline stages.
// ABOUTME: A send completes only once a receiver has taken the value, which gives stage-to-stage backpressure.

//! Synchronous handoff channel.
//!
//! Tokio's bounded channels need a capacity of at least one, so a plain
//! `mpsc::channel(1)` would let a sender run one record ahead of its
//! neighbour. Here every value travels with a oneshot acknowledgement and
//! `send` waits for it, so the sender is suspended until the receiver has
//! actually taken the value.
//!
//! `send` is not cancel safe: dropping the future after the value was queued
//! may still deliver it.

use tokio::sync::{mpsc, oneshot};

type Envelope<T> = (T, oneshot::Sender<()>);

/// The receiving half was dropped; the value was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("handoff receiver dropped")]
pub struct Closed;

/// Creates a connected sender/receiver pair.
pub fn channel<T>() -> (Sender<T>, Receiver<T>) {
    let (tx, rx) = mpsc::channel(1);
    (Sender { tx }, Receiver { rx })
}

/// Sending half. Cloning allows several producers to feed one receiver.
#[derive(Debug)]
pub struct Sender<T> {
    tx: mpsc::Sender<Envelope<T>>,
}

impl<T> Clone for Sender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> Sender<T> {
    /// Hands `value` over, waiting until the receiver has taken it.
    pub async fn send(&self, value: T) -> Result<(), Closed> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx.send((value, ack_tx)).await.map_err(|_| Closed)?;
        ack_rx.await.map_err(|_| Closed)
    }
}

/// Receiving half. The channel closes once every sender is dropped.
#[derive(Debug)]
pub struct Receiver<T> {
    rx: mpsc::Receiver<Envelope<T>>,
}

impl<T> Receiver<T> {
    /// Takes the next value, releasing its sender. `None` once all senders are gone.
    pub async fn recv(&mut self) -> Option<T> {
        let (value, ack) = self.rx.recv().await?;
        let _ = ack.send(());
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn send_waits_for_receiver() {
        let (tx, mut rx) = channel();
        let sender = tokio::spawn(async move { tx.send(7).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!sender.is_finished(), "send completed without a receiver");

        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(sender.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn values_arrive_in_order_and_channel_closes() {
        let (tx, mut rx) = channel();
        let producer = tokio::spawn(async move {
            for i in 0..5 {
                tx.send(i).await.unwrap();
            }
        });

        let mut got = Vec::new();
        while let Some(v) = rx.recv().await {
            got.push(v);
        }
        producer.await.unwrap();
        assert_eq!(got, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn send_fails_when_receiver_dropped() {
        let (tx, rx) = channel::<u8>();
        drop(rx);
        assert_eq!(tx.send(1).await, Err(Closed));
    }

    #[tokio::test]
    async fn cloned_senders_share_one_receiver() {
        let (tx, mut rx) = channel();
        let tx2 = tx.clone();
        let a = tokio::spawn(async move { tx.send("a").await });
        let b = tokio::spawn(async move { tx2.send("b").await });

        let mut got = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        got.sort();
        assert_eq!(got, vec!["a", "b"]);
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
        assert_eq!(rx.recv().await, None);
    }
}
