//! Update sources.
//!
//! The dispatch loop pulls updates from an [`UpdateSource`] until it reports
//! closure. Channel receivers and streams are sources out of the box, so a
//! long-polling or webhook transport only needs to feed a sender.

use async_trait::async_trait;
use courier_core::Update;
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;

/// A finite or infinite sequence of updates.
#[async_trait]
pub trait UpdateSource: Send + 'static {
    /// Waits for the next update. `None` means the source is closed and will
    /// yield nothing more.
    async fn recv(&mut self) -> Option<Update>;
}

#[async_trait]
impl UpdateSource for mpsc::Receiver<Update> {
    async fn recv(&mut self) -> Option<Update> {
        mpsc::Receiver::recv(self).await
    }
}

#[async_trait]
impl UpdateSource for mpsc::UnboundedReceiver<Update> {
    async fn recv(&mut self) -> Option<Update> {
        mpsc::UnboundedReceiver::recv(self).await
    }
}

/// Adapts any [`Stream`] of updates into an [`UpdateSource`].
pub struct StreamSource<S> {
    stream: S,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = Update> + Unpin + Send + 'static,
{
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S> UpdateSource for StreamSource<S>
where
    S: Stream<Item = Update> + Unpin + Send + 'static,
{
    async fn recv(&mut self) -> Option<Update> {
        self.stream.next().await
    }
}

/// Creates a bounded update channel.
///
/// A capacity of zero is raised to one.
pub fn update_channel(capacity: usize) -> (mpsc::Sender<Update>, mpsc::Receiver<Update>) {
    mpsc::channel(capacity.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::UpdateKind;

    #[tokio::test]
    async fn test_channel_source_closes() {
        let (tx, rx) = update_channel(0);
        let mut source: Box<dyn UpdateSource> = Box::new(rx);

        tx.send(Update::new(1, UpdateKind::Unknown)).await.unwrap();
        drop(tx);

        assert_eq!(source.recv().await.map(|u| u.update_id), Some(1));
        assert!(source.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_stream_source() {
        let updates = futures::stream::iter((1..=3).map(|id| Update::new(id, UpdateKind::Unknown)));
        let mut source = StreamSource::new(updates);

        let mut ids = Vec::new();
        while let Some(update) = source.recv().await {
            ids.push(update.update_id);
        }
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
