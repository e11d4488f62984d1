// ABOUTME: Source and sink seams between the pipeline and the message bus.
// ABOUTME: Includes adapters over tokio mpsc channels for embedding the pipeline in-process.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::BusError;
use crate::record::Record;

/// Where records come from.
#[async_trait]
pub trait RecordSource: Send {
    /// Receives the next record. `Ok(None)` signals end of stream.
    async fn next_record(&mut self) -> Result<Option<Record>, BusError>;
}

/// Where enriched records go.
#[async_trait]
pub trait RecordSink: Send {
    /// Publishes one record.
    async fn send(&mut self, record: Record) -> Result<(), BusError>;

    /// Flushes anything buffered. Called once after the last record.
    async fn flush(&mut self) -> Result<(), BusError> {
        Ok(())
    }
}

#[async_trait]
impl RecordSource for mpsc::Receiver<Record> {
    async fn next_record(&mut self) -> Result<Option<Record>, BusError> {
        Ok(self.recv().await)
    }
}

#[async_trait]
impl RecordSource for mpsc::UnboundedReceiver<Record> {
    async fn next_record(&mut self) -> Result<Option<Record>, BusError> {
        Ok(self.recv().await)
    }
}

#[async_trait]
impl RecordSink for mpsc::Sender<Record> {
    async fn send(&mut self, record: Record) -> Result<(), BusError> {
        mpsc::Sender::send(self, record)
            .await
            .map_err(|_| BusError::Closed)
    }
}

#[async_trait]
impl RecordSink for mpsc::UnboundedSender<Record> {
    async fn send(&mut self, record: Record) -> Result<(), BusError> {
        mpsc::UnboundedSender::send(self, record).map_err(|_| BusError::Closed)
    }
}

#[async_trait]
impl<S: RecordSource + ?Sized> RecordSource for Box<S> {
    async fn next_record(&mut self) -> Result<Option<Record>, BusError> {
        (**self).next_record().await
    }
}

#[async_trait]
impl<K: RecordSink + ?Sized> RecordSink for Box<K> {
    async fn send(&mut self, record: Record) -> Result<(), BusError> {
        (**self).send(record).await
    }

    async fn flush(&mut self) -> Result<(), BusError> {
        (**self).flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mpsc_source_ends_when_senders_drop() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(Record::new("https://site.test/1")).await.unwrap();
        drop(tx);

        let first = rx.next_record().await.unwrap();
        assert_eq!(first.unwrap().link(), "https://site.test/1");
        assert!(rx.next_record().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mpsc_sink_reports_closed_receiver() {
        let (mut tx, rx) = mpsc::unbounded_channel::<Record>();
        drop(rx);
        let err = RecordSink::send(&mut tx, Record::new("https://site.test/1"))
            .await
            .unwrap_err();
        assert!(matches!(err, BusError::Closed));
    }

    #[tokio::test]
    async fn boxed_trait_objects_delegate() {
        let (tx, rx) = mpsc::unbounded_channel();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel();
        let mut source: Box<dyn RecordSource> = Box::new(rx);
        let mut sink: Box<dyn RecordSink> = Box::new(out_tx);

        tx.send(Record::new("https://site.test/1")).unwrap();
        let record = source.next_record().await.unwrap().unwrap();
        sink.send(record).await.unwrap();
        sink.flush().await.unwrap();

        assert_eq!(out_rx.recv().await.unwrap().link(), "https://site.test/1");
    }
}
