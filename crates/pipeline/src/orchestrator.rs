// ABOUTME: Three-stage pipeline: read records, extract full text, publish records.
// ABOUTME: Stages run as tokio tasks joined by rendezvous handoff channels and share one Extractor.

use std::sync::Arc;

use fulltext_extractor::Extractor;
use tokio::sync::Mutex;
use tracing::instrument::WithSubscriber;
use tracing::{debug, error, info, warn, Dispatch};

use crate::bus::{RecordSink, RecordSource};
use crate::error::{BusError, PipelineError};
use crate::handoff;
use crate::record::Record;

/// Counters reported when a run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Records read from the source.
    pub received: usize,
    /// Records whose text was set by extraction.
    pub enriched: usize,
    /// Records forwarded without text because extraction failed.
    pub extraction_failures: usize,
    /// Records accepted by the sink.
    pub published: usize,
    /// Records the sink rejected.
    pub publish_failures: usize,
}

/// Builder for [`Pipeline`].
#[derive(Debug)]
pub struct PipelineBuilder {
    extractor: Arc<Extractor>,
    workers: usize,
    dispatch: Option<Dispatch>,
}

impl PipelineBuilder {
    /// Number of extraction tasks. Defaults to one.
    ///
    /// With one task records reach the sink in source order. With more,
    /// ordering is best effort: a slow page can be overtaken by later records.
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Route every stage's logs to `dispatch` instead of the caller's default.
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    pub fn build(self) -> Pipeline {
        let dispatch = self
            .dispatch
            .unwrap_or_else(|| tracing::dispatcher::get_default(|d| d.clone()));
        Pipeline {
            extractor: self.extractor,
            workers: self.workers,
            dispatch,
        }
    }
}

/// Source → extraction → sink, connected by synchronous handoffs.
///
/// Each stage blocks until its neighbour is ready, so a slow sink stalls
/// extraction, which stalls the source. Extraction errors never stop the run:
/// the record is forwarded with its text unchanged.
#[derive(Debug, Clone)]
pub struct Pipeline {
    extractor: Arc<Extractor>,
    workers: usize,
    dispatch: Dispatch,
}

#[derive(Debug, Default)]
struct ExtractCounts {
    enriched: usize,
    failures: usize,
}

#[derive(Debug, Default)]
struct SinkCounts {
    published: usize,
    failures: usize,
}

impl Pipeline {
    pub fn builder(extractor: Arc<Extractor>) -> PipelineBuilder {
        PipelineBuilder {
            extractor,
            workers: 1,
            dispatch: None,
        }
    }

    /// Runs until the source reports end of stream and every record has reached the sink.
    pub async fn run<S, K>(&self, source: S, sink: K) -> Result<PipelineStats, PipelineError>
    where
        S: RecordSource + 'static,
        K: RecordSink + 'static,
    {
        let (to_extract, extract_rx) = handoff::channel::<Record>();
        let (to_sink, sink_rx) = handoff::channel::<Record>();
        let extract_rx = Arc::new(Mutex::new(extract_rx));

        tracing::dispatcher::with_default(&self.dispatch, || {
            info!(workers = self.workers, "pipeline starting");
        });
        let source_task = tokio::spawn(
            source_stage(source, to_extract).with_subscriber(self.dispatch.clone()),
        );

        let extract_tasks: Vec<_> = (0..self.workers)
            .map(|worker| {
                tokio::spawn(
                    extract_stage(
                        worker,
                        Arc::clone(&self.extractor),
                        Arc::clone(&extract_rx),
                        to_sink.clone(),
                    )
                    .with_subscriber(self.dispatch.clone()),
                )
            })
            .collect();
        // The workers hold the only senders and receivers: the sink stops once they
        // all finish, and the source's send fails once they are all gone.
        drop(to_sink);
        drop(extract_rx);

        let sink_task = tokio::spawn(sink_stage(sink, sink_rx).with_subscriber(self.dispatch.clone()));

        let (source_res, extract_res, sink_res) = tokio::join!(
            source_task,
            futures::future::join_all(extract_tasks),
            sink_task
        );

        let mut stats = PipelineStats::default();

        let (received, source_err) = source_res.map_err(|source| PipelineError::StagePanicked {
            stage: "source",
            source,
        })?;
        stats.received = received;

        for res in extract_res {
            let counts = res.map_err(|source| PipelineError::StagePanicked {
                stage: "extraction",
                source,
            })?;
            stats.enriched += counts.enriched;
            stats.extraction_failures += counts.failures;
        }

        let sink_counts = sink_res.map_err(|source| PipelineError::StagePanicked {
            stage: "sink",
            source,
        })?;
        stats.published = sink_counts.published;
        stats.publish_failures = sink_counts.failures;

        tracing::dispatcher::with_default(&self.dispatch, || {
            info!(
                received = stats.received,
                enriched = stats.enriched,
                extraction_failures = stats.extraction_failures,
                published = stats.published,
                publish_failures = stats.publish_failures,
                "pipeline finished"
            );
        });

        match source_err {
            Some(err) => Err(PipelineError::Source(err)),
            None => Ok(stats),
        }
    }
}

/// Pulls records until end of stream or a transport error.
async fn source_stage<S: RecordSource>(
    mut source: S,
    out: handoff::Sender<Record>,
) -> (usize, Option<BusError>) {
    let mut received = 0;
    loop {
        match source.next_record().await {
            Ok(Some(record)) => {
                received += 1;
                debug!(link = %record.link(), "record received");
                if out.send(record).await.is_err() {
                    error!("extraction stage stopped, no longer reading the source");
                    return (received, None);
                }
            }
            Ok(None) => {
                info!(received, "source exhausted");
                return (received, None);
            }
            Err(err) if err.is_record_level() => {
                warn!(error = %err, "skipping undecodable record");
            }
            Err(err) => {
                error!(error = %err, "record source failed");
                return (received, Some(err));
            }
        }
    }
}

/// Enriches records one at a time, forwarding each whether or not extraction succeeded.
async fn extract_stage(
    worker: usize,
    extractor: Arc<Extractor>,
    input: Arc<Mutex<handoff::Receiver<Record>>>,
    out: handoff::Sender<Record>,
) -> ExtractCounts {
    let mut counts = ExtractCounts::default();
    loop {
        let next = input.lock().await.recv().await;
        let Some(mut record) = next else {
            break;
        };

        match extractor.extract(record.link()).await {
            Ok(text) => {
                record.full_text = text;
                counts.enriched += 1;
            }
            Err(err) => {
                warn!(worker, link = %record.link(), error = %err, "extraction failed, forwarding record unchanged");
                counts.failures += 1;
            }
        }

        if out.send(record).await.is_err() {
            error!(worker, "sink stage stopped, dropping record");
            break;
        }
    }
    debug!(worker, enriched = counts.enriched, failed = counts.failures, "extraction worker done");
    counts
}

/// Publishes records until every extraction worker has finished.
async fn sink_stage<K: RecordSink>(mut sink: K, mut input: handoff::Receiver<Record>) -> SinkCounts {
    let mut counts = SinkCounts::default();
    while let Some(record) = input.recv().await {
        let link = record.link().to_string();
        match sink.send(record).await {
            Ok(()) => counts.published += 1,
            Err(err) => {
                error!(link = %link, error = %err, "failed to publish record");
                counts.failures += 1;
            }
        }
    }
    if let Err(err) = sink.flush().await {
        error!(error = %err, "failed to flush sink");
    }
    counts
}
