use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::{debug, info};

use super::status::StatusDocument;

#[derive(Debug, Error)]
pub(crate) enum StatusError {
    #[error("status request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("status endpoint answered HTTP {status}")]
    HttpStatus { status: u16 },
    #[error("failed to read status file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed status document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("status worker stopped")]
    WorkerStopped,
}

/// Something that can produce the current status document on demand. Calls may block.
pub(crate) trait StatusSource: Send {
    fn fetch(&mut self) -> Result<StatusDocument, StatusError>;
    fn describe(&self) -> String;
}

pub(crate) struct HttpStatusSource {
    client: Client,
    url: String,
}

impl HttpStatusSource {
    pub(crate) fn new(url: String, timeout: Duration) -> Result<Self, StatusError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

impl StatusSource for HttpStatusSource {
    fn fetch(&mut self) -> Result<StatusDocument, StatusError> {
        let url = cache_busted_url(&self.url, unix_millis());
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::HttpStatus {
                status: status.as_u16(),
            });
        }
        let body = response.text()?;
        Ok(StatusDocument::parse(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Appends a millisecond timestamp so intermediate caches never answer a poll.
pub(crate) fn cache_busted_url(base: &str, millis: u128) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{millis}")
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default()
}

pub(crate) struct FileStatusSource {
    path: PathBuf,
}

impl FileStatusSource {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl StatusSource for FileStatusSource {
    fn fetch(&mut self) -> Result<StatusDocument, StatusError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| StatusError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(StatusDocument::parse(&raw)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Scene-side handle to a status source.
pub(crate) trait StatusChannel {
    /// Starts a fetch. Returns false when one is already in flight.
    fn request(&mut self) -> bool;
    /// Completed fetches since the last call, oldest first. Never blocks.
    fn drain(&mut self) -> Vec<Result<StatusDocument, StatusError>>;
}

/// Runs the source synchronously inside `request`.
pub(crate) struct InlineStatusChannel {
    source: Box<dyn StatusSource>,
    completed: Vec<Result<StatusDocument, StatusError>>,
}

impl InlineStatusChannel {
    pub(crate) fn new(source: Box<dyn StatusSource>) -> Self {
        Self {
            source,
            completed: Vec::new(),
        }
    }
}

impl StatusChannel for InlineStatusChannel {
    fn request(&mut self) -> bool {
        self.completed.push(self.source.fetch());
        true
    }

    fn drain(&mut self) -> Vec<Result<StatusDocument, StatusError>> {
        std::mem::take(&mut self.completed)
    }
}

/// Owns a source on a background thread; at most one fetch is outstanding at a time.
pub(crate) struct StatusWorker {
    requests: Option<Sender<()>>,
    results: Receiver<Result<StatusDocument, StatusError>>,
    in_flight: bool,
    handle: Option<JoinHandle<()>>,
}

impl StatusWorker {
    pub(crate) fn spawn(mut source: Box<dyn StatusSource>) -> io::Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<()>();
        let (result_tx, result_rx) = mpsc::channel();
        let description = source.describe();
        let handle = thread::Builder::new()
            .name("status-worker".to_string())
            .spawn(move || {
                for () in request_rx {
                    if result_tx.send(source.fetch()).is_err() {
                        break;
                    }
                }
                debug!("status_worker_stopped");
            })?;
        info!(source = %description, "status_worker_started");
        Ok(Self {
            requests: Some(request_tx),
            results: result_rx,
            in_flight: false,
            handle: Some(handle),
        })
    }
}

impl StatusChannel for StatusWorker {
    fn request(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        let sent = self
            .requests
            .as_ref()
            .is_some_and(|requests| requests.send(()).is_ok());
        self.in_flight = sent;
        sent
    }

    fn drain(&mut self) -> Vec<Result<StatusDocument, StatusError>> {
        let mut completed = Vec::new();
        loop {
            match self.results.try_recv() {
                Ok(result) => {
                    self.in_flight = false;
                    completed.push(result);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if std::mem::take(&mut self.in_flight) {
                        completed.push(Err(StatusError::WorkerStopped));
                    }
                    break;
                }
            }
        }
        completed
    }
}

impl Drop for StatusWorker {
    /// Closing the request channel ends the worker loop. An idle worker is joined; one with a
    /// fetch still outstanding is detached so shutdown never waits on the HTTP timeout.
    fn drop(&mut self) {
        self.requests.take();
        let Some(handle) = self.handle.take() else {
            return;
        };
        if self.in_flight {
            debug!("status_worker_detached_in_flight");
            return;
        }
        let _ = handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    struct GatedSource {
        gate: Receiver<()>,
    }

    impl StatusSource for GatedSource {
        fn fetch(&mut self) -> Result<StatusDocument, StatusError> {
            self.gate.recv().map_err(|_| StatusError::WorkerStopped)?;
            StatusDocument::parse(r#"{"location":"shop","activity":"Busy"}"#)
                .map_err(StatusError::from)
        }

        fn describe(&self) -> String {
            "gated".to_string()
        }
    }

    fn drain_until_result(worker: &mut StatusWorker) -> Vec<Result<StatusDocument, StatusError>> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let completed = worker.drain();
            if !completed.is_empty() || Instant::now() > deadline {
                return completed;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn cache_busting_appends_timestamp_query() {
        assert_eq!(
            cache_busted_url("http://localhost:8080/status.json", 1700000000123),
            "http://localhost:8080/status.json?1700000000123"
        );
        assert_eq!(
            cache_busted_url("http://host/status?agent=pixel", 42),
            "http://host/status?agent=pixel&42"
        );
    }

    #[test]
    fn worker_keeps_at_most_one_request_in_flight() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let mut worker =
            StatusWorker::spawn(Box::new(GatedSource { gate: gate_rx })).expect("worker");

        assert!(worker.request());
        assert!(!worker.request());
        assert!(worker.drain().is_empty());

        gate_tx.send(()).expect("open gate");
        let completed = drain_until_result(&mut worker);
        assert_eq!(completed.len(), 1);
        let document = completed
            .into_iter()
            .next()
            .expect("result")
            .expect("document");
        assert_eq!(document.location_key(), Some("shop"));

        assert!(worker.request());
        drop(gate_tx);
        let completed = drain_until_result(&mut worker);
        assert!(matches!(
            completed.as_slice(),
            [Err(StatusError::WorkerStopped)]
        ));
    }

    #[test]
    fn dropping_worker_does_not_wait_for_outstanding_fetch() {
        let (gate_tx, gate_rx) = mpsc::channel();
        let mut worker =
            StatusWorker::spawn(Box::new(GatedSource { gate: gate_rx })).expect("worker");
        assert!(worker.request());

        let (done_tx, done_rx) = mpsc::channel();
        thread::spawn(move || {
            drop(worker);
            let _ = done_tx.send(());
        });
        let dropped = done_rx.recv_timeout(Duration::from_secs(2));
        drop(gate_tx);

        assert!(dropped.is_ok(), "drop blocked on the outstanding fetch");
    }

    #[test]
    fn idle_worker_is_joined_on_drop() {
        let (_gate_tx, gate_rx) = mpsc::channel::<()>();
        let worker = StatusWorker::spawn(Box::new(GatedSource { gate: gate_rx })).expect("worker");
        drop(worker);
    }

    #[test]
    fn file_source_reads_and_parses_json() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("status.json");
        fs::write(&path, r#"{"zone":"kitchen","activity":"Cooking","mood":"ok"}"#)
            .expect("write status");

        let mut source = FileStatusSource::new(path);
        let document = source.fetch().expect("document");
        assert_eq!(document.location_key(), Some("kitchen"));
        assert_eq!(document.activity.as_deref(), Some("Cooking"));
    }

    #[test]
    fn file_source_reports_missing_and_malformed_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("status.json");
        let mut source = FileStatusSource::new(path.clone());
        assert!(matches!(source.fetch(), Err(StatusError::Io { .. })));

        fs::write(&path, "{\"zone\":").expect("write status");
        assert!(matches!(source.fetch(), Err(StatusError::Parse(_))));
    }

    #[test]
    fn inline_channel_returns_results_in_request_order() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("status.json");
        fs::write(&path, r#"{"location":"desk"}"#).expect("write status");
        let mut channel = InlineStatusChannel::new(Box::new(FileStatusSource::new(path.clone())));

        assert!(channel.request());
        fs::remove_file(&path).expect("remove status");
        assert!(channel.request());

        let completed = channel.drain();
        assert_eq!(completed.len(), 2);
        assert!(completed[0].is_ok());
        assert!(completed[1].is_err());
        assert!(channel.drain().is_empty());
    }
}
