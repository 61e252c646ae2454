//! Background download task.
//!
//! One task wraps one call into the [`MediaDownloader`] on a blocking worker
//! thread. The worker only talks to the window through the event channel and
//! emits exactly one [`TaskEvent::Finished`] per task, whatever happens inside
//! the downloader.

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
};

use eframe::egui;
use tokio::{runtime::Handle, sync::mpsc::UnboundedSender};
use tracing::{info, warn};

use crate::{
    downloader::MediaDownloader,
    model::{DownloadOutcome, TaskId},
    options::DownloadOptions,
};

/// Message sent from a worker to the window
#[derive(Clone, Debug, PartialEq)]
pub enum TaskEvent {
    Progress { id: TaskId, fraction: f32 },
    Finished { id: TaskId, outcome: DownloadOutcome },
}

/// Schedules the download and returns without waiting for it
pub fn spawn(
    runtime: &Handle,
    id: TaskId,
    url: String,
    options: DownloadOptions,
    downloader: Arc<dyn MediaDownloader>,
    events: UnboundedSender<TaskEvent>,
    ctx: egui::Context,
) {
    runtime.spawn_blocking(move || {
        info!(task = %id, %url, format = %options.format, "download started");

        let report = |fraction: f32| {
            let _ = events.send(TaskEvent::Progress { id, fraction });
            ctx.request_repaint();
        };
        let result = catch_unwind(AssertUnwindSafe(|| {
            downloader.download(&url, &options, &report)
        }));

        let outcome = match result {
            Ok(Ok(())) => {
                info!(task = %id, "download finished");
                DownloadOutcome::Success
            }
            Ok(Err(e)) => {
                warn!(task = %id, error = %e, "download failed");
                DownloadOutcome::Failure(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(task = %id, %message, "downloader panicked");
                DownloadOutcome::Failure(message)
            }
        };

        // The window may already be gone; nothing left to notify then.
        let _ = events.send(TaskEvent::Finished { id, outcome });
        ctx.request_repaint();
    });
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_owned());
    format!("internal error: {detail}")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::downloader::DownloadError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::{
        runtime::Runtime,
        sync::mpsc::{UnboundedReceiver, unbounded_channel},
    };

    /// Collaborator double returning a canned result
    pub(crate) struct FakeDownloader {
        pub result: Result<(), DownloadError>,
        pub calls: AtomicUsize,
    }

    impl FakeDownloader {
        pub(crate) fn ok() -> Self {
            Self { result: Ok(()), calls: AtomicUsize::new(0) }
        }

        pub(crate) fn failing(message: &str) -> Self {
            Self {
                result: Err(DownloadError(message.to_owned())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MediaDownloader for FakeDownloader {
        fn download(
            &self,
            _url: &str,
            _options: &DownloadOptions,
            progress: &dyn Fn(f32),
        ) -> Result<(), DownloadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            progress(0.5);
            self.result.clone()
        }
    }

    struct PanickingDownloader;

    impl MediaDownloader for PanickingDownloader {
        fn download(
            &self,
            _url: &str,
            _options: &DownloadOptions,
            _progress: &dyn Fn(f32),
        ) -> Result<(), DownloadError> {
            panic!("extractor exploded")
        }
    }

    fn opts() -> DownloadOptions {
        DownloadOptions {
            format: "best".to_owned(),
            output_template: "/tmp/out/%(title)s.mp4".to_owned(),
        }
    }

    /// Runs one task to completion and returns every event it sent
    fn run(downloader: Arc<dyn MediaDownloader>) -> Vec<TaskEvent> {
        let rt = Runtime::new().unwrap();
        let (tx, mut rx): (_, UnboundedReceiver<TaskEvent>) = unbounded_channel();
        spawn(
            rt.handle(),
            TaskId(7),
            "https://example.com/v".to_owned(),
            opts(),
            downloader,
            tx,
            egui::Context::default(),
        );
        let mut events = Vec::new();
        // The channel closes once the worker drops its sender.
        while let Some(event) = rx.blocking_recv() {
            events.push(event);
        }
        events
    }

    fn finished(events: &[TaskEvent]) -> Vec<&DownloadOutcome> {
        events
            .iter()
            .filter_map(|e| match e {
                TaskEvent::Finished { id, outcome } => {
                    assert_eq!(*id, TaskId(7));
                    Some(outcome)
                }
                TaskEvent::Progress { .. } => None,
            })
            .collect()
    }

    #[test]
    fn success_is_reported_once() {
        let fake = Arc::new(FakeDownloader::ok());
        let events = run(fake.clone());
        assert_eq!(finished(&events), [&DownloadOutcome::Success]);
        assert_eq!(fake.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            events.first(),
            Some(&TaskEvent::Progress { id: TaskId(7), fraction: 0.5 })
        );
        assert!(matches!(events.last(), Some(TaskEvent::Finished { .. })));
    }

    #[test]
    fn failure_message_is_kept_verbatim() {
        let events = run(Arc::new(FakeDownloader::failing("network timeout")));
        assert_eq!(
            finished(&events),
            [&DownloadOutcome::Failure("network timeout".to_owned())]
        );
    }

    #[test]
    fn panic_becomes_single_failure() {
        let events = run(Arc::new(PanickingDownloader));
        let outcomes = finished(&events);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(
            outcomes[0],
            &DownloadOutcome::Failure("internal error: extractor exploded".to_owned())
        );
    }
}
