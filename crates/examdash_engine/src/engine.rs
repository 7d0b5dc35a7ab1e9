use std::io;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use dash_logging::{dash_debug, dash_error};

use crate::{
    ClientSettings, DashboardApi, EngineEvent, JobNotifier, QueryOrigin, ReqwestDashboardApi,
    WebSocketNotifier,
};

enum EngineCommand {
    Upload {
        card_id: String,
        path: PathBuf,
        file_name: String,
    },
    JobStatus {
        job_id: String,
        origin: QueryOrigin,
    },
    WatchJob {
        job_id: String,
    },
    DeleteExam {
        exam_id: String,
    },
}

/// Sends commands to the engine thread. Cheap to clone.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receives completion events from the engine thread.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    /// Starts an engine talking to the real dashboard server.
    pub fn new(settings: &ClientSettings) -> io::Result<(Self, EngineEvents)> {
        let api = ReqwestDashboardApi::new(settings)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
        let notifier = WebSocketNotifier::new(settings)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err.to_string()))?;
        Self::with_backends(Arc::new(api), Arc::new(notifier))
    }

    /// Starts an engine over arbitrary API and notifier implementations.
    pub fn with_backends(
        api: Arc<dyn DashboardApi>,
        notifier: Arc<dyn JobNotifier>,
    ) -> io::Result<(Self, EngineEvents)> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .thread_name("examdash-engine")
            .build()?;

        thread::Builder::new()
            .name("examdash-engine-cmd".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let api = api.clone();
                    let notifier = notifier.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        let event = handle_command(api.as_ref(), notifier.as_ref(), command).await;
                        if event_tx.send(event).is_err() {
                            dash_debug!("engine event dropped; receiver gone");
                        }
                    });
                }
                dash_debug!("engine command loop finished");
            })?;

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    pub fn upload(&self, card_id: impl Into<String>, path: PathBuf, file_name: impl Into<String>) {
        self.send(EngineCommand::Upload {
            card_id: card_id.into(),
            path,
            file_name: file_name.into(),
        });
    }

    /// `origin` is echoed back on the matching `JobStatusFetched`.
    pub fn job_status(&self, job_id: impl Into<String>, origin: QueryOrigin) {
        self.send(EngineCommand::JobStatus {
            job_id: job_id.into(),
            origin,
        });
    }

    pub fn watch_job(&self, job_id: impl Into<String>) {
        self.send(EngineCommand::WatchJob {
            job_id: job_id.into(),
        });
    }

    pub fn delete_exam(&self, exam_id: impl Into<String>) {
        self.send(EngineCommand::DeleteExam {
            exam_id: exam_id.into(),
        });
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            dash_error!("engine thread is gone; command dropped");
        }
    }
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine has shut down.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

async fn handle_command(
    api: &dyn DashboardApi,
    notifier: &dyn JobNotifier,
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::Upload {
            card_id,
            path,
            file_name,
        } => {
            let result = api.upload_pdf(&path, &file_name).await;
            EngineEvent::UploadFinished { card_id, result }
        }
        EngineCommand::JobStatus { job_id, origin } => {
            let result = api.job_status(&job_id).await;
            EngineEvent::JobStatusFetched {
                job_id,
                origin,
                result,
            }
        }
        EngineCommand::WatchJob { job_id } => {
            let result = notifier.wait_for_completion(&job_id).await;
            EngineEvent::ChannelEnded { job_id, result }
        }
        EngineCommand::DeleteExam { exam_id } => {
            let result = api.delete_exam(&exam_id).await;
            EngineEvent::DeleteFinished { exam_id, result }
        }
    }
}
