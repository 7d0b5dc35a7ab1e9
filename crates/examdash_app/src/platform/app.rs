use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};

use anyhow::Context;
use chrono::Utc;
use dash_logging::{dash_debug, dash_info};
use examdash_core::{update, AppState, Effect, Msg};
use examdash_engine::{ClientSettings, EngineHandle};

use super::effects::EffectRunner;
use super::files::candidate_from_path;
use super::persistence::Persistence;
use super::ui;
use super::ui::render::TerminalRenderer;

/// Everything the page-load sequence needs.
pub struct PageConfig {
    pub settings: ClientSettings,
    pub state_dir: PathBuf,
    pub prefers_dark: bool,
}

/// The user interaction a single invocation performs after page load.
pub enum Action {
    Upload {
        file: PathBuf,
    },
    Resume,
    Delete {
        exam_id: String,
        exam_name: String,
        confirmed: bool,
    },
    Theme {
        toggle: bool,
    },
    Login,
}

pub fn run_app(page: PageConfig, action: Action) -> anyhow::Result<()> {
    let (engine, events) =
        EngineHandle::new(&page.settings).context("failed to start the request engine")?;
    let persistence = Persistence::new(&page.state_dir);
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();

    let runner = EffectRunner::new(
        engine,
        events,
        persistence.clone(),
        page.settings.base_url.clone(),
        msg_tx.clone(),
    );
    let renderer = TerminalRenderer::new(
        page.settings.base_url.clone(),
        std::io::stdout().is_terminal(),
    );

    let mut dashboard = Dashboard {
        state: AppState::new(),
        runner,
        renderer,
        persistence,
        prefers_dark: page.prefers_dark,
        msg_tx,
        msg_rx,
    };

    dashboard.load_page();
    // The command acts on the restored board, not on one still reconciling.
    dashboard.run_until(|state| !state.restoring());
    dashboard.refresh();
    dashboard.perform(action)?;
    dashboard.run_until(|state| state.in_flight() == 0);
    Ok(())
}

struct Dashboard {
    state: AppState,
    runner: EffectRunner,
    renderer: TerminalRenderer,
    persistence: Persistence,
    prefers_dark: bool,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
}

impl Dashboard {
    /// Theme first, then the persisted job.
    fn load_page(&mut self) {
        self.post(Msg::ThemeRestored {
            saved: self.persistence.load_theme(),
            prefers_dark: self.prefers_dark,
        });
        self.post(Msg::RestoreJob(self.persistence.load_job_id()));
    }

    fn perform(&mut self, action: Action) -> anyhow::Result<()> {
        match action {
            Action::Upload { file } => {
                let candidate = candidate_from_path(&file)
                    .with_context(|| format!("cannot read {}", file.display()))?;
                self.dispatch(Msg::FileChosen(candidate));
                // A rejected file already produced its own flash.
                if self.state.view().upload.upload_enabled {
                    self.dispatch(Msg::UploadSubmitted {
                        issued_at_ms: Utc::now().timestamp_millis(),
                    });
                }
            }
            Action::Resume => {}
            Action::Delete {
                exam_id,
                exam_name,
                confirmed,
            } => {
                self.dispatch(Msg::DeleteRequested { exam_id, exam_name });
                let confirmed = match self.state.view().delete_modal {
                    Some(modal) if !confirmed => ui::prompt::confirm_delete(&modal)
                        .context("failed to read the confirmation")?,
                    _ => confirmed,
                };
                self.dispatch(if confirmed {
                    Msg::DeleteConfirmed
                } else {
                    Msg::DeleteCancelled
                });
            }
            Action::Theme { toggle } => {
                if toggle {
                    self.dispatch(Msg::ThemeToggled);
                }
            }
            Action::Login => self.dispatch(Msg::LoginClicked),
        }
        Ok(())
    }

    fn refresh(&mut self) {
        self.renderer.draw(&self.state.view());
    }

    fn post(&self, msg: Msg) {
        // The receiver lives in `self`, so this cannot fail.
        let _ = self.msg_tx.send(msg);
    }

    /// Handles messages until the queue is empty and `settled` holds.
    fn run_until(&mut self, settled: impl Fn(&AppState) -> bool) {
        loop {
            let msg = match self.msg_rx.try_recv() {
                Ok(msg) => msg,
                Err(TryRecvError::Empty) if settled(&self.state) => return,
                Err(TryRecvError::Empty) => match self.msg_rx.recv() {
                    Ok(msg) => msg,
                    Err(_) => return,
                },
                Err(TryRecvError::Disconnected) => return,
            };
            self.dispatch(msg);
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        dash_debug!("dispatch {:?}", msg);
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        if state.consume_dirty() {
            self.renderer.draw(&state.view());
        }
        self.state = state;

        for effect in effects {
            match effect {
                Effect::ReloadPage => self.reload(),
                other => self.runner.run(other),
            }
        }
    }

    fn reload(&mut self) {
        dash_info!("reloading dashboard");
        self.state = AppState::new();
        self.load_page();
    }
}
