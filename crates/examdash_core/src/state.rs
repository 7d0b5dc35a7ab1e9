use std::path::PathBuf;

use crate::view_model::{
    exam_path, format_file_size, AppViewModel, CardKind, CardView, DeleteModalView, FlashView,
    UploadFormView,
};

/// Server-assigned job identifier (opaque).
pub type JobId = String;
/// Server-assigned exam identifier (opaque).
pub type ExamId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parses a stored value; anything unrecognised counts as "no preference".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamResult {
    pub exam_id: ExamId,
    pub exam_name: String,
}

/// A file that passed validation and is ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardKey {
    /// Temporary key of a placeholder, `loading-{millis}`.
    Loading(String),
    Exam(ExamId),
}

impl CardKey {
    pub fn dom_id(&self) -> String {
        match self {
            CardKey::Loading(temp) => temp.clone(),
            CardKey::Exam(exam_id) => format!("exam-{exam_id}"),
        }
    }
}

/// A card on the exam board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExamCard {
    /// Placeholder shown while the server processes an upload.
    Loading { temp_id: String, file_name: String },
    Ready { exam_id: ExamId, exam_name: String },
}

impl ExamCard {
    pub fn key(&self) -> CardKey {
        match self {
            ExamCard::Loading { temp_id, .. } => CardKey::Loading(temp_id.clone()),
            ExamCard::Ready { exam_id, .. } => CardKey::Exam(exam_id.clone()),
        }
    }

    fn has_key(&self, key: &CardKey) -> bool {
        match (self, key) {
            (ExamCard::Loading { temp_id, .. }, CardKey::Loading(wanted)) => temp_id == wanted,
            (ExamCard::Ready { exam_id, .. }, CardKey::Exam(wanted)) => exam_id == wanted,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashSeverity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub text: String,
    pub severity: FlashSeverity,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDelete {
    pub exam_id: ExamId,
    pub exam_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct UploadForm {
    selected: Option<SelectedFile>,
    progress_visible: bool,
    success_visible: bool,
}

/// Requests, channels and timers whose completion will post a `Msg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct InFlight {
    uploads: usize,
    status_queries: usize,
    channels: usize,
    deletes: usize,
    reloads: usize,
}

impl InFlight {
    fn total(&self) -> usize {
        self.uploads + self.status_queries + self.channels + self.deletes + self.reloads
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    theme: Theme,
    /// Newest first.
    cards: Vec<ExamCard>,
    /// Key of the single active placeholder.
    current_loading: Option<String>,
    /// Job behind the current placeholder, once the server assigned one.
    loading_job: Option<JobId>,
    /// Persisted job whose page-load status query has not answered yet.
    restoring: Option<JobId>,
    /// Mirror of the persisted job reference.
    tracked_job: Option<JobId>,
    /// Job whose channel ended without a completion signal.
    orphaned_job: Option<JobId>,
    form: UploadForm,
    flash: Option<Flash>,
    flash_generation: u64,
    pending_delete: Option<PendingDelete>,
    login_redirecting: bool,
    in_flight: InFlight,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let cards = self
            .cards
            .iter()
            .map(|card| match card {
                ExamCard::Loading { file_name, .. } => CardView {
                    dom_id: card.key().dom_id(),
                    title: "Processing Document".to_string(),
                    kind: CardKind::Loading {
                        file_name: file_name.clone(),
                    },
                },
                ExamCard::Ready { exam_id, exam_name } => CardView {
                    dom_id: card.key().dom_id(),
                    title: exam_name.clone(),
                    kind: CardKind::Ready {
                        exam_id: exam_id.clone(),
                        view_path: exam_path(exam_id),
                    },
                },
            })
            .collect();

        AppViewModel {
            theme: self.theme,
            cards,
            flash: self.flash.as_ref().map(|flash| FlashView {
                text: flash.text.clone(),
                severity: flash.severity,
            }),
            upload: UploadFormView {
                file_name: self.form.selected.as_ref().map(|f| f.name.clone()),
                file_size: self
                    .form
                    .selected
                    .as_ref()
                    .map(|f| format_file_size(f.size)),
                upload_enabled: self.form.selected.is_some(),
                progress_visible: self.form.progress_visible,
                success_visible: self.form.success_visible,
            },
            delete_modal: self.pending_delete.as_ref().map(|pending| DeleteModalView {
                exam_id: pending.exam_id.clone(),
                exam_name: pending.exam_name.clone(),
            }),
            login_enabled: !self.login_redirecting,
            login_label: if self.login_redirecting {
                "Redirecting..."
            } else {
                "Sign in with Google"
            },
            tracked_job: self.tracked_job.clone(),
            orphaned_job: self.orphaned_job.clone(),
            in_flight: self.in_flight.total(),
            dirty: self.dirty,
        }
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Outstanding requests, channels and reload timers.
    pub fn in_flight(&self) -> usize {
        self.in_flight.total()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn cards(&self) -> &[ExamCard] {
        &self.cards
    }

    pub fn current_loading(&self) -> Option<&str> {
        self.current_loading.as_deref()
    }

    pub fn tracked_job(&self) -> Option<&str> {
        self.tracked_job.as_deref()
    }

    /// True until the status of the job found in storage has come back.
    pub fn restoring(&self) -> bool {
        self.restoring.is_some()
    }

    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&PendingDelete> {
        self.pending_delete.as_ref()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            self.theme = theme;
            self.mark_dirty();
        }
    }

    pub(crate) fn selected_file(&self) -> Option<&SelectedFile> {
        self.form.selected.as_ref()
    }

    pub(crate) fn select_file(&mut self, file: SelectedFile) {
        self.form.selected = Some(file);
        self.form.success_visible = false;
        self.mark_dirty();
    }

    pub(crate) fn reset_form(&mut self) {
        let cleared = UploadForm::default();
        if self.form != cleared {
            self.form = cleared;
            self.mark_dirty();
        }
    }

    pub(crate) fn show_progress(&mut self) {
        self.form.progress_visible = true;
        self.mark_dirty();
    }

    /// Clears the selection after an accepted upload and shows the success banner.
    pub(crate) fn complete_form(&mut self) {
        self.form = UploadForm {
            selected: None,
            progress_visible: false,
            success_visible: true,
        };
        self.mark_dirty();
    }

    pub(crate) fn hide_progress(&mut self) {
        if self.form.progress_visible {
            self.form.progress_visible = false;
            self.mark_dirty();
        }
    }

    /// Inserts a placeholder at the top and makes it the current one.
    pub(crate) fn create_loading_card(&mut self, issued_at_ms: i64, file_name: String) -> String {
        let mut temp_id = format!("loading-{issued_at_ms}");
        // Two placeholders created within the same millisecond must not share a key.
        let mut suffix = 1;
        while self.find_card(&CardKey::Loading(temp_id.clone())).is_some() {
            temp_id = format!("loading-{issued_at_ms}-{suffix}");
            suffix += 1;
        }
        self.cards.insert(
            0,
            ExamCard::Loading {
                temp_id: temp_id.clone(),
                file_name,
            },
        );
        self.current_loading = Some(temp_id.clone());
        self.loading_job = None;
        self.mark_dirty();
        temp_id
    }

    /// Re-keys the current placeholder to the exam id and swaps in the result.
    ///
    /// Without a current placeholder the result card is inserted directly.
    /// Returns false when nothing changed.
    pub(crate) fn promote_loading_card(&mut self, result: ExamResult) -> bool {
        let exam_key = CardKey::Exam(result.exam_id.clone());
        let current = self.current_loading.take();
        self.loading_job = None;

        if self.find_card(&exam_key).is_some() {
            // The exam is already on the board; only drop the placeholder.
            if let Some(temp_id) = current {
                self.remove_card(&CardKey::Loading(temp_id));
            }
            return false;
        }

        let slot = current.and_then(|temp_id| self.find_card(&CardKey::Loading(temp_id)));
        let card = ExamCard::Ready {
            exam_id: result.exam_id,
            exam_name: result.exam_name,
        };
        match slot {
            Some(index) => self.cards[index] = card,
            None => self.cards.insert(0, card),
        }
        self.mark_dirty();
        true
    }

    /// True when a placeholder is showing that `job_id` does not own.
    pub(crate) fn placeholder_owned_elsewhere(&self, job_id: &str) -> bool {
        self.current_loading.is_some() && self.loading_job.as_deref() != Some(job_id)
    }

    /// Adds a result card without touching the current placeholder.
    pub(crate) fn insert_exam_card(&mut self, result: ExamResult) -> bool {
        if self.find_card(&CardKey::Exam(result.exam_id.clone())).is_some() {
            return false;
        }
        // Below the active placeholder, which stays on top.
        let index = self
            .current_loading
            .clone()
            .and_then(|temp_id| self.find_card(&CardKey::Loading(temp_id)))
            .map_or(0, |position| position + 1);
        self.cards.insert(
            index,
            ExamCard::Ready {
                exam_id: result.exam_id,
                exam_name: result.exam_name,
            },
        );
        self.mark_dirty();
        true
    }

    pub(crate) fn remove_loading_card(&mut self) {
        self.loading_job = None;
        if let Some(temp_id) = self.current_loading.take() {
            self.remove_card(&CardKey::Loading(temp_id));
        }
    }

    pub(crate) fn remove_exam_card(&mut self, exam_id: &str) -> bool {
        self.remove_card(&CardKey::Exam(exam_id.to_string()))
    }

    /// Records the unresolved job; a showing placeholder now belongs to it.
    pub(crate) fn track_job(&mut self, job_id: JobId) {
        if self.current_loading.is_some() {
            self.loading_job = Some(job_id.clone());
        }
        self.tracked_job = Some(job_id);
        self.orphaned_job = None;
        self.mark_dirty();
    }

    pub(crate) fn untrack_job(&mut self) {
        if self.tracked_job.take().is_some() {
            self.mark_dirty();
        }
        self.orphaned_job = None;
    }

    pub(crate) fn mark_orphaned(&mut self, job_id: JobId) {
        self.orphaned_job = Some(job_id);
        self.mark_dirty();
    }

    /// Shows a flash and returns the generation its expiry timer must carry.
    pub(crate) fn show_flash(&mut self, text: impl Into<String>, severity: FlashSeverity) -> u64 {
        self.flash_generation += 1;
        self.flash = Some(Flash {
            text: text.into(),
            severity,
            generation: self.flash_generation,
        });
        self.mark_dirty();
        self.flash_generation
    }

    pub(crate) fn expire_flash(&mut self, generation: u64) {
        if self
            .flash
            .as_ref()
            .is_some_and(|flash| flash.generation == generation)
        {
            self.flash = None;
            self.mark_dirty();
        }
    }

    pub(crate) fn open_delete_modal(&mut self, pending: PendingDelete) {
        self.pending_delete = Some(pending);
        self.mark_dirty();
    }

    pub(crate) fn take_pending_delete(&mut self) -> Option<PendingDelete> {
        let pending = self.pending_delete.take();
        if pending.is_some() {
            self.mark_dirty();
        }
        pending
    }

    pub(crate) fn begin_restore(&mut self, job_id: JobId) {
        self.restoring = Some(job_id);
    }

    pub(crate) fn finish_restore(&mut self, job_id: &str) {
        if self.restoring.as_deref() == Some(job_id) {
            self.restoring = None;
        }
    }

    pub(crate) fn login_redirecting(&self) -> bool {
        self.login_redirecting
    }

    pub(crate) fn start_login_redirect(&mut self) {
        self.login_redirecting = true;
        self.mark_dirty();
    }

    pub(crate) fn begin_upload(&mut self) {
        self.in_flight.uploads += 1;
    }

    pub(crate) fn end_upload(&mut self) {
        self.in_flight.uploads = self.in_flight.uploads.saturating_sub(1);
    }

    pub(crate) fn begin_status_query(&mut self) {
        self.in_flight.status_queries += 1;
    }

    pub(crate) fn end_status_query(&mut self) {
        self.in_flight.status_queries = self.in_flight.status_queries.saturating_sub(1);
    }

    pub(crate) fn begin_channel(&mut self) {
        self.in_flight.channels += 1;
    }

    pub(crate) fn end_channel(&mut self) {
        self.in_flight.channels = self.in_flight.channels.saturating_sub(1);
    }

    pub(crate) fn begin_delete(&mut self) {
        self.in_flight.deletes += 1;
    }

    pub(crate) fn end_delete(&mut self) {
        self.in_flight.deletes = self.in_flight.deletes.saturating_sub(1);
    }

    pub(crate) fn begin_reload(&mut self) {
        self.in_flight.reloads += 1;
    }

    pub(crate) fn end_reload(&mut self) {
        self.in_flight.reloads = self.in_flight.reloads.saturating_sub(1);
    }

    fn find_card(&self, key: &CardKey) -> Option<usize> {
        self.cards.iter().position(|card| card.has_key(key))
    }

    fn remove_card(&mut self, key: &CardKey) -> bool {
        match self.find_card(key) {
            Some(index) => {
                self.cards.remove(index);
                self.mark_dirty();
                true
            }
            None => false,
        }
    }
}
