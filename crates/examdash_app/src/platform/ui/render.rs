use examdash_core::{AppViewModel, CardKind, FlashSeverity, Theme};

/// How a line should be coloured; the palette depends on the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Heading,
    Plain,
    Muted,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub tone: Tone,
    pub text: String,
}

impl Line {
    fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

pub fn render(view: &AppViewModel, base_url: &str) -> Vec<Line> {
    let base = base_url.trim_end_matches('/');
    let mut lines = vec![Line::new(
        Tone::Heading,
        format!("Exam dashboard ({} theme)", view.theme.as_str()),
    )];

    if let Some(flash) = &view.flash {
        let tone = match flash.severity {
            FlashSeverity::Success => Tone::Success,
            FlashSeverity::Error => Tone::Error,
        };
        lines.push(Line::new(tone, flash.text.clone()));
    }

    let upload = &view.upload;
    if let (Some(name), Some(size)) = (&upload.file_name, &upload.file_size) {
        lines.push(Line::new(Tone::Plain, format!("Selected file: {name} ({size})")));
    }
    if upload.progress_visible {
        lines.push(Line::new(Tone::Muted, "Uploading..."));
    }
    if upload.success_visible {
        lines.push(Line::new(Tone::Success, "Upload complete"));
    }

    for card in &view.cards {
        let text = match &card.kind {
            CardKind::Loading { file_name } => {
                format!("[{}] {}: {}", card.dom_id, card.title, file_name)
            }
            CardKind::Ready { exam_id, view_path } => format!(
                "[{}] {}  view: {base}{view_path}  delete: examdash delete {exam_id}",
                card.dom_id, card.title
            ),
        };
        lines.push(Line::new(Tone::Plain, text));
    }

    if let Some(modal) = &view.delete_modal {
        lines.push(Line::new(
            Tone::Heading,
            format!(
                "Delete \"{}\" (exam {})? This cannot be undone.",
                modal.exam_name, modal.exam_id
            ),
        ));
    }

    if !view.login_enabled {
        lines.push(Line::new(Tone::Muted, view.login_label));
    }

    if let Some(job_id) = &view.orphaned_job {
        lines.push(Line::new(
            Tone::Muted,
            format!("Job {job_id} is still processing; run `examdash resume` to check again."),
        ));
    }

    lines
}

const RESET: &str = "\x1b[0m";

fn palette(theme: Theme, tone: Tone) -> &'static str {
    match (theme, tone) {
        (_, Tone::Plain) => "",
        (Theme::Light, Tone::Heading) => "\x1b[1;34m",
        (Theme::Dark, Tone::Heading) => "\x1b[1;96m",
        (Theme::Light, Tone::Muted) => "\x1b[90m",
        (Theme::Dark, Tone::Muted) => "\x1b[37m",
        (Theme::Light, Tone::Success) => "\x1b[32m",
        (Theme::Dark, Tone::Success) => "\x1b[92m",
        (Theme::Light, Tone::Error) => "\x1b[31m",
        (Theme::Dark, Tone::Error) => "\x1b[91m",
    }
}

pub fn paint(line: &Line, theme: Theme, color: bool) -> String {
    let code = palette(theme, line.tone);
    if !color || code.is_empty() {
        return line.text.clone();
    }
    format!("{code}{}{RESET}", line.text)
}

/// Prints each frame as the lines that were not on screen in the previous one.
pub struct TerminalRenderer {
    base_url: String,
    color: bool,
    shown: Vec<Line>,
}

impl TerminalRenderer {
    pub fn new(base_url: impl Into<String>, color: bool) -> Self {
        Self {
            base_url: base_url.into(),
            color,
            shown: Vec::new(),
        }
    }

    pub fn draw(&mut self, view: &AppViewModel) {
        for text in self.frame(view) {
            println!("{text}");
        }
    }

    fn frame(&mut self, view: &AppViewModel) -> Vec<String> {
        let lines = render(view, &self.base_url);
        let fresh = lines
            .iter()
            .filter(|line| !self.shown.contains(line))
            .map(|line| paint(line, view.theme, self.color))
            .collect();
        self.shown = lines;
        fresh
    }
}
