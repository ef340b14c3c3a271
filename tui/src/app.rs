use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use tokio::time::Duration;

use slidegen_core::{Config, GenerationResult, GenerationSession, GenerationStatus};

use crate::form::{Focus, FormState};
use crate::preview::PreviewGrid;

const FORM_TITLE: &str =
    "Create Presentation (Tab: next field, Space: toggle, Enter: generate, Esc: quit)";
const NOTHING_TO_SAVE: &str = "Nothing to save until generation is Ready";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Submit,
    Save,
    NextField,
    PrevField,
    Toggle,
    Insert(char),
    Backspace,
    Ignore,
}

/// Map a key press to what it does with the given field focused.
pub fn key_action(key: KeyEvent, focus: Focus) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::Ignore;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let choice = matches!(focus, Focus::Mode | Focus::Style);

    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('q') if ctrl => KeyAction::Quit,
        KeyCode::Char('s') if ctrl => KeyAction::Save,
        KeyCode::Char('g') if ctrl => KeyAction::Submit,
        KeyCode::Tab | KeyCode::Down => KeyAction::NextField,
        KeyCode::BackTab | KeyCode::Up => KeyAction::PrevField,
        KeyCode::Enter if focus == Focus::Description => KeyAction::Insert('\n'),
        KeyCode::Enter => KeyAction::Submit,
        KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right if choice => KeyAction::Toggle,
        KeyCode::Backspace => KeyAction::Backspace,
        KeyCode::Char(c) if !ctrl => KeyAction::Insert(c),
        _ => KeyAction::Ignore,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Notice {
    Info(String),
    Error(String),
}

/// One-line summary of the current cycle.
pub fn status_text(result: &GenerationResult, file_name: &str) -> String {
    match result.status() {
        GenerationStatus::Idle => "Fill in the form and press Enter to generate".to_string(),
        GenerationStatus::Submitting => "Generating...".to_string(),
        GenerationStatus::Ready => format!(
            "Ready: {} slide previews. Ctrl-S saves {file_name}",
            result.preview_images().len()
        ),
        GenerationStatus::Failed => match result.error() {
            Some(e) => format!("Failed: {e}"),
            None => "Failed".to_string(),
        },
    }
}

/// Raw mode and the alternate screen, undone on drop so an error inside
/// the loop still hands the terminal back intact.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("Could not leave raw mode: {e}");
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
            tracing::warn!("Could not restore the screen: {e}");
        }
    }
}

pub struct GeneratorApp {
    running: bool,
    form: FormState,
    session: GenerationSession,
    result: GenerationResult,
    notice: Option<Notice>,
    config: Config,
}

impl GeneratorApp {
    pub fn new(session: GenerationSession, config: Config) -> Self {
        let result = session.snapshot();
        Self {
            running: true,
            form: FormState::new(),
            session,
            result,
            notice: None,
            config,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut watcher = self.session.subscribe();

        let _guard = TerminalGuard::enter()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        while self.running {
            terminal.draw(|f| self.draw(f))?;

            tokio::select! {
                changed = watcher.changed() => {
                    if let Some(result) = changed {
                        self.on_result(result);
                    }
                }
                event_result = tokio::task::spawn_blocking(poll_input) => {
                    if let Ok(Ok(true)) = event_result {
                        if let Ok(Event::Key(key)) = event::read() {
                            self.handle_key(key).await;
                        }
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        match key_action(key, self.form.focus()) {
            KeyAction::Quit => self.running = false,
            KeyAction::Submit => self.submit(),
            KeyAction::Save => self.save().await,
            KeyAction::NextField => self.form.focus_next(),
            KeyAction::PrevField => self.form.focus_prev(),
            KeyAction::Toggle => self.form.toggle(),
            KeyAction::Insert(c) => self.form.insert_char(c),
            KeyAction::Backspace => self.form.backspace(),
            KeyAction::Ignore => {}
        }
    }

    fn submit(&mut self) {
        match self.session.submit(self.form.fields()) {
            // Completion arrives through the watcher.
            Ok(_handle) => self.notice = None,
            Err(e) => self.notice = Some(Notice::Error(e.to_string())),
        }
    }

    async fn save(&mut self) {
        let Some(handoff) = self.session.download() else {
            self.notice = Some(Notice::Error(NOTHING_TO_SAVE.to_string()));
            return;
        };
        let handoff = handoff.with_file_name(self.config.file_name.clone());
        self.notice = Some(match handoff.save_to(&self.config.output_dir).await {
            Ok(path) => Notice::Info(format!("Saved {}", path.display())),
            Err(e) => Notice::Error(format!("Could not save presentation: {e}")),
        });
    }

    fn on_result(&mut self, result: GenerationResult) {
        tracing::debug!("Submission {} is now {:?}", result.token(), result.status());
        self.result = result;
    }

    fn draw(&self, f: &mut Frame) {
        let form_rows = self.form.rows();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(form_rows.len() as u16 + 2),
                Constraint::Length(4),
                Constraint::Min(3),
            ])
            .split(f.area());

        let lines: Vec<Line> = form_rows
            .into_iter()
            .map(|(focus, label, value)| {
                let value = value.replace('\n', " / ");
                if focus == self.form.focus() {
                    Line::from(format!("> {label}: {value}"))
                        .style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    Line::from(format!("  {label}: {value}"))
                }
            })
            .collect();
        let form_block = Block::default().title(FORM_TITLE).borders(Borders::ALL);
        let form = Paragraph::new(lines).block(form_block);
        f.render_widget(form, chunks[0]);

        let mut status = vec![Line::from(status_text(&self.result, &self.config.file_name))];
        match &self.notice {
            Some(Notice::Info(msg)) => status.push(Line::from(msg.as_str())),
            Some(Notice::Error(msg)) => {
                status.push(Line::from(msg.as_str()).style(Style::default().fg(Color::Red)))
            }
            None => {}
        }
        let status = Paragraph::new(status)
            .block(Block::default().title("Status").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(status, chunks[1]);

        let preview_block = Block::default().title("Slide Preview").borders(Borders::ALL);
        let inner = preview_block.inner(chunks[2]);
        f.render_widget(preview_block, chunks[2]);
        f.render_widget(
            PreviewGrid::new(self.result.preview_images()).columns(self.config.preview_columns),
            inner,
        );
    }
}

fn poll_input() -> io::Result<bool> {
    event::poll(Duration::from_millis(100))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use slidegen_common::{ContentMode, FormFields, GenerationRequest, ValidationError};
    use slidegen_core::{GenerationClient, GenerationError, GenerationOutcome, TransportError};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Answers every call with the same outcome, or never answers when `None`.
    struct FixedClient {
        outcome: Option<GenerationOutcome>,
        calls: AtomicUsize,
    }

    impl FixedClient {
        fn new(outcome: Option<GenerationOutcome>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl GenerationClient for FixedClient {
        async fn generate(&self, _request: &GenerationRequest) -> GenerationOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Some(outcome) => outcome.clone(),
                None => std::future::pending().await,
            }
        }
    }

    fn server_error() -> GenerationError {
        GenerationError::GenerationFailed(TransportError::Status {
            status: 500,
            detail: "Failed to generate presentation content".to_string(),
        })
    }

    fn app_with(client: Arc<FixedClient>, output_dir: &Path) -> GeneratorApp {
        let config = Config {
            output_dir: output_dir.to_path_buf(),
            ..Config::default()
        };
        GeneratorApp::new(GenerationSession::new(client), config)
    }

    fn filled_form(app: &mut GeneratorApp) {
        "Q1 Review".chars().for_each(|c| app.form.insert_char(c));
        app.form.focus_next();
        "Alice".chars().for_each(|c| app.form.insert_char(c));
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_enter_submits_except_in_description() {
        assert_eq!(key_action(press(KeyCode::Enter), Focus::Title), KeyAction::Submit);
        assert_eq!(key_action(press(KeyCode::Enter), Focus::Style), KeyAction::Submit);
        assert_eq!(
            key_action(press(KeyCode::Enter), Focus::Description),
            KeyAction::Insert('\n')
        );
        assert_eq!(key_action(ctrl('g'), Focus::Description), KeyAction::Submit);
    }

    #[test]
    fn test_space_toggles_only_choice_fields() {
        assert_eq!(key_action(press(KeyCode::Char(' ')), Focus::Mode), KeyAction::Toggle);
        assert_eq!(key_action(press(KeyCode::Right), Focus::Style), KeyAction::Toggle);
        assert_eq!(
            key_action(press(KeyCode::Char(' ')), Focus::Title),
            KeyAction::Insert(' ')
        );
        assert_eq!(key_action(press(KeyCode::Left), Focus::Title), KeyAction::Ignore);
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(key_action(ctrl('q'), Focus::Title), KeyAction::Quit);
        assert_eq!(key_action(ctrl('s'), Focus::Author), KeyAction::Save);
        assert_eq!(key_action(ctrl('x'), Focus::Author), KeyAction::Ignore);
        assert_eq!(key_action(press(KeyCode::Esc), Focus::Author), KeyAction::Quit);
        assert_eq!(key_action(press(KeyCode::BackTab), Focus::Author), KeyAction::PrevField);
    }

    #[test]
    fn test_key_release_ignored() {
        let mut key = press(KeyCode::Enter);
        key.kind = KeyEventKind::Release;
        assert_eq!(key_action(key, Focus::Title), KeyAction::Ignore);
    }

    #[tokio::test]
    async fn test_blank_description_is_reported_without_submitting() {
        let dir = tempfile::tempdir().unwrap();
        let client = FixedClient::new(None);
        let mut app = app_with(client.clone(), dir.path());
        filled_form(&mut app);
        app.form.focus_next();
        app.form.focus_next();
        app.form.toggle();
        assert_eq!(app.form.fields().content_mode, ContentMode::Manual);

        app.submit();

        assert_eq!(app.session.status(), GenerationStatus::Idle);
        assert_eq!(
            app.notice,
            Some(Notice::Error(ValidationError::MissingDescription.to_string()))
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_save_refused_until_ready() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("decks");
        let nothing = Some(Notice::Error(NOTHING_TO_SAVE.to_string()));

        // Idle
        let mut app = app_with(FixedClient::new(None), &out);
        app.save().await;
        assert_eq!(app.notice, nothing);

        // Submitting
        filled_form(&mut app);
        app.submit();
        assert_eq!(app.session.status(), GenerationStatus::Submitting);
        app.save().await;
        assert_eq!(app.notice, nothing);

        // Failed
        let failing = FixedClient::new(Some(GenerationOutcome::Failure(server_error())));
        let mut app = app_with(failing, &out);
        filled_form(&mut app);
        let fields: FormFields = app.form.fields().clone();
        let result = app.session.submit(&fields).unwrap().wait().await;
        assert_eq!(result.status(), GenerationStatus::Failed);
        app.save().await;
        assert_eq!(app.notice, nothing);

        assert!(!out.exists());
    }

    #[tokio::test]
    async fn test_save_writes_ready_presentation() {
        let dir = tempfile::tempdir().unwrap();
        let ready = GenerationOutcome::Success {
            artifact: slidegen_core::Artifact::new(b"PK\x03\x04".to_vec(), None),
            previews: Vec::new(),
        };
        let mut app = app_with(FixedClient::new(Some(ready)), dir.path());
        filled_form(&mut app);
        let fields = app.form.fields().clone();
        app.session.submit(&fields).unwrap().wait().await;

        app.save().await;

        let path = dir.path().join("presentation.pptx");
        assert_eq!(app.notice, Some(Notice::Info(format!("Saved {}", path.display()))));
        assert_eq!(std::fs::read(path).unwrap(), b"PK\x03\x04");
    }

    #[tokio::test]
    async fn test_status_text_shows_failure_reason() {
        let failing = FixedClient::new(Some(GenerationOutcome::Failure(server_error())));
        let session = GenerationSession::new(failing);
        assert_eq!(
            status_text(&session.snapshot(), "presentation.pptx"),
            "Fill in the form and press Enter to generate"
        );

        let fields = FormFields {
            title: "Q1 Review".to_string(),
            author: "Alice".to_string(),
            ..FormFields::default()
        };
        let result = session.submit(&fields).unwrap().wait().await;

        assert_eq!(
            status_text(&result, "presentation.pptx"),
            format!("Failed: {}", server_error())
        );
        assert_eq!(
            status_text(&result, "presentation.pptx"),
            "Failed: Presentation generation failed: service responded with HTTP 500: \
             Failed to generate presentation content"
        );
    }
}
