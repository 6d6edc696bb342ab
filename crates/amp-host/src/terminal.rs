//! `Host` implementation backed by the terminal.

use amp_client::{
    EditorSurface, FileSettings, InputPrompt, Notifier, SettingsError, SettingsStore, StatusBar,
};
use amp_core::{Endpoint, Level, Notice};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// What the "editor" currently shows. Written by the console, read by the
/// session through [`EditorSurface`].
#[derive(Debug, Clone, Default)]
pub struct EditorView(Arc<Mutex<EditorState>>);

#[derive(Debug, Default)]
struct EditorState {
    document: Option<PathBuf>,
    folder: Option<String>,
}

impl EditorView {
    /// Start with no document open and the workspace directory as the folder.
    pub fn for_workspace(workspace: &Path) -> Self {
        let folder = workspace
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        Self(Arc::new(Mutex::new(EditorState {
            document: None,
            folder,
        })))
    }

    fn with<T>(&self, f: impl FnOnce(&mut EditorState) -> T) -> T {
        let mut state = self.0.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    pub fn open(&self, path: PathBuf) {
        self.with(|s| s.document = Some(path));
    }

    pub fn close(&self) {
        self.with(|s| s.document = None);
    }

    pub fn set_folder(&self, folder: Option<String>) {
        self.with(|s| s.folder = folder);
    }

    pub fn document(&self) -> Option<PathBuf> {
        self.with(|s| s.document.clone())
    }

    pub fn folder(&self) -> Option<String> {
        self.with(|s| s.folder.clone())
    }
}

/// Slot for the answer to an outstanding prompt. While it is filled, the
/// console routes the next input line here instead of parsing it.
#[derive(Debug, Clone, Default)]
pub struct PendingAnswer(Arc<Mutex<Option<oneshot::Sender<String>>>>);

impl PendingAnswer {
    fn wait(&self) -> oneshot::Receiver<String> {
        let (tx, rx) = oneshot::channel();
        *self.0.lock().unwrap_or_else(|e| e.into_inner()) = Some(tx);
        rx
    }

    /// Hand `line` to a waiting prompt. Gives the line back if nobody waits.
    pub fn offer(&self, line: String) -> Result<(), String> {
        let waiting = self.0.lock().unwrap_or_else(|e| e.into_inner()).take();
        match waiting {
            Some(tx) => tx.send(line),
            None => Err(line),
        }
    }

    /// Cancel any outstanding prompt.
    pub fn cancel(&self) {
        self.0.lock().unwrap_or_else(|e| e.into_inner()).take();
    }
}

pub struct TerminalHost {
    settings: FileSettings,
    editor: EditorView,
    answers: PendingAnswer,
    status: String,
}

impl TerminalHost {
    pub fn new(settings: FileSettings, editor: EditorView, answers: PendingAnswer) -> Self {
        Self {
            settings,
            editor,
            answers,
            status: String::new(),
        }
    }

    async fn read_answer(&self) -> Option<String> {
        self.answers.wait().await.ok()
    }
}

impl Notifier for TerminalHost {
    fn notify(&mut self, notice: Notice) {
        match notice.level {
            Level::Info => {
                tracing::debug!(text = %notice.text, "notice");
                println!("[info] {}", notice.text);
            }
            Level::Error => {
                tracing::debug!(text = %notice.text, "error notice");
                println!("[error] {}", notice.text);
            }
        }
    }
}

impl StatusBar for TerminalHost {
    fn set_status(&mut self, text: &str) {
        // The refresh timer re-renders every second; only print changes.
        if self.status != text {
            self.status = text.to_string();
            println!("status: {}", strip_icons(text));
        }
    }
}

impl InputPrompt for TerminalHost {
    async fn prompt(&mut self, message: &str, placeholder: &str) -> Option<String> {
        println!("{message} (e.g. {placeholder}; empty line cancels):");
        self.read_answer().await
    }

    async fn choose(&mut self, title: &str, options: &[&'static str]) -> Option<usize> {
        println!("{title}:");
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        let answer = self.read_answer().await?;
        parse_choice(&answer, options)
    }
}

impl SettingsStore for TerminalHost {
    fn endpoint(&self) -> Option<String> {
        self.settings.endpoint()
    }

    fn set_endpoint(&mut self, endpoint: &Endpoint) -> Result<(), SettingsError> {
        self.settings.set_endpoint(endpoint)
    }
}

impl EditorSurface for TerminalHost {
    fn active_document(&self) -> Option<PathBuf> {
        self.editor.document()
    }

    fn workspace_folder(&self) -> Option<String> {
        self.editor.folder()
    }
}

/// Accept a 1-based index or an option label (case-insensitive).
fn parse_choice(answer: &str, options: &[&str]) -> Option<usize> {
    let answer = answer.trim();
    if let Ok(n) = answer.parse::<usize>() {
        return (1..=options.len()).contains(&n).then(|| n - 1);
    }
    options.iter().position(|o| o.eq_ignore_ascii_case(answer))
}

/// Drop `$(icon)` markers, which only editors render.
fn strip_icons(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("$(") {
        out.push_str(&rest[..start]);
        match rest[start..].find(')') {
            Some(end) => rest = &rest[start + end + 1..],
            None => {
                rest = &rest[start..];
                break;
            }
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}
