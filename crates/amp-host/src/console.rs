//! Stdin command loop.

use crate::terminal::{EditorView, PendingAnswer};
use amp_client::{Command, Input};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

const HELP: &str = "\
commands:
  open <path>      make <path> the active document
  close            close the active document
  folder <name>    set the workspace folder
  no-folder        close the workspace folder
  connect          connect to the stored endpoint
  set-url          enter a new endpoint
  options          reconnect / change URL / show uptime
  hello            greeting
  ping             send a test message
  quit             disconnect and exit";

/// One parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Open(PathBuf),
    Close,
    Folder(String),
    NoFolder,
    Command(Command),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse(line: &str) -> Line {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match (word, rest) {
        ("", _) => Line::Empty,
        ("open", path) if !path.is_empty() => Line::Open(PathBuf::from(path)),
        ("close", "") => Line::Close,
        ("folder", name) if !name.is_empty() => Line::Folder(name.to_string()),
        ("no-folder", "") => Line::NoFolder,
        ("connect", "") => Line::Command(Command::Connect),
        ("set-url", "") => Line::Command(Command::SetEndpoint),
        ("options", "") => Line::Command(Command::ShowOptions),
        ("hello", "") => Line::Command(Command::Hello),
        ("ping", "") => Line::Command(Command::SendTestMessage),
        ("help", _) => Line::Help,
        ("quit" | "exit", "") => Line::Quit,
        _ => Line::Unknown(line.to_string()),
    }
}

/// Read stdin until `quit`, EOF or Ctrl-C, feeding the session. Dropping
/// `inputs` on exit is what ends the session.
pub async fn run(editor: EditorView, answers: PendingAnswer, inputs: mpsc::Sender<Input>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("stdin: {}", e);
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        };

        let Err(line) = answers.offer(line) else {
            continue;
        };

        let input = match parse(&line) {
            Line::Open(path) => {
                editor.open(path);
                Input::ActiveDocumentChanged
            }
            Line::Close => {
                editor.close();
                Input::ActiveDocumentChanged
            }
            Line::Folder(name) => {
                editor.set_folder(Some(name));
                Input::WorkspaceFoldersChanged
            }
            Line::NoFolder => {
                editor.set_folder(None);
                Input::WorkspaceFoldersChanged
            }
            Line::Command(command) => Input::Command(command),
            Line::Help => {
                println!("{HELP}");
                continue;
            }
            Line::Quit => break,
            Line::Empty => continue,
            Line::Unknown(line) => {
                println!("unknown command: {line} (try `help`)");
                continue;
            }
        };

        if inputs.send(input).await.is_err() {
            break;
        }
    }

    answers.cancel();
}
