//! Test doubles shared by the session tests.
#![allow(dead_code)]

use amp_client::{
    Dialer, EditorSurface, InputPrompt, Link, LinkEvent, LinkId, Notifier, Outbound,
    SettingsError, SettingsStore, StatusBar,
};
use amp_core::{Endpoint, Level, Notice};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
pub struct HostState {
    pub notices: Vec<Notice>,
    pub statuses: Vec<String>,
    pub answers: VecDeque<Option<String>>,
    pub choices: VecDeque<Option<usize>>,
    pub prompts: usize,
    pub stored: Option<String>,
    pub document: Option<PathBuf>,
    pub folder: Option<String>,
}

/// Records everything the session asks of its host.
#[derive(Debug, Clone, Default)]
pub struct FakeHost(pub Arc<Mutex<HostState>>);

impl FakeHost {
    pub fn with_endpoint(endpoint: &str) -> Self {
        let host = Self::default();
        host.state().stored = Some(endpoint.to_string());
        host
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.0.lock().unwrap()
    }

    pub fn answer(&self, answer: Option<&str>) {
        self.state().answers.push_back(answer.map(str::to_string));
    }

    pub fn pick(&self, choice: Option<usize>) {
        self.state().choices.push_back(choice);
    }

    pub fn last_status(&self) -> Option<String> {
        self.state().statuses.last().cloned()
    }

    pub fn saw(&self, level: Level, text: &str) -> bool {
        self.state()
            .notices
            .iter()
            .any(|n| n.level == level && n.text == text)
    }

    pub fn errors(&self) -> Vec<String> {
        self.state()
            .notices
            .iter()
            .filter(|n| n.level == Level::Error)
            .map(|n| n.text.clone())
            .collect()
    }
}

impl Notifier for FakeHost {
    fn notify(&mut self, notice: Notice) {
        self.state().notices.push(notice);
    }
}

impl StatusBar for FakeHost {
    fn set_status(&mut self, text: &str) {
        self.state().statuses.push(text.to_string());
    }
}

impl InputPrompt for FakeHost {
    async fn prompt(&mut self, _message: &str, _placeholder: &str) -> Option<String> {
        let mut state = self.state();
        state.prompts += 1;
        state.answers.pop_front().flatten()
    }

    async fn choose(&mut self, _title: &str, _options: &[&'static str]) -> Option<usize> {
        self.state().choices.pop_front().flatten()
    }
}

impl SettingsStore for FakeHost {
    fn endpoint(&self) -> Option<String> {
        self.state().stored.clone()
    }

    fn set_endpoint(&mut self, endpoint: &Endpoint) -> Result<(), SettingsError> {
        self.state().stored = Some(endpoint.to_string());
        Ok(())
    }
}

impl EditorSurface for FakeHost {
    fn active_document(&self) -> Option<PathBuf> {
        self.state().document.clone()
    }

    fn workspace_folder(&self) -> Option<String> {
        self.state().folder.clone()
    }
}

#[derive(Debug, Default)]
pub struct Dialed {
    pub links: Vec<(LinkId, String)>,
    pub outbound: Vec<mpsc::UnboundedReceiver<Outbound>>,
}

/// Hands out links backed by plain channels; nothing touches the network.
#[derive(Debug, Clone, Default)]
pub struct FakeDialer(pub Arc<Mutex<Dialed>>);

impl FakeDialer {
    pub fn dial_count(&self) -> usize {
        self.0.lock().unwrap().links.len()
    }

    pub fn last_id(&self) -> LinkId {
        self.0.lock().unwrap().links.last().unwrap().0
    }

    pub fn last_uri(&self) -> String {
        self.0.lock().unwrap().links.last().unwrap().1.clone()
    }

    /// Everything queued on the most recent link so far.
    pub fn drain_last(&self) -> Vec<Outbound> {
        let mut dialed = self.0.lock().unwrap();
        let rx = dialed.outbound.last_mut().unwrap();
        let mut frames = Vec::new();
        while let Ok(frame) = rx.try_recv() {
            frames.push(frame);
        }
        frames
    }

    pub fn texts_last(&self) -> Vec<String> {
        self.drain_last()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Text(t) => Some(t),
                Outbound::Close => None,
            })
            .collect()
    }
}

impl Dialer for FakeDialer {
    fn dial(
        &mut self,
        id: LinkId,
        endpoint: &Endpoint,
        _events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Link {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut dialed = self.0.lock().unwrap();
        dialed.links.push((id, endpoint.to_string()));
        dialed.outbound.push(rx);
        Link::new(id, tx, None)
    }
}
