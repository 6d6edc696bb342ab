//! The session context.
//!
//! A [`Session`] owns everything that used to be process-wide: the connection
//! state, the single live link, the editor snapshot and the session start
//! time. It is created by [`Session::init`] when the host activates and
//! released by [`Session::teardown`] when it deactivates.
//!
//! All handlers run to completion on one task. Socket edges arrive as
//! [`LinkEvent`]s on a channel and go through the same
//! [`transition`](amp_core::transition) as operator requests, so a snapshot
//! mutation always finishes before any broadcast it triggers is serialized.

use crate::command::{Command, OptionChoice};
use crate::config::ClientConfig;
use crate::host::Host;
use crate::link::{Dialer, Link, LinkEvent, LinkId};
use amp_core::{
    BroadcastMessage, ConnectionEvent, ConnectionState, EditorSnapshot, Effect, Endpoint,
    EndpointParseError, Error, Notice, Transition, Uptime, transition,
};
use std::time::Instant;
use tokio::sync::mpsc;

const ENDPOINT_PROMPT: &str = "Enter the WebSocket server URL";
const ENDPOINT_PLACEHOLDER: &str = "ws://localhost:8080";
const OPTIONS_TITLE: &str = "amp";
const GREETING: &str = "Hello World from amp!";
const TEST_MESSAGE: &str = "Hello from amp!";

/// Outcome of a connect request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new link was dialed.
    Dialing,
    /// A link was already open or connecting; nothing happened.
    AlreadyConnected,
}

/// Inputs the host feeds into [`Session::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    ActiveDocumentChanged,
    WorkspaceFoldersChanged,
}

pub struct Session<H, D> {
    host: H,
    dialer: D,
    config: ClientConfig,
    state: ConnectionState,
    snapshot: EditorSnapshot,
    link: Option<Link>,
    next_link: u64,
    events_tx: mpsc::UnboundedSender<LinkEvent>,
    events_rx: mpsc::UnboundedReceiver<LinkEvent>,
}

impl<H: Host, D: Dialer> Session<H, D> {
    /// Activate: capture the start time, read the editor surface, and either
    /// connect to the stored endpoint or ask for one.
    pub async fn init(host: H, dialer: D, config: ClientConfig) -> Self {
        let mut session = Self::new(host, dialer, config, Instant::now());
        session.refresh_status();

        match session.stored_endpoint() {
            Some(stored) if session.config.connect_on_start => {
                session.connect_or_report(stored.as_str());
            }
            Some(_) => {}
            None => session.set_endpoint().await,
        }
        session
    }

    /// Build a session without touching the host or the network.
    pub fn new(host: H, dialer: D, config: ClientConfig, started: Instant) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut snapshot = EditorSnapshot::new(started);
        snapshot.set_active_document(host.active_document().as_deref());
        snapshot.set_workspace_folder(host.workspace_folder().as_deref());

        Self {
            host,
            dialer,
            config,
            state: ConnectionState::Disconnected,
            snapshot,
            link: None,
            next_link: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn snapshot(&self) -> &EditorSnapshot {
        &self.snapshot
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn uptime(&self) -> Uptime {
        self.snapshot.uptime()
    }

    // -- tracker -----------------------------------------------------------

    /// The active document changed; refresh the file fields and broadcast.
    pub fn on_active_document_changed(&mut self) {
        let path = self.host.active_document();
        self.snapshot.set_active_document(path.as_deref());
        tracing::debug!(file = %self.snapshot.file_name, "active document changed");
        self.send();
    }

    /// The workspace folders changed; refresh the folder name and broadcast.
    pub fn on_workspace_folders_changed(&mut self) {
        let folder = self.host.workspace_folder();
        self.snapshot.set_workspace_folder(folder.as_deref());
        tracing::debug!(folder = %self.snapshot.folder_name, "workspace folders changed");
        self.send();
    }

    // -- connection manager ------------------------------------------------

    /// Connect to `endpoint` unless a link is already open or connecting.
    pub fn connect_to(&mut self, endpoint: &str) -> Result<ConnectOutcome, Error> {
        let endpoint = Endpoint::parse(endpoint)?;
        let t = transition(self.state, ConnectionEvent::ConnectRequested);
        let outcome = if t.dials() {
            ConnectOutcome::Dialing
        } else {
            ConnectOutcome::AlreadyConnected
        };
        self.apply(t, Some(&endpoint));
        Ok(outcome)
    }

    /// Connect to the stored endpoint, prompting for one if none is stored.
    pub async fn connect(&mut self) {
        match self.stored_endpoint() {
            Some(stored) => self.connect_or_report(stored.as_str()),
            None => {
                let err = Error::from(EndpointParseError::Empty);
                self.host.notify(Notice::error(err.to_string()));
                self.set_endpoint().await;
            }
        }
    }

    /// The persisted endpoint; blank values count as unset.
    fn stored_endpoint(&self) -> Option<Endpoint> {
        Endpoint::from_setting(self.host.endpoint().as_deref())
    }

    fn connect_or_report(&mut self, endpoint: &str) {
        if let Err(e) = self.connect_to(endpoint) {
            self.host.notify(Notice::error(e.to_string()));
        }
    }

    /// Prompt for an endpoint; store it and connect if one was given.
    pub async fn set_endpoint(&mut self) {
        let answer = self
            .host
            .prompt(ENDPOINT_PROMPT, ENDPOINT_PLACEHOLDER)
            .await;
        let Some(endpoint) = Endpoint::from_setting(answer.as_deref()) else {
            self.host.notify(Notice::error("WebSocket URL not set"));
            return;
        };

        if let Err(e) = self.host.set_endpoint(&endpoint) {
            tracing::warn!(%endpoint, "failed to store endpoint: {}", e);
            self.host.notify(Notice::error(e.to_string()));
            return;
        }
        self.host.notify(Notice::info(format!("WebSocket URL set to {endpoint}")));
        self.connect_or_report(endpoint.as_str());
    }

    /// Send the current snapshot if the connection is open.
    ///
    /// Returns whether a frame was queued.
    pub fn send(&mut self) -> bool {
        if !self.state.is_open() {
            return false;
        }
        let Some(link) = &self.link else {
            return false;
        };

        let message = BroadcastMessage::capture(&self.snapshot, &self.config.captions);
        match message.encode(self.config.payload) {
            Ok(json) => {
                let queued = link.send_text(json);
                tracing::trace!(link = %link.id(), queued, "broadcast");
                queued
            }
            Err(e) => {
                tracing::warn!("failed to encode broadcast: {}", e);
                false
            }
        }
    }

    /// Show the options menu and act on the choice.
    pub async fn show_options(&mut self) {
        let labels = OptionChoice::labels();
        let picked = self.host.choose(OPTIONS_TITLE, &labels).await;
        if let Some(choice) = picked.and_then(|i| OptionChoice::ALL.get(i).copied()) {
            self.apply_option(choice).await;
        }
    }

    pub async fn apply_option(&mut self, choice: OptionChoice) {
        match choice {
            OptionChoice::Reconnect => self.connect().await,
            OptionChoice::ChangeUrl => self.set_endpoint().await,
            OptionChoice::ShowUptime => {
                let uptime = self.uptime();
                self.host.notify(Notice::info(format!("Uptime: {uptime}")));
            }
        }
    }

    pub fn hello(&mut self) {
        self.host.notify(Notice::info(GREETING));
    }

    /// Send a fixed text frame; reports an error when not connected.
    pub fn send_test_message(&mut self) {
        let sent = match (&self.link, self.state.is_open()) {
            (Some(link), true) => link.send_text(TEST_MESSAGE.to_string()),
            _ => false,
        };
        if !sent {
            self.host.notify(Notice::error(Error::NotConnected.to_string()));
        }
    }

    pub async fn execute(&mut self, command: Command) {
        tracing::debug!(?command, "command");
        match command {
            Command::Connect => self.connect().await,
            Command::SetEndpoint => self.set_endpoint().await,
            Command::ShowOptions => self.show_options().await,
            Command::Hello => self.hello(),
            Command::SendTestMessage => self.send_test_message(),
        }
    }

    /// Feed one link edge through the state machine. Edges from links other
    /// than the current one are dropped.
    pub fn handle_link_event(&mut self, ev: LinkEvent) {
        let current = self.link.as_ref().map(Link::id);
        if current != Some(ev.link) {
            tracing::debug!(link = %ev.link, ?current, "ignoring event from stale link");
            return;
        }

        let terminal = matches!(
            ev.event,
            ConnectionEvent::Closed | ConnectionEvent::Errored(_)
        );
        let t = transition(self.state, ev.event);
        self.apply(t, None);
        if terminal {
            self.link = None;
        }
    }

    /// Periodic timer body: re-render the status label.
    pub fn tick(&mut self) {
        self.refresh_status();
    }

    fn refresh_status(&mut self) {
        self.host.set_status(self.state.label());
    }

    fn apply(&mut self, t: Transition, endpoint: Option<&Endpoint>) {
        if t.state != self.state {
            tracing::info!(from = ?self.state, to = ?t.state, "connection state");
        }
        self.state = t.state;

        for effect in t.effects {
            match effect {
                Effect::Dial => match endpoint {
                    Some(endpoint) => self.dial(endpoint),
                    None => tracing::warn!("dial requested without an endpoint"),
                },
                Effect::RefreshStatus => self.refresh_status(),
                Effect::Notify(notice) => self.host.notify(notice),
                Effect::Broadcast => {
                    self.send();
                }
            }
        }
    }

    fn dial(&mut self, endpoint: &Endpoint) {
        let id = LinkId(self.next_link);
        self.next_link += 1;
        tracing::info!(link = %id, %endpoint, "connecting");
        let link = self.dialer.dial(id, endpoint, self.events_tx.clone());
        if let Some(old) = self.link.replace(link) {
            tracing::debug!(link = %old.id(), "dropping finished link");
        }
    }

    /// Wait for the next link edge and handle it.
    pub async fn next_link_event(&mut self) {
        if let Some(ev) = self.events_rx.recv().await {
            self.handle_link_event(ev);
        }
    }

    /// Drive the session until `inputs` closes, then tear it down.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<Input>) {
        let mut ticker = tokio::time::interval(self.config.status_refresh());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                input = inputs.recv() => match input {
                    Some(Input::Command(command)) => self.execute(command).await,
                    Some(Input::ActiveDocumentChanged) => self.on_active_document_changed(),
                    Some(Input::WorkspaceFoldersChanged) => self.on_workspace_folders_changed(),
                    None => break,
                },
                Some(ev) = self.events_rx.recv() => self.handle_link_event(ev),
                _ = ticker.tick() => self.tick(),
            }
        }

        self.teardown().await;
    }

    /// Deactivate: close any live link and wait for it to finish.
    pub async fn teardown(mut self) {
        if let Some(link) = self.link.take() {
            tracing::info!(link = %link.id(), state = ?self.state, "closing connection");
            link.close().await;
        }
        self.state = ConnectionState::Disconnected;
        self.refresh_status();
    }
}
