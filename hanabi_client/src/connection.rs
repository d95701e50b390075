use std::time::{Duration, Instant};

use hanabi::{CardId, Command, ProtocolError, ServerMessage, UpdateMessage};
use hanabi_view::{Action, DisconnectReason, LogEntry, Projection, SessionStore, SubscriptionId};
use tracing::{debug, info, trace, warn};

use crate::throttle::Throttle;
use crate::transport::{Connector, Incoming, Transport};
use crate::{ClientConfig, ConnectionError, Recorder, SendError};

/// What one turn of the event loop did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pump {
    /// A server message was handled.
    Message,
    /// Nothing arrived; queued updates may have been applied.
    Idle,
    /// There is no connection to wait on.
    Disconnected,
}

/// Owns the connection to the game server and the session state fed by it.
///
/// Views subscribe to the store for projections and act through
/// [`send_intent()`](Self::send_intent) and [`update_note()`](Self::update_note).
pub struct ConnectionManager<C: Connector> {
    connector: C,
    url: String,
    idle_tick: Duration,
    transport: Option<C::Transport>,
    throttle: Throttle<Box<UpdateMessage>>,
    store: SessionStore,
    recorder: Option<Recorder>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, config: &ClientConfig) -> Self {
        Self {
            connector,
            url: config.endpoint(),
            idle_tick: config.idle_tick(),
            transport: None,
            throttle: Throttle::new(config.coalesce_window()),
            store: SessionStore::new(),
            recorder: None,
        }
    }

    pub fn with_recorder(mut self, recorder: Option<Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn snapshot(&self) -> Projection {
        self.store.snapshot()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Projection) + 'static) -> SubscriptionId {
        self.store.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    /// Opens the connection. On failure the session shows the error banner
    /// and this can simply be called again.
    pub fn connect(&mut self) -> Result<(), ConnectionError> {
        if self.transport.is_some() {
            debug!("Already connected");
            return Ok(());
        }
        info!(url = %self.url, "Connecting");
        self.store.dispatch(Action::Connecting);
        match self.connector.open(&self.url) {
            Ok(transport) => {
                info!("Connected");
                self.transport = Some(transport);
                self.store.dispatch(Action::Connected);
                Ok(())
            }
            Err(err) => {
                warn!(%err, "Could not connect");
                let err = ConnectionError::OpenFailed(err);
                self.store.dispatch(Action::Disconnected(err.reason()));
                Err(err)
            }
        }
    }

    /// Closes the connection on the player's request.
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            info!("Disconnecting");
            transport.close();
            self.end_session(DisconnectReason::Closed);
        }
    }

    /// Sends a player intent. Without a connection nothing is sent.
    pub fn send_intent(&mut self, command: &Command) -> Result<(), SendError> {
        let Some(transport) = self.transport.as_mut() else {
            warn!(%command, "Not connected, command dropped");
            return Err(SendError::NotConnected);
        };
        if let Err(err) = transport.send_text(&command.to_string()) {
            let err = ConnectionError::Session(err);
            self.fail(&err);
            return Err(SendError::Connection(err));
        }
        debug!(%command, "Sent");
        if let Some(recorder) = &mut self.recorder {
            recorder.store_command(command);
        }
        if command.hands_over_turn() {
            self.store.dispatch(Action::ActionSent);
        } else {
            self.store.dispatch(Action::PlayAgain);
        }
        Ok(())
    }

    /// Attaches a note to a card. Notes stay on this side of the connection.
    pub fn update_note(&mut self, card_id: CardId, text: String) {
        self.store.dispatch(Action::UpdateNote { card_id, text });
    }

    /// Handles one raw message from the server, received at `now`.
    pub fn on_message(&mut self, raw: &str, now: Instant) -> Result<(), ProtocolError> {
        trace!(raw, "Received");
        match ServerMessage::parse(raw)? {
            ServerMessage::Init(init) => {
                // Whatever is still queued belongs to the previous game.
                let pending = self.throttle.drain();
                self.apply_updates(pending);
                self.write_recording();
                self.store.dispatch(Action::Init(init));
            }
            ServerMessage::Update(update) => {
                let released = self.throttle.submit(now, update);
                self.apply_updates(released);
            }
        }
        Ok(())
    }

    /// Applies queued updates whose coalescing window has closed.
    pub fn poll(&mut self, now: Instant) {
        let released = self.throttle.poll(now);
        self.apply_updates(released);
    }

    /// Runs one turn of the event loop: waits for a message or for the
    /// throttle, whichever comes first, and handles it.
    pub fn pump(&mut self) -> Result<Pump, ConnectionError> {
        let now = Instant::now();
        self.poll(now);
        let timeout = self
            .throttle
            .deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
            .map_or(self.idle_tick, |until| until.min(self.idle_tick));
        let Some(transport) = self.transport.as_mut() else {
            return Ok(Pump::Disconnected);
        };
        match transport.recv_text(timeout) {
            Ok(Incoming::Text(text)) => {
                if let Err(err) = self.on_message(&text, Instant::now()) {
                    warn!(%err, "Ignoring malformed server message");
                }
                Ok(Pump::Message)
            }
            Ok(Incoming::Idle) => {
                self.poll(Instant::now());
                Ok(Pump::Idle)
            }
            Ok(Incoming::Closed) => {
                let err = ConnectionError::Closed;
                self.fail(&err);
                Err(err)
            }
            Err(err) => {
                let err = ConnectionError::Session(err);
                self.fail(&err);
                Err(err)
            }
        }
    }

    fn apply_updates(&mut self, updates: Vec<Box<UpdateMessage>>) {
        if updates.is_empty() {
            return;
        }
        debug!(count = updates.len(), "Applying updates");
        let mut actions = Vec::with_capacity(updates.len() + 1);
        let mut latest = None;
        for update in updates {
            let (snapshot, event) = update.into_parts();
            actions.push(Action::AppendLog(LogEntry::for_update(&snapshot, event)));
            latest = Some(snapshot);
        }
        if let Some(snapshot) = latest {
            actions.push(Action::Snapshot(Box::new(snapshot)));
        }
        self.store.dispatch_all(actions);
    }

    fn fail(&mut self, err: &ConnectionError) {
        warn!(%err, "Connection lost");
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
        self.end_session(err.reason());
    }

    fn end_session(&mut self, reason: DisconnectReason) {
        let pending = self.throttle.drain();
        self.apply_updates(pending);
        self.write_recording();
        self.store.dispatch(Action::Disconnected(reason));
    }

    fn write_recording(&mut self) {
        let Some(recorder) = &mut self.recorder else {
            return;
        };
        match recorder.write_game_recording() {
            Ok(Some(path)) => info!(path = %path.display(), "Recorded game"),
            Ok(None) => {}
            Err(err) => warn!(%err, "Could not record game"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use hanabi::Seat;
    use hanabi_view::ConnectionStatus;
    use serde_json::json;

    use super::*;
    use crate::TransportError;

    /// What the scripted server saw and will say.
    #[derive(Default)]
    struct Script {
        sent: Vec<String>,
        incoming: VecDeque<Result<Incoming, TransportError>>,
        closed: bool,
    }

    struct ScriptedTransport(Rc<RefCell<Script>>);

    impl Transport for ScriptedTransport {
        fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
            self.0.borrow_mut().sent.push(String::from(text));
            Ok(())
        }

        fn recv_text(&mut self, _timeout: Duration) -> Result<Incoming, TransportError> {
            self.0
                .borrow_mut()
                .incoming
                .pop_front()
                .unwrap_or(Ok(Incoming::Idle))
        }

        fn close(&mut self) {
            self.0.borrow_mut().closed = true;
        }
    }

    struct ScriptedConnector {
        script: Rc<RefCell<Script>>,
        refuse: bool,
    }

    impl Connector for ScriptedConnector {
        type Transport = ScriptedTransport;

        fn open(&mut self, _url: &str) -> Result<ScriptedTransport, TransportError> {
            if self.refuse {
                return Err(TransportError::Io(std::io::Error::from(
                    std::io::ErrorKind::ConnectionRefused,
                )));
            }
            Ok(ScriptedTransport(Rc::clone(&self.script)))
        }
    }

    fn manager(refuse: bool) -> (ConnectionManager<ScriptedConnector>, Rc<RefCell<Script>>) {
        let script = Rc::new(RefCell::new(Script::default()));
        let connector = ScriptedConnector {
            script: Rc::clone(&script),
            refuse,
        };
        (ConnectionManager::new(connector, &ClientConfig::default()), script)
    }

    fn init() -> String {
        json!({"type": "INIT", "colors": ["WHITE", "RED", "BLUE", "YELLOW", "GREEN"], "playerNumber": 1})
            .to_string()
    }

    fn update(score: u32, line: &str) -> String {
        json!({
            "currentScore": score,
            "hintStonesRemaining": 8,
            "mulligansRemaining": 3,
            "playerId": 0,
            "partnerId": 1,
            "cards": ["1y", "2w", "2r", "2g", "5b"],
            "cardsIds": [10, 11, 12, 13, 14],
            "partnerCardsIds": [5, 6, 7, 8, 9],
            "piles": [0, 0, 0, 0, 0],
            "isPlayerTurn": true,
            "moveHistory": [line],
        })
        .to_string()
    }

    #[test]
    fn send_while_disconnected_is_rejected() {
        let (mut manager, script) = manager(false);
        let result = manager.send_intent(&Command::Place { index: 2 });
        assert!(matches!(result, Err(SendError::NotConnected)));
        assert!(script.borrow().sent.is_empty());
    }

    #[test]
    fn open_failure_shows_banner_and_allows_retry() {
        let (mut manager, _script) = manager(true);
        assert!(matches!(manager.connect(), Err(ConnectionError::OpenFailed(_))));
        assert!(!manager.is_connected());
        let view = manager.snapshot().view;
        assert_eq!(
            view.connection,
            ConnectionStatus::Lost(DisconnectReason::OpenFailed)
        );

        manager.connector.refuse = false;
        assert!(manager.connect().is_ok());
        assert_eq!(manager.snapshot().view.connection, ConnectionStatus::Connected);
    }

    #[test]
    fn sends_wire_commands() {
        let (mut manager, script) = manager(false);
        manager.connect().unwrap();
        let t0 = Instant::now();
        manager.on_message(&init(), t0).unwrap();
        manager.on_message(&update(0, "start"), t0).unwrap();
        assert!(manager.snapshot().view.is_player_turn);

        manager.send_intent(&Command::Place { index: 2 }).unwrap();
        assert!(!manager.snapshot().view.is_player_turn);
        manager
            .send_intent(&Command::HintColor { value: 1, seat: Seat(1) })
            .unwrap();
        manager
            .send_intent(&Command::Replay {
                seed: None,
                bot_name: String::from("Smart Bot"),
            })
            .unwrap();
        assert_eq!(
            script.borrow().sent,
            vec!["PLACE 2", "HINT_COLOR 1 1", "REPLAY - Smart-Bot"]
        );
    }

    #[test]
    fn burst_keeps_every_log_entry_and_last_snapshot() {
        let (mut manager, _script) = manager(false);
        manager.connect().unwrap();
        let t0 = Instant::now();
        manager.on_message(&init(), t0).unwrap();

        let scores = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&scores);
        manager.subscribe(move |projection| sink.borrow_mut().push(projection.view.score));

        for i in 0..5u32 {
            let at = t0 + Duration::from_millis(100 * i as u64);
            manager.on_message(&update(i, &format!("move {}", i)), at).unwrap();
        }
        // Only the leading update has been applied so far.
        assert_eq!(manager.snapshot().view.score, 0);
        assert_eq!(manager.snapshot().view.log.len(), 2);

        manager.poll(t0 + Duration::from_secs(1));
        let view = manager.snapshot().view;
        assert_eq!(view.score, 4);
        assert_eq!(
            view.log,
            vec!["Game 1 started", "move 0", "move 1", "move 2", "move 3", "move 4"]
        );
        // The UI saw the first update, then the merged rest.
        assert_eq!(*scores.borrow(), vec![0, 4]);
    }

    #[test]
    fn init_flushes_queue_and_resets_game() {
        let (mut manager, _script) = manager(false);
        manager.connect().unwrap();
        let t0 = Instant::now();
        manager.on_message(&init(), t0).unwrap();
        manager.on_message(&update(1, "a"), t0).unwrap();
        manager.update_note(CardId(10), String::from("five?"));
        manager.on_message(&update(2, "b"), t0).unwrap();
        assert_eq!(manager.store.raw().history.len(), 2);

        manager.on_message(&init(), t0).unwrap();
        let raw = manager.store.raw();
        assert_eq!(raw.game_id, 2);
        assert!(raw.notes.is_empty());
        assert_eq!(raw.history, vec![LogEntry::NewGame { game_id: 2 }]);
        assert!(manager.throttle.is_idle());
    }

    #[test]
    fn server_close_and_session_error_are_distinct() {
        let (mut manager, script) = manager(false);
        manager.connect().unwrap();
        script.borrow_mut().incoming.push_back(Ok(Incoming::Closed));
        assert!(matches!(manager.pump(), Err(ConnectionError::Closed)));
        assert!(script.borrow().closed);
        assert_eq!(
            manager.snapshot().view.connection.banner().as_deref(),
            Some("The game has ended.")
        );
        assert_eq!(manager.pump().unwrap(), Pump::Disconnected);

        manager.connect().unwrap();
        script.borrow_mut().incoming.push_back(Err(TransportError::Io(
            std::io::Error::from(std::io::ErrorKind::ConnectionReset),
        )));
        assert!(matches!(manager.pump(), Err(ConnectionError::Session(_))));
        assert!(matches!(
            manager.snapshot().view.connection,
            ConnectionStatus::Lost(DisconnectReason::SessionError(_))
        ));
    }

    #[test]
    fn pump_dispatches_messages_and_skips_garbage() {
        let (mut manager, script) = manager(false);
        manager.connect().unwrap();
        {
            let mut script = script.borrow_mut();
            script.incoming.push_back(Ok(Incoming::Text(init())));
            script.incoming.push_back(Ok(Incoming::Text(String::from("not json"))));
            script.incoming.push_back(Ok(Incoming::Text(update(3, "x"))));
        }
        assert_eq!(manager.pump().unwrap(), Pump::Message);
        assert_eq!(manager.pump().unwrap(), Pump::Message);
        assert_eq!(manager.pump().unwrap(), Pump::Message);
        assert_eq!(manager.pump().unwrap(), Pump::Idle);
        let view = manager.snapshot().view;
        assert_eq!(view.score, 3);
        assert_eq!(view.log, vec!["Game 1 started", "x"]);
    }

    #[test]
    fn disconnect_applies_queued_updates() {
        let (mut manager, _script) = manager(false);
        manager.connect().unwrap();
        let t0 = Instant::now();
        manager.on_message(&update(1, "a"), t0).unwrap();
        manager.on_message(&update(2, "b"), t0).unwrap();
        manager.disconnect();
        let raw = manager.store.raw();
        assert_eq!(raw.history.len(), 2);
        assert_eq!(raw.snapshot.as_ref().map(|s| s.current_score), Some(2));
        assert!(!manager.is_connected());
    }
}
