use tracing::trace;

use crate::{project, Action, Projection, RawSessionState};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Projection)>;

/// Owns the session state and tells subscribers about every change.
///
/// Subscribers only ever see [projections](Projection), never the raw
/// state.
pub struct SessionStore {
    state: RawSessionState,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            state: RawSessionState::new(),
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        self.dispatch_all([action]);
    }

    /// Applies several actions, then notifies subscribers once.
    pub fn dispatch_all(&mut self, actions: impl IntoIterator<Item = Action>) {
        let mut changed = false;
        for action in actions {
            trace!(?action, "Dispatch");
            self.state.reduce(action);
            changed = true;
        }
        if changed {
            self.notify();
        }
    }

    pub fn snapshot(&self) -> Projection {
        project(&self.state)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Projection) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if there was no such subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// For the connection manager's own bookkeeping; views use
    /// [`snapshot()`](Self::snapshot).
    pub fn raw(&self) -> &RawSessionState {
        &self.state
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let projection = project(&self.state);
        for (_, listener) in &mut self.listeners {
            listener(&projection);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use hanabi::{CardId, Snapshot};

    use super::*;
    use crate::LogEntry;

    #[test]
    fn subscribers_see_projections() {
        let mut store = SessionStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = store.subscribe(move |projection| {
            sink.borrow_mut().push(projection.view.score);
        });

        store.dispatch(Action::Connected);
        store.dispatch_all([
            Action::AppendLog(LogEntry::Update { server_line: None }),
            Action::Snapshot(Box::new(Snapshot {
                current_score: 3,
                ..Snapshot::default()
            })),
        ]);
        assert_eq!(*seen.borrow(), vec![0, 3]);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.dispatch(Action::UpdateNote {
            card_id: CardId(1),
            text: String::from("x"),
        });
        assert_eq!(seen.borrow().len(), 2);
        assert_eq!(store.raw().notes.get(CardId(1)), Some("x"));
        assert_eq!(store.snapshot().view.score, 3);
    }
}
