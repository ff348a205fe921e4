//! Typed observer interface. Each controller owns its own bus; there is no
//! global emitter.

use clairkeys_domain::Note;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, Hash)]
pub enum EventKind {
    TimeUpdate,
    PlayStateChange,
    SpeedChange,
    NoteStart,
    NoteEnd,
    PracticeStep,
    PracticeComplete,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PlayerEvent {
    TimeUpdate { current_time: f64 },
    PlayStateChange { is_playing: bool },
    SpeedChange { tempo_scale: f64 },
    /// `index` refers to the controller's loaded note sequence.
    NoteStart { index: usize, note: Note },
    NoteEnd { index: usize, note: Note },
    PracticeStep { step_index: usize, notes: Vec<Note> },
    PracticeComplete,
}

impl PlayerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PlayerEvent::TimeUpdate { .. } => EventKind::TimeUpdate,
            PlayerEvent::PlayStateChange { .. } => EventKind::PlayStateChange,
            PlayerEvent::SpeedChange { .. } => EventKind::SpeedChange,
            PlayerEvent::NoteStart { .. } => EventKind::NoteStart,
            PlayerEvent::NoteEnd { .. } => EventKind::NoteEnd,
            PlayerEvent::PracticeStep { .. } => EventKind::PracticeStep,
            PlayerEvent::PracticeComplete => EventKind::PracticeComplete,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&PlayerEvent)>;

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    listener: Listener,
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for one event kind.
    pub fn on<F>(&mut self, kind: EventKind, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + 'static,
    {
        self.subscribe(Some(kind), Box::new(listener))
    }

    /// Registers a listener for every event.
    pub fn on_any<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&PlayerEvent) + 'static,
    {
        self.subscribe(None, Box::new(listener))
    }

    fn subscribe(&mut self, kind: Option<EventKind>, listener: Listener) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push(Subscription { id, kind, listener });
        id
    }

    /// Returns false when `id` was not registered.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|sub| sub.id != id);
        self.subscriptions.len() != before
    }

    pub fn emit(&mut self, event: PlayerEvent) {
        let kind = event.kind();
        for sub in self.subscriptions.iter_mut() {
            if sub.kind.map_or(true, |k| k == kind) {
                (sub.listener)(&event);
            }
        }
    }

    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}
