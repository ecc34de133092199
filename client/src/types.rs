//! Client state, actions, and the persisted snapshot shape.

use serde::{Deserialize, Serialize};
use todolist_core::todo::{Partition, Todo, TodoId};

/// A todo that only exists on this device.
///
/// Created while offline or while a create request is in flight. It has no
/// identifier, so it is matched by its literal text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTodo {
    /// Validated, trimmed text
    pub text: String,
}

/// One item of a client list.
///
/// The tag is explicit: nothing infers identified-ness from the shape of the
/// data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Entry {
    /// Confirmed by the server
    Identified(Todo),
    /// Not (yet) known to the server
    Local(LocalTodo),
}

impl Entry {
    /// Provisional entry for `text`.
    #[must_use]
    pub fn local(text: impl Into<String>) -> Self {
        Self::Local(LocalTodo { text: text.into() })
    }

    /// Display text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Identified(todo) => &todo.text,
            Self::Local(local) => &local.text,
        }
    }

    /// Server identifier, if any.
    #[must_use]
    pub const fn id(&self) -> Option<TodoId> {
        match self {
            Self::Identified(todo) => Some(todo.id),
            Self::Local(_) => None,
        }
    }

    /// Reference that finds this entry again later.
    #[must_use]
    pub fn item_ref(&self) -> ItemRef {
        match self {
            Self::Identified(todo) => ItemRef::Id(todo.id),
            Self::Local(local) => ItemRef::Local(local.text.clone()),
        }
    }

    /// Whether `item` refers to this entry.
    #[must_use]
    pub fn matches(&self, item: &ItemRef) -> bool {
        match (self, item) {
            (Self::Identified(todo), ItemRef::Id(id)) => todo.id == *id,
            (Self::Local(local), ItemRef::Local(text)) => local.text == *text,
            _ => false,
        }
    }
}

/// How an action names a list item.
///
/// Identified entries are matched by id; local ones by literal text (first
/// match wins).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// A server-confirmed todo
    Id(TodoId),
    /// A local-only todo with this text
    Local(String),
}

/// Whether the client talks to the API this session.
///
/// Resolved once at startup by the health check and never changed after.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// API reachable: mutations go to the server
    Online,
    /// API unreachable or disabled: snapshot only
    Offline,
}

impl std::fmt::Display for SyncMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Client-side cache of the two lists.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientState {
    /// Not yet completed, newest first
    pub pending: Vec<Entry>,
    /// Completed, newest first
    pub completed: Vec<Entry>,
    /// Bumped on every change; orders snapshot writes
    pub revision: u64,
    /// Last input or sync problem worth showing to the user
    pub last_error: Option<String>,
    /// Between `Bootstrap` and the first load or restore. Snapshot writes
    /// are held back meanwhile so the previous session's file stays intact.
    pub bootstrapping: bool,
}

impl ClientState {
    /// The sequence for `partition`.
    #[must_use]
    pub fn list(&self, partition: Partition) -> &[Entry] {
        match partition {
            Partition::Pending => &self.pending,
            Partition::Completed => &self.completed,
        }
    }

    pub(crate) fn list_mut(&mut self, partition: Partition) -> &mut Vec<Entry> {
        match partition {
            Partition::Pending => &mut self.pending,
            Partition::Completed => &mut self.completed,
        }
    }

    /// Partition holding `item` and its position there.
    #[must_use]
    pub fn locate(&self, item: &ItemRef) -> Option<(Partition, usize)> {
        [Partition::Pending, Partition::Completed]
            .into_iter()
            .find_map(|partition| {
                self.list(partition)
                    .iter()
                    .position(|entry| entry.matches(item))
                    .map(|index| (partition, index))
            })
    }

    /// Entry at a 1-based display position: pending first, then completed.
    #[must_use]
    pub fn item_at(&self, position: usize) -> Option<&Entry> {
        let index = position.checked_sub(1)?;
        self.pending.iter().chain(self.completed.iter()).nth(index)
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len()
    }

    /// True when both lists are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Partition server todos into the two lists, keeping server order.
    pub(crate) fn replace_with(&mut self, todos: Vec<Todo>) {
        let (completed, pending): (Vec<Todo>, Vec<Todo>) =
            todos.into_iter().partition(|todo| todo.completed);
        self.pending = pending.into_iter().map(Entry::Identified).collect();
        self.completed = completed.into_iter().map(Entry::Identified).collect();
    }

    /// Remove every entry with this id from both lists.
    pub(crate) fn remove_id(&mut self, id: TodoId) {
        self.pending.retain(|entry| entry.id() != Some(id));
        self.completed.retain(|entry| entry.id() != Some(id));
    }

    /// Append the entries of a restored snapshot behind the ones already
    /// present. Identified entries already cached are skipped, so an item is
    /// never listed twice.
    pub(crate) fn absorb(&mut self, snapshot: Snapshot) {
        let is_new = |state: &Self, entry: &Entry| {
            entry
                .id()
                .is_none_or(|id| state.locate(&ItemRef::Id(id)).is_none())
        };

        let pending: Vec<Entry> = snapshot
            .pending
            .into_iter()
            .filter(|entry| is_new(self, entry))
            .collect();
        let completed: Vec<Entry> = snapshot
            .completed
            .into_iter()
            .filter(|entry| is_new(self, entry))
            .collect();

        self.pending.extend(pending);
        self.completed.extend(completed);
    }

    /// Capture the persisted part of the state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            pending: self.pending.clone(),
            completed: self.completed.clone(),
        }
    }
}

/// Persisted copy of both lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// State revision this snapshot was taken at
    pub revision: u64,
    /// Pending entries, in display order
    pub pending: Vec<Entry>,
    /// Completed entries, in display order
    pub completed: Vec<Entry>,
}

/// Why a full list fetch was issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOrigin {
    /// Initial load at startup
    Bootstrap,
    /// Periodic resync
    Resync,
}

/// Everything that can happen to the client state.
///
/// User intents (`Bootstrap`, `Add`, `Toggle`, `Remove`) come from the
/// terminal; the rest are fed back by effects.
#[derive(Clone, Debug, PartialEq)]
pub enum ClientAction {
    /// Initial load: fetch (online) or restore the snapshot (offline)
    Bootstrap,
    /// Full list arrived
    Loaded {
        /// Server todos, newest first
        todos: Vec<Todo>,
        /// Which fetch produced them
        origin: FetchOrigin,
    },
    /// Full list fetch failed
    LoadFailed {
        /// Failure description
        error: String,
        /// Which fetch failed
        origin: FetchOrigin,
    },
    /// Snapshot read finished (`None` when absent or unreadable)
    Restored {
        /// The persisted lists
        snapshot: Option<Snapshot>,
    },
    /// Periodic resync timer fired
    ResyncTick,

    /// User adds a todo
    Add {
        /// Raw input
        text: String,
    },
    /// Server accepted a create
    Created {
        /// Text the provisional entry was created with
        text: String,
        /// Confirmed record
        todo: Todo,
    },
    /// Server rejected or never answered a create
    CreateFailed {
        /// Text of the provisional entry
        text: String,
        /// Failure description
        error: String,
    },

    /// User toggles an item between the lists
    Toggle {
        /// The item to move
        item: ItemRef,
    },
    /// Server applied a completion change
    ToggleConfirmed {
        /// Record as stored by the server
        todo: Todo,
    },
    /// Server failed to apply a completion change
    ToggleFailed {
        /// Record as it was before the toggle
        todo: Todo,
        /// Flag that was requested
        completed: bool,
        /// Failure description
        error: String,
    },

    /// User removes an item
    Remove {
        /// The item to remove
        item: ItemRef,
    },
    /// Server failed to delete a todo already removed locally
    RemoveFailed {
        /// Identifier of the removed todo
        id: TodoId,
        /// Failure description
        error: String,
    },
}
