//! Reconciliation of the client cache with the server.
//!
//! Every user intent is applied to [`ClientState`] at once and, when the
//! session is online, mirrored to the API by an effect whose outcome comes
//! back as another action. Failures never block the user: they are logged
//! and the local state stays as the best available answer.
//!
//! There is no ordering between in-flight requests. The last response to
//! land wins, and a resync may overwrite optimistic entries the server has
//! not confirmed yet.

use crate::api::TodoApi;
use crate::environment::ClientEnvironment;
use crate::snapshot::SnapshotStore;
use crate::types::{ClientAction, ClientState, Entry, FetchOrigin, ItemRef};
use smallvec::{SmallVec, smallvec};
use std::marker::PhantomData;
use todolist_core::effect::Effect;
use todolist_core::reducer::Reducer;
use todolist_core::todo::{Todo, TodoId, TodoText};
use todolist_core::{async_effect, delay};

type Effects = SmallVec<[Effect<ClientAction>; 4]>;

/// Reducer for the client state cache.
///
/// Generic over the API and snapshot store so tests can run it against
/// mocks.
pub struct ClientReducer<A, P> {
    _environment: PhantomData<fn() -> (A, P)>,
}

impl<A, P> ClientReducer<A, P> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _environment: PhantomData,
        }
    }
}

impl<A, P> Default for ClientReducer<A, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, P> Clone for ClientReducer<A, P> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<A, P> std::fmt::Debug for ClientReducer<A, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClientReducer")
    }
}

impl<A, P> ClientReducer<A, P>
where
    A: TodoApi,
    P: SnapshotStore,
{
    /// Write the current lists to the snapshot store.
    fn persist(state: &ClientState, env: &ClientEnvironment<A, P>) -> Effect<ClientAction> {
        let snapshots = env.snapshots.clone();
        let snapshot = state.snapshot();

        async_effect! {
            let revision = snapshot.revision;
            match snapshots.save(snapshot).await {
                Ok(true) => {},
                Ok(false) => tracing::trace!(revision, "Snapshot superseded by a newer one"),
                Err(error) => tracing::warn!(error = %error, revision, "Failed to write snapshot"),
            }
            None
        }
    }

    /// Read the snapshot back; an unreadable one counts as absent.
    fn restore(env: &ClientEnvironment<A, P>) -> Effect<ClientAction> {
        let snapshots = env.snapshots.clone();

        async_effect! {
            let snapshot = match snapshots.load().await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    tracing::warn!(error = %error, "Failed to read snapshot, starting empty");
                    None
                },
            };
            Some(ClientAction::Restored { snapshot })
        }
    }

    fn fetch(env: &ClientEnvironment<A, P>, origin: FetchOrigin) -> Effect<ClientAction> {
        let api = env.api.clone();

        async_effect! {
            let result = api.list().await;
            match result {
                Ok(todos) => Some(ClientAction::Loaded { todos, origin }),
                Err(error) => Some(ClientAction::LoadFailed { error: error.to_string(), origin }),
            }
        }
    }

    fn schedule_resync(env: &ClientEnvironment<A, P>) -> Option<Effect<ClientAction>> {
        env.resync_interval.map(|interval| {
            delay! {
                duration: interval,
                action: ClientAction::ResyncTick
            }
        })
    }

    fn create(env: &ClientEnvironment<A, P>, text: String) -> Effect<ClientAction> {
        let api = env.api.clone();

        async_effect! {
            let result = api.create(&text).await;
            match result {
                Ok(todo) => Some(ClientAction::Created { text, todo }),
                Err(error) => Some(ClientAction::CreateFailed { text, error: error.to_string() }),
            }
        }
    }

    fn set_completed(
        env: &ClientEnvironment<A, P>,
        todo: Todo,
        completed: bool,
    ) -> Effect<ClientAction> {
        let api = env.api.clone();

        async_effect! {
            let result = api.set_completed(todo.id, completed).await;
            match result {
                Ok(todo) => Some(ClientAction::ToggleConfirmed { todo }),
                Err(error) => Some(ClientAction::ToggleFailed {
                    todo,
                    completed,
                    error: error.to_string(),
                }),
            }
        }
    }

    fn delete(env: &ClientEnvironment<A, P>, id: TodoId) -> Effect<ClientAction> {
        let api = env.api.clone();

        async_effect! {
            let result = api.delete(id).await;
            match result {
                Ok(()) => None,
                Err(error) => Some(ClientAction::RemoveFailed { id, error: error.to_string() }),
            }
        }
    }

    /// Change recorded: bump the revision and persist.
    ///
    /// While bootstrapping nothing is written; the load or restore that ends
    /// it persists everything at once.
    fn commit(state: &mut ClientState, env: &ClientEnvironment<A, P>) -> Effect<ClientAction> {
        state.revision += 1;
        if state.bootstrapping {
            tracing::trace!(revision = state.revision, "Snapshot held until bootstrap completes");
            return Effect::None;
        }
        Self::persist(state, env)
    }

    /// Put `todo` at the head of the list its flag names, dropping every
    /// other copy of it first so it is only ever in one list.
    ///
    /// Returns `false` (and changes nothing) if the todo is no longer in
    /// the cache, e.g. because it was removed while a request was in flight.
    fn place(state: &mut ClientState, todo: Todo) -> bool {
        if state.locate(&ItemRef::Id(todo.id)).is_none() {
            return false;
        }

        state.remove_id(todo.id);
        let partition = todo.partition();
        state.list_mut(partition).insert(0, Entry::Identified(todo));
        true
    }

    fn reduce_toggle(
        state: &mut ClientState,
        item: &ItemRef,
        env: &ClientEnvironment<A, P>,
    ) -> Effects {
        let Some((from, index)) = state.locate(item) else {
            tracing::debug!(?item, "Toggle of unknown item ignored");
            return SmallVec::new();
        };
        let to = from.opposite();

        if let (Entry::Identified(todo), true) = (&state.list(from)[index], env.is_online()) {
            // Moves only once the server has answered
            return smallvec![Self::set_completed(env, todo.clone(), to.is_completed())];
        }

        let entry = match state.list_mut(from).remove(index) {
            Entry::Identified(mut todo) => {
                todo.completed = to.is_completed();
                Entry::Identified(todo)
            },
            local @ Entry::Local(_) => local,
        };
        state.list_mut(to).insert(0, entry);

        smallvec![Self::commit(state, env)]
    }
}

impl<A, P> Reducer for ClientReducer<A, P>
where
    A: TodoApi,
    P: SnapshotStore,
{
    type State = ClientState;
    type Action = ClientAction;
    type Environment = ClientEnvironment<A, P>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut ClientState,
        action: ClientAction,
        env: &ClientEnvironment<A, P>,
    ) -> Effects {
        match action {
            ClientAction::Bootstrap => {
                state.bootstrapping = true;
                if !env.is_online() {
                    return smallvec![Self::restore(env)];
                }

                let mut effects: Effects = smallvec![Self::fetch(env, FetchOrigin::Bootstrap)];
                effects.extend(Self::schedule_resync(env));
                effects
            },

            ClientAction::Loaded { todos, origin } => {
                tracing::debug!(count = todos.len(), ?origin, "Todos loaded");
                state.replace_with(todos);
                state.last_error = None;
                state.bootstrapping = false;
                smallvec![Self::commit(state, env)]
            },

            ClientAction::LoadFailed { error, origin } => match origin {
                FetchOrigin::Bootstrap => {
                    tracing::warn!(error = %error, "Initial load failed, restoring snapshot");
                    state.last_error = Some(format!("Could not load todos: {error}"));
                    smallvec![Self::restore(env)]
                },
                FetchOrigin::Resync => {
                    tracing::warn!(error = %error, "Resync failed, keeping cached todos");
                    SmallVec::new()
                },
            },

            ClientAction::Restored { snapshot } => {
                state.bootstrapping = false;
                // Entries the user made while the restore was pending
                let changed_meanwhile = !state.is_empty();

                match snapshot {
                    Some(snapshot) => {
                        tracing::info!(
                            revision = snapshot.revision,
                            pending = snapshot.pending.len(),
                            completed = snapshot.completed.len(),
                            "Snapshot restored"
                        );
                        state.revision = state.revision.max(snapshot.revision);
                        state.absorb(snapshot);
                    },
                    None => tracing::info!("No snapshot found"),
                }

                if changed_meanwhile {
                    smallvec![Self::commit(state, env)]
                } else {
                    SmallVec::new()
                }
            },

            ClientAction::ResyncTick => {
                if !env.is_online() {
                    return SmallVec::new();
                }

                tracing::trace!("Resync tick");
                let mut effects: Effects = smallvec![Self::fetch(env, FetchOrigin::Resync)];
                effects.extend(Self::schedule_resync(env));
                effects
            },

            ClientAction::Add { text } => {
                let text = match TodoText::parse(&text) {
                    Ok(text) => text.into_inner(),
                    Err(error) => {
                        tracing::debug!(error = %error, "Rejected todo text");
                        state.last_error = Some(error.to_string());
                        return SmallVec::new();
                    },
                };

                state.pending.insert(0, Entry::local(text.clone()));
                state.last_error = None;

                let mut effects: Effects = smallvec![Self::commit(state, env)];
                if env.is_online() {
                    effects.push(Self::create(env, text));
                }
                effects
            },

            ClientAction::Created { text, todo } => {
                let provisional = ItemRef::Local(text);
                let Some((partition, index)) = state.locate(&provisional) else {
                    tracing::debug!(id = %todo.id, "Provisional entry gone, dropping confirmation");
                    return SmallVec::new();
                };

                tracing::debug!(id = %todo.id, "Todo confirmed");
                let completed = partition.is_completed();
                if todo.completed == completed {
                    state.list_mut(partition)[index] = Entry::Identified(todo);
                    return smallvec![Self::commit(state, env)];
                }

                // Toggled while the create was in flight: keep the user's
                // choice and send it to the server
                let mut confirmed = todo.clone();
                confirmed.completed = completed;
                state.list_mut(partition)[index] = Entry::Identified(confirmed);
                smallvec![
                    Self::commit(state, env),
                    Self::set_completed(env, todo, completed)
                ]
            },

            ClientAction::CreateFailed { text, error } => {
                tracing::warn!(error = %error, text = %text, "Create failed, keeping local entry");
                state.last_error = Some(format!("Could not save \"{text}\": {error}"));
                SmallVec::new()
            },

            ClientAction::Toggle { item } => Self::reduce_toggle(state, &item, env),

            ClientAction::ToggleConfirmed { todo } => {
                let id = todo.id;
                if !Self::place(state, todo) {
                    tracing::debug!(id = %id, "Toggled todo no longer cached");
                    return SmallVec::new();
                }
                smallvec![Self::commit(state, env)]
            },

            ClientAction::ToggleFailed {
                mut todo,
                completed,
                error,
            } => {
                tracing::warn!(error = %error, id = %todo.id, "Toggle failed, moving locally");
                state.last_error = Some(format!("Could not update \"{}\": {error}", todo.text));

                todo.completed = completed;
                if !Self::place(state, todo) {
                    return SmallVec::new();
                }
                smallvec![Self::commit(state, env)]
            },

            ClientAction::Remove { item } => {
                let Some((partition, index)) = state.locate(&item) else {
                    tracing::debug!(?item, "Remove of unknown item ignored");
                    return SmallVec::new();
                };

                let removed = state.list_mut(partition).remove(index);
                let mut effects: Effects = smallvec![Self::commit(state, env)];
                if let (Some(id), true) = (removed.id(), env.is_online()) {
                    effects.push(Self::delete(env, id));
                }
                effects
            },

            ClientAction::RemoveFailed { id, error } => {
                tracing::warn!(error = %error, id = %id, "Delete failed on server");
                state.last_error = Some(format!("Could not delete todo {id}: {error}"));
                SmallVec::new()
            },
        }
    }
}
