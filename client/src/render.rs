//! Plain-text view of the client state.

use crate::types::{ClientState, Entry, SyncMode};
use std::fmt::Write;

/// Render both lists with the 1-based numbers commands refer to.
///
/// Local-only entries are marked with `*`.
#[must_use]
pub fn render(state: &ClientState, mode: SyncMode) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "todolist ({mode})");

    let mut position = 0;
    for (title, entries, mark) in [
        ("Pending", &state.pending, ' '),
        ("Completed", &state.completed, 'x'),
    ] {
        let _ = writeln!(out, "\n{title} ({})", entries.len());
        if entries.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for entry in entries {
            position += 1;
            let local = if matches!(entry, Entry::Local(_)) { " *" } else { "" };
            let _ = writeln!(out, "  {position:>3}. [{mark}] {}{local}", entry.text());
        }
    }

    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "\n! {error}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_continue_from_pending_into_completed() {
        let state = ClientState {
            pending: vec![Entry::local("Task A")],
            completed: vec![Entry::local("Task B")],
            last_error: Some("Could not load todos".to_string()),
            ..ClientState::default()
        };

        let text = render(&state, SyncMode::Offline);

        assert!(text.starts_with("todolist (offline)"));
        assert!(text.contains("    1. [ ] Task A *"));
        assert!(text.contains("    2. [x] Task B *"));
        assert!(text.contains("! Could not load todos"));
    }

    #[test]
    fn empty_lists_say_so() {
        let text = render(&ClientState::default(), SyncMode::Online);
        assert_eq!(text.matches("(none)").count(), 2);
    }
}
