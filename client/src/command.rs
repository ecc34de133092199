//! Terminal input parsing.

use thiserror::Error;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `add <text>`: raw text, validated by the reducer
    Add(String),
    /// `done <n>` / `toggle <n>`: move item `n` to the other list
    Toggle(usize),
    /// `rm <n>`: delete item `n`
    Remove(usize),
    /// `ls` or an empty line: redraw
    List,
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
}

/// Input that is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// First word is not a known command
    #[error("Unknown command: {0} (type `help`)")]
    Unknown(String),
    /// Item number missing or not a positive integer
    #[error("`{0}` needs an item number")]
    MissingNumber(&'static str),
}

/// Help text printed by `help`.
pub const HELP: &str = "\
Commands:
  add <text>      add a todo
  done <n>        move item n between pending and completed
  rm <n>          delete item n
  ls              show the lists
  help            show this help
  quit            exit";

impl Command {
    /// Parse one input line.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the line is not a valid command.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" | "ls" | "list" => Ok(Self::List),
            // Text is passed through untouched; blank text is the reducer's call
            "add" | "a" => Ok(Self::Add(rest.to_string())),
            "done" | "toggle" | "t" => Self::number(rest, "done").map(Self::Toggle),
            "rm" | "remove" | "del" => Self::number(rest, "rm").map(Self::Remove),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    fn number(raw: &str, command: &'static str) -> Result<usize, CommandError> {
        raw.parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(CommandError::MissingNumber(command))
    }
}
