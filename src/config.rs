// ABOUTME: Configuration constants for the REPL

pub const PROMPT: &str = "user> ";

/// Line history persists in the working directory between sessions
pub const HISTORY_FILE: &str = "history.txt";
pub const HISTORY_SIZE: usize = 30;
