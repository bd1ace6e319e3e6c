//! Slash-command parsing for plain text messages

/// A recognized text command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Ask for the clear-context confirmation card.
    Clear,
    /// Ask for the picture-mode confirmation card.
    Picture,
    /// Enter role-play mode with a free-form instruction.
    System(String),
    /// Show the role-tag selector.
    Roles,
    /// Show the AI-mode selector.
    AiMode,
    /// Query the backend account balance.
    Balance,
    Help,
}

/// Parse a message into a command, or `None` for ordinary conversation.
///
/// Bare `clear` (no slash) is accepted because it predates the slash
/// commands and users still type it.
pub fn parse(text: &str) -> Option<Command> {
    let trimmed = text.trim();
    match trimmed {
        "clear" | "/clear" => Some(Command::Clear),
        "/picture" => Some(Command::Picture),
        "/roles" => Some(Command::Roles),
        "/ai_mode" => Some(Command::AiMode),
        "/balance" => Some(Command::Balance),
        "/help" => Some(Command::Help),
        _ => trimmed
            .strip_prefix("/system")
            .map(|rest| Command::System(rest.trim().to_string())),
    }
}
