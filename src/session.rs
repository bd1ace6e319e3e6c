//! Per-session conversational state
//!
//! A session tracks which mode a conversation is in (plain chat, picture
//! creation, role play), the picture resolution, and the turn history that
//! feeds text generation. Sessions are created lazily on first access and
//! are only ever mutated through [`SessionMutation`] so that read-modify-write
//! cycles stay atomic per session key.

mod store;

pub use store::{InMemorySessionStore, SessionStore};

use serde::{Deserialize, Serialize};

/// Conversational behavior currently active for a session.
///
/// Exactly one mode is active at a time. `resolution` is only consulted
/// while the session is in `PicCreate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Chat,
    PicCreate,
    RolePlay,
}

/// Supported image resolutions for picture-creation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Resolution {
    #[default]
    #[serde(rename = "256x256")]
    R256,
    #[serde(rename = "512x512")]
    R512,
    #[serde(rename = "1024x1024")]
    R1024,
}

impl Resolution {
    /// Wire string used both in card menu options and backend requests.
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::R256 => "256x256",
            Resolution::R512 => "512x512",
            Resolution::R1024 => "1024x1024",
        }
    }

    /// Parse a menu option back into a resolution. Unknown strings yield
    /// `None` so the dispatcher can treat them as a no-op.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "256x256" => Some(Resolution::R256),
            "512x512" => Some(Resolution::R512),
            "1024x1024" => Some(Resolution::R1024),
            _ => None,
        }
    }
}

/// Author of a history turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Persisted state for one conversation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    pub mode: Mode,
    pub resolution: Resolution,
    pub history: Vec<Turn>,
    /// Sampling temperature chosen via the AI-mode selector, if any.
    pub temperature: Option<f32>,
}

/// Atomic state change applied to a session under the store lock.
///
/// Decisions carry one of these instead of a mutated session copy, keeping
/// the store the single source of truth under concurrent card actions.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionMutation {
    /// Empty the history. Mode is kept (the "clear context" button never
    /// kicks the user out of their current mode).
    ClearHistory,
    /// Clear history, switch to picture creation, reset resolution to the
    /// 256x256 default.
    EnterPicCreate,
    /// Change only the picture resolution.
    SetResolution(Resolution),
    /// Clear history, switch to role play, seed the system instruction.
    EnterRolePlay { instruction: String },
    /// Remember the sampling temperature for the chosen AI mode.
    SetTemperature(f32),
    /// Record a completed text exchange.
    AppendExchange { user: String, assistant: String },
}

impl Session {
    pub fn apply(&mut self, mutation: &SessionMutation) {
        match mutation {
            SessionMutation::ClearHistory => {
                self.history.clear();
            }
            SessionMutation::EnterPicCreate => {
                self.history.clear();
                self.mode = Mode::PicCreate;
                self.resolution = Resolution::R256;
            }
            SessionMutation::SetResolution(resolution) => {
                self.resolution = *resolution;
            }
            SessionMutation::EnterRolePlay { instruction } => {
                self.history.clear();
                self.history.push(Turn::system(instruction.clone()));
                self.mode = Mode::RolePlay;
            }
            SessionMutation::SetTemperature(t) => {
                self.temperature = Some(*t);
            }
            SessionMutation::AppendExchange { user, assistant } => {
                self.history.push(Turn::user(user.clone()));
                self.history.push(Turn::assistant(assistant.clone()));
            }
        }
    }
}
