//! Card action classification
//!
//! When a card is rendered, its buttons and menus carry an opaque key-value
//! payload. The platform round-trips that payload back to us when the user
//! interacts with the card. This module parses the round-tripped payload
//! into a strongly typed [`CardAction`] so the dispatcher never touches raw
//! JSON or does runtime type assertions.
//!
//! An unrecognized `kind` is not an error: it means "not mine", so an outer
//! chain of handlers (possibly from other features) can try the next one.

use crate::platform::MediaRef;
use crate::session::Resolution;
use serde_json::Value;
use thiserror::Error;

/// Wire tags for the `kind` field embedded in card payloads.
///
/// These are part of rendered cards already in flight, so they are stable
/// strings rather than a serde enum.
pub mod kinds {
    pub const CLEAR: &str = "clear";
    pub const PIC_MODE_CHANGE: &str = "pic_mode_change";
    pub const PIC_RESOLUTION: &str = "pic_resolution";
    pub const PIC_TEXT_MORE: &str = "pic_text_more";
    pub const PIC_VAR_MORE: &str = "pic_var_more";
    pub const ROLE_TAGS_CHOOSE: &str = "role_tags_choose";
    pub const ROLE_CHOOSE: &str = "role_choose";
    pub const AI_MODE_CHOOSE: &str = "ai_mode_choose";
}

/// Whether the action originated in a group chat or a direct chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatScope {
    Group,
    #[default]
    Direct,
}

impl ChatScope {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatScope::Group => "group",
            ChatScope::Direct => "personal",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "group" => ChatScope::Group,
            _ => ChatScope::Direct,
        }
    }
}

/// Answer carried by the two-step confirm/cancel buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmChoice {
    Confirmed,
    Cancelled,
}

impl ConfirmChoice {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "1" => Some(ConfirmChoice::Confirmed),
            "0" => Some(ConfirmChoice::Cancelled),
            _ => None,
        }
    }
}

/// Typed intent, one variant per action kind.
///
/// Each kind carries its own payload type: boolean-like confirmation, enum
/// selection, free-text prompt, or media reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionIntent {
    ClearConfirm { choice: ConfirmChoice },
    PicModeConfirm { choice: ConfirmChoice },
    PicResolutionSelect { resolution: Resolution },
    PicRegenerate { prompt: String },
    PicVariantRegenerate { image_ref: MediaRef },
    RoleTagSelect { tag: String },
    RoleSelect { name: String },
    AiModeSelect { mode: String },
}

/// A classified card interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardAction {
    pub intent: ActionIntent,
    pub session_key: String,
    pub message_id: String,
    pub scope: ChatScope,
}

/// The payload as delivered by the platform callback: the key-value map the
/// card was rendered with, plus the selected option for menu interactions.
#[derive(Debug, Clone, Default)]
pub struct RawCardAction {
    pub value: Value,
    pub option: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    /// Routing signal, not a failure: this dispatcher does not own the kind.
    #[error("unrecognized action kind: {0}")]
    UnknownKind(String),
    /// Structurally broken payload (a required key is missing).
    #[error("card payload missing required key: {0}")]
    MissingField(&'static str),
    /// Recognized kind, but the value does not parse. Absorbed as a no-op
    /// upstream — ambiguous input never commits a transition.
    #[error("invalid value for action kind {kind}: {value}")]
    InvalidValue { kind: String, value: String },
}

/// Parse a raw payload into a typed action. No side effects.
pub fn classify(raw: &RawCardAction) -> Result<CardAction, ClassifyError> {
    let kind = str_field(raw, "kind").ok_or(ClassifyError::MissingField("kind"))?;
    let intent = match kind.as_str() {
        kinds::CLEAR => ActionIntent::ClearConfirm {
            choice: confirm_value(raw, &kind)?,
        },
        kinds::PIC_MODE_CHANGE => ActionIntent::PicModeConfirm {
            choice: confirm_value(raw, &kind)?,
        },
        kinds::PIC_RESOLUTION => {
            let option = selected_option(raw, &kind)?;
            let resolution =
                Resolution::parse(&option).ok_or_else(|| ClassifyError::InvalidValue {
                    kind: kind.clone(),
                    value: option,
                })?;
            ActionIntent::PicResolutionSelect { resolution }
        }
        kinds::PIC_TEXT_MORE => ActionIntent::PicRegenerate {
            prompt: str_field(raw, "value").ok_or(ClassifyError::MissingField("value"))?,
        },
        kinds::PIC_VAR_MORE => ActionIntent::PicVariantRegenerate {
            image_ref: MediaRef::new(
                str_field(raw, "value").ok_or(ClassifyError::MissingField("value"))?,
            ),
        },
        kinds::ROLE_TAGS_CHOOSE => ActionIntent::RoleTagSelect {
            tag: selected_option(raw, &kind)?,
        },
        kinds::ROLE_CHOOSE => ActionIntent::RoleSelect {
            name: selected_option(raw, &kind)?,
        },
        kinds::AI_MODE_CHOOSE => ActionIntent::AiModeSelect {
            mode: selected_option(raw, &kind)?,
        },
        _ => return Err(ClassifyError::UnknownKind(kind)),
    };

    let session_key = str_field(raw, "sessionId").ok_or(ClassifyError::MissingField("sessionId"))?;
    // Menu payloads stash the reply target under msgId; button payloads
    // reply to the session's root message.
    let message_id = str_field(raw, "msgId").unwrap_or_else(|| session_key.clone());
    let scope = str_field(raw, "chatType")
        .map(|s| ChatScope::parse(&s))
        .unwrap_or_default();

    Ok(CardAction {
        intent,
        session_key,
        message_id,
        scope,
    })
}

fn str_field(raw: &RawCardAction, key: &str) -> Option<String> {
    raw.value
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn confirm_value(raw: &RawCardAction, kind: &str) -> Result<ConfirmChoice, ClassifyError> {
    let value = str_field(raw, "value").ok_or(ClassifyError::MissingField("value"))?;
    ConfirmChoice::parse(&value).ok_or_else(|| ClassifyError::InvalidValue {
        kind: kind.to_string(),
        value,
    })
}

fn selected_option(raw: &RawCardAction, kind: &str) -> Result<String, ClassifyError> {
    raw.option
        .clone()
        .filter(|o| !o.is_empty())
        .ok_or_else(|| ClassifyError::InvalidValue {
            kind: kind.to_string(),
            value: String::new(),
        })
}
