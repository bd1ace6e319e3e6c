//! Logical card templates
//!
//! The renderer maps dispatcher decisions onto a fixed set of card
//! templates and serializes them as *logical* descriptions: abstract tones
//! and template tags, never platform color constants or markup. Turning a
//! description into platform JSON is the transport's job.
//!
//! Every template is a pure function of its parameters. All free text that
//! ends up in a markdown body goes through [`sanitize::normalize`] first —
//! that is a contract, not cosmetics.

pub mod sanitize;

use crate::action::{kinds, ChatScope};
use crate::backend::Balance;
use crate::platform::MediaRef;
use crate::roles::RoleCatalog;
use crate::session::Resolution;
use serde_json::{json, Value};

/// Visual severity of a notice. Mapped 1:1 to platform color tokens by the
/// external card-markup builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Danger,
    Muted,
    Accent,
}

impl Tone {
    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Info => "info",
            Tone::Success => "success",
            Tone::Danger => "danger",
            Tone::Muted => "muted",
            Tone::Accent => "accent",
        }
    }
}

/// One entry in a selector menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub value: String,
}

impl MenuOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// The fixed template set.
#[derive(Debug, Clone, PartialEq)]
pub enum Card {
    Notice {
        title: String,
        body: String,
        footnote: String,
        tone: Tone,
    },
    /// Two-step confirm/cancel guard. The buttons round-trip `kind` with
    /// value "1" (confirm) or "0" (cancel).
    Confirm {
        title: String,
        body: String,
        footnote: String,
        kind: &'static str,
        session_key: String,
        scope: ChatScope,
    },
    SelectorMenu {
        title: String,
        placeholder: String,
        options: Vec<MenuOption>,
        footnote: String,
        kind: &'static str,
        session_key: String,
        message_id: String,
    },
    /// Generated image plus a "one more" button that round-trips the
    /// prompt (or source image ref) under `regenerate_kind`.
    ImageResult {
        image: MediaRef,
        regenerate_kind: &'static str,
        regenerate_value: String,
        session_key: String,
        message_id: String,
    },
    BalanceReport(Balance),
    Help {
        session_key: String,
    },
}

/// Serialize a card into its logical description.
pub fn render(card: &Card) -> Value {
    match card {
        Card::Notice {
            title,
            body,
            footnote,
            tone,
        } => json!({
            "template": "notice",
            "title": title,
            "body": sanitize::normalize(body),
            "footnote": footnote,
            "tone": tone.as_str(),
        }),

        Card::Confirm {
            title,
            body,
            footnote,
            kind,
            session_key,
            scope,
        } => json!({
            "template": "confirm",
            "title": title,
            "body": sanitize::normalize(body),
            "footnote": footnote,
            "confirm": button_payload(kind, "1", session_key, *scope),
            "cancel": button_payload(kind, "0", session_key, *scope),
        }),

        Card::SelectorMenu {
            title,
            placeholder,
            options,
            footnote,
            kind,
            session_key,
            message_id,
        } => json!({
            "template": "selector",
            "title": title,
            "placeholder": placeholder,
            "options": options
                .iter()
                .map(|o| json!({ "label": o.label, "value": o.value }))
                .collect::<Vec<_>>(),
            "footnote": footnote,
            "payload": {
                "kind": kind,
                "value": "0",
                "sessionId": session_key,
                "msgId": message_id,
            },
        }),

        Card::ImageResult {
            image,
            regenerate_kind,
            regenerate_value,
            session_key,
            message_id,
        } => json!({
            "template": "image_result",
            "image_key": image.as_str(),
            "regenerate": {
                "kind": regenerate_kind,
                "value": sanitize::normalize(regenerate_value),
                "sessionId": session_key,
                "msgId": message_id,
                "chatType": ChatScope::Direct.as_str(),
            },
        }),

        Card::BalanceReport(balance) => json!({
            "template": "balance",
            "total_granted": balance.total_granted,
            "total_used": balance.total_used,
            "total_available": balance.total_available,
            "effective_at": balance.effective_at.to_rfc3339(),
            "expires_at": balance.expires_at.to_rfc3339(),
        }),

        Card::Help { session_key } => json!({
            "template": "help",
            "title": "Need any help?",
            "sections": [
                { "body": "**Clear the topic context**\nreply *clear* or */clear*",
                  "action": button_payload(kinds::CLEAR, "1", session_key, ChatScope::Direct) },
                { "body": "**AI mode selection**\nreply */ai_mode*" },
                { "body": "**Built-in role list**\nreply */roles*" },
                { "body": "**Role-play mode**\nreply */system* + space + role description" },
                { "body": "**Picture creation mode**\nreply */picture*" },
                { "body": "**Token balance query**\nreply */balance*" },
                { "body": "**Need more help**\nreply */help*" },
            ],
        }),
    }
}

fn button_payload(kind: &str, value: &str, session_key: &str, scope: ChatScope) -> Value {
    json!({
        "kind": kind,
        "value": value,
        "sessionId": session_key,
        "chatType": scope.as_str(),
    })
}

// ============================================================================
// Concrete cards used by the dispatcher
// ============================================================================

pub fn clear_check_card(session_key: &str, scope: ChatScope) -> Card {
    Card::Confirm {
        title: "Clear this topic?".to_string(),
        body: "Are you sure you want to clear the conversation context?".to_string(),
        footnote: "This starts a brand new conversation; the previous topic's history \
                   will no longer be available."
            .to_string(),
        kind: kinds::CLEAR,
        session_key: session_key.to_string(),
        scope,
    }
}

pub fn context_cleared_notice() -> Card {
    Card::Notice {
        title: "Context cleared".to_string(),
        body: "The context of this topic has been deleted.".to_string(),
        footnote: "We can start a brand new topic whenever you like.".to_string(),
        tone: Tone::Muted,
    }
}

pub fn context_retained_notice() -> Card {
    Card::Notice {
        title: "Context retained".to_string(),
        body: "The context of this topic is still available.".to_string(),
        footnote: "We can keep exploring this topic — just keep replying.".to_string(),
        tone: Tone::Success,
    }
}

pub fn pic_mode_check_card(session_key: &str, scope: ChatScope) -> Card {
    Card::Confirm {
        title: "Enter picture creation mode?".to_string(),
        body: "Switch this conversation to picture creation?".to_string(),
        footnote: "This starts a brand new conversation; the previous topic's history \
                   will no longer be available."
            .to_string(),
        kind: kinds::PIC_MODE_CHANGE,
        session_key: session_key.to_string(),
        scope,
    }
}

pub fn pic_mode_entry_card(session_key: &str) -> Card {
    Card::SelectorMenu {
        title: "Picture creation mode".to_string(),
        placeholder: format!("Default resolution {}", Resolution::R256.as_str()),
        options: [Resolution::R256, Resolution::R512, Resolution::R1024]
            .iter()
            .map(|r| MenuOption::new(r.as_str(), r.as_str()))
            .collect(),
        footnote: "Reply with text and the AI will generate a related picture.".to_string(),
        kind: kinds::PIC_RESOLUTION,
        session_key: session_key.to_string(),
        message_id: session_key.to_string(),
    }
}

pub fn role_tags_card(catalog: &RoleCatalog, session_key: &str) -> Card {
    Card::SelectorMenu {
        title: "Pick a role category".to_string(),
        placeholder: "Choose a category".to_string(),
        options: catalog
            .tags()
            .into_iter()
            .map(|t| MenuOption::new(t, t))
            .collect(),
        footnote: "Pick a category and we will suggest matching roles.".to_string(),
        kind: kinds::ROLE_TAGS_CHOOSE,
        session_key: session_key.to_string(),
        message_id: session_key.to_string(),
    }
}

pub fn role_list_card(catalog: &RoleCatalog, tag: &str, session_key: &str) -> Card {
    Card::SelectorMenu {
        title: format!("Roles - {tag}"),
        placeholder: "View built-in roles".to_string(),
        options: catalog
            .titles_for_tag(tag)
            .into_iter()
            .map(|t| MenuOption::new(t, t))
            .collect(),
        footnote: "Pick a built-in role to enter role-play mode.".to_string(),
        kind: kinds::ROLE_CHOOSE,
        session_key: session_key.to_string(),
        message_id: session_key.to_string(),
    }
}

pub fn role_entry_card(instruction: &str) -> Card {
    Card::Notice {
        title: "Entering role-play mode".to_string(),
        body: instruction.to_string(),
        footnote: "This starts a brand new conversation; the previous topic's history \
                   will no longer be available."
            .to_string(),
        tone: Tone::Accent,
    }
}

pub fn ai_mode_card(catalog: &RoleCatalog, session_key: &str) -> Card {
    Card::SelectorMenu {
        title: "AI mode selection".to_string(),
        placeholder: "Choose a mode".to_string(),
        options: catalog
            .ai_mode_labels()
            .into_iter()
            .map(|l| MenuOption::new(l, l))
            .collect(),
        footnote: "Pick a built-in mode so the AI better matches your needs.".to_string(),
        kind: kinds::AI_MODE_CHOOSE,
        session_key: session_key.to_string(),
        message_id: session_key.to_string(),
    }
}

pub fn image_result_card(
    image: MediaRef,
    regenerate_kind: &'static str,
    regenerate_value: &str,
    session_key: &str,
    message_id: &str,
) -> Card {
    Card::ImageResult {
        image,
        regenerate_kind,
        regenerate_value: regenerate_value.to_string(),
        session_key: session_key.to_string(),
        message_id: message_id.to_string(),
    }
}

pub fn generation_failed_notice(detail: &str) -> Card {
    Card::Notice {
        title: "Generation failed".to_string(),
        body: detail.to_string(),
        footnote: "Please try again in a moment.".to_string(),
        tone: Tone::Danger,
    }
}
