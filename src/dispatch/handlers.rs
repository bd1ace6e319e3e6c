//! The card-action transition table, one handler per action family
//!
//! Each handler claims the intents it owns and returns [`Verdict::NotMine`]
//! for everything else, so the chain stays open for handlers registered by
//! other features. Handlers never mutate: lookups that miss (unknown role
//! title, unknown AI-mode label) decide [`Decision::NoOp`] so a stale card
//! can never commit a half-valid transition.

use super::decision::{CardHandler, Decision, Reply, Verdict};
use crate::action::{ActionIntent, CardAction, ConfirmChoice};
use crate::cards;
use crate::jobs::ImageJobSpec;
use crate::roles::RoleCatalog;
use crate::session::{Session, SessionMutation};

/// `clear` confirm buttons.
pub struct ClearHandler;

impl CardHandler for ClearHandler {
    fn try_handle(&self, _session: &Session, action: &CardAction) -> Verdict {
        let ActionIntent::ClearConfirm { choice } = &action.intent else {
            return Verdict::NotMine;
        };
        Verdict::Decide(match choice {
            ConfirmChoice::Confirmed => Decision::MutateAndRender {
                mutation: SessionMutation::ClearHistory,
                reply: Reply::Card(cards::context_cleared_notice()),
            },
            ConfirmChoice::Cancelled => {
                Decision::Render(Reply::Card(cards::context_retained_notice()))
            }
        })
    }
}

/// `pic_mode_change` confirm buttons.
pub struct PicModeHandler;

impl CardHandler for PicModeHandler {
    fn try_handle(&self, _session: &Session, action: &CardAction) -> Verdict {
        let ActionIntent::PicModeConfirm { choice } = &action.intent else {
            return Verdict::NotMine;
        };
        Verdict::Decide(match choice {
            ConfirmChoice::Confirmed => Decision::MutateAndRender {
                mutation: SessionMutation::EnterPicCreate,
                reply: Reply::Card(cards::pic_mode_entry_card(&action.session_key)),
            },
            ConfirmChoice::Cancelled => {
                Decision::Render(Reply::Card(cards::context_retained_notice()))
            }
        })
    }
}

/// `pic_resolution` menu.
pub struct PicResolutionHandler;

impl CardHandler for PicResolutionHandler {
    fn try_handle(&self, _session: &Session, action: &CardAction) -> Verdict {
        let ActionIntent::PicResolutionSelect { resolution } = &action.intent else {
            return Verdict::NotMine;
        };
        Verdict::Decide(Decision::MutateAndRender {
            mutation: SessionMutation::SetResolution(*resolution),
            reply: Reply::Text(format!("Image resolution updated to {}", resolution.as_str())),
        })
    }
}

/// `pic_text_more` and `pic_var_more` regenerate buttons. The generation
/// resolution is whatever the session holds *now*, not whatever it was
/// when the original image was made.
pub struct PicRegenerateHandler;

impl CardHandler for PicRegenerateHandler {
    fn try_handle(&self, session: &Session, action: &CardAction) -> Verdict {
        match &action.intent {
            ActionIntent::PicRegenerate { prompt } => {
                Verdict::Decide(Decision::SpawnImageJob(ImageJobSpec::Prompt {
                    prompt: prompt.clone(),
                    resolution: session.resolution,
                }))
            }
            ActionIntent::PicVariantRegenerate { image_ref } => {
                Verdict::Decide(Decision::SpawnImageJob(ImageJobSpec::Variant {
                    source: image_ref.clone(),
                    resolution: session.resolution,
                }))
            }
            _ => Verdict::NotMine,
        }
    }
}

/// `role_tags_choose` menu: drill into the titles under a tag.
pub struct RoleTagHandler {
    pub catalog: RoleCatalog,
}

impl CardHandler for RoleTagHandler {
    fn try_handle(&self, _session: &Session, action: &CardAction) -> Verdict {
        let ActionIntent::RoleTagSelect { tag } = &action.intent else {
            return Verdict::NotMine;
        };
        if self.catalog.titles_for_tag(tag).is_empty() {
            return Verdict::Decide(Decision::NoOp);
        }
        Verdict::Decide(Decision::Render(Reply::Card(cards::role_list_card(
            &self.catalog,
            tag,
            &action.session_key,
        ))))
    }
}

/// `role_choose` menu: enter role-play mode with the role's instruction.
pub struct RoleHandler {
    pub catalog: RoleCatalog,
}

impl CardHandler for RoleHandler {
    fn try_handle(&self, _session: &Session, action: &CardAction) -> Verdict {
        let ActionIntent::RoleSelect { name } = &action.intent else {
            return Verdict::NotMine;
        };
        let Some(role) = self.catalog.find(name) else {
            return Verdict::Decide(Decision::NoOp);
        };
        Verdict::Decide(Decision::MutateAndRender {
            mutation: SessionMutation::EnterRolePlay {
                instruction: role.instruction.to_string(),
            },
            reply: Reply::Card(cards::role_entry_card(role.instruction)),
        })
    }
}

/// `ai_mode_choose` menu: remember the sampling temperature.
pub struct AiModeHandler {
    pub catalog: RoleCatalog,
}

impl CardHandler for AiModeHandler {
    fn try_handle(&self, _session: &Session, action: &CardAction) -> Verdict {
        let ActionIntent::AiModeSelect { mode } = &action.intent else {
            return Verdict::NotMine;
        };
        let Some(preset) = self.catalog.find_ai_mode(mode) else {
            return Verdict::Decide(Decision::NoOp);
        };
        Verdict::Decide(Decision::MutateAndRender {
            mutation: SessionMutation::SetTemperature(preset.temperature),
            reply: Reply::Text(format!("AI mode set to {}", preset.label)),
        })
    }
}

/// The built-in chain, in registration order.
pub fn builtin_handlers(catalog: RoleCatalog) -> Vec<Box<dyn CardHandler>> {
    vec![
        Box::new(ClearHandler),
        Box::new(PicModeHandler),
        Box::new(PicResolutionHandler),
        Box::new(PicRegenerateHandler),
        Box::new(RoleTagHandler { catalog }),
        Box::new(RoleHandler { catalog }),
        Box::new(AiModeHandler { catalog }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ChatScope;
    use crate::session::Resolution;

    fn action(intent: ActionIntent) -> CardAction {
        CardAction {
            intent,
            session_key: "s1".to_string(),
            message_id: "m1".to_string(),
            scope: ChatScope::Direct,
        }
    }

    #[test]
    fn clear_confirmed_mutates_before_rendering() {
        let verdict = ClearHandler.try_handle(
            &Session::default(),
            &action(ActionIntent::ClearConfirm {
                choice: ConfirmChoice::Confirmed,
            }),
        );
        let Verdict::Decide(Decision::MutateAndRender { mutation, .. }) = verdict else {
            panic!("expected a mutating decision");
        };
        assert_eq!(mutation, SessionMutation::ClearHistory);
    }

    #[test]
    fn clear_cancelled_renders_without_mutation() {
        let verdict = ClearHandler.try_handle(
            &Session::default(),
            &action(ActionIntent::ClearConfirm {
                choice: ConfirmChoice::Cancelled,
            }),
        );
        assert!(matches!(
            verdict,
            Verdict::Decide(Decision::Render(Reply::Card(_)))
        ));
    }

    #[test]
    fn handlers_disown_foreign_intents() {
        let foreign = action(ActionIntent::RoleTagSelect {
            tag: "Career".to_string(),
        });
        assert_eq!(
            ClearHandler.try_handle(&Session::default(), &foreign),
            Verdict::NotMine
        );
        assert_eq!(
            PicModeHandler.try_handle(&Session::default(), &foreign),
            Verdict::NotMine
        );
    }

    #[test]
    fn regenerate_uses_current_session_resolution() {
        let session = Session {
            resolution: Resolution::R1024,
            ..Session::default()
        };
        let verdict = PicRegenerateHandler.try_handle(
            &session,
            &action(ActionIntent::PicRegenerate {
                prompt: "a red fox".to_string(),
            }),
        );
        let Verdict::Decide(Decision::SpawnImageJob(ImageJobSpec::Prompt {
            resolution, ..
        })) = verdict
        else {
            panic!("expected an image job");
        };
        assert_eq!(resolution, Resolution::R1024);
    }

    #[test]
    fn unknown_role_title_is_a_noop() {
        let verdict = RoleHandler {
            catalog: RoleCatalog::new(),
        }
        .try_handle(
            &Session::default(),
            &action(ActionIntent::RoleSelect {
                name: "Astronaut".to_string(),
            }),
        );
        assert_eq!(verdict, Verdict::Decide(Decision::NoOp));
    }

    #[test]
    fn unknown_tag_is_a_noop() {
        let verdict = RoleTagHandler {
            catalog: RoleCatalog::new(),
        }
        .try_handle(
            &Session::default(),
            &action(ActionIntent::RoleTagSelect {
                tag: "Nonexistent".to_string(),
            }),
        );
        assert_eq!(verdict, Verdict::Decide(Decision::NoOp));
    }

    #[test]
    fn ai_mode_sets_preset_temperature() {
        let verdict = AiModeHandler {
            catalog: RoleCatalog::new(),
        }
        .try_handle(
            &Session::default(),
            &action(ActionIntent::AiModeSelect {
                mode: "Creative".to_string(),
            }),
        );
        let Verdict::Decide(Decision::MutateAndRender {
            mutation: SessionMutation::SetTemperature(t),
            ..
        }) = verdict
        else {
            panic!("expected a temperature mutation");
        };
        assert!((t - 1.2).abs() < f32::EPSILON);
    }
}
