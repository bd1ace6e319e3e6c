//! Conversation-mode dispatcher
//!
//! The single entry point for both webhook surfaces: card interactions and
//! plain text messages. Card actions are classified, run through the
//! handler chain, and their decisions executed here — mutation first,
//! rendering after, so every reply describes committed state. Text
//! messages are either slash commands or ordinary conversation relayed to
//! the text backend according to the session's mode.

pub mod commands;
pub mod decision;
pub mod handlers;

#[cfg(test)]
mod proptests;

pub use decision::{CardHandler, Decision, Reply, Verdict};

use crate::action::{classify, ClassifyError, RawCardAction};
use crate::backend::{BalanceBackend, TextBackend};
use crate::cards;
use crate::jobs::{ImageJobRunner, ImageJobSpec};
use crate::platform::{DeliveryError, Messenger, OutboundContent, ReplyContext};
use crate::roles::RoleCatalog;
use crate::session::{Mode, Session, SessionMutation, SessionStore, Turn};
use commands::Command;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Result of offering a card action to this dispatcher.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// The action was ours. Carries the replacement card to return in the
    /// webhook response, if the decision produced one.
    Handled(Option<Value>),
    /// Not ours; the caller should offer it to the next dispatcher.
    PassToNext,
}

pub struct Dispatcher {
    store: Arc<dyn SessionStore>,
    messenger: Arc<dyn Messenger>,
    text: Arc<dyn TextBackend>,
    balance: Arc<dyn BalanceBackend>,
    jobs: ImageJobRunner,
    catalog: RoleCatalog,
    handlers: Vec<Box<dyn CardHandler>>,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn SessionStore>,
        messenger: Arc<dyn Messenger>,
        text: Arc<dyn TextBackend>,
        balance: Arc<dyn BalanceBackend>,
        jobs: ImageJobRunner,
    ) -> Self {
        let catalog = RoleCatalog::new();
        Self {
            store,
            messenger,
            text,
            balance,
            jobs,
            catalog,
            handlers: handlers::builtin_handlers(catalog),
        }
    }

    /// Register an extra handler after the built-in chain.
    pub fn push_handler(&mut self, handler: Box<dyn CardHandler>) {
        self.handlers.push(handler);
    }

    /// Offer a card interaction to the handler chain.
    ///
    /// A failed text acknowledgement surfaces as `Err`; the webhook layer
    /// decides whether to swallow it for its always-200 policy.
    pub async fn handle_card_action(
        &self,
        raw: &RawCardAction,
    ) -> Result<Outcome, DeliveryError> {
        let action = match classify(raw) {
            Ok(action) => action,
            Err(ClassifyError::UnknownKind(kind)) => {
                debug!(kind = %kind, "card action kind not ours");
                return Ok(Outcome::PassToNext);
            }
            Err(ClassifyError::MissingField("kind")) => {
                // No kind at all: routing is impossible, so treat it like a
                // foreign kind and let the next dispatcher try.
                debug!("card action carries no kind");
                return Ok(Outcome::PassToNext);
            }
            Err(e) => {
                // Recognized kind with a broken payload: absorb without
                // committing anything.
                warn!(error = %e, "malformed card action absorbed");
                return Ok(Outcome::Handled(None));
            }
        };

        let session = self.store.get(&action.session_key).await;
        for handler in &self.handlers {
            match handler.try_handle(&session, &action) {
                Verdict::NotMine => {}
                Verdict::Decide(decision) => {
                    info!(
                        session_key = %action.session_key,
                        intent = ?action.intent,
                        "card action claimed"
                    );
                    let ctx = ReplyContext::new(&action.session_key, &action.message_id)
                        .with_scope(action.scope);
                    return Ok(Outcome::Handled(self.execute(decision, &ctx).await?));
                }
            }
        }
        Ok(Outcome::PassToNext)
    }

    /// Run a decision. Mutations are applied before any rendering.
    async fn execute(
        &self,
        decision: Decision,
        ctx: &ReplyContext,
    ) -> Result<Option<Value>, DeliveryError> {
        match decision {
            Decision::NoOp => Ok(None),
            Decision::Render(reply) => self.render(reply, ctx).await,
            Decision::MutateAndRender { mutation, reply } => {
                self.store.apply(&ctx.session_key, mutation).await;
                self.render(reply, ctx).await
            }
            Decision::SpawnImageJob(spec) => {
                drop(self.jobs.spawn(spec, ctx.clone()));
                Ok(None)
            }
        }
    }

    /// Cards replace the interacted card via the webhook response; text
    /// goes out as a fresh message.
    async fn render(
        &self,
        reply: Reply,
        ctx: &ReplyContext,
    ) -> Result<Option<Value>, DeliveryError> {
        match reply {
            Reply::Card(card) => Ok(Some(cards::render(&card))),
            Reply::Text(text) => {
                self.messenger
                    .deliver(ctx, OutboundContent::Text(text))
                    .await?;
                Ok(None)
            }
        }
    }

    /// Handle a plain text message: slash command or conversation.
    pub async fn handle_message(
        &self,
        text: &str,
        ctx: &ReplyContext,
    ) -> Result<(), DeliveryError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        if let Some(command) = commands::parse(trimmed) {
            return self.run_command(command, ctx).await;
        }

        let session = self.store.get(&ctx.session_key).await;
        match session.mode {
            Mode::PicCreate => {
                info!(session_key = %ctx.session_key, "prompt accepted for image generation");
                drop(self.jobs.spawn(
                    ImageJobSpec::Prompt {
                        prompt: trimmed.to_string(),
                        resolution: session.resolution,
                    },
                    ctx.clone(),
                ));
                Ok(())
            }
            Mode::Chat | Mode::RolePlay => self.relay_text(&session, trimmed, ctx).await,
        }
    }

    async fn run_command(&self, command: Command, ctx: &ReplyContext) -> Result<(), DeliveryError> {
        match command {
            Command::Clear => {
                self.deliver_card(ctx, &cards::clear_check_card(&ctx.session_key, ctx.scope))
                    .await
            }
            Command::Picture => {
                self.deliver_card(
                    ctx,
                    &cards::pic_mode_check_card(&ctx.session_key, ctx.scope),
                )
                .await
            }
            Command::System(instruction) => {
                if instruction.is_empty() {
                    return self
                        .messenger
                        .deliver(
                            ctx,
                            OutboundContent::Text(
                                "Usage: /system followed by a role description".to_string(),
                            ),
                        )
                        .await;
                }
                self.store
                    .apply(
                        &ctx.session_key,
                        SessionMutation::EnterRolePlay {
                            instruction: instruction.clone(),
                        },
                    )
                    .await;
                self.deliver_card(ctx, &cards::role_entry_card(&instruction))
                    .await
            }
            Command::Roles => {
                self.deliver_card(ctx, &cards::role_tags_card(&self.catalog, &ctx.session_key))
                    .await
            }
            Command::AiMode => {
                self.deliver_card(ctx, &cards::ai_mode_card(&self.catalog, &ctx.session_key))
                    .await
            }
            Command::Balance => match self.balance.balance().await {
                Ok(balance) => {
                    self.deliver_card(ctx, &cards::Card::BalanceReport(balance))
                        .await
                }
                Err(e) => {
                    error!(session_key = %ctx.session_key, error = %e, "balance query failed");
                    self.messenger
                        .deliver(
                            ctx,
                            OutboundContent::Text(
                                "Balance query failed, please try again later.".to_string(),
                            ),
                        )
                        .await
                }
            },
            Command::Help => {
                self.deliver_card(
                    ctx,
                    &cards::Card::Help {
                        session_key: ctx.session_key.clone(),
                    },
                )
                .await
            }
        }
    }

    /// Relay a conversational message to the text backend. The exchange is
    /// committed to the session before the answer is delivered.
    async fn relay_text(
        &self,
        session: &Session,
        text: &str,
        ctx: &ReplyContext,
    ) -> Result<(), DeliveryError> {
        let mut history = session.history.clone();
        history.push(Turn::user(text));

        match self.text.generate_text(&history, session.temperature).await {
            Ok(answer) => {
                self.store
                    .apply(
                        &ctx.session_key,
                        SessionMutation::AppendExchange {
                            user: text.to_string(),
                            assistant: answer.clone(),
                        },
                    )
                    .await;
                self.messenger
                    .deliver(ctx, OutboundContent::Text(answer))
                    .await
            }
            Err(e) => {
                error!(session_key = %ctx.session_key, error = %e, "text generation failed");
                self.messenger
                    .deliver(
                        ctx,
                        OutboundContent::Text(
                            "The AI service is unavailable right now, please try again later."
                                .to_string(),
                        ),
                    )
                    .await
            }
        }
    }

    async fn deliver_card(
        &self,
        ctx: &ReplyContext,
        card: &cards::Card,
    ) -> Result<(), DeliveryError> {
        self.messenger
            .deliver(ctx, OutboundContent::Card(cards::render(card)))
            .await
    }
}
