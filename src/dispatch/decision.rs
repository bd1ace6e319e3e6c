//! Handler verdicts and decisions
//!
//! Card handlers are pure: they look at a session snapshot and a typed
//! action, and return a [`Decision`] describing what should happen. The
//! dispatcher executes the decision — applies the mutation first, renders
//! after. Keeping handlers side-effect free means the whole transition
//! table is testable without a store or a messenger.

use crate::action::CardAction;
use crate::cards::Card;
use crate::jobs::ImageJobSpec;
use crate::session::{Session, SessionMutation};

/// What to send back, if anything.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Card(Card),
}

/// The outcome a handler decided on.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Acknowledge without visible effect. Ambiguous or stale input lands
    /// here rather than committing a transition.
    NoOp,
    /// Send a reply; session untouched.
    Render(Reply),
    /// Apply the mutation, then send the reply. Order is load-bearing: the
    /// reply must describe state that is already committed.
    MutateAndRender {
        mutation: SessionMutation,
        reply: Reply,
    },
    /// Hand off to the detached image pipeline.
    SpawnImageJob(ImageJobSpec),
}

/// Whether a handler claims an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Not this handler's action; try the next one in the chain.
    NotMine,
    Decide(Decision),
}

/// One link in the card-action handler chain.
pub trait CardHandler: Send + Sync {
    fn try_handle(&self, session: &Session, action: &CardAction) -> Verdict;
}
