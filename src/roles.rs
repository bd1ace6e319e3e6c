//! Built-in role-play catalog and AI-mode presets
//!
//! Fixed content consumed by the role/AI-mode selector cards: tags group
//! roles, each role carries the system instruction that seeds role-play
//! mode, and AI modes map a label to a sampling temperature.

/// A built-in role-play persona.
#[derive(Debug, Clone)]
pub struct Role {
    pub title: &'static str,
    pub tag: &'static str,
    pub instruction: &'static str,
}

/// A named sampling preset for text generation.
#[derive(Debug, Clone, Copy)]
pub struct AiMode {
    pub label: &'static str,
    pub temperature: f32,
}

const ROLES: &[Role] = &[
    Role {
        title: "Interviewer",
        tag: "Career",
        instruction: "You are an interviewer for a software engineering position. \
                      Ask one question at a time and wait for the candidate's answer.",
    },
    Role {
        title: "Resume Coach",
        tag: "Career",
        instruction: "You review resumes. Point out weak phrasing and suggest concrete rewrites.",
    },
    Role {
        title: "English Tutor",
        tag: "Learning",
        instruction: "You are an English teacher. Correct the user's grammar in every reply, \
                      then continue the conversation naturally.",
    },
    Role {
        title: "Socratic Tutor",
        tag: "Learning",
        instruction: "Never answer directly. Lead the user to the answer with short questions.",
    },
    Role {
        title: "Travel Guide",
        tag: "Life",
        instruction: "You are a local travel guide. Given a place, recommend sights, food, \
                      and a one-day itinerary.",
    },
    Role {
        title: "Storyteller",
        tag: "Fun",
        instruction: "You tell interactive stories. After each scene, offer the user three choices.",
    },
];

const AI_MODES: &[AiMode] = &[
    AiMode {
        label: "Precise",
        temperature: 0.1,
    },
    AiMode {
        label: "Balanced",
        temperature: 0.7,
    },
    AiMode {
        label: "Creative",
        temperature: 1.2,
    },
];

/// Lookup surface over the built-in content.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleCatalog;

impl RoleCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Distinct tags, in definition order.
    pub fn tags(&self) -> Vec<&'static str> {
        let mut tags = Vec::new();
        for role in ROLES {
            if !tags.contains(&role.tag) {
                tags.push(role.tag);
            }
        }
        tags
    }

    /// Titles of the roles under a tag. Unknown tags yield an empty list.
    pub fn titles_for_tag(&self, tag: &str) -> Vec<&'static str> {
        ROLES
            .iter()
            .filter(|r| r.tag == tag)
            .map(|r| r.title)
            .collect()
    }

    pub fn find(&self, title: &str) -> Option<&'static Role> {
        ROLES.iter().find(|r| r.title == title)
    }

    pub fn ai_mode_labels(&self) -> Vec<&'static str> {
        AI_MODES.iter().map(|m| m.label).collect()
    }

    pub fn find_ai_mode(&self, label: &str) -> Option<AiMode> {
        AI_MODES.iter().find(|m| m.label == label).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_deduplicated_in_order() {
        let catalog = RoleCatalog::new();
        let tags = catalog.tags();
        assert_eq!(tags, vec!["Career", "Learning", "Life", "Fun"]);
    }

    #[test]
    fn roles_resolve_by_title() {
        let catalog = RoleCatalog::new();
        let role = catalog.find("Interviewer").unwrap();
        assert_eq!(role.tag, "Career");
        assert!(!role.instruction.is_empty());
    }

    #[test]
    fn unknown_lookups_yield_nothing() {
        let catalog = RoleCatalog::new();
        assert!(catalog.find("Yodeler").is_none());
        assert!(catalog.titles_for_tag("Sports").is_empty());
        assert!(catalog.find_ai_mode("Chaotic").is_none());
    }

    #[test]
    fn every_ai_mode_has_a_distinct_label() {
        let catalog = RoleCatalog::new();
        let labels = catalog.ai_mode_labels();
        assert_eq!(labels.len(), 3);
        for label in &labels {
            assert!(catalog.find_ai_mode(label).is_some());
        }
    }
}
