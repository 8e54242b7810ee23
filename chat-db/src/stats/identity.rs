use chat_msg::{Author, Mention};
use chat_ref::AuthorId;
use chrono::{DateTime, FixedOffset};
use serde::{Serialize, Serializer};

pub const PLACEHOLDER_NAME_PREFIX: &str = "Unknown User";

/// Canonical key for a posting author.
pub fn resolve_author(author: &Author) -> AuthorId {
    author.id.clone()
}

/// Canonical key for a mention target.
pub fn resolve_mention(mention: &Mention) -> AuthorId {
    mention.id.clone()
}

pub fn placeholder_author(id: &AuthorId) -> Author {
    let name = format!("{} {}", PLACEHOLDER_NAME_PREFIX, id);
    Author::new(id.clone(), name.clone(), name)
}

/// Position of a real author record in the archive.
///
/// Ordered by instant, then message id, so "latest observation" is the same
/// no matter which worker saw which channel first.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObservedAt {
    at: Option<DateTime<FixedOffset>>,
    message_id: String,
}

impl ObservedAt {
    pub fn new(timestamp: &str, message_id: &str) -> Self {
        ObservedAt {
            at: DateTime::parse_from_rfc3339(timestamp).ok(),
            message_id: message_id.to_string(),
        }
    }
}

/// Identity attached to an aggregate.
///
/// Starts as a placeholder when the id is first seen as a mention target and is
/// upgraded once a real post by that id arrives. Counters never live here.
#[derive(Clone, Debug, PartialEq)]
pub enum Identity {
    Placeholder(Author),
    Observed {
        author: Author,
        observed_at: ObservedAt,
    },
}

impl Identity {
    pub fn placeholder(id: &AuthorId) -> Self {
        Identity::Placeholder(placeholder_author(id))
    }

    pub fn author(&self) -> &Author {
        match self {
            Identity::Placeholder(author) => author,
            Identity::Observed { author, .. } => author,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Identity::Placeholder(_))
    }

    /// Replaces the identity with `author` if it is a placeholder or if this
    /// observation is later than the current one. Returns whether it changed.
    pub fn upgrade(&mut self, author: &Author, observed_at: ObservedAt) -> bool {
        let is_newer = match self {
            Identity::Placeholder(_) => true,
            Identity::Observed {
                observed_at: current,
                ..
            } => *current < observed_at,
        };

        if is_newer {
            *self = Identity::Observed {
                author: author.clone(),
                observed_at,
            };
        }

        is_newer
    }
}

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.author().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(id: &str, name: &str) -> Author {
        Author::new(AuthorId::from(id), name.to_string(), name.to_string())
    }

    #[test]
    fn test_placeholder_name() {
        let identity = Identity::placeholder(&AuthorId::from("42"));
        assert!(identity.is_placeholder());
        assert_eq!(identity.author().name, "Unknown User 42");
        assert_eq!(identity.author().nickname, "Unknown User 42");
    }

    #[test]
    fn test_upgrade_placeholder() {
        let mut identity = Identity::placeholder(&AuthorId::from("42"));
        let changed = identity.upgrade(
            &author("42", "alice"),
            ObservedAt::new("2020-01-01T00:00:00+00:00", "1"),
        );
        assert!(changed);
        assert!(!identity.is_placeholder());
        assert_eq!(identity.author().name, "alice");
    }

    #[test]
    fn test_latest_observation_wins_in_any_order() {
        let early = ObservedAt::new("2020-01-01T00:00:00+00:00", "1");
        let late = ObservedAt::new("2021-01-01T00:00:00+00:00", "2");

        let mut forward = Identity::placeholder(&AuthorId::from("42"));
        forward.upgrade(&author("42", "old"), early.clone());
        forward.upgrade(&author("42", "new"), late.clone());

        let mut backward = Identity::placeholder(&AuthorId::from("42"));
        backward.upgrade(&author("42", "new"), late);
        assert!(!backward.upgrade(&author("42", "old"), early));

        assert_eq!(forward.author().name, "new");
        assert_eq!(backward.author().name, "new");
    }

    #[test]
    fn test_observed_at_compares_instants_across_offsets() {
        let utc = ObservedAt::new("2020-01-01T10:00:00+00:00", "1");
        let ahead = ObservedAt::new("2020-01-01T11:30:00+02:00", "1");
        assert!(ahead < utc);
    }
}
