//! Inbox filter settings.
//!
//! Every predicate is optional: `all`, an absent key, a `null` entity or an
//! empty search string switch that check off. Active predicates are ANDed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::HubError;
use crate::models::{CommunicationType, Message, MessageStatus, Priority};

/// Either "no restriction" or one concrete value the field must equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selector<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selector<T> {
    pub fn accepts(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selector::All)
    }
}

impl<T> From<Option<T>> for Selector<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selector::All, Selector::Only)
    }
}

impl<T: FromStr<Err = HubError>> FromStr for Selector<T> {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Selector::All)
        } else {
            s.parse().map(Selector::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::All => f.write_str("all"),
            Selector::Only(value) => value.fmt(f),
        }
    }
}

impl<T: fmt::Display> Serialize for Selector<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, T: FromStr<Err = HubError>> Deserialize<'de> for Selector<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Selector::All),
            Some(raw) => raw.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageFilters {
    #[serde(rename = "type")]
    pub kind: Selector<CommunicationType>,
    pub status: Selector<MessageStatus>,
    pub priority: Selector<Priority>,
    #[serde(deserialize_with = "deserialize_entity_id")]
    pub linked_entity: Option<String>,
    pub search: String,
}

/// An empty entity id means "any record", same as `null`.
fn deserialize_entity_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|id| !id.is_empty()))
}

impl MessageFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, kind: impl Into<Selector<CommunicationType>>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_status(mut self, status: impl Into<Selector<MessageStatus>>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Selector<Priority>>) -> Self {
        self.priority = priority.into();
        self
    }

    /// An empty id clears the entity filter.
    pub fn with_linked_entity(mut self, id: impl Into<String>) -> Self {
        self.linked_entity = Some(id.into()).filter(|id| !id.is_empty());
        self
    }

    pub fn linked_entity(&self) -> Option<&str> {
        self.linked_entity.as_deref().filter(|id| !id.is_empty())
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.kind.is_all()
            && self.status.is_all()
            && self.priority.is_all()
            && self.linked_entity().is_none()
            && self.search.is_empty()
    }

    pub fn matches(&self, message: &Message) -> bool {
        self.kind.accepts(&message.communication_type)
            && self.status.accepts(&message.status)
            && self.priority.accepts(&message.priority)
            && self.matches_linked_entity(message)
            && self.matches_search(message)
    }

    fn matches_linked_entity(&self, message: &Message) -> bool {
        match self.linked_entity() {
            None => true,
            Some(wanted) => message.linked_entity_id() == Some(wanted),
        }
    }

    fn matches_search(&self, message: &Message) -> bool {
        if self.search.is_empty() {
            return true;
        }

        let needle = self.search.to_lowercase();
        [
            message.body.as_deref(),
            message.subject.as_deref(),
            message.recipient_email.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

impl From<CommunicationType> for Selector<CommunicationType> {
    fn from(value: CommunicationType) -> Self {
        Selector::Only(value)
    }
}

impl From<MessageStatus> for Selector<MessageStatus> {
    fn from(value: MessageStatus) -> Self {
        Selector::Only(value)
    }
}

impl From<Priority> for Selector<Priority> {
    fn from(value: Priority) -> Self {
        Selector::Only(value)
    }
}
