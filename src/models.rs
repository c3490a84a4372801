use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::HubError;

/// Generates the string conversions shared by the closed message enums.
macro_rules! wire_enum {
    ($name:ident, $field:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = HubError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    _ => Err(HubError::InvalidSelector {
                        field: $field,
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationType {
    #[default]
    Email,
    Sms,
    InApp,
}

wire_enum!(CommunicationType, "type", {
    Email => "email",
    Sms => "sms",
    InApp => "in_app",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Draft,
    #[default]
    Sent,
    Delivered,
    Failed,
    Read,
}

wire_enum!(MessageStatus, "status", {
    Draft => "draft",
    Sent => "sent",
    Delivered => "delivered",
    Failed => "failed",
    Read => "read",
});

/// Ordered from least to most pressing, so `max()` picks the loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

wire_enum!(Priority, "priority", {
    Low => "low",
    Normal => "normal",
    High => "high",
    Urgent => "urgent",
});

/// Kind of record a message can be linked to elsewhere in the app.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Property,
    Vehicle,
    Contact,
    Document,
    Asset,
    FinancialAccount,
    HealthRecord,
    LegalDocument,
    BusinessClient,
    Other(String),
}

impl EntityKind {
    /// Accepts both the backend's entity names (`FinancialAccount`) and
    /// snake_case (`financial_account`).
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "property" => EntityKind::Property,
            "vehicle" => EntityKind::Vehicle,
            "contact" => EntityKind::Contact,
            "document" => EntityKind::Document,
            "asset" => EntityKind::Asset,
            "financialaccount" => EntityKind::FinancialAccount,
            "healthrecord" => EntityKind::HealthRecord,
            "legaldocument" => EntityKind::LegalDocument,
            "businessclient" => EntityKind::BusinessClient,
            _ => EntityKind::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::Property => "property",
            EntityKind::Vehicle => "vehicle",
            EntityKind::Contact => "contact",
            EntityKind::Document => "document",
            EntityKind::Asset => "asset",
            EntityKind::FinancialAccount => "financial_account",
            EntityKind::HealthRecord => "health_record",
            EntityKind::LegalDocument => "legal_document",
            EntityKind::BusinessClient => "business_client",
            EntityKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Other(raw) if raw.is_empty() => f.write_str("unknown"),
            other => f.write_str(other.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LinkedEntity {
    pub kind: EntityKind,
    pub id: String,
    pub name: Option<String>,
    /// `linked_entity_type` exactly as received, written back on output.
    wire_type: Option<String>,
}

impl PartialEq for LinkedEntity {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.id == other.id && self.name == other.name
    }
}

impl Eq for LinkedEntity {}

impl LinkedEntity {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        LinkedEntity {
            kind,
            id: id.into(),
            name: None,
            wire_type: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.kind, name),
            None => format!("{} {}", self.kind, self.id),
        }
    }
}

/// A Communication record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireMessage", into = "WireMessage")]
pub struct Message {
    pub id: String,
    pub thread_id: Option<String>,
    pub communication_type: CommunicationType,
    pub status: MessageStatus,
    pub priority: Priority,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub linked_entity: Option<LinkedEntity>,
    pub created_date: DateTime<Utc>,
}

impl Message {
    /// Grouping key: the backend-issued thread id, or the message's own id.
    pub fn thread_key(&self) -> &str {
        self.thread_id.as_deref().unwrap_or(&self.id)
    }

    pub fn linked_entity_id(&self) -> Option<&str> {
        self.linked_entity.as_ref().map(|entity| entity.id.as_str())
    }

    /// Whichever recipient address is populated for this message.
    pub fn recipient(&self) -> Option<&str> {
        self.recipient_email
            .as_deref()
            .or(self.recipient_phone.as_deref())
    }

    pub fn is_unread(&self) -> bool {
        self.status == MessageStatus::Delivered
    }
}

/// Flat shape used on the wire; folds into [`Message`].
#[derive(Serialize, Deserialize)]
struct WireMessage {
    id: String,
    #[serde(default)]
    thread_id: Option<String>,
    #[serde(default)]
    communication_type: Option<CommunicationType>,
    #[serde(default)]
    status: Option<MessageStatus>,
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_entity_name: Option<String>,
    #[serde(
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    created_date: DateTime<Utc>,
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let linked_entity = wire.linked_entity_id.map(|id| LinkedEntity {
            kind: wire
                .linked_entity_type
                .as_deref()
                .map(EntityKind::parse)
                .unwrap_or_else(|| EntityKind::Other(String::new())),
            id,
            name: wire.linked_entity_name,
            wire_type: wire.linked_entity_type,
        });

        Message {
            id: wire.id,
            thread_id: wire.thread_id,
            communication_type: wire.communication_type.unwrap_or_default(),
            status: wire.status.unwrap_or_default(),
            priority: wire.priority.unwrap_or_default(),
            recipient_email: wire.recipient_email,
            recipient_phone: wire.recipient_phone,
            subject: wire.subject,
            body: wire.body,
            linked_entity,
            created_date: wire.created_date,
        }
    }
}

impl From<Message> for WireMessage {
    fn from(message: Message) -> Self {
        let (linked_entity_type, linked_entity_id, linked_entity_name) = match message.linked_entity
        {
            Some(entity) => {
                let kind = match (entity.wire_type, entity.kind) {
                    (Some(raw), kind) if EntityKind::parse(&raw) == kind => Some(raw),
                    (_, EntityKind::Other(raw)) if raw.is_empty() => None,
                    (_, kind) => Some(kind.as_str().to_string()),
                };
                (kind, Some(entity.id), entity.name)
            }
            None => (None, None, None),
        };

        WireMessage {
            id: message.id,
            thread_id: message.thread_id,
            communication_type: Some(message.communication_type),
            status: Some(message.status),
            priority: Some(message.priority),
            recipient_email: message.recipient_email,
            recipient_phone: message.recipient_phone,
            subject: message.subject,
            body: message.body,
            linked_entity_type,
            linked_entity_id,
            linked_entity_name,
            created_date: message.created_date,
        }
    }
}

/// Parse the timestamp formats the backend has been seen to emit.
///
/// Naive timestamps and bare dates are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised timestamp '{}'", raw)))
}

fn serialize_timestamp<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}
