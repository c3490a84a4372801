use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use counter::Counter;
use regex::Regex;
use serde::Serialize;

use crate::models::{CommunicationType, Message, MessageStatus, Priority};
use crate::thread::{GroupedMessages, Thread};

static WHITESPACE_REGEX: OnceLock<Regex> = OnceLock::new();

fn whitespace_regex() -> &'static Regex {
    WHITESPACE_REGEX.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Collapse whitespace and cut to `max_chars`, marking the cut with `…`.
pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = whitespace_regex().replace_all(text.trim(), " ");
    if collapsed.chars().count() <= max_chars {
        return collapsed.into_owned();
    }

    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut.truncate(cut.trim_end().len());
    cut.push('…');
    cut
}

/// One row of the thread list pane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadSummary {
    pub key: String,
    pub message_count: usize,
    pub latest_id: String,
    pub latest_subject: String,
    pub preview: String,
    pub latest_at: DateTime<Utc>,
    pub first_at: DateTime<Utc>,
    pub communication_type: CommunicationType,
    pub highest_priority: Priority,
    pub has_failed: bool,
    pub unread_count: usize,
    pub recipients: Vec<String>,
    pub linked_entity: Option<String>,
}

impl ThreadSummary {
    pub fn from_thread(thread: &Thread<'_>, preview_len: usize) -> Self {
        let latest = thread.latest();
        let messages = thread.messages();

        let latest_subject = messages
            .iter()
            .find_map(|message| message.subject.as_deref().filter(|s| !s.trim().is_empty()))
            .unwrap_or("(no subject)")
            .to_string();

        let mut recipients: Vec<String> = Vec::new();
        for recipient in messages.iter().filter_map(|message| message.recipient()) {
            if !recipients.iter().any(|seen| seen == recipient) {
                recipients.push(recipient.to_string());
            }
        }

        ThreadSummary {
            key: thread.key().to_string(),
            message_count: thread.len(),
            latest_id: latest.id.clone(),
            latest_subject,
            preview: preview(latest.body.as_deref().unwrap_or(""), preview_len),
            latest_at: latest.created_date,
            first_at: messages
                .iter()
                .map(|message| message.created_date)
                .min()
                .unwrap_or(latest.created_date),
            communication_type: latest.communication_type,
            highest_priority: messages
                .iter()
                .map(|message| message.priority)
                .max()
                .unwrap_or_default(),
            has_failed: messages
                .iter()
                .any(|message| message.status == MessageStatus::Failed),
            unread_count: messages.iter().filter(|message| message.is_unread()).count(),
            recipients,
            linked_entity: messages
                .iter()
                .find_map(|message| message.linked_entity.as_ref())
                .map(|entity| entity.label()),
        }
    }

    pub fn print_line(&self) {
        let mut flags = String::new();
        if self.unread_count > 0 {
            flags.push_str(&format!(" [{} unread]", self.unread_count));
        }
        if self.has_failed {
            flags.push_str(" [failed]");
        }
        if self.highest_priority >= Priority::High {
            flags.push_str(&format!(" [{}]", self.highest_priority));
        }

        println!(
            "{:<24} {:>3}  {:<6} {}  {}{}",
            self.key,
            self.message_count,
            self.communication_type.as_str(),
            self.latest_at.format("%Y-%m-%d %H:%M"),
            self.latest_subject,
            flags
        );
        if !self.preview.is_empty() {
            println!("{:<24}      {}", "", self.preview);
        }
        if let Some(entity) = &self.linked_entity {
            println!("{:<24}      ↳ {}", "", entity);
        }
    }
}

/// Summaries in thread-list order.
pub fn summarize(grouped: &GroupedMessages<'_>, preview_len: usize) -> Vec<ThreadSummary> {
    grouped
        .threads
        .iter()
        .map(|thread| ThreadSummary::from_thread(thread, preview_len))
        .collect()
}

/// Message counts per channel, status, priority and linked record kind.
#[derive(Debug, Clone, Default)]
pub struct Breakdown {
    pub total: usize,
    pub threads: usize,
    pub by_type: Counter<CommunicationType>,
    pub by_status: Counter<MessageStatus>,
    pub by_priority: Counter<Priority>,
    pub by_entity_kind: Counter<String>,
}

impl Breakdown {
    pub fn from_grouped(grouped: &GroupedMessages<'_>) -> Self {
        let mut breakdown = Self::from_messages(grouped.filtered.iter().copied());
        breakdown.threads = grouped.threads.len();
        breakdown
    }

    pub fn from_messages<'a>(messages: impl IntoIterator<Item = &'a Message>) -> Self {
        let mut breakdown = Breakdown::default();
        for message in messages {
            breakdown.total += 1;
            breakdown.by_type[&message.communication_type] += 1;
            breakdown.by_status[&message.status] += 1;
            breakdown.by_priority[&message.priority] += 1;
            if let Some(entity) = &message.linked_entity {
                breakdown.by_entity_kind[&entity.kind.to_string()] += 1;
            }
        }
        breakdown
    }

    pub fn print(&self) {
        println!("\n=== BREAKDOWN ===");
        println!("Messages: {}  Threads: {}", self.total, self.threads);

        print_counter("By channel", &self.by_type);
        print_counter("By status", &self.by_status);
        print_counter("By priority", &self.by_priority);
        if !self.by_entity_kind.is_empty() {
            print_counter("By linked record", &self.by_entity_kind);
        }
    }
}

fn print_counter<T>(title: &str, counter: &Counter<T>)
where
    T: Ord + Clone + std::hash::Hash + std::fmt::Display,
{
    println!("\n{}:", title);
    for (value, count) in counter.most_common_ordered() {
        println!("   {:<20} {:>5}", value.to_string(), count);
    }
}
