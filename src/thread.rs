//! Conversation grouping for the two-pane inbox.
//!
//! Input is a snapshot in backend order (newest first). Grouping never
//! reorders: the thread list follows the first message seen per key, and each
//! thread keeps the snapshot order, so `thread.messages()[0]` is its latest
//! message. The detail pane asks for [`Thread::chronological`] instead.

use std::collections::HashMap;

use crate::filter::MessageFilters;
use crate::models::Message;

#[derive(Debug, Clone, PartialEq)]
pub struct Thread<'a> {
    key: &'a str,
    messages: Vec<&'a Message>,
}

impl<'a> Thread<'a> {
    fn new(key: &'a str) -> Self {
        Thread {
            key,
            messages: Vec::new(),
        }
    }

    pub fn key(&self) -> &'a str {
        self.key
    }

    /// Messages in snapshot order (newest first).
    pub fn messages(&self) -> &[&'a Message] {
        &self.messages
    }

    pub fn latest(&self) -> &'a Message {
        // Threads are only created when their first message is pushed.
        self.messages[0]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Oldest first, ties kept in snapshot order.
    pub fn chronological(&self) -> Vec<&'a Message> {
        let mut ordered = self.messages.clone();
        ordered.sort_by_key(|message| message.created_date);
        ordered
    }
}

/// Thread key to messages, iterated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadMap<'a> {
    threads: Vec<Thread<'a>>,
    index: HashMap<&'a str, usize>,
}

impl<'a> ThreadMap<'a> {
    pub fn get(&self, key: &str) -> Option<&Thread<'a>> {
        self.index.get(key).map(|&position| &self.threads[position])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.threads.iter().map(|thread| thread.key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Thread<'a>> {
        self.threads.iter()
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }

    fn push(&mut self, message: &'a Message) {
        let key = message.thread_key();
        let position = match self.index.get(key) {
            Some(&position) => position,
            None => {
                self.threads.push(Thread::new(key));
                self.index.insert(key, self.threads.len() - 1);
                self.threads.len() - 1
            }
        };
        self.threads[position].messages.push(message);
    }
}

impl<'a, 'm> IntoIterator for &'m ThreadMap<'a> {
    type Item = &'m Thread<'a>;
    type IntoIter = std::slice::Iter<'m, Thread<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.threads.iter()
    }
}

impl<'a> FromIterator<&'a Message> for ThreadMap<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Message>>(iter: I) -> Self {
        let mut map = ThreadMap::default();
        for message in iter {
            map.push(message);
        }
        map
    }
}

/// Result of one grouping pass over a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMessages<'a> {
    /// Messages passing every active filter, in snapshot order.
    pub filtered: Vec<&'a Message>,
    pub threads: ThreadMap<'a>,
}

/// Filter a snapshot and group the survivors into threads.
pub fn group_messages<'a>(
    messages: &'a [Message],
    filters: &MessageFilters,
) -> GroupedMessages<'a> {
    let filtered: Vec<&Message> = messages
        .iter()
        .filter(|message| filters.matches(message))
        .collect();
    let threads: ThreadMap = filtered.iter().copied().collect();

    log::debug!(
        "grouped {} of {} messages into {} threads",
        filtered.len(),
        messages.len(),
        threads.len()
    );

    GroupedMessages { filtered, threads }
}
