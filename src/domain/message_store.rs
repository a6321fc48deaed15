use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use super::message::{DeliveryStatus, FileInfo, Message, MessageKind, SenderRole};

/// Ordered messages of one conversation, as last returned by the server.
///
/// The server order is kept as-is. At most one optimistic local entry (an attachment
/// preview) is shown after the server list until the next full replace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    local_preview: Option<Message>,
}

/// Summary of a full replace, consumed by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub previous_count: usize,
    pub current_count: usize,
    pub newest_sender: Option<SenderRole>,
    pub dropped_duplicates: usize,
}

impl MessageStore {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn local_preview(&self) -> Option<&Message> {
        self.local_preview.as_ref()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn newest(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn unread_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| message.is_unread_incoming())
            .count()
    }

    /// Id of the most recent support message still lacking `read_at`.
    pub fn newest_unread_id(&self) -> Option<i64> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.is_unread_incoming())
            .map(|message| message.id)
    }

    /// Replaces the whole list with a fetched snapshot.
    pub fn replace_all(&mut self, fetched: Vec<Message>) -> ReplaceSummary {
        let previous_count = self.messages.len();
        let previous: HashMap<i64, &Message> = self
            .messages
            .iter()
            .map(|message| (message.id, message))
            .collect();

        let mut seen = HashSet::with_capacity(fetched.len());
        let mut dropped_duplicates = 0;
        let mut merged = Vec::with_capacity(fetched.len());

        for mut message in fetched {
            if !seen.insert(message.id) {
                dropped_duplicates += 1;
                continue;
            }

            if let Some(known) = previous.get(&message.id) {
                message.retain_progress_from(known);
            }

            merged.push(message);
        }

        self.messages = merged;
        self.local_preview = None;

        ReplaceSummary {
            previous_count,
            current_count: self.messages.len(),
            newest_sender: self.messages.last().map(|message| message.sender),
            dropped_duplicates,
        }
    }

    /// Stamps every unread support message as read. Repeated calls are no-ops.
    pub fn mark_incoming_read(&mut self, now: DateTime<Utc>) -> usize {
        let mut marked = 0;
        for message in self
            .messages
            .iter_mut()
            .filter(|message| message.is_unread_incoming())
        {
            message.read_at = Some(now);
            message.status = DeliveryStatus::Read;
            marked += 1;
        }
        marked
    }

    pub fn show_local_preview(&mut self, preview: Message) {
        self.local_preview = Some(preview);
    }

    pub fn clear_local_preview(&mut self) {
        self.local_preview = None;
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.local_preview = None;
    }

    /// Image messages with their attachment info, in conversation order.
    pub fn image_attachments(&self) -> impl Iterator<Item = (&Message, &FileInfo)> {
        self.messages.iter().filter_map(|message| {
            match (message.kind, message.file_info.as_ref()) {
                (MessageKind::Image, Some(file)) => Some((message, file)),
                _ => None,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{image_message, message, support_message};

    #[test]
    fn replace_keeps_server_order_and_reports_counts() {
        let mut store = MessageStore::default();

        let summary = store.replace_all(vec![message(3, "c"), support_message(1, "a")]);

        assert_eq!(summary.previous_count, 0);
        assert_eq!(summary.current_count, 2);
        assert_eq!(summary.newest_sender, Some(SenderRole::Support));
        let ids: Vec<i64> = store.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn replace_drops_duplicate_ids_keeping_first() {
        let mut store = MessageStore::default();

        let summary = store.replace_all(vec![message(1, "first"), message(1, "second")]);

        assert_eq!(summary.dropped_duplicates, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].text.as_deref(), Some("first"));
    }

    #[test]
    fn status_is_non_decreasing_across_snapshots() {
        let mut store = MessageStore::default();
        let mut read = message(1, "hi");
        read.status = DeliveryStatus::Read;
        store.replace_all(vec![read]);

        let mut stale = message(1, "hi");
        stale.status = DeliveryStatus::Sent;
        store.replace_all(vec![stale]);

        assert_eq!(store.messages()[0].status, DeliveryStatus::Read);
    }

    #[test]
    fn mark_incoming_read_is_idempotent() {
        let mut store = MessageStore::default();
        store.replace_all(vec![support_message(1, "a"), support_message(2, "b")]);
        let now = Utc::now();

        assert_eq!(store.mark_incoming_read(now), 2);
        let once = store.clone();

        assert_eq!(store.mark_incoming_read(now + chrono::Duration::seconds(5)), 0);
        assert_eq!(store, once);
        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn read_at_survives_snapshot_without_it() {
        let mut store = MessageStore::default();
        store.replace_all(vec![support_message(1, "a")]);
        store.mark_incoming_read(Utc::now());

        store.replace_all(vec![support_message(1, "a")]);

        assert_eq!(store.unread_count(), 0);
    }

    #[test]
    fn local_preview_is_overwritten_by_next_replace() {
        let mut store = MessageStore::default();
        store.show_local_preview(message(-1, "preview"));
        assert!(store.is_empty());
        assert!(store.local_preview().is_some());

        store.replace_all(vec![message(1, "server")]);

        assert!(store.local_preview().is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unread_count_and_newest_unread_track_support_messages() {
        let mut store = MessageStore::default();
        store.replace_all(vec![
            support_message(1, "a"),
            message(2, "b"),
            support_message(3, "c"),
        ]);

        assert_eq!(store.unread_count(), 2);
        assert_eq!(store.newest_unread_id(), Some(3));
    }

    #[test]
    fn image_attachments_skip_other_kinds() {
        let mut store = MessageStore::default();
        store.replace_all(vec![
            image_message(1, "a.png"),
            message(2, "text"),
            image_message(3, "b.png"),
        ]);

        let names: Vec<&str> = store
            .image_attachments()
            .map(|(_, file)| file.name.as_str())
            .collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
    }
}
