use std::path::Path;

use threadhub::{
    group_messages, load_snapshot, summarize, Breakdown, CommunicationType, JsonFileViewStore,
    Message, MessageFilters, MessageStatus, Priority, SavedView, ViewStore,
};

fn fixture() -> Vec<Message> {
    load_snapshot(Path::new(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/communications.json"
    )))
    .unwrap()
}

fn ids(messages: &[&Message]) -> Vec<String> {
    messages.iter().map(|m| m.id.clone()).collect()
}

#[test]
fn test_unfiltered_snapshot_groups_by_thread() {
    let messages = fixture();
    let grouped = group_messages(&messages, &MessageFilters::default());

    assert_eq!(grouped.filtered.len(), messages.len());
    assert_eq!(
        grouped.threads.keys().collect::<Vec<_>>(),
        vec!["thr-roof", "c5", "c3", "thr-tax"]
    );

    let roof = grouped.threads.get("thr-roof").unwrap();
    assert_eq!(ids(roof.messages()), vec!["c6", "c4", "c1"]);
    assert_eq!(roof.latest().id, "c6");
    assert_eq!(ids(&roof.chronological()), vec!["c1", "c4", "c6"]);
}

#[test]
fn test_filters_combine_with_and() {
    let messages = fixture();

    let emails = group_messages(
        &messages,
        &MessageFilters::new().with_type(CommunicationType::Email),
    );
    assert_eq!(ids(&emails.filtered), vec!["c6", "c4", "c2", "c1"]);
    assert!(!emails.threads.contains_key("c5"));

    let roof_invoice = group_messages(
        &messages,
        &MessageFilters::new()
            .with_linked_entity("prop-1")
            .with_search("INVOICE"),
    );
    assert_eq!(ids(&roof_invoice.filtered), vec!["c6"]);
    assert_eq!(roof_invoice.threads.get("thr-roof").unwrap().len(), 1);

    let nothing = group_messages(
        &messages,
        &MessageFilters::new()
            .with_status(MessageStatus::Failed)
            .with_priority(Priority::Low),
    );
    assert!(nothing.filtered.is_empty());
    assert!(nothing.threads.is_empty());
}

#[test]
fn test_summaries_and_breakdown_follow_thread_order() {
    let messages = fixture();
    let grouped = group_messages(&messages, &MessageFilters::default());
    let summaries = summarize(&grouped, 20);

    assert_eq!(summaries.len(), 4);
    assert_eq!(summaries[0].key, "thr-roof");
    assert_eq!(summaries[0].latest_subject, "Re: Roof repair quote");
    assert_eq!(summaries[0].preview, "Attached is the revi…");
    assert_eq!(summaries[0].unread_count, 1);
    assert_eq!(summaries[0].highest_priority, Priority::High);
    assert_eq!(summaries[1].key, "c5");
    assert!(summaries[1].has_failed);
    assert_eq!(summaries[2].latest_subject, "(no subject)");

    let breakdown = Breakdown::from_grouped(&grouped);
    assert_eq!(breakdown.total, 6);
    assert_eq!(breakdown.threads, 4);
    assert_eq!(breakdown.by_type[&CommunicationType::Email], 4);
    assert_eq!(breakdown.by_entity_kind[&"property".to_string()], 3);
    assert_eq!(breakdown.by_entity_kind[&"financial_account".to_string()], 1);
}

#[test]
fn test_saved_view_drives_grouping() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileViewStore::new(dir.path().join("views.json"));
    store
        .save(
            SavedView::new(
                "urgent",
                MessageFilters::new().with_priority(Priority::Urgent),
            )
            .unwrap(),
        )
        .unwrap();

    let messages = fixture();
    let view = store.require("urgent").unwrap();
    let grouped = group_messages(&messages, &view.filters);

    assert_eq!(ids(&grouped.filtered), vec!["c5"]);
}
