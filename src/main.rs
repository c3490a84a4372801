use std::path::PathBuf;

use clap::Parser;
use env_logger::Env;
use threadhub::{
    group_messages, load_snapshot, summarize, Breakdown, CommunicationType, HubConfig, HubError,
    JsonFileViewStore, MessageFilters, MessageStatus, Priority, Result, SavedView, Selector,
    Thread, ViewStore,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Group and filter a communications snapshot into threads",
    long_about = None
)]
struct Args {
    #[clap(
        required_unless_present_any = ["list_views", "delete_view"],
        help = "JSON snapshot of Communication records, newest first"
    )]
    path: Option<PathBuf>,
    #[clap(long = "type", help = "Channel to keep: all, email, sms or in_app")]
    kind: Option<Selector<CommunicationType>>,
    #[clap(long, help = "Status to keep: all, draft, sent, delivered, failed or read")]
    status: Option<Selector<MessageStatus>>,
    #[clap(long, help = "Priority to keep: all, low, normal, high or urgent")]
    priority: Option<Selector<Priority>>,
    #[clap(long, help = "Keep only messages linked to this record id")]
    linked_entity: Option<String>,
    #[clap(
        short,
        long,
        help = "Case-insensitive text to look for in body, subject and recipient"
    )]
    search: Option<String>,
    #[clap(long, help = "Start from a saved view; explicit filter flags override it")]
    view: Option<String>,
    #[clap(long, help = "Save the effective filters under this name")]
    save_view: Option<String>,
    #[clap(long, help = "Delete a saved view and exit")]
    delete_view: Option<String>,
    #[clap(long, help = "List saved views and exit")]
    list_views: bool,
    #[clap(short, long, help = "Show a single thread, oldest message first")]
    thread: Option<String>,
    #[clap(short, long, help = "Show only the breakdown, not the thread list")]
    analysis_only: bool,
    #[clap(long, help = "Print JSON instead of text")]
    json: bool,
    #[clap(long, help = "Saved views file (defaults to THREADHUB_VIEWS_PATH)")]
    views_file: Option<PathBuf>,
    #[clap(long, help = "Characters of body text shown per thread")]
    preview_len: Option<usize>,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::debug!("threadhub failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = HubConfig::from_env().with_overrides(args.views_file.clone(), args.preview_len);
    let mut store = JsonFileViewStore::new(&config.views_path);
    log::debug!("saved views at {}", store.path().display());
    run_with_store(&args, &config, &mut store)
}

fn run_with_store(args: &Args, config: &HubConfig, store: &mut impl ViewStore) -> Result<()> {
    if args.list_views {
        return print_views(&*store);
    }

    if let Some(name) = &args.delete_view {
        match store.delete(name)? {
            true => println!("Deleted view '{}'", name.trim()),
            false => return Err(HubError::UnknownView(name.trim().to_string())),
        }
        return Ok(());
    }

    let filters = effective_filters(args, &*store)?;
    if let Some(name) = &args.save_view {
        store.save(SavedView::new(name, filters.clone())?)?;
        println!("Saved view '{}'", name.trim());
    }

    let Some(path) = args.path.as_deref() else {
        return Ok(());
    };

    let messages = load_snapshot(path)?;
    let grouped = group_messages(&messages, &filters);
    if !filters.is_unfiltered() {
        log::info!(
            "{} of {} messages match the active filters",
            grouped.filtered.len(),
            messages.len()
        );
    }

    if let Some(key) = &args.thread {
        let thread = grouped
            .threads
            .get(key)
            .ok_or_else(|| HubError::UnknownThread(key.clone()))?;
        return print_thread(thread, args.json);
    }

    let summaries = summarize(&grouped, config.preview_len);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if !args.analysis_only {
        println!("=== THREADS ({}) ===", summaries.len());
        for summary in &summaries {
            summary.print_line();
        }
    }
    Breakdown::from_grouped(&grouped).print();

    Ok(())
}

fn effective_filters(args: &Args, store: &impl ViewStore) -> Result<MessageFilters> {
    let mut filters = match &args.view {
        Some(name) => store.require(name)?.filters,
        None => MessageFilters::default(),
    };

    if let Some(kind) = args.kind {
        filters.kind = kind;
    }
    if let Some(status) = args.status {
        filters.status = status;
    }
    if let Some(priority) = args.priority {
        filters.priority = priority;
    }
    if let Some(id) = &args.linked_entity {
        filters = filters.with_linked_entity(id.as_str());
    }
    if let Some(search) = &args.search {
        filters.search = search.clone();
    }

    Ok(filters)
}

fn print_views(store: &impl ViewStore) -> Result<()> {
    let views = store.list()?;
    if views.is_empty() {
        println!("No saved views");
        return Ok(());
    }

    for view in views {
        let f = &view.filters;
        println!(
            "{:<20} type={} status={} priority={} entity={} search={:?}  (saved {})",
            view.name,
            f.kind,
            f.status,
            f.priority,
            f.linked_entity.as_deref().unwrap_or("any"),
            f.search,
            view.created_at.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn print_thread(thread: &Thread<'_>, json: bool) -> Result<()> {
    let ordered = thread.chronological();
    if json {
        println!("{}", serde_json::to_string_pretty(&ordered)?);
        return Ok(());
    }

    println!("=== THREAD {} ({} messages) ===", thread.key(), thread.len());
    for message in ordered {
        println!(
            "\n[{}] {} {} {} -> {}",
            message.created_date.format("%Y-%m-%d %H:%M"),
            message.communication_type,
            message.status,
            message.priority,
            message.recipient().unwrap_or("(no recipient)")
        );
        if let Some(subject) = &message.subject {
            println!("Subject: {}", subject);
        }
        if let Some(entity) = &message.linked_entity {
            println!("Re: {}", entity.label());
        }
        println!("{}", message.body.as_deref().unwrap_or(""));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use threadhub::MemoryViewStore;

    const FIXTURE: &str = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/communications.json"
    );

    fn args(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("threadhub").chain(extra.iter().copied()))
    }

    fn config() -> HubConfig {
        HubConfig {
            views_path: PathBuf::from("unused-views.json"),
            preview_len: 40,
        }
    }

    fn store_with_view() -> MemoryViewStore {
        let mut store = MemoryViewStore::new();
        let filters = MessageFilters::new()
            .with_type(CommunicationType::Email)
            .with_priority(Priority::High)
            .with_linked_entity("prop-1")
            .with_search("roof");
        store
            .save(SavedView::new("roof", filters).unwrap())
            .unwrap();
        store
    }

    #[test]
    fn test_flags_override_saved_view_field_by_field() {
        let store = store_with_view();
        let filters = effective_filters(
            &args(&[FIXTURE, "--view", "roof", "--priority", "all", "--search", "quote"]),
            &store,
        )
        .unwrap();

        assert_eq!(filters.kind, Selector::Only(CommunicationType::Email));
        assert!(filters.priority.is_all());
        assert_eq!(filters.linked_entity.as_deref(), Some("prop-1"));
        assert_eq!(filters.search, "quote");
    }

    #[test]
    fn test_empty_linked_entity_flag_clears_view_entity() {
        let store = store_with_view();
        let filters = effective_filters(
            &args(&[FIXTURE, "--view", "roof", "--linked-entity", ""]),
            &store,
        )
        .unwrap();

        assert_eq!(filters.linked_entity, None);
        assert_eq!(filters.search, "roof");
    }

    #[test]
    fn test_missing_view_is_reported() {
        let store = MemoryViewStore::new();
        let err = effective_filters(&args(&[FIXTURE, "--view", "nope"]), &store).unwrap_err();
        assert!(matches!(err, HubError::UnknownView(name) if name == "nope"));
    }

    #[test]
    fn test_unknown_thread_key_is_an_error() {
        let mut store = MemoryViewStore::new();
        let err = run_with_store(
            &args(&[FIXTURE, "--thread", "thr-missing"]),
            &config(),
            &mut store,
        )
        .unwrap_err();
        assert!(matches!(err, HubError::UnknownThread(key) if key == "thr-missing"));
    }

    #[test]
    fn test_thread_hidden_by_filters_is_unknown() {
        let mut store = MemoryViewStore::new();
        let err = run_with_store(
            &args(&[FIXTURE, "--type", "sms", "--thread", "thr-roof"]),
            &config(),
            &mut store,
        )
        .unwrap_err();
        assert!(matches!(err, HubError::UnknownThread(_)));

        run_with_store(&args(&[FIXTURE, "--thread", "thr-roof"]), &config(), &mut store).unwrap();
    }

    #[test]
    fn test_delete_missing_view_is_unknown_view() {
        let mut store = MemoryViewStore::new();
        let err = run_with_store(&args(&["--delete-view", "ghost"]), &config(), &mut store)
            .unwrap_err();
        assert!(matches!(err, HubError::UnknownView(name) if name == "ghost"));
    }

    #[test]
    fn test_save_then_delete_view() {
        let mut store = MemoryViewStore::new();
        run_with_store(
            &args(&[FIXTURE, "--status", "failed", "--save-view", "failures", "-a"]),
            &config(),
            &mut store,
        )
        .unwrap();

        let saved = store.require("failures").unwrap();
        assert_eq!(saved.filters.status, Selector::Only(MessageStatus::Failed));

        run_with_store(&args(&["--delete-view", "failures"]), &config(), &mut store).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_bad_selector_flag_is_rejected_by_parser() {
        let parsed = Args::try_parse_from(["threadhub", FIXTURE, "--type", "fax"]);
        assert!(parsed.is_err());
        assert!(Path::new(FIXTURE).exists());
    }
}
