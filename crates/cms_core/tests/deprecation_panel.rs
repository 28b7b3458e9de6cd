use cms_core::db::open_db_in_memory;
use cms_core::{
    DeprecatedPanel, Deprecator, NewDeprecationLog, PanelDetail, PanelError, PanelQuery,
    SqliteDeprecationLogStore, TraceFrame,
};

fn trace(file: &str, line: u32) -> TraceFrame {
    TraceFrame {
        file: Some(file.to_string()),
        line: Some(line),
        function: Some("render".to_string()),
    }
}

#[test]
fn repeated_warning_updates_one_log() {
    let conn = open_db_in_memory().unwrap();
    let mut deprecator = Deprecator::new(SqliteDeprecationLogStore::try_new(&conn).unwrap());

    let first = deprecator
        .log(&NewDeprecationLog::new("craft.getUsers", "old message").at("index.twig", 3))
        .unwrap();
    let second = deprecator
        .log(
            &NewDeprecationLog::new("craft.getUsers", "new message")
                .at("index.twig", 3)
                .with_traces(vec![trace("index.twig", 3)]),
        )
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.message, "new message");
    assert_eq!(second.traces, vec![trace("index.twig", 3)]);
    assert_eq!(deprecator.request_logs().len(), 1);
    assert_eq!(deprecator.all_logs().unwrap().len(), 1);
}

#[test]
fn summary_is_restartable_and_matches_saved_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let mut deprecator = Deprecator::new(SqliteDeprecationLogStore::try_new(&conn).unwrap());
    deprecator
        .log(&NewDeprecationLog::new("a.key", "first"))
        .unwrap();
    deprecator
        .log(&NewDeprecationLog::new("b.key", "second").at("layout.twig", 9))
        .unwrap();

    let panel = DeprecatedPanel::new(&mut deprecator);
    assert_eq!(panel.name(), "Deprecated");

    let first_pass: Vec<_> = panel.list_summary().map(|log| log.key.clone()).collect();
    let second_pass: Vec<_> = panel.list_summary().map(|log| log.key.clone()).collect();
    assert_eq!(first_pass, vec!["a.key", "b.key"]);
    assert_eq!(first_pass, second_pass);

    let saved = serde_json::to_value(panel.save()).unwrap();
    assert_eq!(saved[1]["fingerprint"], "layout.twig:9");
    assert_eq!(saved[1]["line"], 9);
}

#[test]
fn detail_by_id_returns_log_or_not_found() {
    let conn = open_db_in_memory().unwrap();
    let mut deprecator = Deprecator::new(SqliteDeprecationLogStore::try_new(&conn).unwrap());
    let stored = deprecator
        .log(&NewDeprecationLog::new("x.key", "msg").with_traces(vec![trace("a.php", 1)]))
        .unwrap();

    let panel = DeprecatedPanel::new(&mut deprecator);
    assert_eq!(panel.get_detail_by_id(stored.id).unwrap(), stored);

    let err = panel.get_detail_by_id(stored.id + 100).unwrap_err();
    assert!(matches!(err, PanelError::NotFound(_)));
}

#[test]
fn clear_all_twice_leaves_empty_log_without_error() {
    let conn = open_db_in_memory().unwrap();
    let mut deprecator = Deprecator::new(SqliteDeprecationLogStore::try_new(&conn).unwrap());
    deprecator
        .log(&NewDeprecationLog::new("x.key", "msg"))
        .unwrap();

    let mut panel = DeprecatedPanel::new(&mut deprecator);
    panel.clear_all().unwrap();
    assert_eq!(panel.list_summary().count(), 0);
    panel.clear_all().unwrap();
    assert_eq!(panel.list_summary().count(), 0);

    assert!(deprecator.all_logs().unwrap().is_empty());
}

#[test]
fn detail_query_resolves_overview_trace_and_clear() {
    let conn = open_db_in_memory().unwrap();
    let mut deprecator = Deprecator::new(SqliteDeprecationLogStore::try_new(&conn).unwrap());
    let stored = deprecator
        .log(&NewDeprecationLog::new("x.key", "msg"))
        .unwrap();

    let mut panel = DeprecatedPanel::new(&mut deprecator);

    let overview = panel.detail(&PanelQuery::default()).unwrap();
    assert!(matches!(overview, PanelDetail::Overview(ref logs) if logs.len() == 1));

    let traces = panel
        .detail(&PanelQuery {
            clear: false,
            trace: Some(stored.id.to_string()),
        })
        .unwrap();
    assert_eq!(traces, PanelDetail::Traces(stored.clone()));

    let bogus = panel
        .detail(&PanelQuery {
            clear: false,
            trace: Some("not-a-number".to_string()),
        })
        .unwrap_err();
    assert!(matches!(bogus, PanelError::NotFound(ref id) if id == "not-a-number"));

    let cleared = panel
        .detail(&PanelQuery {
            clear: true,
            trace: Some(stored.id.to_string()),
        })
        .unwrap_err();
    assert!(matches!(cleared, PanelError::NotFound(_)));
    assert_eq!(
        panel.detail(&PanelQuery::default()).unwrap(),
        PanelDetail::Overview(Vec::new())
    );
}

#[test]
fn zero_or_blank_trace_renders_overview() {
    let conn = open_db_in_memory().unwrap();
    let mut deprecator = Deprecator::new(SqliteDeprecationLogStore::try_new(&conn).unwrap());
    deprecator
        .log(&NewDeprecationLog::new("x.key", "msg"))
        .unwrap();

    let mut panel = DeprecatedPanel::new(&mut deprecator);
    for raw in ["0", " 0 ", ""] {
        let detail = panel
            .detail(&PanelQuery {
                clear: false,
                trace: Some(raw.to_string()),
            })
            .unwrap();
        assert!(matches!(detail, PanelDetail::Overview(ref logs) if logs.len() == 1));
    }
}
