#![allow(clippy::unwrap_used)]
// Page controller tests against a wiremock appliance.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pidns_api::{AdminClient, Credentials, ListKind, TransportConfig};
use pidns_core::network::{AUTH_REQUIRED_MESSAGE, DashboardView, LOAD_FAILED_MESSAGE};
use pidns_core::session::AUTH_REQUIRED_TITLE;
use pidns_core::statistics::{ChartId, TabData};
use pidns_core::testing::{RecordingChart, RecordingShell, ShellEvent};
use pidns_core::{
    AdminSession, EntryListManager, NetworkDashboard, NoticeLevel, StatisticsViewer,
    SubscriptionManager, Tab,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(shell: RecordingShell) -> (MockServer, AdminSession, Arc<RecordingShell>) {
    let server = MockServer::start().await;
    let client = AdminClient::new(
        Url::parse(&server.uri()).unwrap(),
        &TransportConfig::default(),
    )
    .unwrap();
    let shell = Arc::new(shell);
    let session = AdminSession::new(Arc::new(client), shell.clone());
    (server, session, shell)
}

fn ok(body: serde_json::Value) -> ResponseTemplate {
    let mut body = body;
    body["success"] = json!(true);
    ResponseTemplate::new(200).set_body_json(body)
}

fn entry_json(id: i64, domain: &str) -> serde_json::Value {
    json!({
        "id": id,
        "domain": domain,
        "category": "ads",
        "created_at": "2024-06-01T10:00:00",
        "expires_at": null,
        "notes": null
    })
}

async fn mount_entries(server: &MockServer, entries: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/blacklist"))
        .respond_with(ok(json!({ "entries": entries })))
        .mount(server)
        .await;
}

// ── Shared request path ─────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_prompts_once_before_any_notice() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    session
        .client()
        .set_credentials(Credentials::new("admin", "stale".to_string().into()));

    Mock::given(method("GET"))
        .and(path("/api/blacklist"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let mut page = EntryListManager::new(ListKind::Blacklist, session.clone());
    assert!(!page.load().await);

    let events = shell.events();
    let prompt_at = events
        .iter()
        .position(|e| *e == ShellEvent::CredentialPrompt)
        .unwrap();
    let first_notice_at = events
        .iter()
        .position(|e| matches!(e, ShellEvent::Notice { .. }))
        .unwrap();
    assert!(prompt_at < first_notice_at);
    assert_eq!(shell.prompt_count(), 1);
    assert!(matches!(
        &events[first_notice_at],
        ShellEvent::Notice { title, .. } if title == AUTH_REQUIRED_TITLE
    ));
    assert!(!session.client().has_credentials());
}

#[tokio::test]
async fn test_rejection_is_shown_verbatim_and_dialog_stays_open() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    mount_entries(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/blacklist"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Domain already exists"
        })))
        .mount(&server)
        .await;

    let mut page = EntryListManager::new(ListKind::Blacklist, session);
    page.open_create();
    page.entry_form_mut().unwrap().domain = "dup.com".into();

    assert!(!page.save().await);
    assert!(page.entry_modal().is_open());
    assert_eq!(
        shell.notices(),
        vec![(NoticeLevel::Error, "Domain already exists".to_string())]
    );
}

// ── Entry list tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_empty_list_renders_placeholder() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    mount_entries(&server, json!([])).await;

    let mut page = EntryListManager::new(ListKind::Blacklist, session);
    assert!(page.load().await);

    let view = page.render(chrono::Utc::now());
    assert_eq!(view.placeholder(), Some("No blacklist entries found"));
}

#[tokio::test]
async fn test_filter_miss_renders_filter_placeholder() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    mount_entries(&server, json!([entry_json(1, "a.com")])).await;

    let mut page = EntryListManager::new(ListKind::Blacklist, session);
    page.load().await;
    page.set_search("nothing-matches");

    let view = page.render(chrono::Utc::now());
    assert_eq!(view.placeholder(), Some("No entries match the current filters"));
}

#[tokio::test]
async fn test_edit_with_blank_expiry_omits_key() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    mount_entries(&server, json!([entry_json(42, "a.com")])).await;
    Mock::given(method("PUT"))
        .and(path("/api/blacklist/42"))
        .and(body_json(json!({
            "domain": "a.com",
            "category": "ads",
            "notes": ""
        })))
        .respond_with(ok(json!({ "message": "Entry updated successfully" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut page = EntryListManager::new(ListKind::Blacklist, session);
    page.load().await;
    assert!(page.open_edit("42"));
    assert_eq!(page.entry_modal().focused(), Some("domain"));
    assert!(page.save().await);
    assert!(!page.entry_modal().is_open());
}

#[tokio::test]
async fn test_edit_does_not_touch_cache_before_reload() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/blacklist"))
        .respond_with(ok(json!({ "entries": [entry_json(7, "old.com")] })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blacklist"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/blacklist/7"))
        .respond_with(ok(json!({ "message": "Entry updated successfully" })))
        .mount(&server)
        .await;

    let mut page = EntryListManager::new(ListKind::Blacklist, session);
    page.load().await;
    page.open_edit("7");
    page.entry_form_mut().unwrap().domain = "new.com".into();

    assert!(page.save().await);
    // The reload failed, so the cache still holds what was last fetched.
    assert_eq!(page.entries()[0].domain, "old.com");
}

#[tokio::test]
async fn test_edit_unknown_id_makes_no_request() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    mount_entries(&server, json!([entry_json(1, "a.com")])).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut page = EntryListManager::new(ListKind::Blacklist, session);
    page.load().await;
    assert!(!page.open_edit("99"));
    assert_eq!(
        shell.notices(),
        vec![(NoticeLevel::Error, "Entry not found".to_string())]
    );
}

#[tokio::test]
async fn test_list_statistics_and_categories() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/whitelist/statistics"))
        .respond_with(ok(json!({
            "statistics": { "total": 3, "active": 2, "expired": 1, "categories": { "custom": 2 } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/whitelist/categories"))
        .respond_with(ok(json!({ "categories": ["custom", "streaming"] })))
        .mount(&server)
        .await;

    let page = EntryListManager::new(ListKind::Whitelist, session);
    let stats = page.statistics().await.unwrap();
    assert_eq!((stats.total, stats.active, stats.expired), (3, 2, 1));
    assert_eq!(page.categories().await.unwrap(), vec!["custom", "streaming"]);
}

#[tokio::test]
async fn test_fetch_entry_reads_one_record() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/blacklist/7"))
        .respond_with(ok(json!({ "entry": entry_json(7, "ads.example.com") })))
        .expect(1)
        .mount(&server)
        .await;

    let page = EntryListManager::new(ListKind::Blacklist, session);
    let entry = page.fetch_entry("7").await.unwrap();
    assert_eq!(entry.domain, "ads.example.com");
}

#[tokio::test]
async fn test_import_sends_trimmed_lowercased_batch() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    mount_entries(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/blacklist/batch"))
        .and(body_json(json!({
            "entries": [
                { "domain": "a.com", "category": "ads" },
                { "domain": "b.com", "category": "ads" }
            ],
            "category": "ads"
        })))
        .respond_with(ok(json!({
            "message": "Batch import completed",
            "result": { "added": 2, "skipped": 0, "errors": [] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut page = EntryListManager::new(ListKind::Blacklist, session);
    page.open_import();
    let draft = page.import_draft_mut().unwrap();
    draft.data = "a.com\nB.COM\n\n".into();
    draft.category = "ads".into();

    let result = page.import().await.unwrap();
    assert_eq!(result.added, 2);
    assert!(!page.import_modal().is_open());
    assert_eq!(
        shell.notices(),
        vec![(NoticeLevel::Success, "Batch import completed".to_string())]
    );
}

#[tokio::test]
async fn test_empty_import_is_rejected_locally() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut page = EntryListManager::new(ListKind::Whitelist, session);
    page.open_import();
    page.import_draft_mut().unwrap().data = " \n\n".into();

    assert!(page.import().await.is_none());
    assert_eq!(
        shell.notices(),
        vec![(NoticeLevel::Error, "No entries to import".to_string())]
    );
}

#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let (server, session, shell) = setup(RecordingShell::new().declining()).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut page = EntryListManager::new(ListKind::Whitelist, session);
    assert!(!page.delete("3").await);
    assert_eq!(
        shell.events(),
        vec![ShellEvent::Confirm(
            "Are you sure you want to delete this whitelist entry?".into()
        )]
    );
}

#[tokio::test]
async fn test_export_writes_kind_named_file() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/whitelist/export"))
        .respond_with(ok(json!({ "entries": [entry_json(1, "good.com")] })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut page = EntryListManager::new(ListKind::Whitelist, session);
    let written = page.export(dir.path()).await.unwrap();

    assert_eq!(written, dir.path().join("whitelist.json"));
    assert!(
        std::fs::read_to_string(&written)
            .unwrap()
            .contains("good.com")
    );
    assert_eq!(
        shell.notices(),
        vec![(NoticeLevel::Success, "Whitelist exported successfully".to_string())]
    );
}

// ── Subscription tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_update_all_confirms_then_reloads() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    Mock::given(method("POST"))
        .and(path("/api/blocklists/update-all"))
        .respond_with(ok(json!({ "message": "Updated 2 block lists", "updated_count": 2 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blocklists"))
        .respond_with(ok(json!({ "blocklists": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut page = SubscriptionManager::new(session);
    assert!(page.update_all().await);
    assert_eq!(shell.confirm_count(), 1);
    assert_eq!(
        page.render(chrono::Utc::now()).placeholder(),
        Some("No block lists found")
    );
}

#[tokio::test]
async fn test_catalog_marks_existing_subscriptions() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/blocklists/predefined"))
        .respond_with(ok(json!({
            "predefined_blocklists": [
                { "name": "Ads", "url": "https://a", "category": "ads", "in_database": true, "database_enabled": true },
                { "name": "Mal", "url": "https://m", "category": "malware", "in_database": false }
            ]
        })))
        .mount(&server)
        .await;

    let mut page = SubscriptionManager::new(session);
    assert!(page.show_catalog().await);

    let catalog = page.catalog_modal().content().unwrap();
    let labels: Vec<String> = catalog
        .cards
        .rows()
        .iter()
        .map(|c| c.action.to_string())
        .collect();
    assert_eq!(
        labels,
        vec!["Already in database (enabled)", "Add to Database"]
    );
    assert_eq!(catalog.cards.rows()[1].description, "Predefined malware block list");
}

#[tokio::test]
async fn test_edit_subscription_sends_changes_then_reloads() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    Mock::given(method("PUT"))
        .and(path("/api/blocklists/4"))
        .and(body_json(json!({ "category": "malware", "enabled": false })))
        .respond_with(ok(json!({ "message": "Block list updated successfully" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/blocklists"))
        .respond_with(ok(json!({ "blocklists": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut page = SubscriptionManager::new(session);
    let update = pidns_api::models::BlockListUpdate {
        category: Some("malware".into()),
        enabled: Some(false),
        ..Default::default()
    };
    assert!(page.edit("4", &update).await);
    assert_eq!(
        shell.notices(),
        vec![(NoticeLevel::Success, "Block list updated successfully".to_string())]
    );
}

#[tokio::test]
async fn test_edit_subscription_without_changes_sends_nothing() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut page = SubscriptionManager::new(session);
    assert!(!page.edit("4", &Default::default()).await);
    assert_eq!(
        shell.notices(),
        vec![(NoticeLevel::Error, "Nothing to change".to_string())]
    );
}

#[tokio::test]
async fn test_path_like_subscription_id_is_refused() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut page = SubscriptionManager::new(session);
    assert!(!page.toggle("../../blacklist/1").await);
    let notices = shell.notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].0, NoticeLevel::Error);
    assert!(notices[0].1.starts_with("Invalid id"), "{notices:?}");
}

#[tokio::test]
async fn test_subscription_statistics() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/blocklists/statistics"))
        .respond_with(ok(json!({
            "statistics": {
                "total_blocklists": 3,
                "enabled_blocklists": 2,
                "total_domains": 90000,
                "last_update": null,
                "category_stats": {}
            }
        })))
        .mount(&server)
        .await;

    let page = SubscriptionManager::new(session);
    let stats = page.statistics().await.unwrap();
    assert_eq!(stats.total_blocklists, 3);
    assert_eq!(stats.total_domains, 90_000);
}

// ── Statistics tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_summary_and_health_reads() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/statistics/summary"))
        .and(query_param("days", "30"))
        .respond_with(ok(json!({
            "summary": [{ "date": "2024-06-14", "total_queries": 10, "blocked_queries": 1 }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/statistics/health"))
        .respond_with(ok(json!({
            "health": { "query_count": 10, "summary_count": 1, "database_size_bytes": 4096 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let viewer = StatisticsViewer::new(session, RecordingChart::default());
    let summary = viewer.summary(30).await.unwrap();
    assert_eq!(summary[0].total_queries, 10);
    let health = viewer.health().await.unwrap();
    assert_eq!(health.summary_count, 1);
}

#[tokio::test]
async fn test_query_pages_over_120_rows() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/statistics/recent-queries"))
        .and(query_param("limit", "50"))
        .respond_with(ok(json!({ "queries": [], "total": 120, "offset": 0, "limit": 50 })))
        .mount(&server)
        .await;

    let mut viewer = StatisticsViewer::new(session, RecordingChart::default());
    viewer.switch_tab(Tab::Queries).await;
    assert!(viewer.set_page_size(50).await);

    let p = viewer.pagination();
    assert_eq!(p.total_pages(), 3);
    assert!(p.has_next());

    assert!(viewer.next_page().await);
    assert!(viewer.pagination().has_next());
    assert!(viewer.next_page().await);
    assert_eq!(viewer.pagination().page, 3);
    assert!(!viewer.pagination().has_next());
    assert!(!viewer.next_page().await);
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let (_server, session, _shell) = setup(RecordingShell::new()).await;
    let mut viewer = StatisticsViewer::new(session, RecordingChart::default());

    let older = viewer.prepare(Tab::Domains);
    let newer = viewer.prepare(Tab::Domains);

    let fresh = TabData::Domains(vec![pidns_api::models::DomainCount {
        domain: "new.com".into(),
        count: 5,
    }]);
    let stale = TabData::Domains(vec![pidns_api::models::DomainCount {
        domain: "old.com".into(),
        count: 1,
    }]);

    assert!(viewer.apply(newer.ticket, fresh));
    assert!(!viewer.apply(older.ticket, stale));
    assert_eq!(viewer.domains_view().rows()[0].label, "new.com");
}

#[tokio::test]
async fn test_hourly_chart_disposed_before_redraw() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/statistics/hourly"))
        .respond_with(ok(json!({
            "hourly_stats": [
                { "hour": "2024-06-15T10:00:00", "total_queries": 10, "blocked_queries": 2 }
            ]
        })))
        .mount(&server)
        .await;

    let mut viewer = StatisticsViewer::new(session, RecordingChart::default());
    assert!(viewer.switch_tab(Tab::Hourly).await);
    assert!(viewer.set_hours(48).await);

    let chart = viewer.chart();
    assert_eq!(chart.drawn.len(), 2);
    assert_eq!(chart.disposed, vec![ChartId(1)]);
    assert_eq!(chart.live, vec![ChartId(2)]);
}

#[tokio::test]
async fn test_clear_reloads_only_active_tab() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("POST"))
        .and(path("/api/statistics/clear"))
        .and(query_param("days", "30"))
        .respond_with(ok(json!({
            "message": "Cleared statistics older than 30 days",
            "deleted_queries": 10,
            "deleted_summary": 2
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/statistics/overview"))
        .respond_with(ok(json!({ "statistics": { "total_queries": 0, "period_days": 7 } })))
        .expect(1)
        .mount(&server)
        .await;

    let mut viewer = StatisticsViewer::new(session, RecordingChart::default());
    assert!(viewer.clear(Some(30)).await);
    assert_eq!(viewer.overview_view().unwrap().period, "7 days");
}

// ── Dashboard tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_dashboard_renders_devices_and_stats() {
    let (server, session, _shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ok(json!({
            "devices": [
                { "hostname": "nas", "mac": "aa:aa", "ip": "10.0.0.5", "vendor": "Synology",
                  "duration": "10m", "duration_seconds": 600 },
                { "hostname": null, "mac": "bb:bb", "ip": "10.0.0.6", "vendor": "Unknown",
                  "duration": "2h", "duration_seconds": 7200 }
            ],
            "total_devices": 2
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ok(json!({
            "stats": { "total_devices": 2, "active_devices": 1, "vendor_distribution": {} }
        })))
        .mount(&server)
        .await;

    let mut dash = NetworkDashboard::new(session);
    assert!(dash.refresh().await);

    let DashboardView::Devices(rows) = dash.view() else {
        panic!("expected device rows, got {:?}", dash.view());
    };
    let statuses: Vec<&str> = rows.iter().map(|r| r.status()).collect();
    assert_eq!(statuses, vec!["Active", "Inactive"]);
    assert_eq!(rows[1].name, "Unknown");
    assert_eq!(dash.network_status().unwrap().to_string(), "Active");
    assert!(dash.last_update().is_some());
}

#[tokio::test]
async fn test_dashboard_unauthorized_prompts_once_without_render() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut dash = NetworkDashboard::new(session);
    assert!(!dash.refresh().await);

    assert_eq!(shell.prompt_count(), 1);
    assert_eq!(dash.view(), &DashboardView::Error(AUTH_REQUIRED_MESSAGE.into()));
    assert!(dash.stats().is_none());
}

#[tokio::test]
async fn test_dashboard_partial_failure_shows_error() {
    let (server, session, shell) = setup(RecordingShell::new()).await;
    Mock::given(method("GET"))
        .and(path("/api/devices"))
        .respond_with(ok(json!({ "devices": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/stats"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "lease file unreadable"
        })))
        .mount(&server)
        .await;

    let mut dash = NetworkDashboard::new(session);
    assert!(!dash.refresh().await);

    assert_eq!(dash.view(), &DashboardView::Error(LOAD_FAILED_MESSAGE.into()));
    assert_eq!(shell.prompt_count(), 0);
    assert!(dash.stats().is_none());
}
