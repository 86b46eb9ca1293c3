//! End-to-end: live stats over HTTP through detection, routing and the in-app surface

use fpl_live_alerts::{
    engine::{EventKind, PollOutcome, PollScheduler, TrackedPlayer},
    fpl::HttpLiveStatsSource,
    notify::{
        ChannelKind, InAppNotificationSurface, NotificationRouter, PlatformCapabilities,
        SettingsStore, SharedSurface,
    },
    storage::MemoryStore,
    GameweekId, PlayerId,
};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

fn salah() -> TrackedPlayer {
    TrackedPlayer::new(PlayerId::new(355), "Salah", "Liverpool")
}

fn live_body(stats: Value) -> Value {
    json!({
        "elements": [
            { "id": 355, "stats": stats, "explain": [{ "fixture": 91 }] },
            { "id": 16, "stats": { "minutes": 90, "goals_scored": 2 }, "explain": [{ "fixture": 92 }] }
        ]
    })
}

/// Serve `bodies` for `/event/10/live/` one per request, repeating the last.
async fn mount_live_sequence(server: &MockServer, bodies: Vec<Value>) {
    let last = bodies.len() - 1;
    for (i, body) in bodies.into_iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path("/event/10/live/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body));
        let mock = if i == last { mock } else { mock.up_to_n_times(1) };
        mock.mount(server).await;
    }
}

async fn mount_fixtures_sequence(server: &MockServer, bodies: Vec<Value>) {
    let last = bodies.len() - 1;
    for (i, body) in bodies.into_iter().enumerate() {
        let mock = Mock::given(method("GET"))
            .and(path("/fixtures/"))
            .and(query_param("event", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body));
        let mock = if i == last { mock } else { mock.up_to_n_times(1) };
        mock.mount(server).await;
    }
}

fn scheduler_for(
    server: &MockServer,
    capabilities: PlatformCapabilities,
) -> (PollScheduler<HttpLiveStatsSource, NotificationRouter>, SharedSurface) {
    let surface = InAppNotificationSurface::shared();
    let router = NotificationRouter::new(
        SettingsStore::new(MemoryStore::new()),
        capabilities,
        surface.clone(),
    );
    let source = HttpLiveStatsSource::new(server.uri()).unwrap();
    (PollScheduler::new(source, router), surface)
}

fn rendered_titles(surface: &SharedSurface) -> Vec<String> {
    surface
        .lock()
        .unwrap()
        .rendered()
        .iter()
        .map(|t| t.notification.title.clone())
        .collect()
}

#[tokio::test]
async fn test_goal_reaches_in_app_surface() {
    let server = MockServer::start().await;
    mount_fixtures_sequence(&server, vec![json!([{ "id": 91, "finished": false }])]).await;
    mount_live_sequence(
        &server,
        vec![
            live_body(json!({ "minutes": 45, "goals_scored": 0, "assists": 0 })),
            live_body(json!({ "minutes": 45, "goals_scored": 1, "assists": 0 })),
        ],
    )
    .await;

    let (scheduler, surface) = scheduler_for(&server, PlatformCapabilities::default());
    scheduler.track(vec![salah()], GameweekId::new(10));

    assert_eq!(scheduler.force_check().await, PollOutcome::Completed { events: 0 });
    assert!(surface.lock().unwrap().is_empty());

    // Minutes unchanged but a goal went in: only the goal is reported.
    assert_eq!(scheduler.force_check().await, PollOutcome::Completed { events: 1 });
    let surface_guard = surface.lock().unwrap();
    let rendered = surface_guard.rendered();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].notification.title, "⚽ Goal!");
    assert_eq!(rendered[0].notification.body, "Salah (Liverpool) has scored!");
    assert!(rendered[0].notification.tag.starts_with("goal-355-"));
}

#[tokio::test]
async fn test_untracked_players_are_ignored() {
    let server = MockServer::start().await;
    mount_fixtures_sequence(&server, vec![json!([{ "id": 91 }, { "id": 92 }])]).await;
    mount_live_sequence(&server, vec![live_body(json!({ "minutes": 10 }))]).await;

    let (scheduler, _surface) = scheduler_for(&server, PlatformCapabilities::default());
    scheduler.track(vec![salah()], GameweekId::new(10));
    scheduler.force_check().await;

    scheduler.with_store(|store| {
        assert_eq!(store.len(), 1);
        assert!(store.get(PlayerId::new(16)).is_none());
    });
}

#[tokio::test]
async fn test_disabled_kind_is_detected_but_not_shown() {
    let server = MockServer::start().await;
    mount_fixtures_sequence(&server, vec![json!([{ "id": 91 }])]).await;
    mount_live_sequence(
        &server,
        vec![
            live_body(json!({ "minutes": 30 })),
            live_body(json!({ "minutes": 40, "goals_scored": 1, "yellow_cards": 1 })),
        ],
    )
    .await;

    let (scheduler, surface) = scheduler_for(&server, PlatformCapabilities::default());
    scheduler
        .with_sink(|router| router.settings_mut().set_kind(EventKind::Goal, false))
        .unwrap();
    scheduler.track(vec![salah()], GameweekId::new(10));

    scheduler.force_check().await;
    assert_eq!(scheduler.force_check().await, PollOutcome::Completed { events: 2 });
    assert_eq!(rendered_titles(&surface), vec!["🟨 Yellow Card".to_string()]);
}

#[tokio::test]
async fn test_full_time_with_bonus() {
    let server = MockServer::start().await;
    mount_fixtures_sequence(
        &server,
        vec![
            json!([{ "id": 91, "finished": false }]),
            json!([{ "id": 91, "finished": false, "finished_provisional": true }]),
        ],
    )
    .await;
    mount_live_sequence(
        &server,
        vec![
            live_body(json!({ "minutes": 80, "goals_scored": 1 })),
            live_body(json!({ "minutes": 90, "goals_scored": 1, "bonus": 3 })),
        ],
    )
    .await;

    let (scheduler, surface) = scheduler_for(&server, PlatformCapabilities::default());
    scheduler.track(vec![salah()], GameweekId::new(10));

    scheduler.force_check().await;
    assert_eq!(scheduler.force_check().await, PollOutcome::Completed { events: 2 });
    assert_eq!(
        rendered_titles(&surface),
        vec!["⭐ Bonus Points".to_string(), "🏁 Full Time".to_string()]
    );

    // Finished and unchanged: nothing more to say.
    assert_eq!(scheduler.force_check().await, PollOutcome::Completed { events: 0 });
}

#[tokio::test]
async fn test_ios_wrapper_routes_to_surface() {
    let server = MockServer::start().await;
    mount_fixtures_sequence(&server, vec![json!([{ "id": 91 }])]).await;
    mount_live_sequence(
        &server,
        vec![
            live_body(json!({ "minutes": 20 })),
            live_body(json!({ "minutes": 25, "red_cards": 1 })),
        ],
    )
    .await;

    let capabilities = PlatformCapabilities {
        ios_wrapper: true,
        ..PlatformCapabilities::default()
    };
    let (scheduler, surface) = scheduler_for(&server, capabilities);
    assert_eq!(
        scheduler.with_sink(|router| fpl_live_alerts::notify::channel::select_channel(
            &router.capabilities(),
            &router.settings().load()
        )),
        ChannelKind::PlatformPush
    );
    scheduler.track(vec![salah()], GameweekId::new(10));

    scheduler.force_check().await;
    scheduler.force_check().await;
    assert_eq!(rendered_titles(&surface), vec!["🟥 Red Card".to_string()]);
}

#[tokio::test]
async fn test_gameweek_switch_resets_baselines() {
    let server = MockServer::start().await;
    mount_fixtures_sequence(&server, vec![json!([{ "id": 91 }])]).await;
    mount_live_sequence(&server, vec![live_body(json!({ "minutes": 90, "goals_scored": 2 }))]).await;
    Mock::given(method("GET"))
        .and(path("/event/11/live/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_body(json!({ "minutes": 5 }))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/fixtures/"))
        .and(query_param("event", "11"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": 91 }])))
        .mount(&server)
        .await;

    let (scheduler, surface) = scheduler_for(&server, PlatformCapabilities::default());
    scheduler.track(vec![salah()], GameweekId::new(10));
    scheduler.force_check().await;

    scheduler.track(vec![salah()], GameweekId::new(11));
    // Lower counters in the new gameweek are a fresh baseline, not a decrease.
    assert_eq!(scheduler.force_check().await, PollOutcome::Completed { events: 0 });
    assert!(surface.lock().unwrap().is_empty());
    scheduler.with_store(|store| {
        assert_eq!(store.gameweek(), Some(GameweekId::new(11)));
        assert_eq!(store.get(PlayerId::new(355)).unwrap().minutes, 5);
    });
}
