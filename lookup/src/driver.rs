use aspexis_shared::player::PlayerIdentity;
use aspexis_shared::query::decode_response;
use aspexis_shared::store::{ChangeNotifier, KeyValueStorage};
use aspexis_shared::{
    AbilityClass, Favorite, PlayerSession, QueryCache, QueryKey, QueryState,
    SearchHistoryStore, SessionEvent,
};
use futures::future::join_all;
use tracing::{info, warn};

use crate::transport::HttpTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupOptions {
    /// Hypixel guild roster pages to load; the first page always loads.
    pub guild_pages: usize,
    pub metric: Option<String>,
    /// Wynncraft character whose ability tree should be fetched.
    pub character: Option<String>,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            guild_pages: 1,
            metric: None,
            character: None,
        }
    }
}

/// Follow-up actions a dashboard user would take once earlier data is in.
struct FollowUps<'a> {
    options: &'a LookupOptions,
    more_clicked_at: Option<usize>,
    tree_chosen: bool,
}

impl<'a> FollowUps<'a> {
    fn new(options: &'a LookupOptions) -> Self {
        Self {
            options,
            more_clicked_at: None,
            tree_chosen: false,
        }
    }

    fn apply(&mut self, session: &mut PlayerSession) {
        if let Some(character) = &self.options.character
            && !self.tree_chosen
        {
            let profile = session.wynncraft();
            if profile.is_terminal() {
                self.tree_chosen = true;
                let class = profile
                    .data()
                    .and_then(|p| p.character(character))
                    .and_then(|c| AbilityClass::parse(&c.character_class));
                match class {
                    Some(class) => session.select_ability_tree(character, class),
                    None => warn!(character, "character not found on the Wynncraft profile"),
                }
            }
        }

        let roster = session.guild_roster();
        let loaded = roster.pages_loaded();
        if loaded > 0
            && loaded < self.options.guild_pages
            && roster.has_next_page()
            && roster.error().is_none()
            && self.more_clicked_at != Some(loaded)
        {
            self.more_clicked_at = Some(loaded);
            session.load_more_guild_members();
        }
    }
}

/// Resolve `term` and drive every dependent fetch until nothing is left to do.
/// The resolved username goes into `history`.
pub async fn run_lookup<S, N>(
    transport: &HttpTransport,
    history: &mut SearchHistoryStore<S, N>,
    term: &str,
    options: &LookupOptions,
) -> anyhow::Result<PlayerSession>
where
    S: KeyValueStorage,
    N: ChangeNotifier,
{
    let mut session = PlayerSession::new();
    session.search(term)?;
    if let Some(metric) = &options.metric {
        session.select_metric(metric);
    }

    let mut follow_ups = FollowUps::new(options);
    loop {
        let mut requests = session.poll_requests();
        if requests.is_empty() {
            follow_ups.apply(&mut session);
            requests = session.poll_requests();
            if requests.is_empty() {
                break;
            }
        }

        info!(
            count = requests.len(),
            kinds = ?requests.iter().map(QueryKey::kind).collect::<Vec<_>>(),
            "fetching"
        );
        let responses = join_all(requests.into_iter().map(|key| async move {
            let response = transport.fetch(&key).await;
            (key, response)
        }))
        .await;

        for (key, response) in responses {
            if let SessionEvent::IdentityResolved(identity) = session.complete(&key, response) {
                history.add(&identity.username);
            }
        }
    }

    Ok(session)
}

/// Re-resolve every favorite by uuid so the shown username is current.
pub async fn resolve_favorites(
    transport: &HttpTransport,
    favorites: &[Favorite],
) -> Vec<(Favorite, QueryState<PlayerIdentity>)> {
    let mut cache: QueryCache<String, PlayerIdentity> = QueryCache::new();
    let keys: Vec<String> = favorites
        .iter()
        .filter(|favorite| cache.begin(favorite.uuid.clone()))
        .map(|favorite| favorite.uuid.clone())
        .collect();

    let responses = join_all(keys.into_iter().map(|uuid| async move {
        let response = transport.fetch(&QueryKey::Identity(uuid.clone())).await;
        (uuid, response)
    }))
    .await;
    for (uuid, response) in responses {
        let outcome = response.and_then(|raw| decode_response(raw.status, &raw.body));
        cache.settle(&uuid, outcome);
    }

    favorites
        .iter()
        .map(|favorite| (favorite.clone(), cache.state(&favorite.uuid).cloned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use aspexis_shared::metric::HYPIXEL_LEVEL;
    use aspexis_shared::{MemoryStorage, NoopNotifier, ServiceSection, ServiceTab};
    use axum::extract::{Path, Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use aspexis_shared::FetchError;
    use serde_json::json;

    use super::*;

    const NOTCH_UUID: &str = "069a79f444e94726a5befca90e38aaf5";
    const GUILD_SIZE: usize = 45;

    #[derive(Clone, Default)]
    struct Backend {
        hits: Arc<Mutex<Vec<String>>>,
    }

    impl Backend {
        fn record(&self, hit: String) {
            if let Ok(mut hits) = self.hits.lock() {
                hits.push(hit);
            }
        }

        fn hits(&self) -> Vec<String> {
            self.hits.lock().map(|hits| hits.clone()).unwrap_or_default()
        }

        fn count(&self, prefix: &str) -> usize {
            self.hits().iter().filter(|hit| hit.starts_with(prefix)).count()
        }
    }

    async fn mojang(State(backend): State<Backend>, Path(term): Path<String>) -> Response {
        backend.record(format!("mojang/{term}"));
        if term.eq_ignore_ascii_case("notch") || term == NOTCH_UUID {
            Json(json!({"uuid": NOTCH_UUID, "username": "Notch", "skin_showcase_b64": null}))
                .into_response()
        } else {
            StatusCode::NOT_FOUND.into_response()
        }
    }

    async fn status(State(backend): State<Backend>, Path(uuid): Path<String>) -> Response {
        backend.record(format!("status/{uuid}"));
        Json(json!({"hypixel_online": true, "hypixel_game_type": "BEDWARS"})).into_response()
    }

    async fn hypixel(State(backend): State<Backend>, Path(uuid): Path<String>) -> Response {
        backend.record(format!("hypixel/{uuid}"));
        Json(json!({
            "player": {"uuid": uuid, "network_level": 210.4, "karma": 125000},
            "guild": {"id": "5363aa", "name": "Builders", "tag": "BLD"}
        }))
        .into_response()
    }

    async fn hypixel_guild(
        State(backend): State<Backend>,
        Path(guild_id): Path<String>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let offset: usize = params
            .get("offset")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0);
        let limit: usize = params
            .get("limit")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(20);
        backend.record(format!("guild/{guild_id}/{offset}"));
        let members: Vec<_> = (offset..(offset + limit).min(GUILD_SIZE))
            .map(|i| json!({"uuid": format!("m{i}"), "username": format!("member{i}")}))
            .collect();
        Json(members).into_response()
    }

    async fn wynncraft(State(backend): State<Backend>, Path(uuid): Path<String>) -> Response {
        backend.record(format!("wynncraft/{uuid}"));
        StatusCode::NOT_FOUND.into_response()
    }

    async fn donut(State(backend): State<Backend>, Path(username): Path<String>) -> Response {
        backend.record(format!("donutsmp/{username}"));
        (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response()
    }

    async fn mcc(State(backend): State<Backend>, Path(uuid): Path<String>) -> Response {
        backend.record(format!("mccisland/{uuid}"));
        Json(json!({"username": "Notch", "crown_level": 40})).into_response()
    }

    async fn capes(State(backend): State<Backend>, Path(uuid): Path<String>) -> Response {
        backend.record(format!("capes/{uuid}"));
        Json(json!([{"provider": "minecraft", "name": "Migrator"}])).into_response()
    }

    async fn metric(
        State(backend): State<Backend>,
        Path((key, uuid)): Path<(String, String)>,
    ) -> Response {
        backend.record(format!("metric/{key}/{uuid}"));
        Json(json!({
            "metric_key": key,
            "buckets": [0.0, 100.0, 200.0, 300.0],
            "counts": [50, 30, 20],
            "player_value": 210.4,
            "percentile": 82.5,
            "sample_size": 100,
            "top_players": [{"uuid": "x", "value": 299.0}],
            "player_rank": 18
        }))
        .into_response()
    }

    fn fake_backend(backend: Backend) -> Router {
        Router::new()
            .route("/v1/players/mojang/{term}", get(mojang))
            .route("/v1/players/status/{uuid}", get(status))
            .route("/v1/players/hypixel/{uuid}", get(hypixel))
            .route("/v1/hypixel/guilds/{guild_id}", get(hypixel_guild))
            .route("/v1/players/wynncraft/{uuid}", get(wynncraft))
            .route("/v1/players/donutsmp/{username}", get(donut))
            .route("/v1/players/mccisland/{uuid}", get(mcc))
            .route("/v1/players/capes/{uuid}", get(capes))
            .route("/v1/metrics/{key}/distribution/{uuid}", get(metric))
            .with_state(backend)
    }

    async fn spawn_test_server(app: Router) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve test app");
        });
        (addr, handle)
    }

    fn transport_for(addr: SocketAddr) -> HttpTransport {
        HttpTransport::new(
            &format!("http://{addr}"),
            Duration::from_secs(5),
            Duration::from_secs(1),
        )
        .expect("transport should build")
    }

    #[tokio::test]
    async fn lookup_fans_out_and_tabs_match_successful_services() {
        let backend = Backend::default();
        let (addr, server_handle) = spawn_test_server(fake_backend(backend.clone())).await;
        let transport = transport_for(addr);
        let mut history = SearchHistoryStore::init(MemoryStorage::new(), NoopNotifier);
        let options = LookupOptions {
            guild_pages: 5,
            metric: Some(HYPIXEL_LEVEL.to_string()),
            character: None,
        };

        let session = run_lookup(&transport, &mut history, "  notch ", &options)
            .await
            .expect("lookup should run");

        assert_eq!(
            session.loaded_tabs(),
            vec![ServiceTab::Hypixel, ServiceTab::MccIsland]
        );
        assert_eq!(session.selected_tab(), Some(ServiceTab::Hypixel));
        let failed: Vec<_> = session
            .failed_sections()
            .into_iter()
            .map(|(section, _)| section)
            .collect();
        assert_eq!(failed, vec![ServiceSection::DonutSmp]);

        let roster = session.guild_roster();
        assert_eq!(roster.members().len(), GUILD_SIZE);
        assert!(!roster.has_next_page());
        assert_eq!(
            backend.count("guild/5363aa/"),
            3,
            "pages 0, 20 and 40 fetched once each"
        );

        let metric = session.metric();
        let dist = metric.data().expect("distribution loaded");
        assert!(dist.is_consistent());
        assert_eq!(dist.player_bucket(), Some(2));

        assert_eq!(backend.count("mojang/"), 1);
        assert_eq!(backend.count("donutsmp/Notch"), 1);
        assert_eq!(history.list(), ["Notch"]);

        let rendered = crate::report::render_session(&session);
        assert!(rendered.contains("Guild Builders [BLD]: 45 members loaded"));
        assert!(rendered.contains("! Donut SMP: server error (HTTP 500)"));

        server_handle.abort();
    }

    #[tokio::test]
    async fn guild_paging_stops_at_requested_page_count() {
        let backend = Backend::default();
        let (addr, server_handle) = spawn_test_server(fake_backend(backend.clone())).await;
        let transport = transport_for(addr);
        let mut history = SearchHistoryStore::init(MemoryStorage::new(), NoopNotifier);

        let session = run_lookup(&transport, &mut history, "Notch", &LookupOptions::default())
            .await
            .expect("lookup should run");

        assert_eq!(session.guild_roster().members().len(), 20);
        assert!(session.guild_roster().has_next_page());
        assert_eq!(backend.count("guild/"), 1);
        assert_eq!(backend.count("metric/"), 0);

        server_handle.abort();
    }

    #[tokio::test]
    async fn unknown_player_fetches_nothing_else() {
        let backend = Backend::default();
        let (addr, server_handle) = spawn_test_server(fake_backend(backend.clone())).await;
        let transport = transport_for(addr);
        let mut history = SearchHistoryStore::init(MemoryStorage::new(), NoopNotifier);

        let session = run_lookup(&transport, &mut history, "ghost", &LookupOptions::default())
            .await
            .expect("lookup should run");

        assert_eq!(session.identity(), QueryState::NotFound);
        assert_eq!(backend.hits(), vec!["mojang/ghost".to_string()]);
        assert!(history.list().is_empty());
        assert_eq!(
            crate::report::render_session(&session),
            "No player found for \"ghost\".\n"
        );

        server_handle.abort();
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_section_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind spare listener");
        let addr = listener.local_addr().expect("listener address");
        drop(listener);

        let transport = transport_for(addr);
        let mut history = SearchHistoryStore::init(MemoryStorage::new(), NoopNotifier);
        let session = run_lookup(&transport, &mut history, "Notch", &LookupOptions::default())
            .await
            .expect("transport failures do not abort the lookup");

        assert!(matches!(
            session.identity(),
            QueryState::Error(FetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn favorites_are_re_resolved_by_uuid() {
        let backend = Backend::default();
        let (addr, server_handle) = spawn_test_server(fake_backend(backend.clone())).await;
        let transport = transport_for(addr);
        let favorites = vec![
            Favorite {
                uuid: NOTCH_UUID.into(),
                username: "OldNotch".into(),
                added_on: chrono::Utc::now(),
            },
            Favorite {
                uuid: "deadbeef".into(),
                username: "Gone".into(),
                added_on: chrono::Utc::now(),
            },
        ];

        let resolved = resolve_favorites(&transport, &favorites).await;
        assert_eq!(
            resolved[0].1.data().map(|identity| identity.username.as_str()),
            Some("Notch")
        );
        assert_eq!(resolved[1].1, QueryState::NotFound);

        server_handle.abort();
    }

    #[tokio::test]
    async fn empty_term_is_rejected_before_any_request() {
        let backend = Backend::default();
        let (addr, server_handle) = spawn_test_server(fake_backend(backend.clone())).await;
        let transport = transport_for(addr);
        let mut history = SearchHistoryStore::init(MemoryStorage::new(), NoopNotifier);

        let result = run_lookup(&transport, &mut history, "   ", &LookupOptions::default()).await;
        assert!(result.is_err());
        assert!(backend.hits().is_empty());

        server_handle.abort();
    }
}
