//! Integration tests for the similarity and audience runs
//!
//! Every scenario is driven through the public API against a scripted
//! transport, so no network access is needed:
//! - Budget stops the likers walk after a whole page
//! - Unusable seeds (no search hit, no recent posts) end the run
//! - A failing second-hop fetch is dropped and reported
//! - Reports reach the JSON and SQLite sinks

#[cfg(test)]
mod similarity_integration_tests {
    use chrono::{DateTime, TimeZone, Utc};
    use pagescout::discovery::{AudienceProfiler, DiscoverySettings, Report, ScoutError, Seed, SimilarityResolver};
    use pagescout::graph::{Credential, ExponentialBackoff, GraphClient, GraphError, RetryingTransport, ScriptedTransport};
    use pagescout::output::{BackendType, ResultWriter};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 10, 1, 0, 0, 0).unwrap()
    }

    fn client(transport: &Arc<ScriptedTransport>) -> GraphClient {
        GraphClient::new(
            transport.clone(),
            "https://graph.test",
            "v2.10",
            Credential::App {
                app_id: "42".to_string(),
                app_secret: "secret".to_string(),
            },
        )
    }

    fn post(id: &str, created: &str) -> Value {
        json!({"id": id, "created_time": created, "message": format!("post {}", id)})
    }

    fn users(ids: &[&str]) -> Vec<Value> {
        ids.iter().map(|id| json!({"id": id, "profile_type": "user"})).collect()
    }

    fn page(id: &str, name: &str) -> Value {
        json!({"id": id, "name": name, "category": "Community"})
    }

    /// Seed with two recent posts and one outside the window.
    fn script_seed(transport: &ScriptedTransport) {
        transport.pages(
            "seed/posts",
            vec![vec![
                post("postA", "2017-09-28T10:00:00+0000"),
                post("postB", "2017-09-27T09:30:00+0000"),
                post("postOld", "2017-08-01T00:00:00+0000"),
            ]],
        );
        transport.pages("postA/likes", vec![users(&["u1", "u2"]), users(&["u3"])]);
        transport.pages("postB/likes", vec![users(&["u4"]), users(&["u5", "u6"])]);
    }

    #[tokio::test]
    async fn test_budget_three_draws_one_round() {
        let transport = Arc::new(ScriptedTransport::new());
        script_seed(&transport);
        transport.pages("u1/likes", vec![vec![page("rust", "Rust"), page("go", "Go")]]);
        transport.pages("u2/likes", vec![vec![page("rust", "Rust")]]);
        transport.pages("u4/likes", vec![vec![page("zig", "Zig"), page("rust", "Rust")]]);

        let resolver = SimilarityResolver::new(client(&transport), DiscoverySettings::default());
        let report = resolver
            .resolve_at(&Seed::PageId("seed".to_string()), 3, now())
            .await
            .unwrap();

        assert_eq!(report.recent_posts, 2);
        assert_eq!(report.likers, 3);

        // One page from each post, then the budget is spent
        assert_eq!(transport.calls_to("postA/likes"), 1);
        assert_eq!(transport.calls_to("postB/likes"), 1);
        for absent in ["u3/likes", "u5/likes", "u6/likes", "postOld/likes"] {
            assert_eq!(transport.calls_to(absent), 0, "{}", absent);
        }

        let ranked: Vec<(&str, u64)> = report.pages.iter().map(|p| (p.id.as_str(), p.counter)).collect();
        assert_eq!(ranked[0], ("rust", 3));
        assert_eq!(ranked.len(), 3);
        assert_eq!(report.pages[0].name(), Some("Rust"));
        assert!(report.failures.is_empty());

        // The credential never leaks into recorded request descriptions
        assert!(transport.urls_to("postA/likes")[0].contains("fields=profile_type"));
        assert!(!transport.urls_to("postA/likes")[0].contains("secret"));
    }

    #[tokio::test]
    async fn test_query_seed_resolves_first_hit() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push("search", json!({"data": [page("seed", "Seed Page")]}));
        script_seed(&transport);
        for user in ["u1", "u2", "u3", "u4", "u5", "u6"] {
            transport.pages(&format!("{}/likes", user), vec![vec![page("p", "P")]]);
        }

        let resolver = SimilarityResolver::new(client(&transport), DiscoverySettings::default());
        let report = resolver
            .resolve_at(&Seed::Query("seed page".to_string()), 1000, now())
            .await
            .unwrap();

        assert_eq!(report.seed_id(), "seed");
        assert_eq!(report.seed.name(), Some("Seed Page"));
        assert_eq!(report.likers, 6);
        assert_eq!(report.pages[0].counter, 6);
        assert!(transport.urls_to("search")[0].contains("limit=1"));
    }

    #[tokio::test]
    async fn test_query_without_match_is_not_found() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.push("search", json!({"data": []}));

        let resolver = SimilarityResolver::new(client(&transport), DiscoverySettings::default());
        let err = resolver
            .resolve_at(&Seed::Query("no such page".to_string()), 100, now())
            .await
            .unwrap_err();

        assert!(matches!(err, ScoutError::NotFound { .. }));
        assert!(err.is_unusable_seed());
    }

    #[tokio::test]
    async fn test_no_recent_posts_is_unusable_seed() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.pages(
            "seed/posts",
            vec![
                vec![post("old1", "2017-08-20T00:00:00+0000")],
                vec![post("old2", "2017-08-10T00:00:00+0000")],
            ],
        );

        let resolver = SimilarityResolver::new(client(&transport), DiscoverySettings::default());
        let err = resolver
            .resolve_at(&Seed::PageId("seed".to_string()), 100, now())
            .await
            .unwrap_err();

        match err {
            ScoutError::NoRecentActivity { page_id, days } => {
                assert_eq!(page_id, "seed");
                assert_eq!(days, 30);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        // First page was already past the cutoff
        assert_eq!(transport.calls_to("seed/posts"), 1);
        assert!(transport.calls().iter().all(|c| c == "seed/posts"));
    }

    #[tokio::test]
    async fn test_error_payload_on_posts_is_fatal() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail("seed/posts", "(#803) Some of the aliases you requested do not exist");

        let resolver = SimilarityResolver::new(client(&transport), DiscoverySettings::default());
        let err = resolver
            .resolve_at(&Seed::PageId("seed".to_string()), 100, now())
            .await
            .unwrap_err();

        match err {
            ScoutError::Graph(GraphError::RemoteApi { request, message, code }) => {
                assert!(request.starts_with("seed/posts"));
                assert!(message.contains("do not exist"));
                assert_eq!(code, Some(100));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_likes_fetch_is_isolated() {
        let transport = Arc::new(ScriptedTransport::new());
        script_seed(&transport);
        transport.pages("u1/likes", vec![vec![page("rust", "Rust")]]);
        transport.fail("u2/likes", "(#100) Unsupported get request");
        transport.pages("u4/likes", vec![vec![page("rust", "Rust")]]);

        let resolver = SimilarityResolver::new(client(&transport), DiscoverySettings::default());
        let report = resolver
            .resolve_at(&Seed::PageId("seed".to_string()), 3, now())
            .await
            .unwrap();

        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].counter, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].id, "u2");
        assert_eq!(report.failures[0].stage, "likes");
        assert!(report.failures[0].message.contains("Unsupported get request"));
    }

    #[tokio::test]
    async fn test_failed_post_likers_is_isolated() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.pages(
            "seed/posts",
            vec![vec![
                post("postA", "2017-09-28T10:00:00+0000"),
                post("postB", "2017-09-27T09:30:00+0000"),
            ]],
        );
        transport.fail("postA/likes", "(#10) Requires pages_read_engagement");
        transport.pages("postB/likes", vec![users(&["u4"])]);
        transport.pages("u4/likes", vec![vec![page("zig", "Zig")]]);

        let resolver = SimilarityResolver::new(client(&transport), DiscoverySettings::default());
        let report = resolver
            .resolve_at(&Seed::PageId("seed".to_string()), 100, now())
            .await
            .unwrap();

        assert_eq!(report.likers, 1);
        assert_eq!(report.pages[0].id, "zig");
        assert_eq!(report.failures[0].stage, "likers");
        assert_eq!(report.failures[0].id, "postA");
    }

    #[tokio::test]
    async fn test_fan_out_respects_concurrency_cap() {
        let transport = Arc::new(ScriptedTransport::new());
        let likers: Vec<String> = (0..12).map(|i| format!("u{}", i)).collect();
        let liker_refs: Vec<&str> = likers.iter().map(String::as_str).collect();

        transport.pages("seed/posts", vec![vec![post("postA", "2017-09-28T10:00:00+0000")]]);
        transport.pages("postA/likes", vec![users(&liker_refs)]);
        for id in &likers {
            transport.pages(&format!("{}/likes", id), vec![vec![page("p", "P")]]);
        }
        transport.set_latency(Duration::from_millis(5));

        let settings = DiscoverySettings {
            concurrency: 3,
            ..DiscoverySettings::default()
        };
        let report = SimilarityResolver::new(client(&transport), settings)
            .resolve_at(&Seed::PageId("seed".to_string()), 100, now())
            .await
            .unwrap();

        assert_eq!(report.pages[0].counter, 12);
        assert!(transport.max_in_flight() <= 3);
        assert!(transport.max_in_flight() > 1);
    }

    #[tokio::test]
    async fn test_retrying_transport_rides_out_throttling() {
        let scripted = Arc::new(ScriptedTransport::new());
        scripted.push(
            "seed/likes",
            json!({"error": {"message": "(#4) Application request limit reached", "code": 4}}),
        );
        scripted.pages("seed/likes", vec![vec![page("a", "A")]]);
        scripted.pages("a/likes", vec![vec![page("x", "X")]]);

        let retrying = RetryingTransport::new(
            scripted.clone(),
            ExponentialBackoff::new(Duration::from_millis(1), Duration::from_millis(2), 2),
        );
        let client = GraphClient::new(
            Arc::new(retrying),
            "https://graph.test",
            "v2.10",
            Credential::AccessToken("token".to_string()),
        );

        let report = AudienceProfiler::new(client, 2)
            .profile(&Seed::PageId("seed".to_string()), 10)
            .await
            .unwrap();

        assert_eq!(scripted.calls_to("seed/likes"), 2);
        assert_eq!(report.likers.len(), 1);
        assert_eq!(report.likers_of_likers[0].id, "x");
    }

    #[tokio::test]
    async fn test_reports_reach_both_sinks() {
        let transport = Arc::new(ScriptedTransport::new());
        script_seed(&transport);
        transport.pages("u1/likes", vec![vec![page("rust", "Rust")]]);
        transport.pages("u2/likes", vec![vec![page("rust", "Rust"), page("go", "Go")]]);
        transport.pages("u4/likes", vec![vec![page("go", "Go")]]);

        let report = SimilarityResolver::new(client(&transport), DiscoverySettings::default())
            .resolve_at(&Seed::PageId("seed".to_string()), 3, now())
            .await
            .unwrap();

        let dir = tempdir().unwrap();

        let json_path = dir.path().join("similar.json");
        let mut json_writer = ResultWriter::new(BackendType::Json, Some(json_path.clone()), dir.path().join("unused.db")).unwrap();
        json_writer.write_report(&report).await.unwrap();
        json_writer.flush().await.unwrap();

        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        let result = doc["result"].as_array().unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0]["id"], "rust");
        assert_eq!(result[0]["counter"], 2);
        assert_eq!(result[0]["name"], "Rust");
        assert_eq!(result[0]["category"], "Community");

        let db_path = dir.path().join("pagescout.db");
        let mut sqlite_writer = ResultWriter::new(BackendType::Sqlite, Some(db_path.clone()), dir.path().join("unused.db")).unwrap();
        sqlite_writer.write_report(&report).await.unwrap();
        sqlite_writer.flush().await.unwrap();

        let conn = rusqlite::Connection::open(&db_path).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM ranked_pages WHERE seed_id = 'seed'", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 2);
        assert!(!dir.path().join("unused.db").exists());
    }
}
