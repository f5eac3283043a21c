//! Elasticsearch backend integration tests.
//!
//! Configuration tests run everywhere. Tests that need a running cluster use
//! testcontainers to start one in Docker and are ignored by default.
//!
//! Run with: `cargo test -p usersearch-persistence -- --ignored es_integration`

#![cfg(feature = "elasticsearch")]

use usersearch_persistence::backends::elasticsearch::{
    ElasticsearchAuth, ElasticsearchBackend, ElasticsearchConfig, users_index_mapping,
};
use usersearch_persistence::core::SearchEngine;

// ============================================================================
// Backend Configuration Tests (no ES instance required)
// ============================================================================

#[test]
fn test_elasticsearch_config_serialization() {
    let config = ElasticsearchConfig {
        nodes: vec!["http://es1:9200".to_string()],
        auth: Some(ElasticsearchAuth::Bearer {
            token: "abc".to_string(),
        }),
        ..Default::default()
    };

    let json = serde_json::to_string(&config).unwrap();
    let deserialized: ElasticsearchConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(deserialized.nodes, config.nodes);
    assert!(matches!(
        deserialized.auth,
        Some(ElasticsearchAuth::Bearer { ref token }) if token == "abc"
    ));
}

#[test]
fn test_backend_creation() {
    let backend = ElasticsearchBackend::new(ElasticsearchConfig::default());
    assert!(backend.is_ok());
    assert_eq!(backend.unwrap().engine_name(), "elasticsearch");
}

#[test]
fn test_mapping_uses_configured_settings() {
    let config = ElasticsearchConfig {
        number_of_replicas: 0,
        max_result_window: 500,
        ..Default::default()
    };
    let mapping = users_index_mapping(&config);
    assert_eq!(mapping["settings"]["number_of_replicas"], 0);
    assert_eq!(mapping["settings"]["index.max_result_window"], 500);
}

// ============================================================================
// Integration Tests (requires Docker for testcontainers)
// ============================================================================

mod es_integration {
    use std::sync::Arc;

    use serde_json::json;

    use usersearch_persistence::backends::elasticsearch::{
        ElasticsearchBackend, ElasticsearchConfig, ensure_users_index,
    };
    use usersearch_persistence::core::SearchEngine;
    use usersearch_persistence::error::{ResourceError, SearchError, StorageError};
    use usersearch_persistence::gateway::{GatewaySettings, QueryGateway};
    use usersearch_persistence::types::{RefreshPolicy, UserRecord};

    use testcontainers::ImageExt;
    use testcontainers::runners::AsyncRunner;
    use testcontainers_modules::elastic_search::ElasticSearch;
    use tokio::sync::OnceCell;

    /// Shared Elasticsearch container reused across all tests in this module.
    struct SharedEs {
        url: String,
        /// Kept alive for the duration of the test binary; dropped at process exit.
        _container: testcontainers::ContainerAsync<ElasticSearch>,
    }

    static SHARED_ES: OnceCell<SharedEs> = OnceCell::const_new();

    async fn shared_es() -> &'static SharedEs {
        SHARED_ES
            .get_or_init(|| async {
                let container = ElasticSearch::default()
                    .with_env_var("ES_JAVA_OPTS", "-Xms256m -Xmx256m")
                    .with_startup_timeout(std::time::Duration::from_secs(120))
                    .start()
                    .await
                    .expect("Failed to start Elasticsearch container");

                let port = container
                    .get_host_port_ipv4(9200)
                    .await
                    .expect("Failed to get host port");
                let host = container.get_host().await.expect("Failed to get host");

                SharedEs {
                    url: format!("http://{}:{}", host, port),
                    _container: container,
                }
            })
            .await
    }

    /// Creates a gateway over a fresh users index so tests stay isolated.
    async fn create_gateway() -> (QueryGateway<ElasticsearchBackend>, String) {
        let es = shared_es().await;
        let index = format!("users_{}", uuid::Uuid::new_v4().simple());

        let config = ElasticsearchConfig {
            nodes: vec![es.url.clone()],
            number_of_replicas: 0,
            refresh_interval: "1ms".to_string(),
            ..Default::default()
        };
        let backend = ElasticsearchBackend::new(config).expect("Failed to create backend");
        ensure_users_index(&backend, &index)
            .await
            .expect("Failed to create index");

        let settings = GatewaySettings {
            users_index: index.clone(),
            page_size: None,
            refresh: RefreshPolicy::WaitFor,
        };
        (QueryGateway::new(Arc::new(backend), settings), index)
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn es_integration_health_check() {
        let (gateway, _) = create_gateway().await;
        gateway.engine().health_check().await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn es_integration_ensure_index_is_idempotent() {
        let (gateway, index) = create_gateway().await;
        ensure_users_index(gateway.engine(), &index).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn es_integration_create_then_lookup() {
        let (gateway, _) = create_gateway().await;

        let id = gateway
            .create(UserRecord::named("Alice").with_age(30))
            .await
            .unwrap();
        assert!(!id.is_empty());

        let found = gateway.get_by_id("Alice").await.unwrap().unwrap();
        assert_eq!(found.id.as_deref(), Some(id.as_str()));
        assert_eq!(found.age, Some(30));

        let all = gateway.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn es_integration_update_and_delete() {
        let (gateway, _) = create_gateway().await;

        let id = gateway
            .create(UserRecord::named("Bob").with_age(20))
            .await
            .unwrap();
        gateway
            .update(&id, UserRecord::default().with_age(21))
            .await
            .unwrap();

        let found = gateway.get_by_id("Bob").await.unwrap().unwrap();
        assert_eq!(found.age, Some(21));
        assert_eq!(found.name.as_deref(), Some("Bob"));

        gateway.delete(&id).await.unwrap();
        assert!(gateway.get_by_id("Bob").await.unwrap().is_none());

        let err = gateway.delete(&id).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Resource(ResourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn es_integration_sorted_and_projected() {
        let (gateway, _) = create_gateway().await;
        for (name, age) in [("Carol", 40), ("Alice", 30), ("Bob", 20)] {
            gateway
                .create(UserRecord::named(name).with_age(age).with_education("Physics"))
                .await
                .unwrap();
        }

        let sorted = gateway.sorted_listing().await.unwrap();
        let names: Vec<_> = sorted.iter().filter_map(|u| u.name.as_deref()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);

        let projected = gateway.field_projection().await.unwrap();
        assert_eq!(projected.len(), 3);
        assert!(projected.iter().all(|u| u.education.is_none()));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn es_integration_fuzzy_and_wildcard() {
        let (gateway, _) = create_gateway().await;
        let unique = format!("Zelda{}", &uuid::Uuid::new_v4().simple().to_string()[..6]);
        gateway.create(UserRecord::named(&unique)).await.unwrap();

        let prefix = &unique[..5];
        let hits = gateway.wildcard_prefix(prefix).await.unwrap();
        assert!(hits.iter().any(|d| d["name"] == json!(unique)));

        let lower = gateway
            .wildcard_prefix(&prefix.to_lowercase())
            .await
            .unwrap();
        assert!(!lower.iter().any(|d| d["name"] == json!(unique)));

        let analyzed = gateway
            .analyzed_wildcard(&unique[1..5].to_uppercase())
            .await
            .unwrap();
        assert!(analyzed.iter().any(|d| d["name"] == json!(unique)));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn es_integration_missing_index() {
        let (gateway, _) = create_gateway().await;
        let missing = QueryGateway::new(
            Arc::new(
                ElasticsearchBackend::new(gateway.engine().config().clone()).unwrap(),
            ),
            GatewaySettings {
                users_index: format!("missing_{}", uuid::Uuid::new_v4().simple()),
                ..Default::default()
            },
        );
        let err = missing.list_all().await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::Search(SearchError::IndexNotFound { .. })
        ));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn es_integration_engine_refresh() {
        let (gateway, index) = create_gateway().await;
        gateway
            .engine()
            .index(&index, json!({"name": "Dana"}), RefreshPolicy::Off)
            .await
            .unwrap();
        gateway.engine().refresh(&index).await.unwrap();
        assert_eq!(gateway.list_all().await.unwrap().len(), 1);
    }
}
