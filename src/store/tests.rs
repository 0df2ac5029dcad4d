//! Store Module Tests
//!
//! ## Test Scopes
//! - **InMemoryStore**: query DSL subset, paging, cursor consumption and expiry, write counting.
//! - **ElasticClient**: request shapes and status mapping against a mocked HTTP server.

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::ingestion::types::Record;
    use crate::store::{DocumentStore, ElasticClient, InMemoryStore, ScrollCursor};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INDEX: &str = "covid-19";
    const WINDOW: Duration = Duration::from_secs(60);

    fn record(hash: &str, date: i64) -> Record {
        Record::try_from(json!({"hash": hash, "date": date, "state": "NY"})).unwrap()
    }

    fn seeded_store(count: i64) -> InMemoryStore {
        let store = InMemoryStore::new();
        for i in 0..count {
            let hash = format!("h{:03}", i);
            store.store_local(INDEX, &hash, record(&hash, 20200301 + i));
        }
        store
    }

    // ============================================================
    // IN-MEMORY STORE
    // ============================================================

    #[tokio::test]
    async fn test_index_exists_after_first_upsert() {
        let store = InMemoryStore::new();
        assert!(!store.index_exists(INDEX).await.unwrap());

        store.upsert(INDEX, "a", &record("a", 20200301)).await.unwrap();

        assert!(store.index_exists(INDEX).await.unwrap());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_upsert_same_id_overwrites() {
        let store = InMemoryStore::new();
        store.upsert(INDEX, "a", &record("a", 20200301)).await.unwrap();
        store.upsert(INDEX, "a", &record("a", 20200302)).await.unwrap();

        assert_eq!(store.local_entry_count(INDEX), 1);
        assert_eq!(
            store.get_local(INDEX, "a").unwrap().date(),
            Some(20200302)
        );
    }

    #[tokio::test]
    async fn test_search_first_page_and_total() {
        let store = seeded_store(25);

        let page = store
            .search(INDEX, r#"{"query": {"match_all": {}}}"#, 10, WINDOW)
            .await
            .unwrap();

        assert_eq!(page.total_hits, 25);
        assert_eq!(page.hits.len(), 10);
    }

    #[tokio::test]
    async fn test_search_missing_index_is_store_error() {
        let store = InMemoryStore::new();

        let result = store
            .search(INDEX, r#"{"query": {"match_all": {}}}"#, 10, WINDOW)
            .await;

        assert!(matches!(result, Err(Error::Store { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_scroll_pages_until_empty() {
        let store = seeded_store(25);

        let page = store
            .search(INDEX, r#"{"query": {"match_all": {}}}"#, 10, WINDOW)
            .await
            .unwrap();
        let second = store.scroll_continue(&page.cursor, WINDOW).await.unwrap();
        let third = store.scroll_continue(&second.cursor, WINDOW).await.unwrap();
        let fourth = store.scroll_continue(&third.cursor, WINDOW).await.unwrap();

        assert_eq!(second.hits.len(), 10);
        assert_eq!(third.hits.len(), 5);
        assert!(fourth.hits.is_empty());
    }

    #[tokio::test]
    async fn test_exhausted_context_is_released() {
        let store = seeded_store(25);

        let page = store
            .search(INDEX, r#"{"query": {"match_all": {}}}"#, 10, WINDOW)
            .await
            .unwrap();
        assert_eq!(store.open_cursor_count(), 1);
        let second = store.scroll_continue(&page.cursor, WINDOW).await.unwrap();
        let third = store.scroll_continue(&second.cursor, WINDOW).await.unwrap();
        let last = store.scroll_continue(&third.cursor, WINDOW).await.unwrap();

        assert!(last.hits.is_empty());
        assert_eq!(store.open_cursor_count(), 0);
        let after_end = store.scroll_continue(&last.cursor, WINDOW).await;
        assert!(matches!(after_end, Err(Error::CursorExpired)));
    }

    #[tokio::test]
    async fn test_empty_search_opens_no_context() {
        let store = seeded_store(5);

        let page = store
            .search(INDEX, r#"{"query": {"range": {"date": {"gt": 20990101}}}}"#, 10, WINDOW)
            .await
            .unwrap();

        assert_eq!(page.total_hits, 0);
        assert_eq!(store.open_cursor_count(), 0);
    }

    #[tokio::test]
    async fn test_expired_contexts_are_swept() {
        let store = seeded_store(5);

        for _ in 0..3 {
            store
                .search(INDEX, r#"{"query": {"match_all": {}}}"#, 2, Duration::ZERO)
                .await
                .unwrap();
        }

        // Each search drops the lapsed contexts before registering its own.
        assert_eq!(store.open_cursor_count(), 1);
    }

    #[tokio::test]
    async fn test_consumed_cursor_cannot_be_reused() {
        let store = seeded_store(25);

        let page = store
            .search(INDEX, r#"{"query": {"match_all": {}}}"#, 10, WINDOW)
            .await
            .unwrap();
        let next = store.scroll_continue(&page.cursor, WINDOW).await.unwrap();

        assert_ne!(next.cursor, page.cursor);
        let reused = store.scroll_continue(&page.cursor, WINDOW).await;
        assert!(matches!(reused, Err(Error::CursorExpired)));
    }

    #[tokio::test]
    async fn test_expired_cursor_is_reported() {
        let store = seeded_store(5);

        let page = store
            .search(INDEX, r#"{"query": {"match_all": {}}}"#, 2, Duration::ZERO)
            .await
            .unwrap();
        let result = store.scroll_continue(&page.cursor, WINDOW).await;

        assert!(matches!(result, Err(Error::CursorExpired)));
    }

    #[tokio::test]
    async fn test_unknown_cursor_is_reported_as_expired() {
        let store = seeded_store(5);

        let result = store
            .scroll_continue(&ScrollCursor::new("never-issued"), WINDOW)
            .await;

        assert!(matches!(result, Err(Error::CursorExpired)));
    }

    #[tokio::test]
    async fn test_sort_desc_with_source_projection() {
        let store = seeded_store(10);

        let page = store
            .search(
                INDEX,
                r#"{"query": {"match_all": {}}, "sort": [{"date": {"order": "desc"}}], "_source": "date"}"#,
                3,
                WINDOW,
            )
            .await
            .unwrap();

        let dates: Vec<i64> = page.hits.iter().filter_map(Record::date).collect();
        assert_eq!(dates, vec![20200310, 20200309, 20200308]);
        assert_eq!(page.hits[0].len(), 1, "only the date field is projected");
    }

    #[tokio::test]
    async fn test_range_query() {
        let store = seeded_store(10);

        let page = store
            .search(
                INDEX,
                r#"{"query": {"range": {"date": {"gt": 20200305, "lte": 20200308}}}}"#,
                10,
                WINDOW,
            )
            .await
            .unwrap();

        assert_eq!(page.total_hits, 3);
    }

    #[tokio::test]
    async fn test_unsupported_query_clause_is_rejected() {
        let store = seeded_store(1);

        let result = store
            .search(INDEX, r#"{"query": {"fuzzy": {"state": "NX"}}}"#, 10, WINDOW)
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_id_missing_document() {
        let store = seeded_store(1);

        let result = store.delete_by_id(INDEX, "missing").await;

        assert!(matches!(result, Err(Error::Store { status: 404, .. })));
        assert_eq!(store.delete_count(), 0);
    }

    #[tokio::test]
    async fn test_delete_index() {
        let store = seeded_store(3);

        store.delete_index(INDEX).await.unwrap();

        assert!(!store.index_exists(INDEX).await.unwrap());
        assert!(store.delete_index(INDEX).await.is_err());
    }

    // ============================================================
    // ELASTICSEARCH REST CLIENT
    // ============================================================

    #[tokio::test]
    async fn test_elastic_index_exists_maps_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/covid-19"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri()).unwrap();

        assert!(client.index_exists("covid-19").await.unwrap());
        assert!(!client.index_exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_elastic_search_sends_scroll_and_size() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/covid-19/_search"))
            .and(query_param("scroll", "1m"))
            .and(query_param("size", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_scroll_id": "cursor-1",
                "hits": {
                    "total": {"value": 2, "relation": "eq"},
                    "hits": [
                        {"_id": "a", "_source": {"hash": "a", "date": 20200301}},
                        {"_id": "b", "_source": {"hash": "b", "date": 20200302}}
                    ]
                }
            })))
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri()).unwrap();
        let page = client
            .search("covid-19", r#"{"query": {"match_all": {}}}"#, 10, WINDOW)
            .await
            .unwrap();

        assert_eq!(page.cursor.as_str(), "cursor-1");
        assert_eq!(page.total_hits, 2);
        assert_eq!(page.hits[1].hash(), Some("b"));
    }

    #[tokio::test]
    async fn test_elastic_scroll_continue_posts_cursor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_search/scroll"))
            .and(body_json(json!({"scroll": "30s", "scroll_id": "cursor-1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_scroll_id": "cursor-2",
                "hits": {"hits": []}
            })))
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri()).unwrap();
        let page = client
            .scroll_continue(&ScrollCursor::new("cursor-1"), Duration::from_secs(30))
            .await
            .unwrap();

        assert_eq!(page.cursor.as_str(), "cursor-2");
        assert!(page.hits.is_empty());
    }

    #[tokio::test]
    async fn test_elastic_missing_search_context_is_cursor_expired() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/_search/scroll"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {
                    "root_cause": [{"type": "search_context_missing_exception"}],
                    "type": "search_phase_execution_exception"
                },
                "status": 404
            })))
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri()).unwrap();
        let result = client
            .scroll_continue(&ScrollCursor::new("stale"), WINDOW)
            .await;

        assert!(matches!(result, Err(Error::CursorExpired)));
    }

    #[tokio::test]
    async fn test_elastic_upsert_and_failure_status() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/covid-19/_doc/abc"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/covid-19/_doc/bad"))
            .respond_with(ResponseTemplate::new(400).set_body_string("mapper_parsing_exception"))
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri()).unwrap();

        client
            .upsert("covid-19", "abc", &record("abc", 20200301))
            .await
            .unwrap();
        let failed = client
            .upsert("covid-19", "bad", &record("bad", 20200301))
            .await;
        assert!(matches!(failed, Err(Error::Store { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_elastic_delete_paths() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/covid-19/_doc/abc"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/covid-19"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri()).unwrap();

        client.delete_by_id("covid-19", "abc").await.unwrap();
        client.delete_index("covid-19").await.unwrap();
    }

    #[test]
    fn test_elastic_rejects_invalid_url() {
        assert!(matches!(
            ElasticClient::new("not a url"),
            Err(Error::Validation(_))
        ));
    }
}
