//! End-to-end checks of the assembled service

use async_trait::async_trait;
use chrono::{Duration, Utc};
use reviewpilot_classifiers::{LabelScore, ModelOutput, ModelRegistry, ModelsConfig, SentimentModel};
use reviewpilot_core::{Error, Result, Review, Sentiment, Topic};
use reviewpilot_service::{HealthStatus, ReviewIntelligence, ServiceConfig};
use reviewpilot_store::{InMemoryReviewStore, ManualClock, ReviewFilters, ReviewStore};
use reviewpilot_telemetry::Operation;
use std::sync::Arc;

struct NegativeModel;

#[async_trait]
impl SentimentModel for NegativeModel {
    async fn predict(&self, _text: &str) -> Result<ModelOutput> {
        Ok(ModelOutput::SingleScore(LabelScore::new("NEGATIVE", 0.93)))
    }

    fn name(&self) -> &str {
        "negative"
    }
}

fn sample_reviews() -> Vec<Review> {
    vec![
        Review::new(1, "Downtown", 2, "Great food but slow service", "2024-03-01"),
        Review::new(2, "Uptown", 5, "Friendly staff and a cozy atmosphere", "2024-03-02"),
        Review::new(3, "Downtown", 1, "The tables were dirty and the floor was sticky", "2024-03-03"),
        Review::new(4, "Airport", 4, "Reasonable prices, good value for money", "2024-03-04")
            .with_analysis(Sentiment::Positive, Topic::Price),
    ]
}

fn config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.replies.seed = Some(7);
    config
}

async fn service_with(config: ServiceConfig) -> ReviewIntelligence {
    let service = ReviewIntelligence::builder(config).start().await.unwrap();
    service.ingest(sample_reviews()).await.unwrap();
    service
}

#[tokio::test]
async fn test_health_degraded_without_models() {
    let mut config = config();
    config.models = ModelsConfig::disabled();
    let service = ReviewIntelligence::builder(config).start().await.unwrap();

    let health = service.health_check();
    assert_eq!(health.status, HealthStatus::Degraded);
    assert_eq!(health.models_loaded["sentiment"], false);
    assert_eq!(health.index.documents, 0);
}

#[tokio::test]
async fn test_health_healthy_with_injected_model() {
    let service = ReviewIntelligence::builder(config())
        .models(ModelRegistry::empty().with_sentiment(Arc::new(NegativeModel)))
        .start()
        .await
        .unwrap();

    let health = service.health_check();
    assert_eq!(health.status, HealthStatus::Healthy);
    assert_eq!(health.models_loaded["sentiment"], true);
    assert_eq!(health.models_loaded["summarization"], false);
}

#[tokio::test]
async fn test_ingest_rebuilds_index_and_search_ranks() {
    let service = service_with(config()).await;
    assert_eq!(service.index().stats().documents, 4);

    let results = service.search("slow service", Some(3)).unwrap();
    assert_eq!(results.query, "slow service");
    assert!(!results.results.is_empty());
    assert!(results.total <= 3);
    assert_eq!(results.results[0].id, 1);
    assert!(results.results[0].similarity > 0.0);
    assert!(results.results[0].similarity <= 1.0);

    for pair in results.results.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[tokio::test]
async fn test_search_k_defaults_and_clamps() {
    let mut config = config();
    config.search.default_k = 2;
    config.search.max_k = 3;
    let service = service_with(config).await;

    assert!(service.search("food", None).unwrap().total <= 2);
    assert!(service.search("food service staff dirty value", Some(50)).unwrap().total <= 3);
    assert_eq!(service.search("food", Some(0)).unwrap().total, 0);
}

#[tokio::test]
async fn test_empty_rebuild_then_search_is_empty() {
    let service = ReviewIntelligence::builder(config()).start().await.unwrap();

    let stats = service.rebuild_index().await.unwrap();
    assert_eq!(stats.documents, 0);
    assert!(service.search("anything at all", Some(5)).unwrap().results.is_empty());
}

#[tokio::test]
async fn test_ingest_rejects_invalid_batch() {
    let service = ReviewIntelligence::builder(config()).start().await.unwrap();

    assert!(matches!(service.ingest(vec![]).await, Err(Error::Validation(_))));

    let bad = vec![
        Review::new(10, "Downtown", 4, "Fine", "2024-01-01"),
        Review::new(11, "Downtown", 9, "Off the scale", "2024-01-01"),
    ];
    assert!(matches!(service.ingest(bad).await, Err(Error::Validation(_))));
    assert_eq!(service.index().stats().documents, 0);
}

#[tokio::test]
async fn test_food_topic_and_severe_reply() {
    let service = service_with(config()).await;

    let text = "Great food but slow service";
    assert_eq!(service.extract_topic(text), Topic::Food);

    let suggestion = service
        .generate_reply(text, 2, Some(Sentiment::Negative), None)
        .await
        .unwrap();
    assert!(!suggestion.reply.is_empty());
    assert!(!suggestion.reply.contains("{topic}"));
    assert!(suggestion.reasoning_log.contains("Template: negative_severe"));
    assert!(suggestion.reasoning_log.contains("Rating: 2/5"));
    assert_eq!(suggestion.topic, Topic::Food);
}

#[tokio::test]
async fn test_analytics_cached_until_ttl() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let service = ReviewIntelligence::builder(config())
        .clock(clock.clone())
        .start()
        .await
        .unwrap();
    service.ingest(sample_reviews()).await.unwrap();

    let first = service.get_analytics().await.unwrap();
    assert_eq!(first.total_reviews, 4);
    assert_eq!(first.location_counts["Downtown"], 2);
    assert_eq!(first.sentiment_counts["positive"], 1);

    service
        .ingest(vec![Review::new(5, "Uptown", 3, "It was okay", "2024-03-05")])
        .await
        .unwrap();

    clock.advance(Duration::seconds(120));
    assert_eq!(service.get_analytics().await.unwrap(), first);

    clock.advance(Duration::seconds(180));
    assert_eq!(service.get_analytics().await.unwrap().total_reviews, 5);
}

#[tokio::test]
async fn test_disabled_features() {
    let mut config = config();
    config.features.enable_search = false;
    config.features.enable_analytics = false;
    config.features.enable_ai_replies = false;
    config.features.enable_batch_processing = false;
    let service = service_with(config).await;

    assert!(matches!(service.search("food", None), Err(Error::FeatureDisabled(_))));
    assert!(matches!(service.get_analytics().await, Err(Error::FeatureDisabled(_))));
    assert!(matches!(service.process_reviews().await, Err(Error::FeatureDisabled(_))));
    assert!(matches!(service.suggest_reply(1).await, Err(Error::FeatureDisabled(_))));
    assert!(matches!(
        service.generate_reply("Nice", 5, None, None).await,
        Err(Error::FeatureDisabled(_))
    ));

    // Core analysis stays available
    assert_eq!(service.extract_topic("dirty tables"), Topic::Cleanliness);
}

#[tokio::test]
async fn test_process_reviews_tags_pending() {
    let store = Arc::new(InMemoryReviewStore::new());
    let service = ReviewIntelligence::builder(config())
        .reviews(store.clone())
        .models(ModelRegistry::empty().with_sentiment(Arc::new(NegativeModel)))
        .start()
        .await
        .unwrap();
    service.ingest(sample_reviews()).await.unwrap();

    let summary = service.process_reviews().await.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.processed, 3);
    assert!(store.unanalyzed().await.unwrap().is_empty());

    let dirty = service.get_review(3).await.unwrap();
    assert_eq!(dirty.sentiment, Some(Sentiment::Negative));
    assert_eq!(dirty.topic, Some(Topic::Cleanliness));

    // Already tagged review keeps its tags
    let priced = service.get_review(4).await.unwrap();
    assert_eq!(priced.sentiment, Some(Sentiment::Positive));

    let again = service.process_reviews().await.unwrap();
    assert_eq!(again.total, 0);
    assert_eq!(again.processed, 0);
}

#[tokio::test]
async fn test_suggest_reply_persists_tags() {
    let service = ReviewIntelligence::builder(config())
        .models(ModelRegistry::empty().with_sentiment(Arc::new(NegativeModel)))
        .start()
        .await
        .unwrap();
    service.ingest(sample_reviews()).await.unwrap();

    let reply = service.suggest_reply(1).await.unwrap();
    assert_eq!(reply.sentiment, Sentiment::Negative);
    assert_eq!(reply.topic, Topic::Food);
    assert!(reply.reasoning_log.contains("negative_severe"));

    let stored = service.get_review(1).await.unwrap();
    assert_eq!(stored.sentiment, Some(Sentiment::Negative));
    assert_eq!(stored.topic, Some(Topic::Food));

    // Stored tags win over the model
    let reply = service.suggest_reply(4).await.unwrap();
    assert_eq!(reply.sentiment, Sentiment::Positive);
    assert_eq!(reply.topic, Topic::Price);
}

#[tokio::test]
async fn test_unknown_review_not_found() {
    let service = service_with(config()).await;

    assert!(matches!(service.get_review(999).await, Err(Error::NotFound(_))));
    assert!(matches!(service.suggest_reply(999).await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_list_reviews_filters_and_pages() {
    let service = service_with(config()).await;

    let filters = ReviewFilters {
        location: Some("Downtown".to_string()),
        ..Default::default()
    };
    let page = service.list_reviews(&filters, 1, Some(1)).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.reviews.len(), 1);
    assert_eq!(page.total_pages, 2);
    assert!(page.has_next);
    assert!(!page.has_prev);

    let everything = service.list_reviews(&ReviewFilters::default(), 1, None).await.unwrap();
    assert_eq!(everything.total, 4);
    assert_eq!(everything.page_size, 10);

    assert!(matches!(
        service.list_reviews(&ReviewFilters::default(), 1, Some(1000)).await,
        Err(Error::Validation(_))
    ));
}

#[tokio::test]
async fn test_shutdown_clears_index_and_metrics() {
    let service = service_with(config()).await;
    service.search("food", None).unwrap();
    assert_eq!(service.metrics().stats(Operation::Search).count, 1);

    service.shutdown();
    assert_eq!(service.metrics().stats(Operation::Search).count, 0);
    assert_eq!(service.index().stats().documents, 0);
    assert!(service.search("food", None).unwrap().results.is_empty());
}

#[tokio::test]
async fn test_catalog_from_config_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replies.yaml");
    std::fs::write(
        &path,
        r#"
positive_high: ["Thanks for the kind words about our {topic}!"]
positive_low: ["Thanks for visiting, we hope you enjoyed the {topic}."]
negative_severe: ["We are truly sorry about the {topic}."]
negative_mild: ["Sorry the {topic} was not perfect."]
neutral: ["Thanks for the feedback on our {topic}."]
"#,
    )
    .unwrap();

    let mut with_catalog = config();
    with_catalog.replies.catalog = Some(path);
    let service = ReviewIntelligence::builder(with_catalog).start().await.unwrap();

    let reply = service
        .generate_reply("Cold food", 1, Some(Sentiment::Negative), None)
        .await
        .unwrap();
    assert_eq!(reply.reply, "We are truly sorry about the food.");

    let mut missing = config();
    missing.replies.catalog = Some(dir.path().join("missing.yaml"));
    assert!(ReviewIntelligence::builder(missing).start().await.is_err());
}

#[tokio::test]
async fn test_catalog_without_placeholder_fails_start() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("replies.yaml");
    std::fs::write(
        &path,
        r#"
positive_high: ["Thanks for the kind words about our {topic}!"]
positive_low: ["Thanks for visiting."]
negative_severe: ["We are truly sorry about the {topic}."]
negative_mild: ["Sorry the {topic} was not perfect."]
neutral: ["Thanks for the feedback on our {topic}."]
"#,
    )
    .unwrap();

    let mut config = config();
    config.replies.catalog = Some(path);
    assert!(matches!(
        ReviewIntelligence::builder(config).start().await,
        Err(Error::Template(_))
    ));
}

#[tokio::test]
async fn test_ai_disabled_blocks_batch_and_keeps_index() {
    let mut config = config();
    config.features.ai_enabled = false;
    let service = ReviewIntelligence::builder(config).start().await.unwrap();

    let summary = service.ingest(sample_reviews()).await.unwrap();
    assert_eq!(summary.ingested, 4);
    assert_eq!(summary.index.documents, 0);
    assert_eq!(service.index().stats().documents, 0);

    assert!(matches!(service.process_reviews().await, Err(Error::FeatureDisabled(_))));

    // An explicit rebuild still works
    assert_eq!(service.rebuild_index().await.unwrap().documents, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_ingests_leave_latest_corpus_indexed() {
    let service = ReviewIntelligence::builder(config()).start().await.unwrap();

    let tasks: Vec<_> = (1..=16i64)
        .map(|id| {
            let service = service.clone();
            tokio::spawn(async move {
                let text = format!("Review number {id} about the food");
                let review = Review::new(id, "Downtown", 3, text, "2024-04-01");
                service.ingest(vec![review]).await.unwrap();
                service.rebuild_index().await.unwrap();
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let stats = service.index().stats();
    assert_eq!(stats.documents, 16);
    assert_eq!(stats.version, 1 + 16 * 2);
}
