//! Runs against a real Redis:
//! `REDIS_URL=redis://127.0.0.1:6379 cargo test -p carhire-store -- --ignored`.

use std::time::Duration;
use uuid::Uuid;
use carhire_store::RedisClient;

async fn client() -> RedisClient {
    let url = std::env::var("REDIS_URL").expect("REDIS_URL must point at a test Redis");
    RedisClient::new(&url).await.expect("Failed to open Redis client")
}

#[tokio::test]
#[ignore = "needs REDIS_URL"]
async fn test_limit_is_enforced_within_a_window() {
    let redis = client().await;
    let key = format!("ratelimit:test:{}", Uuid::new_v4());

    assert!(redis.check_rate_limit(&key, 3, 60).await.unwrap());
    assert!(redis.check_rate_limit(&key, 3, 60).await.unwrap());
    assert!(redis.check_rate_limit(&key, 3, 60).await.unwrap());
    assert!(!redis.check_rate_limit(&key, 3, 60).await.unwrap());
    assert!(!redis.check_rate_limit(&key, 3, 60).await.unwrap());
}

#[tokio::test]
#[ignore = "needs REDIS_URL"]
async fn test_window_resets_under_steady_traffic() {
    let redis = client().await;
    let key = format!("ratelimit:test:{}", Uuid::new_v4());

    // Hits never more than 1.2s apart, window of 2s. A sliding expiry would
    // keep the counter alive and refuse the third hit.
    assert!(redis.check_rate_limit(&key, 2, 2).await.unwrap());
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(redis.check_rate_limit(&key, 2, 2).await.unwrap());
    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(redis.check_rate_limit(&key, 2, 2).await.unwrap());
}

#[tokio::test]
#[ignore = "needs REDIS_URL"]
async fn test_refused_hits_do_not_extend_the_window() {
    let redis = client().await;
    let key = format!("ratelimit:test:{}", Uuid::new_v4());

    assert!(redis.check_rate_limit(&key, 1, 2).await.unwrap());
    for _ in 0..3 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(!redis.check_rate_limit(&key, 1, 2).await.unwrap());
    }
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(redis.check_rate_limit(&key, 1, 2).await.unwrap());
}
