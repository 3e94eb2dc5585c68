use redis::RedisResult;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window counter. Returns whether this hit is within `limit`.
    ///
    /// The TTL is set only when the window opens, so steady traffic cannot
    /// keep pushing the reset out.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        // A key without a TTL (left over from a crash mid-window) gets one too.
        let script = redis::Script::new(r#"
            local count = redis.call("INCR", KEYS[1])
            if count == 1 or redis.call("TTL", KEYS[1]) == -1 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return count
        "#);

        let count: i64 = script.key(key).arg(window_seconds).invoke_async(&mut conn).await?;

        if count > limit {
            tracing::debug!(key, count, limit, "Rate limit exceeded");
        }
        Ok(count <= limit)
    }
}
