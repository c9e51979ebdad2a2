/// Read-through caching around an async computation.
///
/// Returns the cached value when `$key` is present. Otherwise awaits `$block`,
/// queues the result for a background write with `$ttl` seconds and returns it.
/// A failed cache read is logged and treated as a miss; errors from `$block`
/// are propagated with `?`.
///
/// # Arguments
/// * `$cache`: a value with `get_from_cache` and `set_in_background` methods.
/// * `$key`: the `CacheKey` to read and write.
/// * `$ttl`: time-to-live of the stored value, in seconds.
/// * `$block`: the future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// let poster: Option<String> = cached!(cache, CacheKey::Poster(title.to_string()), 86400,
///     provider.fetch_from_api(title))?;
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await {
            Ok(Some(cached)) => Ok(cached),
            lookup => {
                if let Err(e) = lookup {
                    ::tracing::warn!(error = %e, key = %key, "Cache read failed, treating as miss");
                }
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
