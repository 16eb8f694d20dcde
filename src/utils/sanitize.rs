//! Destination key derivation.
//!
//! Throttling state is kept per destination key. Dropping the query string
//! keeps the number of distinct keys bounded when callers vary parameters
//! (pagination, cache busters, ids) against the same endpoint.

/// Removes everything from the first `?` onwards.
///
/// This is a literal cut; the URL is not parsed or normalized, so
/// `http://a/b` and `http://a/b/` remain different keys. A fragment that
/// follows the query is dropped with it.
///
/// # Examples
///
/// ```
/// use throttled_fetch::utils::strip_query_params;
///
/// assert_eq!(strip_query_params("https://api.test/items?page=2"), "https://api.test/items");
/// assert_eq!(strip_query_params("https://api.test/items"), "https://api.test/items");
/// ```
pub fn strip_query_params(url: &str) -> &str {
    match url.split_once('?') {
        Some((base, _)) => base,
        None => url,
    }
}
