use crate::utils::text::join_url;
use std::collections::HashSet;
use url::form_urlencoded::byte_serialize;
use url::Url;

/// Feed URL shapes to try for one series, most specific first except for
/// the unfiltered "all events" feed, which always comes first as the
/// fallback. Generated lazily; repeated URLs are skipped.
///
/// The fallback is not specific to the series and must be validated like
/// any other candidate.
pub fn feed_candidates<'a>(
    base: &'a Url,
    series_id: &str,
    type_ids: &[String],
) -> impl Iterator<Item = Url> + 'a {
    let mut paths = vec![
        "/events/rss/all".to_string(),
        format!("/events/rss/all?series={}", series_id),
        format!("/events/rss?series={}", series_id),
        format!("/events/rss/series/{}", series_id),
    ];

    if !type_ids.is_empty() {
        let escaped: String = byte_serialize(type_ids.join(",").as_bytes()).collect();
        paths.push(format!("/events/rss/all?types={}", escaped));
        paths.push(format!("/events/rss?types={}", escaped));
    }

    let mut seen = HashSet::new();
    paths
        .into_iter()
        .filter_map(move |path| join_url(base, &path).ok())
        .filter(move |url| seen.insert(url.clone()))
}
