use crate::core::fetcher::FetchError;
use crate::domain::model::{FetchedPage, ValidationOutcome};
use crate::domain::ports::PageFetcher;

const XML_PREFIXES: [&str; 3] = ["<rss", "<?xml", "<feed"];

/// Fetches a candidate feed URL and sniffs the response.
///
/// The checks are textual on purpose: a feed is accepted when it is a 200,
/// looks like XML (content type or body prefix) and contains at least one
/// `<item` or `<entry`. No schema validation is done.
pub struct FeedValidator<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
}

impl<'a, F: PageFetcher + ?Sized> FeedValidator<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self { fetcher }
    }

    pub async fn validate(&self, url: &str) -> ValidationOutcome {
        let fetched = self.fetcher.fetch(url).await;
        let outcome = assess_feed_response(fetched);
        tracing::debug!(
            "candidate {} -> {} ({})",
            url,
            if outcome.accepted { "accepted" } else { "rejected" },
            outcome.reason
        );
        outcome
    }
}

/// Applies the four acceptance checks in order: fetch, status, XML-ness,
/// entry presence. Later checks only run once the earlier ones pass.
pub fn assess_feed_response(fetched: Result<FetchedPage, FetchError>) -> ValidationOutcome {
    let page = match fetched {
        Ok(page) => page,
        Err(e) => return ValidationOutcome::rejected(format!("fetch error: {}", e)),
    };

    if page.status != 200 {
        return ValidationOutcome::rejected(format!("HTTP {}", page.status));
    }

    let content_type = page.header("content-type").unwrap_or("").to_lowercase();
    let body = page.body.trim_start().to_lowercase();

    let looks_like_xml = XML_PREFIXES.iter().any(|prefix| body.starts_with(prefix));
    if !content_type.contains("xml") && !looks_like_xml {
        return ValidationOutcome::rejected(format!("not xml (content-type={})", content_type));
    }

    if !body.contains("<item") && !body.contains("<entry") {
        return ValidationOutcome::rejected("no <item>/<entry>");
    }

    ValidationOutcome::accepted()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn page(status: u16, content_type: &str, body: &str) -> Result<FetchedPage, FetchError> {
        let mut headers = HashMap::new();
        if !content_type.is_empty() {
            headers.insert("content-type".to_string(), content_type.to_string());
        }
        Ok(FetchedPage {
            status,
            headers,
            body: body.to_string(),
        })
    }

    const FEED: &str = "<rss><channel><item/></channel></rss>";

    #[test]
    fn test_accepts_minimal_rss() {
        let outcome = assess_feed_response(page(200, "application/xml", FEED));
        assert_eq!(outcome, ValidationOutcome::accepted());
        assert_eq!(outcome.reason, "ok");
    }

    #[test]
    fn test_rejects_non_200() {
        let outcome = assess_feed_response(page(404, "application/xml", FEED));
        assert!(!outcome.accepted);
        assert_eq!(outcome.reason, "HTTP 404");
    }

    #[test]
    fn test_rejects_html_content() {
        let outcome = assess_feed_response(page(200, "text/html", "<!DOCTYPE html><html><body><item></item></body></html>"));
        assert!(!outcome.accepted);
        assert!(outcome.reason.contains("content-type"));
        assert!(outcome.reason.contains("text/html"));
    }

    #[test]
    fn test_body_prefix_overrides_missing_content_type() {
        let body = "\n   <?XML version=\"1.0\"?><feed><entry></entry></feed>";
        let outcome = assess_feed_response(page(200, "text/plain", body));
        assert!(outcome.accepted);
    }

    #[test]
    fn test_rejects_feed_without_entries() {
        let outcome = assess_feed_response(page(200, "", "<rss><channel></channel></rss>"));
        assert!(!outcome.accepted);
        assert_eq!(outcome.reason, "no <item>/<entry>");
    }

    #[test]
    fn test_reasons_are_distinct() {
        let reasons = [
            assess_feed_response(page(500, "application/xml", FEED)).reason,
            assess_feed_response(page(200, "text/html", "<html/>")).reason,
            assess_feed_response(page(200, "application/rss+xml", "<rss/>")).reason,
            assess_feed_response(page(200, "application/rss+xml", FEED)).reason,
        ];
        let unique: std::collections::HashSet<_> = reasons.iter().collect();
        assert_eq!(unique.len(), reasons.len());
    }

    #[test]
    fn test_fetch_error_reason_keeps_the_cause() {
        let refused = assess_feed_response(Err(FetchError::Connect(
            "error sending request for url (http://127.0.0.1:1/events/rss/all): client error (Connect): tcp connect error: Connection refused (os error 111)".to_string(),
        )));
        let timed_out = assess_feed_response(Err(FetchError::Timeout(
            "error sending request for url (http://slow.example.org/events/rss/all): operation timed out".to_string(),
        )));

        assert!(!refused.accepted);
        assert!(refused.reason.starts_with("fetch error: connect failed: "));
        assert!(refused.reason.ends_with("Connection refused (os error 111)"));
        assert!(timed_out.reason.starts_with("fetch error: timed out: "));
    }

    #[tokio::test]
    async fn test_refused_candidate_reason_names_the_cause() {
        let fetcher = crate::core::fetcher::HttpFetcher::new(
            crate::core::fetcher::USER_AGENT,
            std::time::Duration::from_secs(2),
        )
        .unwrap();

        let outcome = FeedValidator::new(&fetcher)
            .validate("http://127.0.0.1:1/events/rss/all")
            .await;

        assert!(!outcome.accepted);
        assert!(outcome.reason.starts_with("fetch error: connect failed: "), "{}", outcome.reason);
        assert!(outcome.reason.to_lowercase().contains("refused"), "{}", outcome.reason);
    }
}
