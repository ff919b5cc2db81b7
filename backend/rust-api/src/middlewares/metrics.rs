use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};

const PUZZLE_ROUTES: [&str; 4] = ["daily", "next", "theme", "rating"];

/// Records request count and latency per normalized route.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().to_string();
    let path = normalize_path(req.uri().path());

    let response = next.run(req).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(duration);

    response
}

/// Replaces puzzle ids, themes, ratings and slot names with placeholders
/// so label cardinality stays bounded.
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    let mut normalized = Vec::with_capacity(segments.len());

    for (i, segment) in segments.iter().enumerate() {
        let previous = i.checked_sub(1).map(|p| segments[p]).unwrap_or("");
        let placeholder = match previous {
            "puzzles" if !PUZZLE_ROUTES.contains(segment) => Some("{id}"),
            "theme" => Some("{theme}"),
            "rating" => Some("{rating}"),
            "slots" => Some("{slot}"),
            _ => None,
        };
        normalized.push(placeholder.unwrap_or(segment));
    }

    normalized.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/api/v1/puzzles/K69di"),
            "/api/v1/puzzles/{id}"
        );
        assert_eq!(
            normalize_path("/api/v1/puzzles/theme/fork"),
            "/api/v1/puzzles/theme/{theme}"
        );
        assert_eq!(
            normalize_path("/api/v1/puzzles/rating/1500"),
            "/api/v1/puzzles/rating/{rating}"
        );
        assert_eq!(normalize_path("/api/v1/slots/side"), "/api/v1/slots/{slot}");
        assert_eq!(normalize_path("/api/v1/puzzles/daily"), "/api/v1/puzzles/daily");
        assert_eq!(normalize_path("/health"), "/health");
        assert_eq!(normalize_path("/metrics"), "/metrics");
    }
}
