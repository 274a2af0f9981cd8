//! Route classification.
//!
//! Rules are evaluated in order and the first match wins, so a path that
//! matches several patterns (`/api/report.png`) takes the earliest kind.

use crate::strategy::Strategy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use url::Url;

static IMAGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|svg|ico)$").expect("image pattern is valid")
});

const STATIC_SUFFIXES: &[&str] = &[".js", ".css", ".woff", ".woff2"];

/// Category of an intercepted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    StaticAsset,
    Api,
    Image,
    DynamicPage,
}

impl RouteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StaticAsset => "static-asset",
            Self::Api => "api",
            Self::Image => "image",
            Self::DynamicPage => "dynamic-page",
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Self::StaticAsset => Strategy::StaleWhileRevalidate,
            Self::Api => Strategy::NetworkFirst,
            Self::Image => Strategy::CacheFirst,
            Self::DynamicPage => Strategy::NetworkFirstWithFallback,
        }
    }
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Rule {
    kind: RouteKind,
    matches: fn(&str) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        kind: RouteKind::StaticAsset,
        matches: is_static_asset,
    },
    Rule {
        kind: RouteKind::Api,
        matches: is_api,
    },
    Rule {
        kind: RouteKind::Image,
        matches: is_image,
    },
];

fn is_static_asset(path: &str) -> bool {
    path.contains("/assets/") || STATIC_SUFFIXES.iter().any(|s| path.ends_with(s))
}

fn is_api(path: &str) -> bool {
    path.contains("/api/")
}

fn is_image(path: &str) -> bool {
    IMAGE_PATTERN.is_match(path)
}

/// Classify a URL path.
pub fn classify(path: &str) -> RouteKind {
    RULES
        .iter()
        .find(|rule| (rule.matches)(path))
        .map(|rule| rule.kind)
        .unwrap_or(RouteKind::DynamicPage)
}

/// Classify a parsed URL by its path; query and fragment are ignored.
pub fn classify_url(url: &Url) -> RouteKind {
    classify(url.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_examples() {
        assert_eq!(classify("/assets/app.a1b2.js"), RouteKind::StaticAsset);
        assert_eq!(classify("/api/contact"), RouteKind::Api);
        assert_eq!(classify("/photos/cat.webp"), RouteKind::Image);
        assert_eq!(classify("/demo/login"), RouteKind::DynamicPage);
    }

    #[test]
    fn test_static_suffixes() {
        assert_eq!(classify("/main.css"), RouteKind::StaticAsset);
        assert_eq!(classify("/fonts/inter.woff2"), RouteKind::StaticAsset);
        assert_eq!(classify("/fonts/inter.woff"), RouteKind::StaticAsset);
        assert_eq!(classify("/assets/logo.png"), RouteKind::StaticAsset);
        assert_eq!(classify("/data.json"), RouteKind::DynamicPage);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(classify("/api/report.png"), RouteKind::Api);
        assert_eq!(classify("/api/client.js"), RouteKind::StaticAsset);
    }

    #[test]
    fn test_image_extension_case_insensitive() {
        assert_eq!(classify("/img/HERO.JPG"), RouteKind::Image);
        assert_eq!(classify("/favicon.ico"), RouteKind::Image);
        assert_eq!(classify("/img/hero.png.html"), RouteKind::DynamicPage);
    }

    #[test]
    fn test_query_string_ignored() {
        let url = Url::parse("https://example.com/pricing?ref=logo.png").unwrap();
        assert_eq!(classify_url(&url), RouteKind::DynamicPage);
    }

    #[test]
    fn test_deterministic() {
        for path in ["/", "/index.html", "/assets/x", "/api/v1/incidents"] {
            assert_eq!(classify(path), classify(path));
        }
    }

    #[test]
    fn test_kind_strategy_mapping() {
        assert_eq!(RouteKind::StaticAsset.strategy(), Strategy::StaleWhileRevalidate);
        assert_eq!(RouteKind::Api.strategy(), Strategy::NetworkFirst);
        assert_eq!(RouteKind::Image.strategy(), Strategy::CacheFirst);
        assert_eq!(
            RouteKind::DynamicPage.strategy(),
            Strategy::NetworkFirstWithFallback
        );
    }
}
