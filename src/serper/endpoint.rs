//! SERP vertical endpoints.

use std::fmt;

/// The Google SERP verticals Serper exposes as sibling endpoints.
///
/// All of them accept the same [`crate::models::SearchRequest`] payload and
/// differ only in upstream path and in which response sections they populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchVertical {
    Web,
    Images,
    Videos,
    News,
    Places,
    Maps,
    Reviews,
    Shopping,
    Scholar,
    Patents,
}

impl SearchVertical {
    /// Upstream path for this vertical
    pub fn path(&self) -> &'static str {
        match self {
            SearchVertical::Web => "/search",
            SearchVertical::Images => "/images",
            SearchVertical::Videos => "/videos",
            SearchVertical::News => "/news",
            SearchVertical::Places => "/places",
            SearchVertical::Maps => "/maps",
            SearchVertical::Reviews => "/reviews",
            SearchVertical::Shopping => "/shopping",
            SearchVertical::Scholar => "/scholar",
            SearchVertical::Patents => "/patents",
        }
    }

    /// Tool name this vertical is published under
    pub fn tool_name(&self) -> &'static str {
        match self {
            SearchVertical::Web => "google_search",
            SearchVertical::Images => "image_search",
            SearchVertical::Videos => "video_search",
            SearchVertical::News => "news_search",
            SearchVertical::Places => "places_search",
            SearchVertical::Maps => "maps_search",
            SearchVertical::Reviews => "reviews_search",
            SearchVertical::Shopping => "shopping_search",
            SearchVertical::Scholar => "scholar_search",
            SearchVertical::Patents => "patents_search",
        }
    }

    /// What this vertical returns, for tool descriptions
    pub fn subject(&self) -> &'static str {
        match self {
            SearchVertical::Web => "web search results",
            SearchVertical::Images => "images",
            SearchVertical::Videos => "videos",
            SearchVertical::News => "news articles",
            SearchVertical::Places => "places and locations",
            SearchVertical::Maps => "maps and locations",
            SearchVertical::Reviews => "reviews",
            SearchVertical::Shopping => "products and shopping information",
            SearchVertical::Scholar => "academic articles",
            SearchVertical::Patents => "patent information",
        }
    }

    /// All verticals, in registration order
    pub fn all() -> &'static [SearchVertical] {
        &[
            SearchVertical::Web,
            SearchVertical::Images,
            SearchVertical::Videos,
            SearchVertical::News,
            SearchVertical::Places,
            SearchVertical::Maps,
            SearchVertical::Reviews,
            SearchVertical::Shopping,
            SearchVertical::Scholar,
            SearchVertical::Patents,
        ]
    }

    /// Look up a vertical by its tool name
    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|v| v.tool_name() == name)
    }
}

impl fmt::Display for SearchVertical {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tool_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(SearchVertical::Web.path(), "/search");
        assert_eq!(SearchVertical::Scholar.path(), "/scholar");
        assert_eq!(SearchVertical::Patents.path(), "/patents");
    }

    #[test]
    fn test_tool_name_round_trip() {
        for v in SearchVertical::all() {
            assert_eq!(SearchVertical::from_tool_name(v.tool_name()), Some(*v));
        }
        assert_eq!(SearchVertical::from_tool_name("scrape"), None);
    }

    #[test]
    fn test_all_count() {
        assert_eq!(SearchVertical::all().len(), 10);
    }
}
