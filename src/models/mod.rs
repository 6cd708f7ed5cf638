//! Core data structures for Serper requests.

mod request;

pub use request::{
    AutocompleteQuery, CompetitorAnalysisRequest, HealthStatus, KeywordResearchRequest,
    LensRequest, ScrapeRequest, SearchRequest, SerpAnalysisRequest, WebpageRequest,
};
