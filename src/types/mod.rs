//! Core value types

mod extent;
mod request;
mod response;

pub use extent::{CachedEntry, Extent};
pub use request::{CacheOptions, QueryRequest};
pub use response::{
    Extractor, QueryResponse, RequestResponse, ResponseMerger, Sample, Series, SeriesExtractor,
    SeriesMerger,
};
