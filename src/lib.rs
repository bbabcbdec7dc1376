pub mod export;
pub mod feed;
pub mod http_client;
pub mod matching;
pub mod merge;
pub mod normalize;
pub mod picks;
pub mod pipeline;
pub mod report;
pub mod tokens;
