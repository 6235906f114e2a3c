//! Shared request and response shapes for list operations.

mod pagination;

pub use pagination::{CommentSegmentResponse, SearchRequest, SegmentRequest, SegmentResponse};
