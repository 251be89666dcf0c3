//! Data models for fms-web
//!
//! All records are held in memory only and replaced on reset or new upload.

pub mod analysis;
pub mod upload;

pub use analysis::{
    placeholder_image_url, AnalysisResult, FollowUpInfo, GroundingSource, MatchResult,
    MATCH_COUNT,
};
pub use upload::{ImageMediaType, UploadError, UploadedImage};
