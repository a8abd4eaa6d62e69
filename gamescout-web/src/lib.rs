//! Search-page acquisition and extraction.
//!
//! - Query and URL construction (`query`)
//! - Selector-driven fragment extraction from result pages (`extract`)
//! - The search operation itself, over an injectable [`PageFetcher`] (`search`)
//!
//! Extraction is best-effort by construction: the selectors describe one
//! snapshot of third-party markup and silently match nothing when it drifts.

pub mod extract;
pub mod query;
pub mod search;

pub use extract::{Fragment, SearchReport, NO_RESULTS};
pub use search::{GameSearch, PageFetcher, SearchError, render_outcome, search};
