//! ReviewPilot Search
//!
//! TF-IDF similarity search over review text.
//!
//! - [`Analyzer`]: lower-casing, stop-word removal, unigrams and bigrams
//! - [`TfidfVectorizer`]: capped vocabulary, smoothed idf, L2 rows
//! - [`SearchIndex`]: one immutable corpus snapshot with cosine ranking
//! - [`SharedSearchIndex`]: copy-on-write publication of rebuilt indexes

pub mod analyzer;
pub mod index;
pub mod shared;
pub mod stop_words;
pub mod vectorizer;

pub use analyzer::Analyzer;
pub use index::{SearchHit, SearchIndex};
pub use shared::{IndexStats, SharedSearchIndex};
pub use vectorizer::{SparseVector, TfidfVectorizer, DEFAULT_MAX_FEATURES};
