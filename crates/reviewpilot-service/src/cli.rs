use clap::{Parser, Subcommand};
use reviewpilot_core::Sentiment;
use reviewpilot_store::ReviewFilters;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "reviewpilot")]
#[command(author, version, about = "Review intelligence: analysis, search, replies and analytics")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "reviewpilot.yaml", env = "REVIEWPILOT_CONFIG")]
    pub config: PathBuf,

    /// JSON file of reviews loaded before the command runs
    #[arg(short, long)]
    pub reviews: Option<PathBuf>,

    /// Fixed seed for reply template selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report model state, latency metrics and index size
    Health {
        /// Also print the Prometheus exposition
        #[arg(long)]
        prometheus: bool,
    },

    /// Ingest a JSON file of reviews
    Ingest {
        /// Path to a JSON array of reviews
        file: PathBuf,
    },

    /// Tag every review missing a sentiment or topic
    Process,

    /// Find reviews similar to a query
    Search {
        query: String,

        /// Number of results
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Corpus-wide counts
    Analytics,

    /// Suggest a reply to a stored review
    Reply {
        id: i64,
    },

    /// List stored reviews
    List {
        #[arg(long)]
        location: Option<String>,

        #[arg(long, value_parser = parse_sentiment)]
        sentiment: Option<Sentiment>,

        /// Text that must appear in the review
        #[arg(short, long)]
        q: Option<String>,

        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating_min: Option<u8>,

        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating_max: Option<u8>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        date_from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        date_to: Option<String>,

        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long)]
        page_size: Option<usize>,
    },
}

impl Commands {
    /// Listing filters when this is the `list` command
    pub fn filters(&self) -> Option<ReviewFilters> {
        match self {
            Self::List {
                location,
                sentiment,
                q,
                rating_min,
                rating_max,
                date_from,
                date_to,
                ..
            } => Some(ReviewFilters {
                location: location.clone(),
                sentiment: *sentiment,
                q: q.clone(),
                rating_min: *rating_min,
                rating_max: *rating_max,
                date_from: date_from.clone(),
                date_to: date_to.clone(),
            }),
            _ => None,
        }
    }
}

fn parse_sentiment(s: &str) -> Result<Sentiment, String> {
    s.parse().map_err(|e: reviewpilot_core::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["reviewpilot", "search", "slow service", "-k", "3"]);
        match cli.command {
            Commands::Search { query, k } => {
                assert_eq!(query, "slow service");
                assert_eq!(k, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_filters() {
        let cli = Cli::parse_from([
            "reviewpilot",
            "--reviews",
            "seed.json",
            "list",
            "--sentiment",
            "Negative",
            "--rating-max",
            "2",
        ]);
        assert_eq!(cli.reviews, Some(PathBuf::from("seed.json")));

        let filters = cli.command.filters().unwrap();
        assert_eq!(filters.sentiment, Some(Sentiment::Negative));
        assert_eq!(filters.rating_max, Some(2));
        assert!(filters.location.is_none());
    }

    #[test]
    fn test_rating_filter_range_checked() {
        assert!(Cli::try_parse_from(["reviewpilot", "list", "--rating-min", "9"]).is_err());
        assert!(Cli::try_parse_from(["reviewpilot", "list", "--sentiment", "mixed"]).is_err());
    }
}
