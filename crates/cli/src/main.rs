use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use data_loader::{Dataset, UserId};
use recommender::{
    HybridRecommendations, MatrixStats, RecommendError, Recommendation, Recommender,
    RecommenderConfig, SimilarUser,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// MovieRecs - Collaborative filtering movie recommendations
#[derive(Parser)]
#[command(name = "movie-recs")]
#[command(
    about = "Movie recommendations using user-based and item-based collaborative filtering",
    long_about = None
)]
struct Cli {
    /// Directory holding movie.csv and rating.csv
    #[arg(short, long, default_value = "datasets/movie_lens_dataset")]
    data_dir: PathBuf,

    /// JSON file with recommender settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep only titles with more than this many ratings
    #[arg(long)]
    min_rating_count: Option<usize>,

    /// Fraction of the target's movies a similar user must have rated
    #[arg(long)]
    min_similarity_ratio: Option<f64>,

    /// Minimum correlation for a user to count as similar
    #[arg(long)]
    threshold: Option<f64>,

    /// Number of titles per recommendation list
    #[arg(long)]
    top_n: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend what similar users rated highly
    UserBased {
        #[arg(long)]
        user_id: UserId,
    },

    /// Recommend titles correlated with the user's latest 5-star movie
    ItemBased {
        #[arg(long)]
        user_id: UserId,
    },

    /// Print both recommendation lists
    Hybrid {
        #[arg(long)]
        user_id: UserId,
    },

    /// Show the users most correlated with a user
    SimilarUsers {
        #[arg(long)]
        user_id: UserId,

        /// Number of users to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Show dataset and rating matrix sizes
    Stats,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    // Loading and building the matrix may take a while on the full dataset
    let start = Instant::now();
    let dataset = Arc::new(Dataset::load_from_dir(&cli.data_dir).with_context(|| {
        format!(
            "Failed to load MovieLens dataset from {}",
            cli.data_dir.display()
        )
    })?);
    let recommender = Recommender::new(dataset, config).context("Failed to build recommender")?;
    tracing::info!("Ready in {:.2?}", start.elapsed());

    match cli.command {
        Commands::UserBased { user_id } => {
            let recs = recommender
                .user_based(user_id)
                .with_context(|| format!("User-based recommendation failed for user {}", user_id))?;
            print_list("User-Based Recommendations", &recs, cli.format)?;
        }
        Commands::ItemBased { user_id } => {
            let recs = recommender
                .item_based(user_id)
                .with_context(|| format!("Item-based recommendation failed for user {}", user_id))?;
            print_list("Item-Based Recommendations", &recs, cli.format)?;
        }
        Commands::Hybrid { user_id } => print_hybrid(&recommender.hybrid(user_id), cli.format)?,
        Commands::SimilarUsers { user_id, limit } => {
            let similar = recommender
                .similar_users(user_id)
                .with_context(|| format!("Similarity search failed for user {}", user_id))?;
            print_similar_users(user_id, &similar, limit, cli.format)?;
        }
        Commands::Stats => print_stats(&recommender.stats(), cli.format)?,
    }

    Ok(())
}

/// Defaults, then the optional config file, then command-line flags
fn resolve_config(cli: &Cli) -> Result<RecommenderConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config_file(path)?,
        None => RecommenderConfig::default(),
    };

    if let Some(count) = cli.min_rating_count {
        config = config.with_min_rating_count(count);
    }
    if let Some(ratio) = cli.min_similarity_ratio {
        config = config.with_min_similarity_ratio(ratio);
    }
    if let Some(threshold) = cli.threshold {
        config = config.with_correlation_threshold(threshold);
    }
    if let Some(top_n) = cli.top_n {
        config = config.with_top_n(top_n);
    }

    config.validate()?;
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<RecommenderConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config file {}", path.display()))
}

fn print_list(header: &str, recs: &[Recommendation], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(recs)?),
        OutputFormat::Text => {
            println!("{}", format!("🎯 {}:", header).bold().blue());
            if recs.is_empty() {
                println!("   (nothing cleared the cutoffs)");
            }
            for (i, rec) in recs.iter().enumerate() {
                println!(
                    "{}. {} {}",
                    (i + 1).to_string().green(),
                    rec.title,
                    format!("(score {:.3})", rec.score).dimmed()
                );
            }
        }
    }
    Ok(())
}

fn print_hybrid(hybrid: &HybridRecommendations, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "user_id": hybrid.user_id,
                "user_based": outcome_json(&hybrid.user_based),
                "item_based": outcome_json(&hybrid.item_based),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            print_outcome("User-Based Recommendations", &hybrid.user_based)?;
            println!();
            print_outcome("Item-Based Recommendations", &hybrid.item_based)?;
        }
    }
    Ok(())
}

fn outcome_json(outcome: &Result<Vec<Recommendation>, RecommendError>) -> serde_json::Value {
    match outcome {
        Ok(recs) => json!({ "recommendations": recs }),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

fn print_outcome(
    header: &str,
    outcome: &Result<Vec<Recommendation>, RecommendError>,
) -> Result<()> {
    match outcome {
        Ok(recs) => print_list(header, recs, OutputFormat::Text),
        Err(e) => {
            println!("{}", format!("🎯 {}:", header).bold().blue());
            println!("   {}", e.to_string().yellow());
            Ok(())
        }
    }
}

fn print_similar_users(
    user_id: UserId,
    similar: &[SimilarUser],
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let shown = &similar[..similar.len().min(limit)];
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(shown)?),
        OutputFormat::Text => {
            println!(
                "{}",
                format!("Users similar to {} ({} found):", user_id, similar.len())
                    .bold()
                    .blue()
            );
            for user in shown {
                println!(
                    "{}User {}: corr {:.3} over {} shared movies",
                    "• ".green(),
                    user.user_id,
                    user.correlation,
                    user.shared_movies
                );
            }
        }
    }
    Ok(())
}

fn print_stats(stats: &MatrixStats, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(stats)?),
        OutputFormat::Text => {
            println!("{}", "Dataset:".bold().blue());
            println!("{}Users: {}", "• ".cyan(), stats.users);
            println!("{}Movies: {}", "• ".cyan(), stats.movies);
            println!("{}Ratings: {}", "• ".cyan(), stats.ratings);
            println!("{}", "Rating matrix:".bold().blue());
            println!("{}Users: {}", "• ".cyan(), stats.matrix_users);
            println!("{}Popular titles: {}", "• ".cyan(), stats.matrix_titles);
            println!("{}Non-missing cells: {}", "• ".cyan(), stats.matrix_cells);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::try_parse_from(["movie-recs", "hybrid", "--user-id", "108170"]).unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config, RecommenderConfig::default());
        assert!(matches!(cli.command, Commands::Hybrid { user_id: 108170 }));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "min_rating_count": 50, "top_n": 10 }}"#).unwrap();

        let cli = Cli::try_parse_from([
            "movie-recs",
            "--config",
            file.path().to_str().unwrap(),
            "--top-n",
            "3",
            "stats",
        ])
        .unwrap();
        let config = resolve_config(&cli).unwrap();

        assert_eq!(config.min_rating_count, 50);
        assert_eq!(config.top_n, 3);
        assert_eq!(config.correlation_threshold, 0.65);
    }

    #[test]
    fn test_invalid_flag_value_is_rejected() {
        let cli = Cli::try_parse_from(["movie-recs", "--threshold", "1.5", "stats"]).unwrap();
        assert!(resolve_config(&cli).is_err());
    }
}
