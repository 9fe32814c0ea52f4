use clap::{Parser, Subcommand};
use bitebridge_engine::{
    store::NewAdvert, AdvertFilter, MarketConfig, Marketplace, SearchQuery, SortOrder, StatusFilter,
};

#[derive(Parser)]
#[command(name = "bitebridge-cli")]
#[command(about = "BiteBridge advert engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// YAML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Database path (overrides config)
    #[arg(short, long)]
    db: Option<String>,

    /// Backend API base URL (overrides config)
    #[arg(long)]
    backend: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search adverts
    Search {
        /// Search query
        query: String,

        /// Maximum results
        #[arg(short, long, default_value = "10")]
        max_results: usize,

        /// Category filter
        #[arg(long)]
        category: Option<String>,

        /// Dietary filter (substring, e.g. "vegan")
        #[arg(long)]
        dietary: Option<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        /// all, active or inactive
        #[arg(long, default_value = "all")]
        status: StatusFilter,

        /// relevance, newest, oldest, price_asc, price_desc, name
        #[arg(long, default_value = "relevance")]
        sort: SortOrder,
    },

    /// Recommend adverts similar to one advert
    Recommend {
        /// Advert id
        id: String,

        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Vendor dashboard statistics
    Stats {
        /// Vendor id
        owner_id: String,
    },

    /// List adverts from the backend, or the local store when it is unreachable
    List,

    /// Publish an advert (backend first, local store as fallback)
    Add {
        name: String,

        #[arg(short, long)]
        price: f64,

        /// At least 10 characters
        #[arg(long)]
        description: String,

        #[arg(long)]
        category: String,

        #[arg(long)]
        owner: Option<String>,
    },

    /// Remove an advert (backend first, local store as fallback)
    Remove {
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bitebridge_engine=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MarketConfig::load(path)?,
        None => MarketConfig::from_env(),
    };
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(backend) = cli.backend {
        config.backend_url = Some(backend);
    }

    let market = Marketplace::from_config(&config).await?;

    match cli.command {
        Commands::Search { query, max_results, category, dietary, min_price, max_price, status, sort } => {
            println!("🔍 Searching for: {}", query);

            let mut filter = AdvertFilter::new()
                .with_price_range(min_price, max_price)
                .with_status(status);
            if let Some(category) = category {
                filter = filter.with_category(category);
            }
            if let Some(dietary) = dietary {
                filter = filter.with_dietary(dietary);
            }

            let result = market
                .search(SearchQuery {
                    query,
                    filter,
                    sort,
                    limit: Some(max_results),
                })
                .await?;

            println!("\n✅ {} of {} adverts match ({})", result.matched, result.total, result.provider);
            if result.expanded_terms.len() > 1 {
                println!("   Expanded: {}", result.expanded_terms.join(" | "));
            }
            println!("   Latency: {:.2}ms", result.latency_ms);

            for (i, hit) in result.adverts.iter().enumerate() {
                println!("   {}. {} [score {:.1}]", i + 1, hit.advert.display_name(), hit.score);
            }
        }

        Commands::Recommend { id, limit } => {
            let recs = market.recommendations(&id, limit).await?;

            println!("📋 Recommended for {}:", id);
            if recs.is_empty() {
                println!("   (none)");
            }
            for (i, rec) in recs.iter().enumerate() {
                println!("   {}. {} [{:.2}]", i + 1, rec.advert.display_name(), rec.score);
            }
        }

        Commands::Stats { owner_id } => {
            let stats = market.vendor_stats(&owner_id).await?;

            println!("📊 Vendor {}:", stats.owner_id);
            println!("   Total adverts: {}", stats.total_adverts);
            println!("   Active adverts: {}", stats.active_adverts);
            println!("   Avg price: GHS {:.2}", stats.average_price);
            for (category, count) in &stats.categories {
                println!("   {}: {}", category, count);
            }
        }

        Commands::List => {
            let fetched = market.fetch_adverts().await?;
            println!("🗂  {} adverts from {}", fetched.adverts.len(), fetched.provider);
            for advert in &fetched.adverts {
                println!("   {}  {}", advert.id, advert.display_name());
            }

            let stats = market.store_stats().await?;
            println!("   Local store: {} adverts ({} available)", stats.total_adverts, stats.available_adverts);
        }

        Commands::Add { name, price, description, category, owner } => {
            let mut advert = NewAdvert::new(name, price);
            advert.description = description;
            advert.category = category;
            advert.owner_id = owner;

            let created = market.create_advert(advert).await?;
            println!("✅ Created {} ({})", created.display_name(), created.id);
        }

        Commands::Remove { id } => {
            if market.delete_advert(&id).await? {
                println!("🧹 Removed {}", id);
            } else {
                println!("Nothing to remove for {}", id);
            }
        }
    }

    Ok(())
}
