use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use larder_core::ingredients;
use larder_core::llm::create_provider_from_env;
use larder_core::suggest::scale_ingredient_line;
use larder_core::{
    cart_signature, parse_cart_command, FakeImageGenerator, InMemoryCart, InMemoryCatalog,
    InboundRequest, LarderConfig, LlmProvider, Orchestrator, SuggestionCache, SuggestionEngine,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "larder")]
#[command(about = "Larder grocery assistant CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ingredients found in a shopping request
    Extract {
        /// Request text, e.g. "Add selected ingredients to cart (serves 4): 2 cups rice"
        text: String,
    },
    /// Run a request through extraction, matching and the cart against the demo catalog
    Process {
        /// Free text or a JSON envelope ({"product_ids": [...]} or {"ingredients": [...]})
        input: String,
        /// User whose cart is updated (default: LARDER_DEFAULT_USER or default_user)
        #[arg(long)]
        user: Option<String>,
    },
    /// Add product ids named in a command such as "add CHICKEN001 and GARLIC001 for user alice"
    Add { command: String },
    /// Suggest recipes for cart items
    Suggest {
        /// Comma-separated cart items
        #[arg(long, value_delimiter = ',')]
        items: Vec<String>,
        /// Session id used in the cache key
        #[arg(long, default_value = "cli")]
        session: String,
        /// Wait for photos and print the enriched set
        #[arg(long)]
        wait_for_images: bool,
    },
    /// Scale one ingredient line between serving counts
    Scale {
        /// Ingredient line, e.g. "1 1/2 cups Jasmine Rice"
        line: String,
        #[arg(long, default_value_t = 4)]
        from: u32,
        #[arg(long)]
        to: u32,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = LarderConfig::from_env().context("Invalid LARDER_* configuration")?;

    match cli.command {
        Commands::Extract { text } => {
            let tokens = ingredients::parse(&text);
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
        Commands::Process { input, user } => {
            process(&config, &input, user.as_deref()).await?;
        }
        Commands::Add { command } => {
            let parsed = parse_cart_command(&command);
            let orchestrator = demo_orchestrator(&config);
            let result = orchestrator
                .add_products(&parsed.user_id, &parsed.product_ids)
                .await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Suggest {
            items,
            session,
            wait_for_images,
        } => {
            suggest(&config, &items, &session, wait_for_images).await?;
        }
        Commands::Scale { line, from, to } => {
            println!("{}", scale_ingredient_line(&line, from, to));
        }
    }

    Ok(())
}

fn demo_orchestrator(config: &LarderConfig) -> Orchestrator {
    Orchestrator::new(
        Arc::new(InMemoryCatalog::demo()),
        Arc::new(InMemoryCart::new()),
        config,
    )
}

async fn process(config: &LarderConfig, input: &str, user: Option<&str>) -> Result<()> {
    let orchestrator = demo_orchestrator(config);

    let result = orchestrator.handle(InboundRequest::parse(input), user).await;
    let cart = orchestrator.get_cart(&result.user_id).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    println!("{}", serde_json::to_string_pretty(&cart)?);
    Ok(())
}

async fn suggest(
    config: &LarderConfig,
    items: &[String],
    session: &str,
    wait_for_images: bool,
) -> Result<()> {
    let items: Vec<String> = items
        .iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();

    let provider: Arc<dyn LlmProvider> = Arc::from(create_provider_from_env()?);
    let cache = Arc::new(SuggestionCache::new(config));
    let engine = SuggestionEngine::new(
        provider,
        Arc::new(FakeImageGenerator::new()),
        cache.clone(),
        config,
    );

    let suggestions = engine.suggest(&items, session).await;
    tracing::info!(source = ?suggestions.source, "Suggestions ready");

    let recipes = match (wait_for_images, suggestions.enrichment) {
        (true, Some(job)) => {
            job.await.context("Image enrichment task failed")?;
            let key = cart_signature(&items, session);
            cache.recipes.get(&key).unwrap_or(suggestions.recipes)
        }
        _ => suggestions.recipes,
    };

    let stats = cache.recipes.stats();
    tracing::debug!(
        entries = stats.entries,
        hits = stats.hits,
        misses = stats.misses,
        "Recipe cache"
    );

    println!("{}", serde_json::to_string_pretty(&recipes)?);
    Ok(())
}
