use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use calorie_tracker::archive::{Archiver, GitArchiver, LocalOnly};
use calorie_tracker::constants;
use calorie_tracker::llm_interaction::OllamaClient;
use calorie_tracker::prompt::collect_food_and_amount;
use calorie_tracker::session::{self, TrackerSession};
use calorie_tracker::summary::{format_entries, Summary};
use calorie_tracker::{LedgerStore, TrackerError};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Log a meal: ask the local LLM for its nutrition, save it and archive the day.
    Log {
        #[arg(long, help = "What you ate. Asked interactively when omitted.")]
        food: Option<String>,
        #[arg(long, help = "How much you ate, e.g. '2 slices'. Asked interactively when omitted.")]
        amount: Option<String>,
        #[arg(long, env = "CALORIE_TRACKER_DAILY_LIMIT", default_value_t = constants::DEFAULT_DAILY_LIMIT, help = "Daily calorie limit.")]
        limit: f64,
        #[arg(long, help = "Skip the git pull before loading today's ledger.")]
        no_sync: bool,
        #[arg(long, help = "Skip git pull, commit and push.")]
        no_archive: bool,
    },
    /// Show today's entries and calorie summary.
    Today {
        #[arg(long, env = "CALORIE_TRACKER_DAILY_LIMIT", default_value_t = constants::DEFAULT_DAILY_LIMIT, help = "Daily calorie limit.")]
        limit: f64,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load .env file if present (OLLAMA_URL, CALORIE_TRACKER_* settings)
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays the report. RUST_LOG overrides the level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    info!("Calorie tracker starting with command: {:?}", cli.command);

    if let Err(e) = run(cli.command).await {
        eprintln!("❌ Error: {:#}", e);
        if e.downcast_ref::<TrackerError>().is_some_and(TrackerError::is_transient) {
            eprintln!("Nothing was saved; you can try again.");
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<()> {
    let store = LedgerStore::new(constants::TRACKER_DIR.as_str());

    match command {
        Commands::Log {
            food,
            amount,
            limit,
            no_sync,
            no_archive,
        } => {
            if no_archive {
                run_log(store, LocalOnly, limit, food, amount, false, false).await
            } else {
                run_log(store, GitArchiver::from_env(), limit, food, amount, !no_sync, true).await
            }
        }
        Commands::Today { limit } => {
            let ledger = store.load(&session::today()).context("Could not load today's ledger")?;
            println!("{}", format_entries(&ledger));
            println!("{}", Summary::compute(ledger.total(), limit));
            Ok(())
        }
    }
}

async fn run_log<A: Archiver>(
    store: LedgerStore,
    archiver: A,
    limit: f64,
    food: Option<String>,
    amount: Option<String>,
    syncing: bool,
    archiving: bool,
) -> Result<()> {
    println!("🍽️  Calorie Tracker");
    println!("{}", "=".repeat(40));

    let estimator = OllamaClient::from_env().context("Could not set up the LLM client")?;
    let date = session::today();
    let mut session = if syncing {
        println!("📥 Pulling latest data from git...");
        TrackerSession::start(store, estimator, archiver, limit, &date).await
    } else {
        TrackerSession::open(store, estimator, archiver, limit, &date)
    }
    .context("Could not open today's ledger")?;

    if let Some(e) = session.sync_error() {
        println!("⚠️  Could not pull from git: {}", e);
        println!("📝 Continuing with local data...");
    }

    println!("\n{}", format_entries(session.ledger()));
    let current = session.summary();
    if current.consumed > 0.0 {
        println!(
            "🔥 Current status: {:.1}/{:.0} calories consumed",
            current.consumed, current.limit
        );
        println!("💚 Remaining: {:.1} calories\n", current.remaining);
    }

    let (food, amount) = {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();
        collect_food_and_amount(&mut input, &mut output, food, amount)?
    };

    println!("🤖 Querying LLM for nutritional info...");
    io::stdout().flush().ok();
    let logged = session
        .log_entry(&food, &amount)
        .await
        .with_context(|| format!("Could not log '{} {}'", amount, food))?;

    let n = &logged.entry.nutrition;
    println!(
        "📊 {:.1}g protein, {:.1}g carbs, {:.1}g fat",
        n.proteins, n.carbs, n.fat
    );
    println!("💾 Saved to {}", logged.path.display());
    println!("📊 Total entries today: {}", session.ledger().len());
    println!("✅ Added: {:.1} calories", n.calories);
    println!("\n{}", logged.summary);

    match logged.archive {
        Ok(()) if archiving => println!("\n✅ Committed and pushed to git"),
        Ok(()) => {}
        Err(e) => {
            println!("\n⚠️  {}", e);
            println!("You may need to manually commit and push the changes.");
        }
    }

    Ok(())
}
