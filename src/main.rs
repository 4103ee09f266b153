use btc_signal::config::AppConfig;
use btc_signal::feed::MarketDataFeed;
use btc_signal::synthetic::{MarketScenario, SyntheticMarket};
use btc_signal::{compute, ComputationResult, IndicatorStatus, ManualFlags, Result};
use clap::{Args, Parser, Subcommand};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "btc-signal")]
#[command(about = "Bitcoin buy/wait signal from technical indicators and sentiment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Manual inputs the market data cannot tell us
#[derive(Args, Debug, Clone, Copy)]
struct FlagArgs {
    /// Count general market sentiment as positive
    #[arg(long)]
    sentiment_positive: bool,
    /// Count macroeconomic conditions as positive
    #[arg(long)]
    macro_positive: bool,
}

impl From<FlagArgs> for ManualFlags {
    fn from(args: FlagArgs) -> Self {
        ManualFlags {
            sentiment_positive: args.sentiment_positive,
            macro_positive: args.macro_positive,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch live market data and compute the signal once
    Check {
        #[command(flatten)]
        flags: FlagArgs,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recompute the signal on an interval until Ctrl+C
    Watch {
        #[arg(long, default_value_t = 5)]
        interval_minutes: u64,
        #[command(flatten)]
        flags: FlagArgs,
    },
    /// Run the signal engine on a synthetic market (no network)
    Simulate {
        #[arg(long, value_enum, default_value_t = MarketScenario::Sideways)]
        scenario: MarketScenario,
        /// Days of history to generate
        #[arg(long, default_value_t = 90)]
        days: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[command(flatten)]
        flags: FlagArgs,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    setup_logging(&config.log_filter);

    match cli.command {
        Commands::Check { flags, json } => {
            let feed = MarketDataFeed::from_config(&config)?;
            match run_cycle(&feed, flags.into()).await {
                Ok(result) => print_result(&result, json)?,
                Err(e) => {
                    eprintln!("❌ Failed to fetch Bitcoin data: {:#}", e);
                    eprintln!("   Run `btc-signal check` again to retry.");
                    std::process::exit(1);
                }
            }
        }
        Commands::Watch {
            interval_minutes,
            flags,
        } => {
            let feed = MarketDataFeed::from_config(&config)?;
            watch_loop(feed, flags.into(), interval_minutes).await;
        }
        Commands::Simulate {
            scenario,
            days,
            seed,
            flags,
            json,
        } => {
            tracing::info!(?scenario, days, seed, "Simulating synthetic market");
            let snapshot = SyntheticMarket::new(seed).generate(scenario, days);
            let result = compute(&snapshot, flags.into())?;
            print_result(&result, json)?;
        }
    }

    Ok(())
}

// ============================================================================
// Initialization Functions
// ============================================================================

fn setup_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ============================================================================
// Cycles
// ============================================================================

/// One full cycle: snapshot (possibly cached) in, fresh computation out
async fn run_cycle(feed: &MarketDataFeed, flags: ManualFlags) -> anyhow::Result<ComputationResult> {
    let snapshot = feed.snapshot().await?;
    let result = compute(&snapshot, flags)?;
    Ok(result)
}

async fn watch_loop(feed: MarketDataFeed, flags: ManualFlags, interval_minutes: u64) {
    let period = Duration::from_secs(interval_minutes.max(1) * 60);
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!("🔄 Watching every {} min, press Ctrl+C to stop", interval_minutes.max(1));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("⚠️  Received Ctrl+C, shutting down...");
                break;
            }
            _ = ticker.tick() => {
                match run_cycle(&feed, flags).await {
                    Ok(result) => print_report(&result),
                    Err(e) => tracing::error!("Cycle failed, retrying on next tick: {:#}", e),
                }
            }
        }
    }
}

// ============================================================================
// Output
// ============================================================================

fn print_result(result: &ComputationResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print_report(result);
    }
    Ok(())
}

fn print_report(result: &ComputationResult) {
    let data = &result.bitcoin_data;
    let signal = &result.buy_signal;

    println!("\n╔═══════════════════════════════════════════════════════╗");
    println!("║              BITCOIN BUY SIGNAL                       ║");
    println!("╚═══════════════════════════════════════════════════════╝");

    println!(
        "\n  BTC ${:.2}  ({:+.2}% 24h)   Volume ${:.0}",
        data.price, data.change_24h, data.volume_24h
    );
    println!("  As of {}\n", data.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));

    println!(
        "  {:<16} {:>14} {:>8}  {}",
        "Indicator", "Value", "Points", "Signal"
    );
    println!("  {}", "─".repeat(62));

    for (_, indicator) in result.indicators.iter() {
        let marker = match indicator.status {
            IndicatorStatus::Positive => "🟢",
            IndicatorStatus::Negative => "🔴",
            IndicatorStatus::Neutral => "⚪",
        };
        println!(
            "{} {:<16} {:>14} {:>5}/{:<2}  {}",
            marker,
            indicator.name,
            indicator.value.to_string(),
            indicator.points,
            indicator.max_points,
            indicator.signal.as_deref().unwrap_or("")
        );
    }

    println!("  {}", "─".repeat(62));

    let verdict = if signal.should_buy {
        "✅ BUY"
    } else {
        "⏳ WAIT"
    };
    println!(
        "\n  {}   score {}/{}   confidence {} ({}%)\n",
        verdict, signal.score, signal.max_score, signal.confidence, signal.confidence_percentage
    );
}
