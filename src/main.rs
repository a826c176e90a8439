use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use clap::Parser;
use fxbot::api::OandaClient;
use fxbot::config::BotConfig;
use fxbot::db::PgAuditLog;
use fxbot::engine::{AuditLog, Broker, Engine, MarketData, PipelineError};
use fxbot::Result;
use tokio::time::{interval_at, Duration, Instant};

/// EMA-crossover/Bollinger trading pipeline for a single instrument
#[derive(Parser)]
#[command(name = "fxbot", version)]
struct Cli {
    /// Run a single pipeline invocation and exit
    #[arg(long)]
    once: bool,

    /// Minutes between scheduled invocations
    #[arg(long, default_value_t = 5)]
    interval_minutes: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    let cli = Cli::parse();
    let config = BotConfig::from_env()?;

    tracing::info!(
        "fxbot starting: {} ({} units, max spread {:.6})",
        config.instrument,
        config.trade_units,
        config.max_spread
    );

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/fxbot".to_string());
    let audit = PgAuditLog::new(&database_url).await?;

    let market = OandaClient::from_env()?;
    let broker = market.clone();

    let engine = Engine::new(market, broker, audit, config);

    if cli.once {
        run_and_report(&engine).await;
        return Ok(());
    }

    scheduled_loop(&engine, cli.interval_minutes).await
}

/// Invoke the pipeline on candle boundaries until interrupted
///
/// The scheduler owns the cadence; the engine only exposes run_once().
/// Failures stay inside their invocation and never cancel the loop.
async fn scheduled_loop<M: MarketData, B: Broker, A: AuditLog>(
    engine: &Engine<M, B, A>,
    interval_minutes: u64,
) -> Result<()> {
    let period = Duration::from_secs(interval_minutes.max(1) * 60);
    let mut ticker = interval_at(next_boundary_plus_offset(interval_minutes), period);

    tracing::info!("Scheduler running every {} minute(s), mon-fri", interval_minutes);

    loop {
        ticker.tick().await;

        if !is_market_open(Utc::now()) {
            tracing::debug!("Market closed, skipping run");
            continue;
        }

        run_and_report(engine).await;
    }
}

async fn run_and_report<M: MarketData, B: Broker, A: AuditLog>(engine: &Engine<M, B, A>) {
    match engine.run_once().await {
        Ok(report) => {
            let accepted = report.decisions.iter().filter(|d| d.accepted).count();
            tracing::info!(
                "Run complete: signal {}, {} decision(s), {} accepted",
                report.signal.as_str(),
                report.decisions.len(),
                accepted
            );
        }
        Err(PipelineError::InsufficientData { got, need }) => {
            tracing::warn!("Run skipped: {} candles available, need {}", got, need);
        }
        Err(e) => {
            tracing::error!("Run aborted: {}", e);
        }
    }
}

/// Next interval boundary (XX:00, XX:05, ...) plus a 60 second offset so
/// the just-closed candle is published before we fetch it
fn next_boundary_plus_offset(interval_minutes: u64) -> Instant {
    let interval = interval_minutes.max(1);
    let now = Utc::now();
    let current_minute = now.minute() as u64;
    let current_second = now.second() as u64;

    let minutes_until_next = interval - (current_minute % interval);
    let seconds_until_next = (minutes_until_next * 60).saturating_sub(current_second);

    Instant::now() + Duration::from_secs(seconds_until_next + 60)
}

fn is_market_open(now: DateTime<Utc>) -> bool {
    !matches!(now.weekday(), Weekday::Sat | Weekday::Sun)
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("fxbot=info,fxbot::strategy=debug")
        .init();
}
