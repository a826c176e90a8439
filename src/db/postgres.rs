use crate::engine::AuditLog;
use crate::models::{Direction, FailedTradeRecord, Signal, TradeRecord};
use crate::Result;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

/// Postgres-backed append-only trade ledger
///
/// Two tables, `trades` and `failed_trades`, matching the audit model:
/// records are only ever inserted and listed, never updated or deleted.
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    /// Connect to Postgres and run migrations
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        tracing::info!("Connected to Postgres trade ledger");

        Ok(Self { pool })
    }

    /// List all recorded trades, oldest first
    pub async fn list_trades(&self) -> Result<Vec<TradeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, signal, trade_type, success, entry_price, exit_price
            FROM trades
            ORDER BY timestamp ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut trades = Vec::new();
        for row in rows {
            let signal_str: String = row.get("signal");
            let direction_str: String = row.get("trade_type");

            trades.push(TradeRecord {
                id: row.get::<Uuid, _>("id"),
                timestamp: row.get::<DateTime<Utc>, _>("timestamp"),
                signal: parse_signal(&signal_str)?,
                direction: parse_direction(&direction_str)?,
                success: row.get("success"),
                entry_price: row.get("entry_price"),
                exit_price: row.get("exit_price"),
            });
        }

        Ok(trades)
    }

    /// List all failed/rejected attempts, oldest first
    pub async fn list_failed_trades(&self) -> Result<Vec<FailedTradeRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, signal, trade_type, reason, entry_price
            FROM failed_trades
            ORDER BY timestamp ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut failed = Vec::new();
        for row in rows {
            let signal_str: String = row.get("signal");
            let direction_str: Option<String> = row.get("trade_type");

            failed.push(FailedTradeRecord {
                id: row.get::<Uuid, _>("id"),
                timestamp: row.get::<DateTime<Utc>, _>("timestamp"),
                signal: parse_signal(&signal_str)?,
                direction: direction_str.as_deref().map(parse_direction).transpose()?,
                reason: row.get("reason"),
                entry_price: row.get("entry_price"),
            });
        }

        Ok(failed)
    }
}

impl AuditLog for PgAuditLog {
    async fn record_trade(&self, record: &TradeRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO trades (id, timestamp, signal, trade_type, success, entry_price, exit_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(record.timestamp)
        .bind(record.signal.as_str())
        .bind(record.direction.as_str())
        .bind(record.success)
        .bind(record.entry_price)
        .bind(record.exit_price)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Recorded {} trade {}", record.direction.as_str(), record.id);

        Ok(())
    }

    async fn record_failed_trade(&self, record: &FailedTradeRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO failed_trades (id, timestamp, signal, trade_type, reason, entry_price)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.timestamp)
        .bind(record.signal.as_str())
        .bind(record.direction.map(|d| d.as_str()))
        .bind(&record.reason)
        .bind(record.entry_price)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Recorded failed trade {}: {}", record.id, record.reason);

        Ok(())
    }
}

fn parse_signal(value: &str) -> Result<Signal> {
    match value {
        "None" => Ok(Signal::None),
        "Buy" => Ok(Signal::Buy),
        "Sell" => Ok(Signal::Sell),
        _ => Err(format!("Invalid signal in trade ledger: {}", value).into()),
    }
}

fn parse_direction(value: &str) -> Result<Direction> {
    match value {
        "Buy" => Ok(Direction::Buy),
        "Sell" => Ok(Direction::Sell),
        _ => Err(format!("Invalid trade type in trade ledger: {}", value).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_round_trips_through_text() {
        for signal in [Signal::None, Signal::Buy, Signal::Sell] {
            assert_eq!(parse_signal(signal.as_str()).unwrap(), signal);
        }
        assert!(parse_signal("Hold").is_err());
    }

    #[test]
    fn test_direction_round_trips_through_text() {
        for direction in [Direction::Buy, Direction::Sell] {
            assert_eq!(parse_direction(direction.as_str()).unwrap(), direction);
        }
        assert!(parse_direction("None").is_err());
    }

    #[tokio::test]
    #[ignore] // Needs a live Postgres at DATABASE_URL
    async fn test_record_and_list_round_trip() {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL not found in environment");
        let log = PgAuditLog::new(&database_url).await.unwrap();

        let trade = TradeRecord::new(Signal::Buy, Direction::Buy, true, 1.09515, None);
        log.record_trade(&trade).await.unwrap();

        let listed = log.list_trades().await.unwrap();
        let found = listed.iter().find(|t| t.id == trade.id).unwrap();
        assert_eq!(found.signal, Signal::Buy);
        assert_eq!(found.direction, Direction::Buy);
        assert_eq!(found.entry_price, trade.entry_price);
        assert_eq!(found.exit_price, None);

        let failed = FailedTradeRecord::new(
            Signal::Sell,
            Some(Direction::Sell),
            "Spread 0.000200 at or above maximum 0.000160",
            Some(1.09500),
        );
        log.record_failed_trade(&failed).await.unwrap();

        let listed = log.list_failed_trades().await.unwrap();
        let found = listed.iter().find(|t| t.id == failed.id).unwrap();
        assert_eq!(found.reason, failed.reason);
        assert_eq!(found.entry_price, failed.entry_price);
    }
}
