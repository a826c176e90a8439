// Durable audit log storage
pub mod postgres;

pub use postgres::PgAuditLog;
