pub mod oanda;

pub use oanda::OandaClient;
