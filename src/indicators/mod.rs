// Technical indicators module
// Implements the indicator columns of the feature frame: ATR, EMA/SMA,
// RSI, Bollinger Bands, MACD and the Stochastic Oscillator.
//
// Every series function returns a Vec aligned 1:1 with its input;
// positions before an indicator's minimum window are None, never zero.

pub mod atr;
pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod rsi;
pub mod stochastic;

pub use atr::atr_series;
pub use bollinger::{bollinger_series, BollingerBands};
pub use macd::{macd_series, Macd};
pub use moving_average::{ema_series, sma_series};
pub use rsi::rsi_series;
pub use stochastic::{stochastic_series, Stochastic};
