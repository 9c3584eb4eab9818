pub mod app;
pub mod panel;

pub use app::ExchangeApp;
