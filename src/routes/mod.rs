pub mod analysis;
pub mod chart;
pub mod dashboard;
pub mod health;
pub mod watchlist;
