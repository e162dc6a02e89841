pub mod price_provider;
pub mod random_walk;
