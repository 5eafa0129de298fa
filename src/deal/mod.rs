//! Deal input data and loading

mod data;
mod loader;

pub use data::DealParameters;
pub use loader::{load_deals, load_deals_from_reader, DealRecord};

#[cfg(test)]
pub(crate) mod tests {
    pub(crate) use super::data::tests::{sample_deal, zero_price_deal};
}
