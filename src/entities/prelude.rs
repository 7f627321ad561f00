pub use super::usd_rates::Entity as UsdRates;
