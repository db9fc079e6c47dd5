//! Customer reference data consumed by the routing core.

mod profile;

pub use profile::{normalize_phone_number, CustomerProfile};
