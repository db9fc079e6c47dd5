//! Customer directory adapters.

mod in_memory_customer_directory;
mod json_customer_directory;

pub use in_memory_customer_directory::InMemoryCustomerDirectory;
pub use json_customer_directory::JsonCustomerDirectory;
