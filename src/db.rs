pub mod gateway;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod work_order_repo;
pub use work_order_repo::WorkOrderRepository;
pub mod memory;
pub use memory::InMemoryStore;
