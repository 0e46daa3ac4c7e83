pub mod catalog;
pub mod quotes;
pub mod work_orders;
