pub mod catalog;
pub mod quote;
pub mod work_order;
