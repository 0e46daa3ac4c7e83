pub mod mutation;
pub mod staging_service;
pub mod work_order_card;
pub mod composer_sessions;
