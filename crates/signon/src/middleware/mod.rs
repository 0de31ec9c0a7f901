pub mod catch_panic;
pub mod request_id;
pub mod trace;
