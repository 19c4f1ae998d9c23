pub mod cart_service;
pub mod catalog_service;
pub mod order_backend;
pub mod session_service;
