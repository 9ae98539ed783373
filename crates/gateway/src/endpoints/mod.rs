//! # Gatewayエンドポイント

pub mod search;
pub mod product;
pub mod taxonomy;

pub use search::handle_search;
pub use product::handle_product;
pub use taxonomy::handle_taxonomy;
