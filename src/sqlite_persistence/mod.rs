mod text_folding;
mod versioned_schema;

pub use text_folding::*;
pub use versioned_schema::*;
