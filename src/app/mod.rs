pub mod errors;
pub mod history;
pub mod local;
pub mod reports;

pub use errors::AppError;
pub use local::AppLocal;
