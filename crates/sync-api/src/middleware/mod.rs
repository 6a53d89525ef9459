pub mod request_id;
pub mod error_handler;
pub mod cors;
pub mod logging;

pub use request_id::RequestId;
pub use error_handler::ErrorHandler;
pub use cors::setup_cors;
pub use logging::logging_middleware;