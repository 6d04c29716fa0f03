//! Extractors that turn malformed requests into [`AppError`](crate::AppError)
//! responses before a handler runs.

pub mod uuid_path;
pub mod validated_json;
pub mod validated_query;

pub use uuid_path::UuidPath;
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
