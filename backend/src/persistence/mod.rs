pub mod repository;
pub mod repository_sqlx;

pub use repository::{PersistError, SampleRepository};
pub use repository_sqlx::SqlxSampleRepository;
