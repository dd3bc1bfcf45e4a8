pub mod cycle;
pub mod driver;

pub use cycle::{CycleReport, IngestionCycle};
pub use driver::run_ingestion_loop;
