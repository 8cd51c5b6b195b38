use thiserror::Error;

pub mod channel;
pub mod events;
pub mod fetch;
pub mod normalize;
pub mod run;
#[cfg(test)]
pub mod testing;

/// Internal defect that ends a run with an `error` event. Source and scorer failures are not
/// faults; they degrade the report instead.
#[derive(Debug, Error)]
pub enum PipelineFault {
    #[error("listing from {source_name} is missing required field '{field}'")]
    InvalidListing {
        source_name: String,
        field: &'static str,
    },

    #[error("pipeline stage aborted: {0}")]
    Aborted(String),
}
