pub mod extract;
pub mod fit_scoring;
pub mod prompts;
pub mod scoring;
