pub mod builder;
pub mod markdown;
