pub mod computus;
pub mod correlation;
pub mod extremes;
