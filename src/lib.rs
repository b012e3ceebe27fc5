pub mod aggregate;
pub mod audio;
pub mod config;
pub mod error;
pub mod harness;
pub mod invoker;
pub mod metrics;
pub mod plot;
pub mod reference;
pub mod signals;
