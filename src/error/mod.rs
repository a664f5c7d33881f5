mod types;

pub use types::{HostError, HostResult, NavError, Result};
