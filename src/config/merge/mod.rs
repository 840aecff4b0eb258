pub mod merge_policy;
pub mod service;
