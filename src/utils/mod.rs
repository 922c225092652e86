//! Utility modules: build info, JSON persistence.

pub mod build_info;
pub mod persistence;
