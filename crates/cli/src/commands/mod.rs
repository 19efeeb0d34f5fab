//! CLI Commands

pub mod capture;
pub mod compare;
