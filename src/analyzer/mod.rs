//! # Analyzer Module
//!
//! Policy compliance analysis for Advanced Cluster Management hubs.

pub mod acm_policy;
