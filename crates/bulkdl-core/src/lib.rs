//! bulkdl core: admission-controlled orchestration of bulk media downloads.
//!
//! The engine takes an ordered candidate list, deduplicates it against a
//! one-time snapshot of the target directory, and drives a bounded number of
//! external transfer agents to completion. Completion is detected from
//! filesystem state alone: the partial-transfer marker is gone and the final
//! artifact is present. A one-way rate-limit guard can halt admission at any
//! point; running transfers then finish naturally and pending work is parked.

pub mod config;
pub mod logging;

pub mod dedup;
pub mod guard;
pub mod job;
pub mod queue;
pub mod transfer;
pub mod url_model;
