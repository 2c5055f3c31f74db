//! heat-probe - Nagios-style OpenStack Heat health check
//!
//! This crate provides the `check-heat-stack` probe, which creates a stack,
//! waits for it, and tears it down again, forcing stuck resources out of
//! the way when Heat cannot delete them on its own.

pub mod config;
pub mod openstack;
pub mod probe;
pub mod teardown;
pub mod wait;
