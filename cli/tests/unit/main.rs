//! Unit tests for capsule CLI
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod detect_service;
mod docker_adapter;
mod lock_service;
mod property_tests;
mod symlink_manager;
mod volume_service;
