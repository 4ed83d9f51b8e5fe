//! Unit tests for the analytics module.

mod support;
