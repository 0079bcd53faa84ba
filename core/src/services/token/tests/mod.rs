//! Unit tests for the token services

mod service_tests;
