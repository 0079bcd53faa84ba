//! Tests for the token repository module

mod mock_tests;
