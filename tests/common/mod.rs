//! Shared fixtures for the integration tests
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::{
    analyze_plain, analyze_tei, plain_text_opening_unchanged, plain_text_play,
    plain_text_without_no_change, tei_play,
};
