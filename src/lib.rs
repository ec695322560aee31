#![doc = include_str!("../README.md")]
#![warn(
    anonymous_parameters,
    bare_trait_objects,
    clippy::branches_sharing_code,
    clippy::map_unwrap_or,
    clippy::match_wildcard_for_single_variants,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::needless_for_each,
    clippy::redundant_closure_for_method_calls,
    clippy::semicolon_if_nothing_returned,
    deprecated_in_future,
    ellipsis_inclusive_range_patterns,
    future_incompatible,
    missing_copy_implementations,
    nonstandard_style,
    rust_2018_idioms,
    rust_2021_compatibility,
    rustdoc::bare_urls,
    rustdoc::broken_intra_doc_links,
    trivial_casts,
    trivial_numeric_casts,
    unused
)]

pub mod apu;
pub mod bus;
pub mod cart;
pub mod common;
pub mod control_deck;
pub mod cpu;
pub mod error;
pub mod input;
pub mod logging;
pub mod mapper;
pub mod mem;
pub mod ppu;

pub type NesError = anyhow::Error;
pub type NesResult<T> = anyhow::Result<T, NesError>;
