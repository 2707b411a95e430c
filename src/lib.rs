#![cfg_attr(not(test), no_std)]

//! Client implementation of the Apple Notification Center Service (ANCS).
//!
//! The crate sits between a host BLE stack and application code: it drives
//! service and characteristic discovery, gates progress on link encryption,
//! decodes notification source events, reassembles fragmented data source
//! responses and sequences multi-attribute retrieval into a compact CBOR
//! record for a downstream consumer.
//!
//! The host stack is consumed through the traits in [`client::traits`];
//! transport events are delivered by calling [`AncsManager::handle_event`]
//! on one logical thread.

pub mod client;
pub mod config;
pub mod manager;
pub mod protocol;
pub mod sequencer;

pub use client::driver::{AncsClient, ClientError, ClientEvent, LinkEvent};
pub use manager::AncsManager;
