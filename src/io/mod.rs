//! File output: saved fit JSON and per-day CSV export.

pub mod export;
pub mod fitfile;
