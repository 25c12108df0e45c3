//! Pipeline stages for turning a deck list into card art.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own without a network.
//!
//! ## Data Flow
//!
//! ```text
//! parse ──▶ query ──▶ (search) ──▶ rank ──▶ download
//! (line)    (text)    (records)    (faces)  (jpg)
//! ```
//!
//! 1. [`parse`]    — raw line → `CardRequest` (quantity, token tag, name, set)
//! 2. [`query`]    — `CardRequest` → exact-name query + `include_extras`
//! 3. [`rank`]     — records → one winner, or one candidate per face
//! 4. [`download`] — candidate → `<name>.jpg` in the output folder
//!
//! The search step itself lives in [`crate::search`].

pub mod download;
pub mod parse;
pub mod query;
pub mod rank;
