//! PDFToolz Server Library
//!
//! A self-hosted PDF utility belt. The main server binary is in main.rs;
//! everything it wires together lives here so it can be exercised by tests.
//!
//! # Modules
//!
//! - `catalog`: Static table of supported tools
//! - `upload`: Multipart intake and scratch files
//! - `dispatch`: Runs a tool's handler and commits its output
//! - `artifacts`: Download area naming, retrieval and expiry
//! - `pdf`: MuPDF-backed page operations, rendering and text extraction
//! - `tables`: Table detection over extracted text lines
//! - `office`: docx / xlsx / pptx writers
//! - `routes`: HTTP surface

pub mod artifacts;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod html;
pub mod office;
pub mod pdf;
pub mod routes;
pub mod state;
pub mod tables;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;
