//! Output verification
//!
//! This module re-reads exported files and checks them against the SHA-256
//! checksums recorded when they were written.

pub mod checksum;
pub mod report;
pub mod verify;

pub use report::{FileCheck, VerificationFailure, VerificationReport};
pub use verify::Verifier;
