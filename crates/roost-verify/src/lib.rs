// crates/roost-verify/src/lib.rs
//
// roost-verify: Verification side-channel for Roost.
//
// Two independent, best-effort lookups enrich an Identity after the fact:
//   - NIP-05: `name@domain` resolved through the domain's well-known
//     document. Accepted only when it maps back to the same pubkey.
//   - LNURL: a lud16 address or bech32 `lnurl1...` resolved to payment
//     metadata. Accepted only when the endpoint allows nostr zaps.
//
// Lookups are spawned onto a bounded pool and never awaited by ingestion.
// Every failure is logged at debug level and dropped.

pub mod client;
pub mod config;
pub mod lnurl;
pub mod nip05;
pub mod side_channel;

// Re-export key types for ergonomic access from downstream crates.
pub use client::{HttpLookupClient, LookupClient, StaticLookupClient};
pub use config::VerifyConfig;
pub use nip05::{Nip05Address, Nip05Profile};
pub use side_channel::Verifier;
