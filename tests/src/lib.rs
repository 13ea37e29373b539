//! # Warp Relay Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/   # Cross-crate scenarios
//! │   ├── relay_flows.rs     # backends + relay session end to end
//! │   ├── backend_restart.rs # durable store, restart, key rotation
//! │   └── runtime_devnet.rs  # relay-runtime driven by env-style config
//! └── benches/           # criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p wr-tests
//! cargo test -p wr-tests integration::relay_flows
//! cargo bench -p wr-tests
//! ```

pub mod integration;
