//! # Voxel Edit Demo
//!
//! Runs the region editor against a generated world and prints the events it
//! publishes. Set `RUST_LOG=info` (or `debug`) to see the editor's logs.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_edit::run();
}
