// This binary crate is intentionally minimal.
// All training-loop logic lives in the library (src/lib.rs and its modules).
// Run the demo with:
//   cargo run --example synthetic
fn main() {
    println!("depth-trainer: training-loop orchestration for depth-estimation models.");
    println!("Run `cargo run --example synthetic` to train on a synthetic depth dataset.");
}
