/// Generates the `iam` message types and the `IamService` client from
/// `proto/iam.proto` into `OUT_DIR`.
///
/// Only the client half is emitted; the load generator never serves.
///
/// Generated code is reachable through:
///
/// ```rust
/// pub mod proto {
///     tonic::include_proto!("iam");
/// }
/// ```
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=proto/iam.proto");

    tonic_prost_build::configure()
        .build_server(false)
        .compile_protos(&["proto/iam.proto"], &["proto"])?;
    Ok(())
}
