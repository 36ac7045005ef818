fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Client and server stubs; the server half is used by the mock in tests
    tonic_build::compile_protos("../../proto/emotion.proto")?;
    Ok(())
}
