fn main() {
    // The proto toolchain is not installed system-wide in this build
    // environment; source a vendored `protoc` so codegen is hermetic.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }
    tonic_build::configure()
        .compile_protos(
            &[
                "proto/money.proto",
                "proto/auth.proto",
                "proto/restaurants.proto",
                "proto/orders.proto",
            ],
            &["proto"],
        )
        .unwrap_or_else(|e| panic!("Failed to compile protos {:?}", e));
}
