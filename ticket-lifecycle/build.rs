//!
//! Generate Protobuf code
//!

fn main() -> std::io::Result<()> {
    prost_build::Config::new()
        .include_file("protobuf.rs")
        .compile_protos(
            &[
                "../shared/protobuf/payment.proto",
                "../shared/protobuf/seat.proto",
                "../shared/protobuf/ticket.proto",
            ],
            &["../shared/protobuf/"],
        )
}
