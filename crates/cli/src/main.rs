//! Command-line interface for the `snipx` application.
//!
//! This crate's binary delegates to [`snipx::run`].

fn main() -> anyhow::Result<std::process::ExitCode> {
    snipx::run()
}
