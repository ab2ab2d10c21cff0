//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg` and
//! serves `static/` on a local HTTP port.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    host::run()
}

// The binary has nothing to do inside the browser.
#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod host {
    use std::process::{Command, ExitStatus};

    use anyhow::{bail, Context, Result};
    use clap::Parser;

    /// Build and serve the proximity grid demo page.
    #[derive(Debug, Parser)]
    #[command(version)]
    struct Args {
        /// Port for the local HTTP server.
        #[arg(long, default_value_t = 8000)]
        port: u16,

        /// Serve whatever is already in `static/pkg` without rebuilding.
        #[arg(long)]
        skip_build: bool,

        /// Build the bundle in debug mode (verbose console logging).
        #[arg(long)]
        dev: bool,
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();

        if !args.skip_build {
            println!("Building WASM pkg …");
            let profile = if args.dev { "--dev" } else { "--release" };
            let status = Command::new("wasm-pack")
                .args(["build", profile, "--target", "web", "--out-dir", "static/pkg"])
                .status()
                .context(
                    "wasm-pack not found in PATH; install it from https://rustwasm.github.io/wasm-pack/",
                )?;
            ensure_success(status, "wasm-pack build")?;
        }

        println!("Serving static/ at http://127.0.0.1:{} …", args.port);
        let status = Command::new("python3")
            .args(["-m", "http.server", &args.port.to_string(), "--directory", "static"])
            .status()
            .context("failed to start python3 http.server")?;
        ensure_success(status, "http server")
    }

    fn ensure_success(status: ExitStatus, what: &str) -> Result<()> {
        if !status.success() {
            bail!("{what} exited with {status}");
        }
        Ok(())
    }
}
