//! `folio-serve`: builds the wasm bundle into `static/pkg`, refreshes `dist/`
//! through the build script, serves it locally and optionally opens an
//! ngrok tunnel.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    serve::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod serve {
    use std::path::PathBuf;
    use std::process::{Command, Stdio};

    use anyhow::{bail, Context, Result};
    use clap::Parser;

    #[derive(Debug, Parser)]
    #[command(name = "folio-serve", about = "Build and serve the scene widget demo page")]
    pub struct Args {
        /// Port for the local HTTP server.
        #[arg(long, default_value_t = 8000)]
        pub port: u16,

        /// Serve the existing dist/ without running wasm-pack or cargo.
        #[arg(long)]
        pub skip_build: bool,

        /// Expose the server through ngrok.
        #[arg(long)]
        pub tunnel: bool,

        /// Directory to serve.
        #[arg(long, default_value = "dist")]
        pub dir: PathBuf,
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        let args = Args::parse();

        if !args.skip_build {
            build()?;
        }
        if !args.dir.exists() {
            bail!("{} does not exist; run without --skip-build first", args.dir.display());
        }

        log::info!("serving {} at http://127.0.0.1:{}", args.dir.display(), args.port);
        let mut server = Command::new("python3")
            .args(["-m", "http.server", &args.port.to_string(), "--directory"])
            .arg(&args.dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .context("failed to start python3 http.server")?;

        let mut tunnel = None;
        if args.tunnel {
            match Command::new("ngrok").args(["http", &args.port.to_string()]).spawn() {
                Ok(child) => {
                    log::info!("ngrok tunnel starting");
                    tunnel = Some(child);
                }
                Err(e) => log::warn!("ngrok not available ({e}); serving locally only"),
            }
        }

        let status = server.wait().context("waiting for http server")?;
        if let Some(mut child) = tunnel {
            child.kill().ok();
        }
        if !status.success() {
            bail!("http server exited with {status}");
        }
        Ok(())
    }

    fn build() -> Result<()> {
        log::info!("building wasm bundle into static/pkg");
        let status = Command::new("wasm-pack")
            .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
            .status()
            .context("wasm-pack not found in PATH (https://rustwasm.github.io/wasm-pack/)")?;
        if !status.success() {
            bail!("wasm-pack build failed");
        }

        // The build script copies static/ (now including pkg/) into dist/.
        log::info!("refreshing dist/");
        let status = Command::new("cargo")
            .args(["build", "--release"])
            .status()
            .context("failed to run cargo build")?;
        if !status.success() {
            bail!("cargo build failed");
        }
        Ok(())
    }

}
