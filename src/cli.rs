use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Index the content root and serve it over HTTP.
    Serve(ServeArgs),
    /// Index the content root and print the discovered stories as JSON.
    Index(IndexArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Content root holding story directories, `static/` and `index.html`.
    #[arg(long, env = "BOOK_BASE_PATH")]
    pub content_root: PathBuf,

    /// Port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind to.
    #[arg(long, env = "BOOK_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// File that receives the process id at startup.
    #[arg(long, env = "BOOK_PID_FILE", default_value = "PID")]
    pub pid_file: PathBuf,
}

impl ServeArgs {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .bind
            .trim()
            .parse()
            .with_context(|| format!("invalid bind address: {:?}", self.bind))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Args)]
pub struct IndexArgs {
    /// Content root holding story directories.
    #[arg(long, env = "BOOK_BASE_PATH")]
    pub content_root: PathBuf,
}
