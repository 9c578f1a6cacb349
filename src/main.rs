//! toccata: catalogs album directories into per-directory ToC documents
//! and drives idempotent renames, conversions and tag rewrites from them.

mod catalog;
mod cli;
mod config;
mod convert;
mod error;
mod parse;
mod rearrange;
mod reconcile;
mod rename;
mod render;
mod sanitize;
mod tagwrite;
#[cfg(test)]
mod testutil;
mod toc;
mod types;

use tracing::error;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    if let Err(err) = cli::run() {
        error!("{err}");
        std::process::exit(1);
    }
}
