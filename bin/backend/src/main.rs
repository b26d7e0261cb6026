//! Household Housing Tracker
//!
//! Serves the login page, the app shell, and the JSON API on BIND_ADDR
//! (e.g. 0.0.0.0:8080). Every flag can also be set from the environment;
//! see `backend --help`.
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    hh_core::log();
    hh_core::kys();
    hh_server::run(hh_server::Config::parse()).await
}
