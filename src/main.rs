use std::process;

use clap::Parser;
use console::style;
use pd2_edge::cmd::{App, RunCommand};

#[tokio::main]
async fn main() {
    let app = App::parse();
    if let Err(err) = app.run().await {
        eprintln!("{}: {err:#}", style("error").red().bold());
        process::exit(1);
    }
}
