use clap::{Parser, Subcommand};

use conn_probe::listener::Listener;
use conn_probe::server::Router;

#[derive(Parser, Debug)]
#[clap(version)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the probe server
    Serve {
        /// Address to listen on, [HOST]:PORT
        #[clap(long, value_parser, value_name = "LISTEN_ADDR", default_value = ":8080")]
        listen: String,
    },

    /// Run sequential probe requests against a server
    Run {
        /// Server address, [HOST]:PORT
        #[clap(long, value_parser, value_name = "ADDR", default_value = ":8080")]
        addr: String,

        /// Reuse one connection across requests instead of dialing per request
        #[clap(long)]
        keep_alive: bool,

        /// Number of sequential requests to issue
        #[clap(long, default_value_t = 5)]
        requests: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), conn_probe::error::Error> {
    conn_probe::trace::init();

    let args = Args::parse();
    match args.command {
        Command::Serve { listen } => {
            let listener = Listener::bind(&listen).await?;
            conn_probe::server::serve(listener, Router::new()).await
        }
        Command::Run {
            addr,
            keep_alive,
            requests,
        } => {
            conn_probe::probe::run(&addr, keep_alive, requests).await?;
            Ok(())
        }
    }
}
