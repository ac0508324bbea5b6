//! Rudimentary GCN-style server, for testing purposes only. Serves one
//! connection at a time and replays the given payloads cyclically.

use std::{net::TcpListener, time::Duration};

use clap::Parser;
use vtp::StopSignal;
use vtp_cli::{install_signal_handlers, parse_host_port_default_8099, HostPort};

#[derive(Parser, Debug)]
#[command(name = "vtp-serve", version, about)]
struct Args {
    /// Address to bind and listen on.
    #[arg(long, default_value = "127.0.0.1:8099", value_parser = parse_host_port_default_8099)]
    host: HostPort,

    /// Seconds to sleep between retransmissions of the payload list.
    #[arg(long, default_value_t = 1)]
    retransmit_timeout: u64,

    /// XML payload files to replay cyclically.
    #[arg(required = true)]
    payloads: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let payloads: Vec<Vec<u8>> = args
        .payloads
        .iter()
        .map(std::fs::read)
        .collect::<std::io::Result<Vec<_>>>()
        .unwrap_or_else(|err| {
            eprintln!("could not read payload file: {err}");
            std::process::exit(2);
        });

    let listener = match TcpListener::bind((args.host.host.as_str(), args.host.port)) {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("could not bind {}:{}: {err}", args.host.host, args.host.port);
            std::process::exit(1);
        }
    };
    tracing::info!(host = %args.host.host, port = args.host.port, "bound");

    let stop = StopSignal::new();
    install_signal_handlers(stop.clone());

    vtp::server::serve(&listener, &payloads, Duration::from_secs(args.retransmit_timeout), &stop);
}
