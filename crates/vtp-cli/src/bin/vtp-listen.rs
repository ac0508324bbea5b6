//! Example VOEvent listener that archives every incoming VOEvent to disk.

use std::{path::PathBuf, time::Duration};

use clap::{ArgGroup, Parser};
use vtp::{handlers, pool::Endpoint, StopSignal};
use vtp_cli::{install_signal_handlers, HostPort};

/// Anonymous VOEvent Transport Protocol listener.
#[derive(Parser, Debug)]
#[command(name = "vtp-listen", version, about)]
#[command(group(ArgGroup::new("notice_filter").args(["include_type", "exclude_type"])))]
struct Args {
    /// Server host[:port] pairs to cycle through. Default port is 8099.
    #[arg(default_values = ["45.58.43.186:8099", "68.169.57.253:8099"])]
    addr: Vec<String>,

    /// IVORN this client identifies itself with in responses.
    #[arg(long, default_value = vtp::DEFAULT_IVORN)]
    ivorn: String,

    /// Seconds without traffic before the connection is considered dead.
    #[arg(long, default_value_t = vtp::DEFAULT_IAMALIVE_TIMEOUT_SECS)]
    iamalive_timeout: u64,

    /// Cap, in seconds, on the reconnect backoff.
    #[arg(long, default_value_t = vtp::DEFAULT_MAX_RECONNECT_TIMEOUT_SECS)]
    max_reconnect_timeout: u64,

    /// Directory archived VOEvents are written into.
    #[arg(long, default_value = ".")]
    archive_dir: PathBuf,

    /// Only archive VOEvents whose Packet_Type is one of these.
    #[arg(long)]
    include_type: Vec<i64>,

    /// Archive every VOEvent except those whose Packet_Type is one of these.
    #[arg(long)]
    exclude_type: Vec<i64>,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let endpoints: Vec<Endpoint> = args
        .addr
        .iter()
        .map(|s| HostPort::with_default_port(s, 8099))
        .collect::<Result<Vec<_>, _>>()
        .map(|hps| hps.into_iter().map(|hp| Endpoint { host: hp.host, port: hp.port }).collect())
        .unwrap_or_else(|err| {
            eprintln!("invalid address: {err}");
            std::process::exit(2);
        });

    let stop = StopSignal::new();
    install_signal_handlers(stop.clone());

    let archiver = handlers::archive(&args.archive_dir);

    if !args.include_type.is_empty() {
        let handler = handlers::include_notice_types(args.include_type, archiver);
        vtp::listen(
            endpoints,
            &args.ivorn,
            Duration::from_secs(args.iamalive_timeout),
            Duration::from_secs(args.max_reconnect_timeout),
            &handler,
            &stop,
        );
    } else if !args.exclude_type.is_empty() {
        let handler = handlers::exclude_notice_types(args.exclude_type, archiver);
        vtp::listen(
            endpoints,
            &args.ivorn,
            Duration::from_secs(args.iamalive_timeout),
            Duration::from_secs(args.max_reconnect_timeout),
            &handler,
            &stop,
        );
    } else {
        vtp::listen(
            endpoints,
            &args.ivorn,
            Duration::from_secs(args.iamalive_timeout),
            Duration::from_secs(args.max_reconnect_timeout),
            &archiver,
            &stop,
        );
    }
}
