use std::{env, process};

use rtcrelay::config::Config;
use rtcrelay::signaling::run::{RunError, run_signaling_server_from_config, run_with_config};

const DEFAULT_CONFIG: &str = "relay.conf";

fn main() {
    // --- Parse CLI args ----------------------------------------------------
    //
    // Supported:
    //   signaling_relay
    //      -> config from $RTCRELAY_CONFIG or ./relay.conf (missing = defaults)
    //
    //   signaling_relay relay.conf      -> that config file
    //   signaling_relay 0.0.0.0:6000    -> default config, this address
    //   signaling_relay 127.0.0.1 7000  -> default config, IP + PORT

    let args: Vec<String> = env::args().collect();
    let default_config =
        || env::var("RTCRELAY_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG.to_owned());

    let (config_path, addr) = match args.len() {
        1 => (default_config(), None),
        2 if looks_like_addr(&args[1]) => (default_config(), Some(args[1].clone())),
        2 => (args[1].clone(), None),
        3 => (default_config(), Some(format!("{}:{}", args[1], args[2]))),
        _ => usage(&args[0]),
    };

    let result = match addr {
        None => {
            eprintln!("[signaling_relay] config {config_path}");
            run_signaling_server_from_config(&config_path)
        }
        Some(addr) => {
            eprintln!("[signaling_relay] config {config_path}, listening on {addr}");
            Config::load_or_empty(&config_path)
                .map_err(RunError::from)
                .and_then(|config| run_with_config(&config, Some(&addr)))
        }
    };

    if let Err(e) = result {
        eprintln!("[signaling_relay] {e}");
        process::exit(1);
    }
}

/// `IP:PORT` or `[v6]:PORT`, as opposed to a config file path.
fn looks_like_addr(arg: &str) -> bool {
    arg.parse::<std::net::SocketAddr>().is_ok()
}

fn usage(prog: &str) -> ! {
    eprintln!("Usage:");
    eprintln!("  {prog}                # config from $RTCRELAY_CONFIG or {DEFAULT_CONFIG}");
    eprintln!("  {prog} [CONFIG]       # e.g. /etc/rtcrelay/relay.conf");
    eprintln!("  {prog} [ADDR]         # e.g. 0.0.0.0:6000");
    eprintln!("  {prog} [IP] [PORT]    # e.g. 127.0.0.1 6000");
    process::exit(1);
}
