//! tundialer - dial a TCP endpoint through a specific network interface

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use tundialer::error::{Error, Result};
use tundialer::{ConnectedSocket, DialConfig, InterfaceBoundConnector, InterfaceTransport};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        if let Error::Connect(connect) = &e {
            eprintln!("kind: {}", connect.kind());
            if let Some(code) = connect.raw_os_error() {
                eprintln!("os error: {}", code);
            }
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse_from(std::env::args().skip(1))?;

    if args.help {
        print_help();
        return Ok(());
    }

    if args.version {
        print_version();
        return Ok(());
    }

    if args.gen_config {
        let json = serde_json::to_string_pretty(&DialConfig::example())
            .map_err(|e| Error::Config(e.to_string()))?;
        println!("{}", json);
        return Ok(());
    }

    let mut config = match &args.config {
        Some(path) => DialConfig::load(path)?,
        None => DialConfig::default(),
    };
    args.apply(&mut config);

    // Initialize logging
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|s| s.parse().ok())
        .or_else(|| config.log.level.parse().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Failed to set tracing subscriber: {}", e)))?;

    config.validate()?;

    let connector = InterfaceBoundConnector::new().with_nodelay(config.nodelay);
    let mut transport = InterfaceTransport::with_dialer(config.interface_name()?, Arc::new(connector));
    if let Some(timeout) = config.connect_timeout() {
        transport = transport.with_timeout(timeout);
    }

    block_on_detached(async {
        let endpoint = config.endpoint();
        info!("dialing {} via {}", endpoint, transport.interface());
        let socket = transport.dial(&endpoint).await?;
        report(&socket);

        if args.relay {
            relay(socket).await?;
        }
        Ok::<(), Error>(())
    })
}

/// Drive `fut` on a fresh runtime without waiting for leftover blocking tasks.
///
/// A dial abandoned by the connect timeout keeps its blocking thread until the
/// OS gives up; the socket it may still produce is closed when that thread
/// finishes or the process exits.
fn block_on_detached<T, F>(fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(fut);
    rt.shutdown_background();
    result
}

fn report(socket: &ConnectedSocket) {
    let local = socket
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "?".into());
    let peer = socket
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "?".into());
    match socket.bound_device() {
        Ok(device) => info!(
            "connected {} -> {} (device: {})",
            local,
            peer,
            device.as_deref().unwrap_or("none")
        ),
        Err(e) => info!("connected {} -> {} (device unknown: {})", local, peer, e),
    }
}

/// Copy stdin to the socket and the socket to stdout until both sides finish
async fn relay(socket: ConnectedSocket) -> Result<()> {
    let stream = socket.into_tokio()?;
    let (mut reader, mut writer) = stream.into_split();

    let upstream = async {
        let mut stdin = tokio::io::stdin();
        let n = tokio::io::copy(&mut stdin, &mut writer).await?;
        writer.shutdown().await?;
        Ok::<u64, std::io::Error>(n)
    };
    let downstream = async {
        let mut stdout = tokio::io::stdout();
        let n = tokio::io::copy(&mut reader, &mut stdout).await?;
        stdout.flush().await?;
        Ok::<u64, std::io::Error>(n)
    };

    let (sent, received) = tokio::join!(upstream, downstream);
    match (sent, received) {
        (Ok(sent), Ok(received)) => {
            info!("relay finished: {} bytes sent, {} bytes received", sent, received);
            Ok(())
        }
        (Err(e), _) | (_, Err(e)) => {
            error!("relay failed: {}", e);
            Err(e.into())
        }
    }
}

/// Command line arguments
#[derive(Default)]
struct Args {
    config: Option<PathBuf>,
    interface: Option<String>,
    address: Option<String>,
    port: Option<u16>,
    timeout_ms: Option<u64>,
    relay: bool,
    gen_config: bool,
    version: bool,
    help: bool,
}

impl Args {
    fn parse_from<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut positional = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-c" | "--config" => parsed.config = Some(PathBuf::from(value(&arg, args.next())?)),
                "-i" | "--interface" => parsed.interface = Some(value(&arg, args.next())?),
                "-a" | "--address" => parsed.address = Some(value(&arg, args.next())?),
                "-p" | "--port" => parsed.port = Some(parse_port(&value(&arg, args.next())?)?),
                "--timeout" => {
                    let raw = value(&arg, args.next())?;
                    let ms = raw
                        .parse()
                        .map_err(|_| Error::Config(format!("Invalid timeout: {:?}", raw)))?;
                    parsed.timeout_ms = Some(ms);
                }
                "--relay" => parsed.relay = true,
                "--gen-config" => parsed.gen_config = true,
                "-v" | "--version" => parsed.version = true,
                "-h" | "--help" => parsed.help = true,
                _ if !arg.starts_with('-') => positional.push(arg.clone()),
                _ => return Err(Error::Config(format!("Unknown option: {}", arg))),
            }
        }

        // Positional form: IFACE ADDR PORT
        let mut positional = positional.into_iter();
        if parsed.interface.is_none() {
            parsed.interface = positional.next();
        }
        if parsed.address.is_none() {
            parsed.address = positional.next();
        }
        if parsed.port.is_none() {
            parsed.port = positional.next().as_deref().map(parse_port).transpose()?;
        }
        if let Some(extra) = positional.next() {
            return Err(Error::Config(format!("Unexpected argument: {}", extra)));
        }

        Ok(parsed)
    }

    /// Command line values win over the config file
    fn apply(&self, config: &mut DialConfig) {
        if let Some(interface) = &self.interface {
            config.interface = interface.clone();
        }
        if let Some(address) = &self.address {
            config.address = address.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(ms) = self.timeout_ms {
            config.connect_timeout_ms = Some(ms);
        }
    }
}

fn value(option: &str, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| Error::Config(format!("Missing value for {}", option)))
}

fn parse_port(raw: &str) -> Result<u16> {
    raw.parse()
        .map_err(|_| Error::Config(format!("Invalid port argument: {:?}", raw)))
}

fn print_help() {
    println!(r#"tundialer - dial TCP through a specific network interface

USAGE:
    tundialer [OPTIONS] [IFACE ADDR PORT]

OPTIONS:
    -c, --config <FILE>       Path to JSON dial configuration
    -i, --interface <NAME>    Egress interface (e.g. eth0)
    -a, --address <IPV4>      Target IPv4 address
    -p, --port <PORT>         Target port
    --timeout <MS>            Stop waiting for the handshake after MS milliseconds
    --relay                   Relay stdin/stdout over the connection
    --gen-config              Print an example configuration
    -v, --version             Print version information
    -h, --help                Print help information

EXAMPLES:
    tundialer eth1 203.0.113.7 443
    tundialer -c dial.json --relay
    tundialer --gen-config > dial.json
"#);
}

fn print_version() {
    println!("tundialer v{}", env!("CARGO_PKG_VERSION"));
}
