//! QR Studio command-line entrypoint

use clap::{Parser, Subcommand, ValueEnum};
use qrstudio::payload::{CalendarEvent, QrContent, Security, UpiPayment, WifiNetwork};
use qrstudio::render::RenderOptions;
use qrstudio::session::{GeneratorSession, RenderBackend};
use qrstudio::{
    Error, QrRenderer, QrStudioConfig, RenderClient, RenderServer, Result, logging, metrics,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "qrstudio", version, about = "QR payload composer and render service")]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to qrstudio.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP render service
    Serve {
        /// Override the bind address (e.g. 127.0.0.1:9480)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Compose a payload, render it, and save the PNG
    Generate {
        #[command(subcommand)]
        content: ContentArgs,

        /// Edge length in pixels
        #[arg(long, value_name = "PIXELS")]
        size: Option<u32>,

        /// Output path; defaults to qrcode-<type>-<unixMillis>.png in cwd
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,

        /// Render through a running service instead of in-process
        #[arg(long, value_name = "ADDR")]
        remote: Option<String>,
    },

    /// Compose a payload and print the encoded string
    Compose {
        #[command(subcommand)]
        content: ContentArgs,
    },
}

#[derive(Subcommand, Debug)]
enum ContentArgs {
    /// WiFi network credentials
    Wifi {
        /// Network name (SSID)
        #[arg(long)]
        ssid: String,
        /// Network password; ignored with --security open
        #[arg(long, default_value = "")]
        password: String,
        /// Security type
        #[arg(long, value_enum, default_value_t = SecurityArg::Wpa)]
        security: SecurityArg,
    },
    /// UPI payment deep link
    Payment {
        /// UPI payee address, e.g. merchant@bank
        #[arg(long)]
        payee: String,
        /// Payment amount; empty lets the payer choose
        #[arg(long, default_value = "")]
        amount: String,
        /// Transaction note
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Calendar event (iCalendar VEVENT)
    Event {
        /// Event title
        #[arg(long)]
        title: String,
        /// Event location
        #[arg(long, default_value = "")]
        location: String,
        /// Start timestamp, e.g. 20260301T100000
        #[arg(long, default_value = "")]
        start: String,
        /// End timestamp
        #[arg(long, default_value = "")]
        end: String,
        /// Free-text description
        #[arg(long, default_value = "")]
        description: String,
    },
    /// A raw URL, passed through verbatim
    Url {
        /// The URL to encode
        url: String,
    },
    /// Plain text, passed through verbatim
    Text {
        /// The text to encode
        text: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SecurityArg {
    Wpa,
    Wep,
    Open,
}

impl From<SecurityArg> for Security {
    fn from(arg: SecurityArg) -> Self {
        match arg {
            SecurityArg::Wpa => Security::Wpa,
            SecurityArg::Wep => Security::Wep,
            SecurityArg::Open => Security::Open,
        }
    }
}

impl From<ContentArgs> for QrContent {
    fn from(args: ContentArgs) -> Self {
        match args {
            ContentArgs::Wifi {
                ssid,
                password,
                security,
            } => QrContent::Wifi(WifiNetwork {
                ssid,
                password,
                security: security.into(),
            }),
            ContentArgs::Payment {
                payee,
                amount,
                note,
            } => QrContent::Payment(UpiPayment {
                payee_id: payee,
                amount,
                note,
            }),
            ContentArgs::Event {
                title,
                location,
                start,
                end,
                description,
            } => QrContent::Event(CalendarEvent {
                title,
                location,
                start,
                end,
                description,
            }),
            ContentArgs::Url { url } => QrContent::Url(url),
            ContentArgs::Text { text } => QrContent::Text(text),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = QrStudioConfig::load(cli.config.as_deref())?;
    logging::init(&config.logging)?;

    if config.logging.metrics {
        metrics::enable(config.logging.metrics_interval_secs);
    }

    match cli.command {
        Commands::Serve { bind } => serve(&config, bind).await,
        Commands::Generate {
            content,
            size,
            out,
            remote,
        } => generate(&config, content, size, out, remote).await,
        Commands::Compose { content } => compose(content),
    }
}

async fn serve(config: &QrStudioConfig, bind: Option<String>) -> Result<()> {
    let address = bind.unwrap_or_else(|| config.server.socket_address());
    let addr = SocketAddr::from_str(&address)
        .map_err(|e| Error::Config(format!("Invalid bind address '{address}': {e}")))?;

    let server = RenderServer::bind(addr)?;
    server.run().await
}

async fn generate(
    config: &QrStudioConfig,
    content: ContentArgs,
    size: Option<u32>,
    out: Option<PathBuf>,
    remote: Option<String>,
) -> Result<()> {
    let content: QrContent = content.into();
    let mut options = config.render.to_options();
    if let Some(size) = size {
        options = RenderOptions { size };
    }

    let backend = match remote {
        Some(ref address) => {
            let addr = SocketAddr::from_str(address).map_err(|e| {
                Error::Config(format!("Invalid remote address '{address}': {e}"))
            })?;
            RenderBackend::Remote(RenderClient::new(addr))
        }
        None => RenderBackend::Local(QrRenderer::new()),
    };

    let mut session = GeneratorSession::new(backend);
    session.generate(&content, options).await?;

    let missing_preview = || Error::Other("no rendered preview to save".to_string());
    let written = match out {
        Some(path) => {
            let preview = session.preview().ok_or_else(missing_preview)?;
            std::fs::write(&path, &preview.png).map_err(Error::Io)?;
            path
        }
        None => {
            let cwd = std::env::current_dir().map_err(Error::Io)?;
            session.save_preview(&cwd)?.ok_or_else(missing_preview)?
        }
    };

    info!(path = %written.display(), "QR code written");
    println!("{}", written.display());
    Ok(())
}

fn compose(content: ContentArgs) -> Result<()> {
    let content: QrContent = content.into();
    let data = content.compose();
    if data.is_empty() {
        return Err(Error::EmptyPayload);
    }
    println!("{data}");
    Ok(())
}
