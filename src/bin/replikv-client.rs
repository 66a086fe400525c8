use clap::Parser;
use replikv::cli::long_flags;
use replikv::client::{parse_pair, Mode, NodeClient};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct App {
    /// Node address in the format host:port.
    #[clap(long, default_value = "127.0.0.1:8080")]
    url: String,

    #[clap(long, value_enum, default_value_t = Mode::GetKey)]
    mode: Mode,

    /// Key to get, or key:value to set.
    #[clap(long, default_value = "key")]
    data: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = App::parse_from(long_flags(std::env::args_os(), &["url", "mode", "data"]));
    let client = NodeClient::new(&cli.url);
    match cli.mode {
        Mode::SetKey => {
            let (key, value) = parse_pair(&cli.data)?;
            client.set(key, value).await?;
        }
        Mode::GetKey => println!("{}", client.get(&cli.data).await?),
    }

    Ok(())
}
