use ccloud_iam::commands::api_key::ApiKeyCommand;
use ccloud_iam::commands::service_account::ServiceAccountCommand;
use ccloud_iam::http::client::HttpClient;
use ccloud_iam::parameters::{
    Commands, ConnectionArgs, OutputFormat, build_http_config, build_transport_config,
};
use ccloud_iam::transport::HttpTransport;
use clap::Parser;
use std::error::Error;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(name = "ccloud-iam-cli")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Format of the JSON printed on success
    #[arg(long, value_enum, default_value = "pretty")]
    output: OutputFormat,

    /// Log requests to stderr
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .init();

    let http_client = HttpClient::new(build_http_config(&cli.connection)?)
        .map_err(|e| format!("error creating http client: {}", e))?;
    let transport = HttpTransport::new(http_client, build_transport_config(&cli.connection)?);

    let output = match cli.command {
        Commands::ServiceAccount(command) => ServiceAccountCommand::new(&transport).run(command)?,
        Commands::ApiKey(command) => ApiKeyCommand::new(&transport).run(command)?,
    };

    match cli.output {
        OutputFormat::Pretty => println!("{}", serde_json::to_string_pretty(&output)?),
        OutputFormat::Compact => println!("{}", serde_json::to_string(&output)?),
    }
    Ok(())
}
