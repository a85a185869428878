use anyhow::{anyhow, Context, Result};
use arcgis_rest::connection::{parse_method, Dispatch, Params, RequestBody};
use arcgis_rest::endpoints::kind::EndpointKind;
use arcgis_rest::observability::metrics::gather_metrics;
use arcgis_rest::utils::config_loader;
use arcgis_rest::utils::logging;
use arcgis_rest::utils::logging::LogLevel;
use arcgis_rest::ArcgisRest;
use clap::Parser;
use serde_json::{Map, Value};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "arcgis-rest.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// Endpoint to talk to
    #[arg(short, long, value_enum, default_value = "arcgis")]
    endpoint: EndpointKind,
    #[arg(short, long, default_value = "GET")]
    method: String,
    /// Path after the rest (or admin) directory, e.g. `services`
    path: String,
    /// Use the admin directory instead of rest
    #[arg(long)]
    admin: bool,
    /// Query parameter `key=value`, repeatable
    #[arg(long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,
    /// Form field `key=value`, repeatable
    #[arg(long = "data", value_parser = parse_key_value)]
    data: Vec<(String, String)>,
    /// JSON object sent as the request body
    #[arg(long)]
    json: Option<String>,
    /// Print metrics after the request
    #[arg(long)]
    print_metrics: bool,
}

fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let client_file = config_loader::run(&args.config)?;
    logging::run(&client_file.settings, args.log_level);
    info!(
        host = %client_file.server.host,
        https = client_file.server.https,
        authenticated = client_file.server.credentials().is_some(),
        "client config loaded"
    );

    // -------------------------------
    // 2. Prepare request
    // -------------------------------

    let method = parse_method(&args.method)?;
    let body = build_body(&args)?;

    // -------------------------------
    // 3. Dispatch
    // -------------------------------

    let client = ArcgisRest::new(client_file.server);
    let connection = client.connection(args.endpoint);
    info!(endpoint = %args.endpoint, url = %connection.url_for(&args.path, args.admin), "dispatching request");

    let outcome = connection.request(method, &args.path, body, args.admin);

    if args.print_metrics {
        eprintln!("{}", gather_metrics());
    }

    let outcome = outcome?;
    if outcome.body.is_null() {
        println!("{} {}", outcome.status, outcome.url);
    } else {
        println!("{}", serde_json::to_string_pretty(&outcome.body)?);
    }

    Ok(())
}

fn build_body(args: &Args) -> Result<RequestBody> {
    let mut body = RequestBody::default();
    if !args.params.is_empty() {
        body.params = Some(args.params.iter().cloned().collect::<Params>());
    }
    if !args.data.is_empty() {
        body.data = Some(args.data.iter().cloned().collect::<Params>());
    }
    if let Some(json) = &args.json {
        let value: Value = serde_json::from_str(json).context("--json must be valid JSON")?;
        let object: Map<String, Value> = match value {
            Value::Object(object) => object,
            _ => return Err(anyhow!("--json must be a JSON object")),
        };
        body.json = Some(object);
    }
    Ok(body)
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_owned(), value.to_owned()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))
}
