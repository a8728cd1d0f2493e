use fleet_motion::api::formatter_for;
use fleet_motion::{
    ConfigurationManager, FleetReport, OutputFormat, PingIngestor, WarehouseServer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct CliArgs {
    pings_path: String,
    config_path: Option<String>,
    format: OutputFormat,
    top_n: Option<usize>,
    since: Option<f64>,
    threshold: Option<f64>,
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <pings.csv> [--config <file.json>] [--format text|json] [--top N] [--since TS] [--threshold K]",
        program
    )
}

fn parse_args(args: &[String]) -> Result<CliArgs, Box<dyn std::error::Error>> {
    let program = args.first().map_or("fleet_motion", |s| s.as_str());
    let mut pings_path = None;
    let mut cli = CliArgs {
        pings_path: String::new(),
        config_path: None,
        format: OutputFormat::Text,
        top_n: None,
        since: None,
        threshold: None,
    };

    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        let mut value = |flag: &str| {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {}\n{}", flag, usage(program)))
        };
        match arg.as_str() {
            "--config" => cli.config_path = Some(value("--config")?),
            "--format" => cli.format = value("--format")?.parse()?,
            "--top" => cli.top_n = Some(value("--top")?.parse()?),
            "--since" => cli.since = Some(value("--since")?.parse()?),
            "--threshold" => cli.threshold = Some(value("--threshold")?.parse()?),
            "-h" | "--help" => return Err(usage(program).into()),
            path if pings_path.is_none() && !path.starts_with("--") => {
                pings_path = Some(path.to_string())
            }
            other => return Err(format!("Unexpected argument '{}'\n{}", other, usage(program)).into()),
        }
    }

    cli.pings_path = pings_path.ok_or_else(|| usage(program))?;
    Ok(cli)
}

fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();
    let cli = parse_args(&args)?;

    let mut manager = match &cli.config_path {
        Some(path) => ConfigurationManager::from_file(path)?,
        None => ConfigurationManager::new(),
    };
    if let Some(top_n) = cli.top_n {
        manager.set_top_n(top_n)?;
    }
    if let Some(since) = cli.since {
        manager.set_since_timestamp(since)?;
    }
    if let Some(threshold) = cli.threshold {
        manager.set_threshold_std_devs(threshold)?;
    }
    let config = manager.config().clone();

    init_logging(config.debug_logging);

    let mut server = WarehouseServer::with_settings(config.velocity_mode, config.threshold_std_devs);
    let summary = PingIngestor::from_config(&config).ingest_path(&mut server, &cli.pings_path)?;
    info!(path = %cli.pings_path, accepted = summary.accepted, "ping log loaded");

    let report = FleetReport::build(&server, &config);
    let output = formatter_for(cli.format).format(&report)?;
    println!("{}", output);

    Ok(())
}
