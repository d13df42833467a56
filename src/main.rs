use certinfo::config::{CheckOptions, Config, DEFAULT_CONFIG_FILE};
use certinfo::output::{self, OutputMode};
use certinfo::{CertInfoError, HostTarget, Report};
use clap::Parser;
use log::{debug, LevelFilter};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Show the leaf TLS certificates presented by one or more hosts
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Hosts to inspect: hostname, host:port or URL
    #[arg(value_name = "HOST")]
    hosts: Vec<String>,

    /// Port to look for TLS certificates on [default: 443]
    #[arg(short, long)]
    port: Option<u16>,

    /// Time out on TCP dialing and the handshake, e.g. 5s [default: 5s]
    #[arg(short, long)]
    timeout: Option<String>,

    /// Error if a certificate expires within this window; use 0 to disable [default: 168h]
    #[arg(short, long)]
    expires: Option<String>,

    /// Output mode [default: text]
    #[arg(short, long, value_enum)]
    output: Option<OutputMode>,

    /// Log connections
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file [default: ./certinfo.toml when present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print an example configuration file and exit
    #[arg(long)]
    generate_config: bool,
}

impl Cli {
    fn as_config(&self) -> Config {
        Config {
            hosts: (!self.hosts.is_empty()).then(|| self.hosts.clone()),
            port: self.port,
            timeout: self.timeout.clone(),
            expires: self.expires.clone(),
            output: self.output.map(|mode| mode.to_string()),
            verbose: self.verbose.then_some(true),
        }
    }
}

fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if std::env::var_os("RUST_LOG").is_none() {
        builder.filter_level(LevelFilter::Warn);
    }
    if verbose {
        builder.filter_module("certinfo", LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn load_config(cli: &Cli) -> Result<Config, certinfo::config::ConfigError> {
    let file_config = match &cli.config {
        Some(path) => Some(Config::from_file(path)?),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            Some(Config::from_file(DEFAULT_CONFIG_FILE)?)
        }
        None => None,
    };

    let mut config = Config::defaults();
    if let Some(file_config) = file_config {
        config = config.merge_with(file_config);
    }
    Ok(config.merge_with(cli.as_config()))
}

fn run(hosts: &[String], options: &CheckOptions) -> Option<CertInfoError> {
    let mut report = Report::default();

    let mut targets = Vec::with_capacity(hosts.len());
    for host in hosts {
        match HostTarget::parse(host, options.port) {
            Ok(target) => targets.push(target),
            Err(err) => report.record(err),
        }
    }
    debug!("inspecting {} hosts", targets.len());
    report.collect_with(&targets, |target| {
        certinfo::fetch_certificates(target, options.timeout)
    });

    let stdout = io::stdout();
    if let Err(err) = output::render(options.output, report.results(), &mut stdout.lock()) {
        report.record(err);
    }

    report.check_expiration(options.expires, chrono::Utc::now());

    let (_, error) = report.finish();
    error
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.generate_config {
        print!("{}", Config::example_toml());
        return ExitCode::SUCCESS;
    }

    let resolved = load_config(&cli).and_then(Config::resolve);
    let (hosts, options) = match resolved {
        Ok(resolved) => resolved,
        Err(err) => {
            init_logger(cli.verbose);
            eprintln!("Error: {}", err);
            return ExitCode::FAILURE;
        }
    };

    init_logger(options.verbose);

    match run(&hosts, &options) {
        Some(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
        None => ExitCode::SUCCESS,
    }
}
