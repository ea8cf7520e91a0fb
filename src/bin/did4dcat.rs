//! did4dcat command-line runner
//!
//! Executes one contract transaction against a world-state snapshot file,
//! acting as the given caller. Submit transactions write the snapshot back
//! on success; evaluate transactions leave it untouched.

use std::path::PathBuf;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use did4dcat::dispatch::Intent;
use did4dcat::storage::{load_snapshot, save_snapshot};
use did4dcat::{
    CertificateIdentity, ChaincodeFailure, ClientIdentity, ContractConfig, DatasetContract,
    ScanPolicy, StaticIdentity, Transaction, TransactionContext,
};

/// Runner configuration
struct Config {
    /// World-state snapshot file
    state: PathBuf,
    /// Caller common name
    common_name: Option<String>,
    /// Caller certificate subject DN
    subject: Option<String>,
    /// Caller MSP id
    msp_id: String,
    /// Skip undecodable records during scans
    skip_corrupt: bool,
    /// Transaction name
    function: String,
    /// Transaction arguments
    args: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            state: PathBuf::from("./world-state.json"),
            common_name: None,
            subject: None,
            msp_id: String::new(),
            skip_corrupt: false,
            function: String::new(),
            args: Vec::new(),
        }
    }
}

fn print_usage() {
    println!("did4dcat - run a DID4DCAT transaction against a world-state file");
    println!();
    println!("USAGE:");
    println!("    did4dcat [OPTIONS] <TRANSACTION> [ARG]");
    println!();
    println!("TRANSACTIONS:");
    println!("    {}", Transaction::NAMES.join(", "));
    println!();
    println!("OPTIONS:");
    println!("    -s, --state <FILE>        World-state file [default: ./world-state.json]");
    println!("        --cn <NAME>           Caller common name");
    println!("        --subject <DN>        Caller certificate subject (CN is extracted)");
    println!("        --msp <ID>            Caller MSP id");
    println!("        --skip-corrupt        Skip undecodable records when listing");
    println!("    -h, --help                Print help information");
    println!();
    println!("For CreateDataset and UpdateDataset, an ARG starting with '@' is read");
    println!("from the named file. Other arguments are used as given.");
}

fn flag_value(args: &[String], i: usize, flag: &str) -> Result<String, String> {
    args.get(i + 1)
        .cloned()
        .ok_or_else(|| format!("{flag} requires a value"))
}

fn parse_args(args: &[String]) -> Result<Option<Config>, String> {
    let mut config = Config::default();
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--state" | "-s" => {
                config.state = PathBuf::from(flag_value(args, i, "--state")?);
                i += 2;
            }
            "--cn" => {
                config.common_name = Some(flag_value(args, i, "--cn")?);
                i += 2;
            }
            "--subject" => {
                config.subject = Some(flag_value(args, i, "--subject")?);
                i += 2;
            }
            "--msp" => {
                config.msp_id = flag_value(args, i, "--msp")?;
                i += 2;
            }
            "--skip-corrupt" => {
                config.skip_corrupt = true;
                i += 1;
            }
            "--help" | "-h" => return Ok(None),
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("unknown argument: {arg}"));
            }
            arg => {
                positional.push(arg.to_string());
                i += 1;
            }
        }
    }

    if config.common_name.is_some() && config.subject.is_some() {
        return Err("--cn and --subject are mutually exclusive".into());
    }

    let mut positional = positional.into_iter();
    config.function = positional.next().ok_or("missing transaction name")?;
    config.args = positional.collect();
    Ok(Some(config))
}

fn load_arg(arg: &str) -> Result<String, String> {
    match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).map_err(|e| format!("read {path}: {e}")),
        None => Ok(arg.to_string()),
    }
}

fn caller(config: &Config) -> Result<Box<dyn ClientIdentity>, String> {
    if let Some(subject) = &config.subject {
        let identity = CertificateIdentity::from_subject(subject.clone(), config.msp_id.clone())
            .map_err(|e| e.to_string())?;
        return Ok(Box::new(identity));
    }
    let identity = match &config.common_name {
        Some(cn) => StaticIdentity::new(cn.clone(), config.msp_id.clone()),
        None => StaticIdentity::without_common_name(config.msp_id.clone()),
    };
    Ok(Box::new(identity))
}

fn run(config: &Config) -> Result<String, String> {
    // Only documents are read from files; keys are always taken literally.
    let takes_document = matches!(config.function.as_str(), "CreateDataset" | "UpdateDataset");
    let args = if takes_document {
        config
            .args
            .iter()
            .map(String::as_str)
            .map(load_arg)
            .collect::<Result<Vec<_>, _>>()?
    } else {
        config.args.clone()
    };
    let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

    let tx = Transaction::parse(&config.function, &arg_refs)
        .map_err(|e| ChaincodeFailure::from(e).to_string())?;

    let policy = if config.skip_corrupt {
        ScanPolicy::Skip
    } else {
        ScanPolicy::Abort
    };
    let contract = DatasetContract::with_config(ContractConfig::default().with_scan_policy(policy))
        .map_err(|e| e.to_string())?;

    let store = load_snapshot(&config.state).map_err(|e| e.to_string())?;
    let identity = caller(config)?;
    let ctx = TransactionContext::new(&store, identity.as_ref());

    let payload = tx
        .execute(&contract, &ctx)
        .map_err(|e| ChaincodeFailure::from(e).to_string())?;

    if tx.intent() == Intent::Submit {
        save_snapshot(&store, &config.state).map_err(|e| e.to_string())?;
        let digest = store.state_digest().map_err(|e| e.to_string())?;
        info!(
            transaction = tx.name(),
            state = %config.state.display(),
            digest = %digest,
            "world state committed"
        );
    }
    Ok(payload)
}

/// Initialize logging with tracing
fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "did4dcat=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match parse_args(&args) {
        Ok(Some(config)) => config,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("error: {e}");
            eprintln!("run with --help for usage");
            return ExitCode::FAILURE;
        }
    };

    init_logging();

    match run(&config) {
        Ok(payload) => {
            if !payload.is_empty() {
                println!("{payload}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
