//! check-heat-stack: Nagios probe for OpenStack Heat
//!
//! Creates a stack from a template, waits for it to come up, then deletes
//! it again, force-deleting stuck volumes and servers when Heat gives up.
//! Exit codes follow the monitoring convention 0/1/2/3.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::error::ErrorKind;
use clap::Parser;
use heat_probe::config::{self, EndpointConfig, ProbeConfig, RuntimeFlags, StackConfig, Timeouts};
use heat_probe::openstack::{ComputeClient, HeatClient, ImageClient, OpenStackContext, VolumeClient};
use heat_probe::probe::{Probe, ProbeClients};
use heat_probe_common::defaults::{DEFAULT_CREATE_TIMEOUT, DEFAULT_DELETE_TIMEOUT};
use heat_probe_common::Outcome;
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "check-heat-stack")]
#[command(about = "Create and delete a Heat stack, reporting to Nagios")]
#[command(version)]
struct Args {
    /// Heat template to create
    #[arg(long)]
    template: PathBuf,

    /// Stack name to use (default: generated)
    #[arg(long, alias = "stack_name")]
    stack_name: Option<String>,

    /// Max number of seconds to create the stack
    #[arg(long, default_value_t = DEFAULT_CREATE_TIMEOUT)]
    timeout: u64,

    /// Max number of seconds to delete the stack
    #[arg(long, alias = "timeout_delete", default_value_t = DEFAULT_DELETE_TIMEOUT)]
    timeout_delete: u64,

    /// Delete a pre-existing stack with the same name first
    #[arg(long, alias = "force_delete")]
    force_delete: bool,

    /// Parameter for the Heat template, as key=value (repeatable)
    #[arg(long = "property", value_name = "KEY=VALUE")]
    properties: Vec<String>,

    /// Image to look up and pass as the `image_id` parameter
    #[arg(long, alias = "image_name")]
    image_name: Option<String>,

    /// Pre-issued keystone token
    #[arg(long, env = "OS_AUTH_TOKEN", hide_env_values = true)]
    token: String,

    /// Orchestration endpoint (e.g. https://heat:8004/v1/<tenant_id>)
    #[arg(long, env = "OS_HEAT_URL")]
    heat_url: String,

    /// Compute endpoint (e.g. https://nova:8774/v2.1/<tenant_id>)
    #[arg(long, env = "OS_COMPUTE_URL")]
    compute_url: String,

    /// Block storage endpoint (e.g. https://cinder:8776/v3/<tenant_id>)
    #[arg(long, env = "OS_VOLUME_URL")]
    volume_url: String,

    /// Image endpoint, required with --image-name
    #[arg(long, env = "OS_IMAGE_URL")]
    image_url: Option<String>,

    /// Log to stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl TryFrom<Args> for ProbeConfig {
    type Error = config::ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let config = Self {
            stack: StackConfig {
                name: args.stack_name,
                template: args.template,
                parameters: config::parse_properties(&args.properties)?,
                image_name: args.image_name,
            },
            endpoints: EndpointConfig {
                token: args.token,
                heat_url: args.heat_url,
                compute_url: args.compute_url,
                volume_url: args.volume_url,
                image_url: args.image_url,
            },
            timeouts: Timeouts::from_secs(args.timeout, args.timeout_delete)?,
            flags: RuntimeFlags {
                force_delete: args.force_delete,
                verbose: args.verbose,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() {
    let outcome = match Args::try_parse() {
        Ok(args) => run(args).await,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => Outcome::unknown(first_line(&e.to_string())),
    };

    report(&outcome);
    std::process::exit(outcome.severity.exit_code());
}

async fn run(args: Args) -> Outcome {
    init_tracing(args.verbose);

    let (config, template, ctx) = match prepare(args) {
        Ok(prepared) => prepared,
        Err(e) => return Outcome::unknown(format!("{e:#}")),
    };
    debug!(config = ?config, "Starting probe");

    let heat = HeatClient::from_context(&ctx, &config.endpoints.heat_url);
    let nova = ComputeClient::from_context(&ctx, &config.endpoints.compute_url);
    let cinder = VolumeClient::from_context(&ctx, &config.endpoints.volume_url);
    let glance = config
        .endpoints
        .image_url
        .as_deref()
        .map(|url| ImageClient::from_context(&ctx, url));

    let clients = ProbeClients {
        stacks: &heat,
        servers: &nova,
        volumes: &cinder,
        images: glance.as_ref(),
    };
    Probe::new(clients, &config, template).run().await
}

/// Validate arguments, load the template and build the HTTP context.
fn prepare(args: Args) -> Result<(ProbeConfig, String, OpenStackContext)> {
    let config = ProbeConfig::try_from(args)?;
    let template = config::load_template(config.template())?;
    let ctx = OpenStackContext::new(config.endpoints.token.clone())
        .context("Failed to build HTTP client")?;
    Ok((config, template, ctx))
}

/// Logs go to stderr so stdout only ever carries the OK line.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .init();
}

fn report(outcome: &Outcome) {
    let line = outcome.render(Utc::now());
    if outcome.severity.is_problem() {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

fn first_line(message: &str) -> String {
    message
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ")
        .to_string()
}
