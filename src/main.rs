use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use approvals_pipeline::app::export_use_case::{ExportFiles, ExportUseCase};
use approvals_pipeline::app::ports::{ApprovalSourcePort, FilePublisherPort};
use approvals_pipeline::config::Config;
use approvals_pipeline::infra::{GraphApprovalSource, LocalDirPublisher, SharePointPublisher};
use approvals_pipeline::logging;
use approvals_pipeline::observability::metrics;
use approvals_pipeline::pipeline::csv_io;
use approvals_pipeline::pipeline::flatten::flatten_approvals;
use approvals_pipeline::pipeline::processing::{
    AreaSource, AutomationRule, OutputLayout, TicketIdPolicy,
};
use approvals_pipeline::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "approvals_pipeline")]
#[command(about = "Approval records extraction, classification and publishing")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./config.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a raw approvals CSV into the reporting table
    Clean {
        /// Raw approvals CSV
        #[arg(long)]
        input: PathBuf,
        /// Output CSV (defaults to <output dir>/<clean filename>)
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        classification: ClassificationArgs,
    },
    /// Download approvals and write the raw flattened CSV
    Fetch {
        /// Graph bearer token
        #[arg(long, env = "GRAPH_TOKEN", hide_env_values = true)]
        token: String,
        /// Output CSV (defaults to <output dir>/<raw filename>)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Fetch, classify and publish in one go
    Run {
        /// Graph bearer token used to read approvals
        #[arg(long, env = "GRAPH_TOKEN", hide_env_values = true)]
        token: String,
        /// Where to publish the tables
        #[arg(long, value_enum, default_value_t = PublishTarget::Local)]
        publish: PublishTarget,
        /// Bearer token for SharePoint uploads (falls back to --token)
        #[arg(long, env = "SHAREPOINT_TOKEN", hide_env_values = true)]
        sharepoint_token: Option<String>,
        /// Also publish the raw flattened table
        #[arg(long)]
        publish_raw: bool,
        #[command(flatten)]
        classification: ClassificationArgs,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum PublishTarget {
    Local,
    Sharepoint,
}

/// Per-run overrides of the configured classification variants
#[derive(Args)]
struct ClassificationArgs {
    /// standard | category_columns
    #[arg(long)]
    layout: Option<OutputLayout>,
    /// first_digit_run | marked
    #[arg(long)]
    ticket_id: Option<TicketIdPolicy>,
    /// owner | details
    #[arg(long)]
    area_source: Option<AreaSource>,
    /// preserved | case_folded
    #[arg(long)]
    automation: Option<AutomationRule>,
}

impl ClassificationArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(layout) = self.layout {
            config.output.layout = layout;
        }
        if let Some(policy) = self.ticket_id {
            config.classification.ticket_id = policy;
        }
        if let Some(area) = self.area_source {
            config.classification.area_source = area;
        }
        if let Some(rule) = self.automation {
            config.classification.automation = rule;
        }
    }
}

fn pipeline_for(config: &Config) -> Pipeline {
    Pipeline::new(config.classification, config.output.layout)
}

fn default_output(config: &Config, filename: &str) -> PathBuf {
    Path::new(&config.output.dir).join(filename)
}

async fn fetch_to_file(config: &Config, token: &str, output: &Path) -> anyhow::Result<()> {
    let source = GraphApprovalSource::new(config.graph.approvals_url.clone(), token)?;
    let items = source.fetch_approvals().await?;
    let rows = flatten_approvals(&items);

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)?;
    }
    let file = File::create(output)
        .with_context(|| format!("creating {}", output.display()))?;
    csv_io::write_raw_csv(&rows, BufWriter::new(file))?;

    info!("Wrote {} raw approvals to {}", rows.len(), output.display());
    Ok(())
}

async fn run_export(
    config: &Config,
    token: &str,
    publish: PublishTarget,
    sharepoint_token: Option<&str>,
) -> anyhow::Result<()> {
    let source = GraphApprovalSource::new(config.graph.approvals_url.clone(), token)?;
    let publisher: Box<dyn FilePublisherPort> = match publish {
        PublishTarget::Local => Box::new(LocalDirPublisher::new(&config.output.dir)),
        PublishTarget::Sharepoint => Box::new(SharePointPublisher::new(
            config.graph.base_url.clone(),
            config.sharepoint.site_id.clone(),
            config.sharepoint.drive_id.clone(),
            sharepoint_token.unwrap_or(token),
        )?),
    };

    let files = ExportFiles {
        raw_filename: config
            .output
            .publish_raw
            .then(|| config.output.raw_filename.clone()),
        clean_filename: config.output.clean_filename.clone(),
    };

    let use_case = ExportUseCase::new(&source, publisher.as_ref(), pipeline_for(config));
    let summary = use_case.run(&files).await?;

    if summary.fetched == 0 {
        info!("No approval items found, nothing published");
    } else {
        info!(
            "Export finished: fetched={} enriched={} published={:?}",
            summary.fetched, summary.enriched, summary.published
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    if let Err(e) = metrics::init() {
        error!("Metrics disabled: {}", e);
    }

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Clean {
            input,
            output,
            classification,
        } => {
            classification.apply(&mut config);
            let output =
                output.unwrap_or_else(|| default_output(&config, &config.output.clean_filename));
            if !input.exists() {
                bail!("input file {} does not exist", input.display());
            }
            let summary = pipeline_for(&config).clean_file(&input, &output)?;
            info!(
                "Generated {} ({} records)",
                summary.output_file, summary.records
            );
        }
        Commands::Fetch { token, output } => {
            let output =
                output.unwrap_or_else(|| default_output(&config, &config.output.raw_filename));
            fetch_to_file(&config, &token, &output).await?;
        }
        Commands::Run {
            token,
            publish,
            sharepoint_token,
            publish_raw,
            classification,
        } => {
            classification.apply(&mut config);
            config.output.publish_raw |= publish_raw;
            run_export(&config, &token, publish, sharepoint_token.as_deref()).await?;
        }
    }

    if let Some(snapshot) = metrics::render() {
        debug!("Metrics snapshot:\n{}", snapshot);
    }
    Ok(())
}
