use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info};

use brs_core::naming::{all_result_names, DEFAULT_SOURCE_NAME};
use brs_core::Projection;

#[derive(Parser, Debug)]
#[command(name = "brsctl", version, about = "Project TaskRun results into BuildRun status")]
struct Cli {
    /// Output format
    #[arg(short = 'o', long = "output", value_enum, global = true, default_value_t = Output::Human)]
    output: Output,

    /// Kubernetes namespace (default: current context)
    #[arg(long = "ns", global = true, env = "BRS_NAMESPACE")]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Output { Human, Json }

#[derive(Subcommand, Debug)]
enum Commands {
    /// Project a TaskRun read from a JSON or YAML file ("-" for stdin)
    Project {
        file: PathBuf,
    },
    /// Fetch a TaskRun from the cluster and project it
    Get {
        /// TaskRun name
        #[arg(long, conflicts_with = "buildrun", required_unless_present = "buildrun")]
        taskrun: Option<String>,
        /// BuildRun name; its most recent TaskRun is used
        #[arg(long)]
        buildrun: Option<String>,
    },
    /// Print projections for BuildRun TaskRuns as they change
    Watch,
    /// Print the result names a build strategy may emit
    Names {
        #[arg(long, default_value = DEFAULT_SOURCE_NAME)]
        source: String,
    },
}

fn init_tracing() {
    let env = std::env::var("BRS_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn read_taskrun(file: &Path) -> Result<Value> {
    let mut text = String::new();
    if file.as_os_str() == "-" {
        std::io::stdin().read_to_string(&mut text).context("reading TaskRun from stdin")?;
    } else {
        text = std::fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;
    }
    if text.trim_start().starts_with('{') {
        Ok(brs_core::taskrun::parse_taskrun(&text)?)
    } else {
        serde_yaml::from_str(&text).context("parsing TaskRun YAML")
    }
}

fn render_human(projection: &Projection) -> Vec<String> {
    let mut lines = Vec::new();
    for s in projection.sources.iter() {
        if let Some(git) = &s.git {
            lines.push(format!(
                "source {} git commit-sha={} commit-author={}",
                s.name,
                git.commit_sha.as_deref().unwrap_or("-"),
                git.commit_author.as_deref().unwrap_or("-"),
            ));
        }
        if let Some(bundle) = &s.bundle {
            lines.push(format!("source {} bundle digest={}", s.name, bundle.digest.as_deref().unwrap_or("-")));
        }
    }
    lines.push(format!(
        "output digest={} size={}",
        projection.output.digest.as_deref().unwrap_or("-"),
        projection.output.size.as_deref().unwrap_or("-"),
    ));
    lines
}

fn print_projection(output: Output, buildrun: Option<&str>, projection: Projection) -> Result<()> {
    match output {
        Output::Human => {
            if let Some(br) = buildrun {
                println!("buildrun {}", br);
            }
            for line in render_human(&projection) {
                println!("{}", line);
            }
        }
        Output::Json => {
            let status = serde_json::to_value(projection.into_status())?;
            let doc = match buildrun {
                Some(br) => serde_json::json!({ "buildRun": br, "status": status }),
                None => status,
            };
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ns = cli.namespace.as_deref();

    match cli.command {
        Commands::Project { file } => {
            let taskrun = read_taskrun(&file)?;
            let projection = brs_core::project_taskrun(&taskrun)?;
            print_projection(cli.output, None, projection)?;
        }
        Commands::Get { taskrun, buildrun } => {
            let obj = match (taskrun, buildrun) {
                (Some(name), _) => brs_kubehub::fetch_taskrun(ns, &name).await?,
                (None, Some(br)) => brs_kubehub::fetch_last_taskrun(ns, &br)
                    .await?
                    .ok_or_else(|| anyhow!("no TaskRun found for BuildRun {}", br))?,
                (None, None) => return Err(anyhow!("either --taskrun or --buildrun is required")),
            };
            let buildrun = brs_kubehub::buildrun_of(&obj).map(str::to_string);
            let projection = brs_core::project_taskrun(&obj)?;
            print_projection(cli.output, buildrun.as_deref(), projection)?;
        }
        Commands::Watch => {
            info!(ns = ?ns, "watch invoked");
            let (tx, mut rx) = mpsc::channel::<(String, Projection)>(256);
            let watcher_handle = tokio::spawn({
                let ns = ns.map(|s| s.to_string());
                async move {
                    if let Err(e) = brs_kubehub::watch_projections(ns.as_deref(), tx).await {
                        error!(error = ?e, "watcher failed");
                    }
                }
            });
            loop {
                tokio::select! {
                    maybe = rx.recv() => match maybe {
                        Some((br, projection)) => print_projection(cli.output, Some(&br), projection)?,
                        None => break,
                    },
                    _ = signal::ctrl_c() => {
                        info!("interrupted");
                        break;
                    }
                }
            }
            watcher_handle.abort();
        }
        Commands::Names { source } => {
            let names = all_result_names(&source);
            match cli.output {
                Output::Human => names.iter().for_each(|n| println!("{}", n)),
                Output::Json => println!("{}", serde_json::to_string_pretty(&names)?),
            }
        }
    }
    Ok(())
}
