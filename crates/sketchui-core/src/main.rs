use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgMatches, Command};
use sketchui_core::{
    AppConfig, ComponentSynthesizer, InMemoryComponentRepository, ServiceError, SynthesisRequest,
};
use sketchui_extract::extract_generation;
use sketchui_gateway::{CancellationToken, HttpGatewayClient};
use sketchui_store::{OwnerId, SketchStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("sketchui")
        .version(sketchui_core::VERSION)
        .about("Turn UI sketches into component code")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .about("Upload a sketch and generate components from it")
                .arg(
                    Arg::new("image")
                        .long("image")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("PNG, JPEG or BMP sketch"),
                )
                .arg(
                    Arg::new("owner")
                        .long("owner")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Owner id for the created components"),
                )
                .arg(
                    Arg::new("prompt")
                        .long("prompt")
                        .help("User prompt sent with the sketch"),
                )
                .arg(
                    Arg::new("title")
                        .long("title")
                        .help("Title for the component when exactly one is generated"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file"),
                ),
        )
        .subcommand(
            Command::new("clean")
                .about("Run the extraction pipeline over saved model output")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("File holding raw model output"),
                ),
        )
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            on_interrupt.cancel();
        }
    });

    match cli().get_matches().subcommand() {
        Some(("generate", args)) => generate(args, &cancel).await,
        Some(("clean", args)) => clean(args),
        _ => Ok(()),
    }
}

async fn generate(args: &ArgMatches, cancel: &CancellationToken) -> anyhow::Result<()> {
    let image = args
        .get_one::<PathBuf>("image")
        .context("--image is required")?;
    let owner = OwnerId(
        *args
            .get_one::<i64>("owner")
            .context("--owner is required")?,
    );
    let config = AppConfig::load(args.get_one::<PathBuf>("config").map(PathBuf::as_path))?;
    if config.gateway.api_key.is_empty() {
        bail!("no gateway credential: set OPENROUTER_API_KEY or gateway.api_key");
    }

    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("cannot read {}", image.display()))?;

    let store = Arc::new(SketchStore::new(config.store.clone()));
    let sketch = store.upload(&bytes, owner).await?;

    let gateway = Arc::new(HttpGatewayClient::new(config.gateway.clone())?);
    let repository = Arc::new(InMemoryComponentRepository::new());
    let synthesizer = ComponentSynthesizer::new(
        Arc::clone(&store),
        gateway,
        repository,
        config.synthesis.clone(),
    );

    let mut request = SynthesisRequest::new(sketch.id().clone(), owner);
    request.prompt_override = args.get_one::<String>("prompt").cloned();
    request.title_override = args.get_one::<String>("title").cloned();

    let result = synthesizer.synthesize(request, cancel).await;
    store.shutdown().await;

    match result {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report.created)?);
            Ok(())
        }
        Err(ServiceError::Persistence {
            committed_ids,
            source,
            ..
        }) => bail!("persistence failed ({source}); committed components: {committed_ids:?}"),
        Err(e) => {
            tracing::debug!(error = %e, "generation failed");
            bail!("{} ({})", e.user_message(), e.status_code())
        }
    }
}

fn clean(args: &ArgMatches) -> anyhow::Result<()> {
    let input = args
        .get_one::<PathBuf>("input")
        .context("--input is required")?;
    let raw = std::fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))?;

    let outcome = extract_generation(&raw)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
