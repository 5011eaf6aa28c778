use {
    crate::{
        console::{Console, SubmitError},
        domain::{Session, Wallet},
        infra::{self, NodeWallet, Persistence, catalog, cli, config, persistence},
    },
    alloy::signers::local::PrivateKeySigner,
    anyhow::{Context, bail},
    clap::Parser,
    model::{Catalog, Network, StoredDeployment},
    std::sync::Arc,
};

pub async fn start(args: impl Iterator<Item = String>) {
    let args = cli::Args::parse_from(args);
    let mut observe = observe::Config::default().with_env_filter(&args.log);
    if args.log_json {
        observe = observe.with_json_format();
    }
    observe::tracing::initialize(&observe);
    tracing::info!(config = ?args.config, "running deployment console");

    if let Err(err) = run(args).await {
        tracing::error!(?err, "deployment console failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

pub async fn run(args: cli::Args) -> anyhow::Result<()> {
    let config = config::file::load(&args.config).await;
    let client = reqwest::Client::new();
    let catalog = catalog::load(&client, &config.catalog).await?;
    let persistence: Arc<dyn Persistence> = match &config.persistence {
        Some(url) => Arc::new(persistence::Api::new(client.clone(), url.clone())),
        None => Arc::new(persistence::Discard),
    };

    match args.command {
        cli::Command::Templates => print_templates(&catalog),
        cli::Command::Networks => {
            for (slug, name) in catalog.network_choices() {
                println!("{slug}\t{name}");
            }
        }
        cli::Command::Encode { template, params } => {
            let console = Console::new(catalog, None, persistence, config.dry_run);
            let session = Session::default().select_template(&template);
            let preview = console.preview(&session, &params.values()?)?;
            println!("constructor arguments: {}", preview.init);
            println!("method: {}", preview.call.method());
            for (i, arg) in preview.call.args().iter().enumerate() {
                println!("  arg {i}: {arg:?}");
            }
            println!("calldata: {}", preview.call.calldata());
        }
        cli::Command::Deploy {
            template,
            network,
            params,
            simulate,
            private_key,
        } => {
            let wallet = match (private_key, catalog.network(&network)) {
                (Some(key), Some(network)) => Some(wallet(&config, network, &key)?),
                _ => None,
            };
            let console = Console::new(catalog, wallet, persistence, config.dry_run);
            let session = Session::default()
                .select_template(&template)
                .select_network(&network);

            match console.submit(&session, &params.values()?, simulate).await {
                Ok(outcome) => println!("{}", serde_json::to_string_pretty(&outcome.stored)?),
                Err(SubmitError::Execution(err)) if err.is_rejection() => {
                    bail!("the deployment was rejected in the wallet")
                }
                Err(SubmitError::Persistence { record, source }) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    return Err(source).context(format!(
                        "{} but the deployment could not be saved",
                        record.status_message
                    ));
                }
                Err(err) => return Err(err.into()),
            }
        }
        cli::Command::History { limit } => {
            let console = Console::new(catalog, None, persistence, config.dry_run);
            let deployments = console
                .history(limit)
                .await
                .context("could not load the deployment history")?;
            print_history(&deployments);
        }
    }
    Ok(())
}

fn wallet(
    config: &infra::Config,
    network: &Network,
    private_key: &str,
) -> anyhow::Result<Arc<dyn Wallet>> {
    let rpc_url = config
        .rpc_url(&network.slug, network.rpc_url.as_deref())
        .with_context(|| format!("no RPC endpoint is known for network {}", network.slug))?;
    let signer: PrivateKeySigner = private_key.parse().context("invalid private key")?;
    Ok(Arc::new(NodeWallet::new(&rpc_url, signer)?))
}

fn print_templates(catalog: &Catalog) {
    for template in &catalog.templates {
        println!("{}\t{}", template.id, template.name);
        if !template.description.is_empty() {
            println!("  {}", template.description);
        }
        for field in &template.constructor_fields {
            match &field.default {
                Some(default) => println!("  {} ({}, default {default})", field.label(), field.ty),
                None => println!("  {} ({})", field.label(), field.ty),
            }
        }
    }
}

fn print_history(deployments: &[StoredDeployment]) {
    if deployments.is_empty() {
        println!("no deployments recorded");
    }
    for deployment in deployments {
        let record = &deployment.record;
        let created_at = deployment
            .created_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{created_at}\t{}\t{}\t{}",
            record.template_id, record.network, record.status
        );
        if let Some(hash) = record.transaction_hash {
            println!("  transaction {hash}");
        }
        if let Some(address) = record.contract_address {
            println!("  contract {address}");
        }
    }
}
