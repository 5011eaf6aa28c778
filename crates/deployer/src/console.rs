//! One deployment submission from selection to recorded history.

use {
    crate::{
        domain::{
            ExecutionError,
            ParameterValues,
            Plan,
            PlanError,
            SelectionError,
            Session,
            encoding::{self, EncodeError},
            execution::{Deploy, Executor, Wallet},
            manager::ManagerCall,
            resolve,
        },
        infra::{http, persistence::Persistence},
    },
    alloy::primitives::Bytes,
    chrono::Utc,
    model::{
        Catalog,
        DeploymentRecord,
        Network,
        Status,
        StoredDeployment,
        Template,
        TemplateField,
    },
    serde_json::json,
    std::sync::Arc,
    tracing::instrument,
};

pub struct Console {
    catalog: Catalog,
    wallet: Option<Arc<dyn Wallet>>,
    persistence: Arc<dyn Persistence>,
    dry_run: bool,
}

/// What a submission left behind.
#[derive(Debug)]
pub struct Outcome {
    /// The session to continue with.
    pub session: Session,
    pub stored: StoredDeployment,
}

/// The manager call a submission would make, without sending it.
#[derive(Debug)]
pub struct Preview {
    pub init: Bytes,
    pub call: ManagerCall,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("a deployment is already being submitted")]
    Busy,
    #[error(transparent)]
    Selection(#[from] SelectionError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error("no wallet is available, only simulations can be recorded")]
    NoWallet,
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// The deployment happened (or was simulated) but is missing from the
    /// history.
    #[error("deployment could not be recorded: {source}")]
    Persistence {
        record: Box<DeploymentRecord>,
        #[source]
        source: http::Error,
    },
}

impl Console {
    pub fn new(
        catalog: Catalog,
        wallet: Option<Arc<dyn Wallet>>,
        persistence: Arc<dyn Persistence>,
        dry_run: bool,
    ) -> Self {
        Self {
            catalog,
            wallet,
            persistence,
            dry_run,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The most recent recorded deployments, newest first.
    pub async fn history(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<StoredDeployment>, http::Error> {
        let mut deployments = self.persistence.list().await?;
        if let Some(limit) = limit {
            deployments.truncate(limit);
        }
        Ok(deployments)
    }

    /// Encodes the selected template's constructor arguments and the
    /// resulting manager call.
    pub fn preview(
        &self,
        session: &Session,
        params: &ParameterValues,
    ) -> Result<Preview, SubmitError> {
        let template = session.template(&self.catalog)?;
        let plan = Plan::try_from(template)?;
        let params = with_defaults(&template.constructor_fields, params);
        let init = encoding::encode(&template.constructor_fields, &params)?;
        let call = plan.call(init.clone(), Utc::now());
        Ok(Preview { init, call })
    }

    /// Deploys the selected template on the selected network and records the
    /// result.
    ///
    /// Without a manager contract for the network, or when `simulate` is set,
    /// nothing is sent and the deployment is recorded as simulated.
    #[instrument(skip_all)]
    pub async fn submit(
        &self,
        session: &Session,
        params: &ParameterValues,
        simulate: bool,
    ) -> Result<Outcome, SubmitError> {
        let busy = session.submitting().ok_or(SubmitError::Busy)?;
        let (template, network) = busy.selection(&self.catalog)?;
        let plan = Plan::try_from(template)?;
        let params = with_defaults(&template.constructor_fields, params);
        let manager = resolve::manager_address(template, network);
        tracing::info!(
            template = %template.id,
            network = %network.slug,
            ?manager,
            method = %plan.method.name(),
            "submitting deployment"
        );

        let (session, record) = match (manager, simulate) {
            (Some(manager), false) => {
                let wallet = self.wallet.clone().ok_or(SubmitError::NoWallet)?;
                let mut executor = Executor::new(wallet);
                let deployed = executor
                    .execute(Deploy {
                        plan: &plan,
                        fields: &template.constructor_fields,
                        params: &params,
                        manager,
                        chain_id: network.chain_id,
                        dry_run: self.dry_run,
                    })
                    .await?;
                let account = deployed.account.to_string();
                let record = DeploymentRecord {
                    funding_wallet: account.clone(),
                    deployer_wallet: account,
                    status: Status::Succeeded,
                    status_message: format!(
                        "Deployment successful. Tx: {}",
                        deployed.transaction_hash
                    ),
                    transaction_hash: Some(deployed.transaction_hash),
                    contract_address: deployed.contract_address,
                    manager_address: Some(manager),
                    metadata: json!({
                        "method": deployed.call.method().to_string(),
                        "event": plan.event_name,
                        "blockNumber": deployed.block_number,
                        "predictedAddress": deployed.predicted,
                    }),
                    ..base_record(template, network, &params)
                };
                (busy.connected(deployed.account), record)
            }
            (manager, _) => {
                let init = encoding::encode(&template.constructor_fields, &params)?;
                let reason = match manager {
                    Some(_) => "Simulation requested, no transaction was sent.".to_string(),
                    None => format!(
                        "No deployment manager is configured for {}, no transaction was sent.",
                        network.name
                    ),
                };
                let account = busy.account().map(|account| account.to_string());
                let record = DeploymentRecord {
                    funding_wallet: account.clone().unwrap_or_default(),
                    deployer_wallet: account.unwrap_or_default(),
                    status: Status::Simulated,
                    status_message: reason,
                    manager_address: manager,
                    metadata: json!({
                        "method": plan.method.name().to_string(),
                        "event": plan.event_name,
                        "encodedArguments": init,
                    }),
                    ..base_record(template, network, &params)
                };
                (busy, record)
            }
        };

        tracing::info!(
            status = %record.status,
            message = %record.status_message,
            "deployment finished"
        );
        let stored = self
            .persistence
            .store(&record)
            .await
            .map_err(|source| SubmitError::Persistence {
                record: Box::new(record),
                source,
            })?;
        Ok(Outcome {
            session: session.settled(),
            stored,
        })
    }
}

/// Fills in field defaults for parameters the operator left out.
fn with_defaults(fields: &[TemplateField], params: &ParameterValues) -> ParameterValues {
    let mut params = params.clone();
    for field in fields {
        if let Some(default) = &field.default {
            params
                .entry(field.name.clone())
                .or_insert_with(|| default.clone());
        }
    }
    params
}

/// The part of a record that does not depend on how the deployment went.
fn base_record(
    template: &Template,
    network: &Network,
    params: &ParameterValues,
) -> DeploymentRecord {
    DeploymentRecord {
        template_id: template.id.clone(),
        template_name: template.name.clone(),
        network: network.slug.clone(),
        funding_wallet: String::new(),
        deployer_wallet: String::new(),
        constructor_arguments: params.clone(),
        status: Status::Simulated,
        status_message: String::new(),
        transaction_hash: None,
        contract_address: None,
        manager_address: None,
        chain_id: Some(network.chain_id),
        metadata: json!({}),
    }
}
