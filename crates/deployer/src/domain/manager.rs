//! Planning of the call to the on-chain deployment manager.

use {
    alloy::{
        dyn_abi::DynSolValue,
        json_abi::Event,
        primitives::{Address, B256, Bytes, keccak256},
        sol_types::SolCall,
    },
    chrono::{DateTime, Utc},
    contracts::IDeploymentManager,
    model::Template,
    std::str::FromStr,
};

/// Manager methods, by their on-chain name.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, strum::Display, strum::EnumString)]
pub enum MethodName {
    #[default]
    #[strum(serialize = "deployTemplate")]
    DeployTemplate,
    #[strum(serialize = "deployBytecode")]
    DeployBytecode,
    #[strum(serialize = "deployDeterministic")]
    DeployDeterministic,
}

/// How a template gets deployed, with exactly the data each manager method
/// needs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Method {
    Template { identifier: B256 },
    Bytecode { bytecode: Bytes },
    Deterministic { identifier: B256, salt: Option<B256> },
}

impl Method {
    pub fn name(&self) -> MethodName {
        match self {
            Method::Template { .. } => MethodName::DeployTemplate,
            Method::Bytecode { .. } => MethodName::DeployBytecode,
            Method::Deterministic { .. } => MethodName::DeployDeterministic,
        }
    }
}

/// A validated deployment descriptor of a template.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub template_id: String,
    pub method: Method,
    /// Name of the event the manager emits for the new contract.
    pub event_name: String,
    /// Definition used to decode that event from receipt logs.
    pub event: Event,
}

impl Plan {
    /// Builds the manager call for the given encoded constructor arguments.
    /// `now` only seeds the salt of deterministic deployments without an
    /// explicit one.
    pub fn call(&self, init: Bytes, now: DateTime<Utc>) -> ManagerCall {
        match &self.method {
            Method::Template { identifier } => ManagerCall::Template {
                identifier: *identifier,
                init,
            },
            Method::Bytecode { bytecode } => ManagerCall::Bytecode {
                bytecode: bytecode.clone(),
                init,
            },
            Method::Deterministic { identifier, salt } => ManagerCall::Deterministic {
                identifier: *identifier,
                init,
                salt: salt.unwrap_or_else(|| default_salt(&self.template_id, now)),
            },
        }
    }
}

impl TryFrom<&Template> for Plan {
    type Error = PlanError;

    fn try_from(template: &Template) -> Result<Self, Self::Error> {
        let deployment = &template.deployment;
        let name = match deployment.method.as_deref() {
            None | Some("") => MethodName::default(),
            Some(method) => MethodName::from_str(method)
                .map_err(|_| PlanError::UnknownMethod(method.to_string()))?,
        };
        let raw_identifier = [&deployment.selector, &deployment.template_id]
            .into_iter()
            .flatten()
            .find(|raw| !raw.is_empty())
            .unwrap_or(&template.id);

        let method = match name {
            MethodName::DeployTemplate => Method::Template {
                identifier: identifier(raw_identifier),
            },
            MethodName::DeployBytecode => {
                let raw = [
                    deployment.bytecode.as_ref(),
                    deployment
                        .artifact
                        .as_ref()
                        .and_then(|artifact| artifact.bytecode.as_ref()),
                ]
                .into_iter()
                .flatten()
                .find(|raw| !raw.is_empty())
                .ok_or_else(|| PlanError::MissingBytecode(template.id.clone()))?;
                let bytecode = Bytes::from_str(raw)
                    .map_err(|_| PlanError::InvalidBytecode(template.id.clone()))?;
                Method::Bytecode { bytecode }
            }
            MethodName::DeployDeterministic => {
                let salt = deployment
                    .salt
                    .as_deref()
                    .filter(|raw| !raw.is_empty())
                    .map(|raw| word(raw).ok_or_else(|| PlanError::InvalidSalt(raw.to_string())))
                    .transpose()?;
                Method::Deterministic {
                    identifier: identifier(raw_identifier),
                    salt,
                }
            }
        };

        let event_name = deployment
            .event
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| contracts::DEPLOYED_EVENT.to_string());
        let event = deployment
            .abi
            .as_ref()
            .and_then(|abi| abi.event(&event_name))
            .and_then(|events| events.first().cloned())
            .unwrap_or_else(contracts::deployed_event);

        Ok(Self {
            template_id: template.id.clone(),
            method,
            event_name,
            event,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("unknown deployment method {0:?}")]
    UnknownMethod(String),
    #[error("template {0:?} is deployed from bytecode but has none")]
    MissingBytecode(String),
    #[error("template {0:?} has invalid bytecode")]
    InvalidBytecode(String),
    #[error("salt {0:?} is not a 32 byte hex value")]
    InvalidSalt(String),
}

/// The arguments of one manager call, in the order the manager expects them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ManagerCall {
    Template {
        identifier: B256,
        init: Bytes,
    },
    Bytecode {
        bytecode: Bytes,
        init: Bytes,
    },
    Deterministic {
        identifier: B256,
        init: Bytes,
        salt: B256,
    },
}

impl ManagerCall {
    pub fn method(&self) -> MethodName {
        match self {
            ManagerCall::Template { .. } => MethodName::DeployTemplate,
            ManagerCall::Bytecode { .. } => MethodName::DeployBytecode,
            ManagerCall::Deterministic { .. } => MethodName::DeployDeterministic,
        }
    }

    /// The ordered call arguments.
    pub fn args(&self) -> Vec<DynSolValue> {
        match self {
            ManagerCall::Template { identifier, init } => vec![
                DynSolValue::FixedBytes(*identifier, 32),
                DynSolValue::Bytes(init.to_vec()),
            ],
            ManagerCall::Bytecode { bytecode, init } => vec![
                DynSolValue::Bytes(bytecode.to_vec()),
                DynSolValue::Bytes(init.to_vec()),
            ],
            ManagerCall::Deterministic {
                identifier,
                init,
                salt,
            } => vec![
                DynSolValue::FixedBytes(*identifier, 32),
                DynSolValue::Bytes(init.to_vec()),
                DynSolValue::FixedBytes(*salt, 32),
            ],
        }
    }

    /// The encoded manager calldata.
    pub fn calldata(&self) -> Bytes {
        match self.clone() {
            ManagerCall::Template { identifier, init } => IDeploymentManager::deployTemplateCall {
                templateId: identifier,
                initData: init,
            }
            .abi_encode(),
            ManagerCall::Bytecode { bytecode, init } => IDeploymentManager::deployBytecodeCall {
                bytecode,
                initData: init,
            }
            .abi_encode(),
            ManagerCall::Deterministic {
                identifier,
                init,
                salt,
            } => IDeploymentManager::deployDeterministicCall {
                templateId: identifier,
                initData: init,
                salt,
            }
            .abi_encode(),
        }
        .into()
    }

    /// Decodes the address a dry run of this call returned.
    pub fn decode_output(&self, output: &[u8]) -> Result<Address, alloy::sol_types::Error> {
        match self {
            ManagerCall::Template { .. } => {
                IDeploymentManager::deployTemplateCall::abi_decode_returns(output)
            }
            ManagerCall::Bytecode { .. } => {
                IDeploymentManager::deployBytecodeCall::abi_decode_returns(output)
            }
            ManagerCall::Deterministic { .. } => {
                IDeploymentManager::deployDeterministicCall::abi_decode_returns(output)
            }
        }
    }
}

/// Resolves the on-chain template identifier.
///
/// 32 byte hex values are used verbatim. Anything else is packed as a short
/// string of its first 31 characters, or hashed if those do not fit into 31
/// bytes. Note that both fallbacks silently produce a different identifier
/// for long or non-ASCII ids.
pub fn identifier(raw: &str) -> B256 {
    if let Some(word) = word(raw) {
        return word;
    }
    let truncated: String = raw.chars().take(31).collect();
    match short_string(&truncated) {
        Some(packed) => packed,
        None => {
            tracing::warn!(identifier = raw, "identifier does not fit a short string, hashing it");
            keccak256(raw.as_bytes())
        }
    }
}

/// Parses a `0x` prefixed 32 byte hex literal.
fn word(raw: &str) -> Option<B256> {
    if raw.len() != 66 || !raw.starts_with("0x") {
        return None;
    }
    B256::from_str(raw).ok()
}

/// Packs UTF-8 text of at most 31 bytes into a zero padded word.
fn short_string(text: &str) -> Option<B256> {
    let bytes = text.as_bytes();
    (bytes.len() <= 31).then(|| B256::right_padding_from(bytes))
}

/// A convenience salt that differs between calls. It is not meant to be
/// reproducible: templates that need a predictable address must configure
/// their salt explicitly.
fn default_salt(template_id: &str, now: DateTime<Utc>) -> B256 {
    keccak256(format!("{template_id}:{}", now.timestamp_millis()))
}
