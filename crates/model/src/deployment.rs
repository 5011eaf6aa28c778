use {
    alloy::primitives::{Address, B256},
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Outcome of a submission as recorded by the persistence service.
///
/// Failed submissions are only reported to the operator and never recorded.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    /// Nothing was sent on-chain.
    Simulated,
    /// The deployment transaction was mined.
    Succeeded,
}

/// A deployment as submitted to the persistence service.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DeploymentRecord {
    pub template_id: String,
    pub template_name: String,
    pub network: String,
    /// The account paying for the deployment, empty if none is connected.
    pub funding_wallet: String,
    pub deployer_wallet: String,
    /// Raw operator input keyed by constructor field name.
    pub constructor_arguments: BTreeMap<String, String>,
    pub status: Status,
    pub status_message: String,
    pub transaction_hash: Option<B256>,
    pub contract_address: Option<Address>,
    pub manager_address: Option<Address>,
    pub chain_id: Option<u64>,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A deployment record as returned by the persistence service.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StoredDeployment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub record: DeploymentRecord,
}

#[cfg(test)]
mod tests {
    use {super::*, maplit::btreemap, serde_json::json};

    #[test]
    fn serializes_record() {
        let record = DeploymentRecord {
            template_id: "vesting".to_string(),
            template_name: "Vesting".to_string(),
            network: "sepolia".to_string(),
            funding_wallet: String::new(),
            deployer_wallet: String::new(),
            constructor_arguments: btreemap! {
                "amounts".to_string() => "1,2".to_string(),
            },
            status: Status::Simulated,
            status_message: "No manager configured".to_string(),
            transaction_hash: None,
            contract_address: None,
            manager_address: None,
            chain_id: Some(11155111),
            metadata: json!({ "method": "deployTemplate" }),
        };

        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({
                "template_id": "vesting",
                "template_name": "Vesting",
                "network": "sepolia",
                "funding_wallet": "",
                "deployer_wallet": "",
                "constructor_arguments": { "amounts": "1,2" },
                "status": "simulated",
                "status_message": "No manager configured",
                "transaction_hash": null,
                "contract_address": null,
                "manager_address": null,
                "chain_id": 11155111,
                "metadata": { "method": "deployTemplate" },
            })
        );
    }

    #[test]
    fn deserializes_stored_record() {
        let stored: StoredDeployment = serde_json::from_value(json!({
            "id": 7,
            "created_at": "2024-05-01T12:00:00Z",
            "template_id": "vesting",
            "template_name": "Vesting",
            "network": "sepolia",
            "funding_wallet": "0x1111111111111111111111111111111111111111",
            "deployer_wallet": "0x1111111111111111111111111111111111111111",
            "constructor_arguments": {},
            "status": "succeeded",
            "status_message": "Deployment successful.",
            "transaction_hash": null,
            "contract_address": "0x2222222222222222222222222222222222222222",
            "manager_address": null,
            "chain_id": 1,
        }))
        .unwrap();

        assert_eq!(stored.id, Some(7));
        assert_eq!(stored.record.status, Status::Succeeded);
        assert_eq!(stored.record.metadata, serde_json::Value::Null);
    }

    #[test]
    fn status_display() {
        assert_eq!(Status::Simulated.to_string(), "simulated");
        assert_eq!("succeeded".parse::<Status>().unwrap(), Status::Succeeded);
    }
}
