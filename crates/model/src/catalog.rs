use {
    alloy::{json_abi::JsonAbi, primitives::Address},
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
};

/// Networks offered when the catalog does not list any.
const FALLBACK_NETWORKS: [&str; 4] = ["ethereum", "polygon", "arbitrum", "base"];

/// Everything the catalog provider publishes. Read once at startup and never
/// mutated afterwards.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub networks: Vec<Network>,
}

impl Catalog {
    pub fn template(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn network(&self, slug: &str) -> Option<&Network> {
        self.networks
            .iter()
            .find(|network| network.slug.eq_ignore_ascii_case(slug))
    }

    /// The `(slug, display name)` pairs to offer for network selection.
    ///
    /// Slugs are lower-cased and deduplicated in catalog order. Falls back to
    /// a fixed list of popular networks if the catalog has none.
    pub fn network_choices(&self) -> Vec<(String, String)> {
        let mut choices: Vec<(String, String)> = Vec::new();
        for network in &self.networks {
            let slug = network.slug.to_lowercase();
            if choices.iter().all(|(existing, _)| *existing != slug) {
                choices.push((slug, network.name.clone()));
            }
        }
        if choices.is_empty() {
            choices = FALLBACK_NETWORKS
                .iter()
                .map(|slug| (slug.to_string(), title_case(slug)))
                .collect();
        }
        choices
    }
}

fn title_case(slug: &str) -> String {
    slug.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// A deployable contract as published in the catalog.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Constructor parameters in the order the on-chain constructor expects
    /// them.
    #[serde(default)]
    pub constructor_fields: Vec<TemplateField>,
    #[serde(default)]
    pub deployment: DeploymentDescriptor,
}

/// One constructor parameter of a template.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    pub name: String,
    /// ABI type of the parameter, e.g. `uint256` or `address[]`.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TemplateField {
    /// The text to show when asking for a value.
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// How a template is deployed, exactly as the catalog describes it. The
/// combination of fields is validated when the deployment is planned, not
/// when the catalog is read.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDescriptor {
    /// Name of the manager method. Absent means `deployTemplate`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Manager contract per network slug, with an optional `default` entry.
    /// Blank entries are dropped.
    #[serde(
        default,
        deserialize_with = "blank_as_absent::managers",
        skip_serializing_if = "Option::is_none"
    )]
    pub managers: Option<HashMap<String, Address>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salt: Option<String>,
    /// Name of the event the manager emits once the contract is created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    /// ABI containing the definition of `event`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<JsonAbi>,
}

/// Compiled contract artifact attached to a template.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytecode: Option<String>,
}

/// A blockchain network templates can be deployed to.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub slug: String,
    pub name: String,
    pub chain_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,
    /// Manager contract used when a template has no entry for this network.
    #[serde(
        default,
        deserialize_with = "blank_as_absent::address",
        skip_serializing_if = "Option::is_none"
    )]
    pub manager: Option<Address>,
}

/// Catalog editors leave manager addresses as empty strings instead of
/// omitting them. Those read as absent so that resolution falls through to the
/// next candidate.
mod blank_as_absent {
    use {
        alloy::primitives::Address,
        serde::{Deserialize, Deserializer, de::Error as _},
        std::{collections::HashMap, str::FromStr},
    };

    pub fn address<'de, D>(deserializer: D) -> Result<Option<Address>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        parse(raw.as_deref()).map_err(D::Error::custom)
    }

    pub fn managers<'de, D>(
        deserializer: D,
    ) -> Result<Option<HashMap<String, Address>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<HashMap<String, Option<String>>>::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let mut managers = HashMap::with_capacity(raw.len());
        for (slug, address) in raw {
            if let Some(address) = parse(address.as_deref()).map_err(D::Error::custom)? {
                managers.insert(slug, address);
            }
        }
        Ok(Some(managers))
    }

    fn parse(raw: Option<&str>) -> Result<Option<Address>, String> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Address::from_str(raw)
                .map(Some)
                .map_err(|err| format!("invalid manager address {raw:?}: {err}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, alloy::primitives::address, maplit::hashmap, serde_json::json};

    #[test]
    fn deserializes_catalog() {
        let catalog: Catalog = serde_json::from_value(json!({
            "templates": [{
                "id": "vesting",
                "name": "Vesting",
                "constructorFields": [
                    { "name": "beneficiary", "type": "address", "label": "Beneficiary" },
                    { "name": "amounts", "type": "uint256[]" },
                ],
                "deployment": {
                    "method": "deployDeterministic",
                    "managers": {
                        "sepolia": "0x1111111111111111111111111111111111111111",
                        "default": "0x2222222222222222222222222222222222222222",
                    },
                    "templateId": "vesting-v1",
                    "event": "ContractDeployed",
                },
            }],
            "networks": [{
                "slug": "sepolia",
                "name": "Sepolia",
                "chainId": 11155111,
                "rpcUrl": "https://rpc.sepolia.org",
            }],
        }))
        .unwrap();

        let template = catalog.template("vesting").unwrap();
        assert_eq!(template.constructor_fields[1].ty, "uint256[]");
        assert_eq!(template.constructor_fields[0].label(), "Beneficiary");
        assert_eq!(template.constructor_fields[1].label(), "amounts");
        assert_eq!(
            template.deployment.managers,
            Some(hashmap! {
                "sepolia".to_string() => address!("0x1111111111111111111111111111111111111111"),
                "default".to_string() => address!("0x2222222222222222222222222222222222222222"),
            })
        );
        assert_eq!(
            template.deployment.template_id.as_deref(),
            Some("vesting-v1")
        );
        assert_eq!(catalog.network("SEPOLIA").unwrap().chain_id, 11155111);
        assert!(catalog.template("airdrop").is_none());
    }

    #[test]
    fn blank_manager_addresses_are_absent() {
        let catalog: Catalog = serde_json::from_value(json!({
            "templates": [{
                "id": "vesting",
                "name": "Vesting",
                "deployment": {
                    "managers": {
                        "sepolia": "",
                        "polygon": null,
                        "default": "0x2222222222222222222222222222222222222222",
                    },
                },
            }],
            "networks": [
                { "slug": "sepolia", "name": "Sepolia", "chainId": 11155111, "manager": "" },
                { "slug": "base", "name": "Base", "chainId": 8453, "manager": null },
            ],
        }))
        .unwrap();

        assert_eq!(
            catalog.templates[0].deployment.managers,
            Some(hashmap! {
                "default".to_string() => address!("0x2222222222222222222222222222222222222222"),
            })
        );
        assert_eq!(catalog.networks[0].manager, None);
        assert_eq!(catalog.networks[1].manager, None);
    }

    #[test]
    fn malformed_manager_address_is_rejected() {
        let result = serde_json::from_value::<Network>(json!({
            "slug": "sepolia",
            "name": "Sepolia",
            "chainId": 11155111,
            "manager": "0x1234",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn network_choices_are_deduplicated() {
        let network = |slug: &str, name: &str| Network {
            slug: slug.to_string(),
            name: name.to_string(),
            chain_id: 1,
            rpc_url: None,
            manager: None,
        };
        let catalog = Catalog {
            templates: vec![],
            networks: vec![
                network("Sepolia", "Sepolia"),
                network("polygon", "Polygon"),
                network("sepolia", "Sepolia again"),
            ],
        };

        assert_eq!(
            catalog.network_choices(),
            vec![
                ("sepolia".to_string(), "Sepolia".to_string()),
                ("polygon".to_string(), "Polygon".to_string()),
            ]
        );
    }

    #[test]
    fn network_choices_fall_back_to_popular_networks() {
        let choices = Catalog::default().network_choices();
        assert_eq!(choices.len(), 4);
        assert_eq!(choices[0], ("ethereum".to_string(), "Ethereum".to_string()));
        assert_eq!(choices[3], ("base".to_string(), "Base".to_string()));
    }
}
