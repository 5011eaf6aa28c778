use {
    alloy::primitives::Address,
    model::{Network, Template},
};

/// Key of the template manager used on networks without their own entry.
pub const DEFAULT_MANAGER: &str = "default";

/// Resolves the manager contract to call for deploying `template` on
/// `network`.
///
/// The template's entry for the network wins over its `default` entry, which
/// in turn wins over the manager configured for the network. Slugs compare
/// case-insensitively. `None` means no manager is known and the deployment can
/// only be simulated.
pub fn manager_address(template: &Template, network: &Network) -> Option<Address> {
    let entry = |key: &str| {
        template
            .deployment
            .managers
            .as_ref()?
            .iter()
            .find(|(slug, _)| slug.eq_ignore_ascii_case(key))
            .map(|(_, address)| *address)
    };
    entry(&network.slug)
        .or_else(|| entry(DEFAULT_MANAGER))
        .or(network.manager)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::primitives::address,
        maplit::hashmap,
        model::{Catalog, DeploymentDescriptor},
        serde_json::json,
    };

    const A: Address = address!("0x000000000000000000000000000000000000000a");
    const B: Address = address!("0x000000000000000000000000000000000000000b");
    const C: Address = address!("0x000000000000000000000000000000000000000c");

    fn template(managers: Option<std::collections::HashMap<String, Address>>) -> Template {
        Template {
            id: "vesting".to_string(),
            name: "Vesting".to_string(),
            description: String::new(),
            constructor_fields: vec![],
            deployment: DeploymentDescriptor {
                managers,
                ..Default::default()
            },
        }
    }

    fn network(slug: &str, manager: Option<Address>) -> Network {
        Network {
            slug: slug.to_string(),
            name: slug.to_string(),
            chain_id: 1,
            rpc_url: None,
            manager,
        }
    }

    #[test]
    fn prefers_network_entry_then_default() {
        let template = template(Some(hashmap! {
            "sepolia".to_string() => A,
            DEFAULT_MANAGER.to_string() => B,
        }));

        assert_eq!(manager_address(&template, &network("sepolia", Some(C))), Some(A));
        assert_eq!(manager_address(&template, &network("polygon", Some(C))), Some(B));
    }

    #[test]
    fn falls_back_to_network_manager() {
        assert_eq!(manager_address(&template(None), &network("sepolia", Some(C))), Some(C));
        assert_eq!(
            manager_address(
                &template(Some(hashmap! { "base".to_string() => A })),
                &network("sepolia", Some(C))
            ),
            Some(C)
        );
        assert_eq!(manager_address(&template(None), &network("sepolia", None)), None);
    }

    #[test]
    fn slugs_match_regardless_of_case() {
        let template = template(Some(hashmap! {
            "Sepolia".to_string() => A,
            "DEFAULT".to_string() => B,
        }));

        assert_eq!(manager_address(&template, &network("sepolia", Some(C))), Some(A));
        assert_eq!(manager_address(&template, &network("SEPOLIA", Some(C))), Some(A));
        assert_eq!(manager_address(&template, &network("base", Some(C))), Some(B));
    }

    #[test]
    fn blank_catalog_entries_fall_through() {
        let catalog: Catalog = serde_json::from_value(json!({
            "templates": [{
                "id": "vesting",
                "name": "Vesting",
                "deployment": {
                    "managers": {
                        "sepolia": "",
                        "default": "0x000000000000000000000000000000000000000b",
                    },
                },
            }],
            "networks": [
                { "slug": "sepolia", "name": "Sepolia", "chainId": 11155111, "manager": "" },
                { "slug": "base", "name": "Base", "chainId": 8453, "manager": "  " },
            ],
        }))
        .unwrap();
        let template = catalog.template("vesting").unwrap();

        assert_eq!(
            manager_address(template, catalog.network("sepolia").unwrap()),
            Some(B)
        );
        let mut bare = template.clone();
        bare.deployment.managers = None;
        assert_eq!(manager_address(&bare, catalog.network("base").unwrap()), None);
    }
}
