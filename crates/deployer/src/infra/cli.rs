//! CLI arguments for the `deployer` binary.

use {
    crate::domain::ParameterValues,
    anyhow::{Context, anyhow},
    clap::{Parser, Subcommand},
    std::path::PathBuf,
};

/// Deploy contract templates through an on-chain deployment manager
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The log filter.
    #[arg(long, env, default_value = "warn,deployer=info")]
    pub log: String,

    /// Output log events as JSON.
    #[arg(long, env)]
    pub log_json: bool,

    /// Path to the console configuration file. This file should be in TOML
    /// format.
    #[clap(long, env)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the deployable templates.
    Templates,
    /// List the networks to deploy on.
    Networks,
    /// Print the encoded constructor arguments and manager call of a
    /// template.
    Encode {
        #[arg(long)]
        template: String,

        #[command(flatten)]
        params: Params,
    },
    /// Deploy a template and record the deployment.
    Deploy {
        #[arg(long)]
        template: String,

        /// Slug of the network to deploy on.
        #[arg(long)]
        network: String,

        #[command(flatten)]
        params: Params,

        /// Record a simulated deployment without sending a transaction.
        #[arg(long)]
        simulate: bool,

        /// Hex encoded key of the deploying account. Without one only
        /// simulations are possible.
        #[arg(long, env, hide_env_values = true)]
        private_key: Option<String>,
    },
    /// List recorded deployments, newest first.
    History {
        /// Show at most this many deployments.
        #[arg(long)]
        limit: Option<usize>,
    },
}

/// Constructor parameters.
#[derive(clap::Args, Debug, Default)]
pub struct Params {
    /// A constructor parameter as `name=value`. Can be repeated and takes
    /// precedence over `--params-json`.
    #[arg(long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// A JSON object of constructor parameters.
    #[arg(long)]
    pub params_json: Option<String>,
}

impl Params {
    pub fn values(&self) -> anyhow::Result<ParameterValues> {
        let mut values = ParameterValues::new();
        if let Some(json) = &self.params_json {
            let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)
                .context("constructor parameters must be a JSON object")?;
            for (name, value) in object {
                let value = match value {
                    serde_json::Value::Null => continue,
                    serde_json::Value::String(value) => value,
                    value => value.to_string(),
                };
                values.insert(name, value);
            }
        }
        values.extend(self.params.iter().cloned());
        Ok(values)
    }
}

fn parse_param(arg: &str) -> anyhow::Result<(String, String)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got {arg:?}"))?;
    Ok((name.trim().to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use {super::*, maplit::btreemap};

    #[test]
    fn parses_deploy_command() {
        let args = Args::try_parse_from([
            "deployer",
            "--config",
            "console.toml",
            "deploy",
            "--template",
            "vesting",
            "--network",
            "sepolia",
            "--param",
            "amount=5",
            "--param",
            "memo=a=b",
            "--params-json",
            r#"{"amount": 1, "recipients": ["0x01", "0x02"], "note": null, "open": true}"#,
            "--simulate",
        ])
        .unwrap();

        let Command::Deploy {
            template,
            network,
            params,
            simulate,
            ..
        } = args.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(template, "vesting");
        assert_eq!(network, "sepolia");
        assert!(simulate);
        assert_eq!(
            params.values().unwrap(),
            btreemap! {
                "amount".to_string() => "5".to_string(),
                "memo".to_string() => "a=b".to_string(),
                "open".to_string() => "true".to_string(),
                "recipients".to_string() => r#"["0x01","0x02"]"#.to_string(),
            }
        );
    }

    #[test]
    fn rejects_malformed_params() {
        assert!(
            Args::try_parse_from([
                "deployer", "--config", "c.toml", "encode", "--template", "t", "--param", "amount",
            ])
            .is_err()
        );

        let params = Params {
            params_json: Some("[1, 2]".to_string()),
            ..Default::default()
        };
        assert!(params.values().is_err());
    }

    #[test]
    fn parses_history_command() {
        let args =
            Args::try_parse_from(["deployer", "--config", "c.toml", "history", "--limit", "5"])
                .unwrap();
        assert!(matches!(args.command, Command::History { limit: Some(5) }));

        let args = Args::try_parse_from(["deployer", "--config", "c.toml", "history"]).unwrap();
        assert!(matches!(args.command, Command::History { limit: None }));

        assert!(
            Args::try_parse_from(["deployer", "--config", "c.toml", "history", "--limit", "-1"])
                .is_err()
        );
    }
}
