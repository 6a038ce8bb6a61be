//! YAML file holding the settings shared by all subcommands.
//!
//! Every field can be overridden on the command line.

use {
    anyhow::{
        Context,
        Result,
    },
    dust_bridging_solana::Network,
    serde::{
        de::Error,
        Deserialize,
        Deserializer,
        Serialize,
        Serializer,
    },
    solana_program::pubkey::Pubkey,
    std::{
        fs,
        path::Path,
        str::FromStr,
    },
};

pub const DEFAULT_KEYPAIR: &str = "~/.config/solana/id.json";

#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub rpc_url:         Option<String>,
    #[serde(
        deserialize_with = "network_string_de",
        serialize_with = "network_string_ser"
    )]
    pub network:         Network,
    #[serde(
        deserialize_with = "opt_pubkey_string_de",
        serialize_with = "opt_pubkey_string_ser"
    )]
    pub collection_mint: Option<Pubkey>,
    /// Overrides the program id of the network, e.g. for a local validator.
    #[serde(
        deserialize_with = "opt_pubkey_string_de",
        serialize_with = "opt_pubkey_string_ser"
    )]
    pub program_id:      Option<Pubkey>,
    #[serde(
        deserialize_with = "opt_pubkey_string_de",
        serialize_with = "opt_pubkey_string_ser"
    )]
    pub wormhole_id:     Option<Pubkey>,
    /// Keypair paying for transactions
    pub payer:           Option<String>,
    /// Keypair of the update authority or delegate
    pub authority:       Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn rpc_url(&self) -> String {
        self.rpc_url.clone().unwrap_or_else(|| match self.network {
            Network::Mainnet => "https://api.mainnet-beta.solana.com".to_owned(),
            Network::Devnet => "https://api.devnet.solana.com".to_owned(),
        })
    }

    pub fn program_id(&self) -> Pubkey {
        self.program_id.unwrap_or_else(|| self.network.program_id())
    }

    pub fn wormhole_id(&self) -> Pubkey {
        self.wormhole_id.unwrap_or_else(|| self.network.wormhole_id())
    }

    pub fn payer(&self) -> &str {
        self.payer.as_deref().unwrap_or(DEFAULT_KEYPAIR)
    }

    /// Falls back to the payer.
    pub fn authority(&self) -> &str {
        self.authority.as_deref().unwrap_or_else(|| self.payer())
    }
}

// Helper methods for stringified addresses and networks

fn opt_pubkey_string_ser<S>(k: &Option<Pubkey>, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match k {
        Some(k) => ser.serialize_str(&k.to_string()),
        None => ser.serialize_none(),
    }
}

fn opt_pubkey_string_de<'de, D>(de: D) -> Result<Option<Pubkey>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de)?
        .map(|s| Pubkey::from_str(&s).map_err(D::Error::custom))
        .transpose()
}

fn network_string_ser<S>(network: &Network, ser: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    ser.serialize_str(match network {
        Network::Mainnet => "mainnet",
        Network::Devnet => "devnet",
    })
}

fn network_string_de<'de, D>(de: D) -> Result<Network, D::Error>
where
    D: Deserializer<'de>,
{
    let network_string = String::deserialize(de)?;
    Network::from_str(&network_string).map_err(D::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanity() -> Result<()> {
        let initial = Config {
            rpc_url:         Some("http://localhost:8899".to_owned()),
            network:         Network::Mainnet,
            collection_mint: Some(Pubkey::new_from_array([42u8; 32])),
            program_id:      None,
            wormhole_id:     None,
            payer:           Some("~/wallets/payer.json".to_owned()),
            authority:       None,
        };

        let serialized = serde_yaml::to_string(&initial)?;
        let deserialized: Config = serde_yaml::from_str(&serialized)?;

        assert_eq!(initial, deserialized);
        Ok(())
    }

    #[test]
    fn defaults() -> Result<()> {
        let config: Config = serde_yaml::from_str(
            "collection_mint: 6XxjKYFbcndh2gDcsUrmZgVEsoDxXMnfsaGY6fpTJzNr\n",
        )?;

        assert_eq!(Network::Devnet, config.network);
        assert_eq!("https://api.devnet.solana.com", config.rpc_url());
        assert_eq!(Network::Devnet.program_id(), config.program_id());
        assert_eq!(DEFAULT_KEYPAIR, config.authority());
        Ok(())
    }

    #[test]
    fn bad_network() {
        assert!(serde_yaml::from_str::<Config>("network: testnet\n").is_err());
    }
}
