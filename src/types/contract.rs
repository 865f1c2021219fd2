//! Contract descriptor and ABI types

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const OFFCHAIN_ENTRY_TYPE: &str = "offchain";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiParam {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
}

impl AbiEntry {
    pub fn is_offchain(&self) -> bool {
        self.kind == OFFCHAIN_ENTRY_TYPE
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.name.as_deref() == Some(name)
    }
}

/// A deployed contract: address, name, ABI and base64 off-chain code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default)]
    pub address: String,
    pub contract_name: String,
    pub abi: Vec<AbiEntry>,
    #[serde(default, rename = "offChain")]
    pub off_chain: String,
}

impl Contract {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn find_offchain(&self, name: &str) -> Option<&AbiEntry> {
        self.abi.iter().find(|e| e.is_offchain() && e.is_named(name))
    }
}

/// One positional element of an off-chain call result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffChainField {
    pub name: String,
    pub value: Value,
}
