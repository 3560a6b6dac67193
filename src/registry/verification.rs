//! Explorer endpoints for source verification.

use url::Url;

use crate::config::secrets::Secret;

/// Explorer endpoints known without configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExplorerEndpoints {
    pub name: &'static str,
    pub chain_id: u64,
    pub api_url: &'static str,
    pub browser_url: &'static str,
}

const BUILTIN_EXPLORERS: &[ExplorerEndpoints] = &[
    ExplorerEndpoints {
        name: "mainnet",
        chain_id: 1,
        api_url: "https://api.etherscan.io/api",
        browser_url: "https://etherscan.io",
    },
    ExplorerEndpoints {
        name: "goerli",
        chain_id: 5,
        api_url: "https://api-goerli.etherscan.io/api",
        browser_url: "https://goerli.etherscan.io",
    },
    ExplorerEndpoints {
        name: "sepolia",
        chain_id: 11155111,
        api_url: "https://api-sepolia.etherscan.io/api",
        browser_url: "https://sepolia.etherscan.io",
    },
    ExplorerEndpoints {
        name: "base",
        chain_id: 8453,
        api_url: "https://api.basescan.org/api",
        browser_url: "https://basescan.org",
    },
    ExplorerEndpoints {
        name: "baseSepolia",
        chain_id: 84532,
        api_url: "https://api-sepolia.basescan.org/api",
        browser_url: "https://sepolia.basescan.org",
    },
    ExplorerEndpoints {
        name: "arbitrumOne",
        chain_id: 42161,
        api_url: "https://api.arbiscan.io/api",
        browser_url: "https://arbiscan.io",
    },
    ExplorerEndpoints {
        name: "polygon",
        chain_id: 137,
        api_url: "https://api.polygonscan.com/api",
        browser_url: "https://polygonscan.com",
    },
    ExplorerEndpoints {
        name: "blast",
        chain_id: 81457,
        api_url: "https://api.blastscan.io/api",
        browser_url: "https://blastscan.io",
    },
];

/// Look up the built-in explorer for a chain.
pub fn builtin_explorer(chain_id: u64) -> Option<&'static ExplorerEndpoints> {
    BUILTIN_EXPLORERS.iter().find(|e| e.chain_id == chain_id)
}

/// Where a descriptor's endpoints came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointSource {
    BuiltIn,
    Custom,
}

/// Everything needed to talk to a network's verification API.
#[derive(Debug, Clone)]
pub struct VerificationDescriptor {
    pub network: String,
    pub chain_id: u64,
    pub api_key: Secret,
    pub api_url: Url,
    /// Browser base URL exactly as declared; checked to parse at load.
    pub browser_url: String,
    pub source: EndpointSource,
}

impl VerificationDescriptor {
    /// Explorer page for an address.
    pub fn address_url(&self, address: &str) -> String {
        format!(
            "{}/address/{}",
            self.browser_url.trim_end_matches('/'),
            address
        )
    }
}

/// Outcome of a verification lookup.
#[derive(Debug, Clone, Copy)]
pub enum Verification<'a> {
    /// Verification is switched off globally.
    Disabled,
    /// The network has no explorer API key entry.
    NotConfigured,
    Enabled(&'a VerificationDescriptor),
}

impl<'a> Verification<'a> {
    pub fn descriptor(&self) -> Option<&'a VerificationDescriptor> {
        match self {
            Verification::Enabled(descriptor) => Some(descriptor),
            _ => None,
        }
    }
}
