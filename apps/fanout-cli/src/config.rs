/// One entry in the built-in endpoint catalog
#[derive(Debug, Clone)]
pub struct NetworkInfo {
    /// Name the operator passes to `--network`
    pub friendly_name: &'static str,
    /// Public JSON-RPC endpoint for the network
    pub endpoint_url: &'static str,
    /// Chain id stamped into every transaction sent there
    pub chain_id: u64,
}

/// Built-in networks, in display order
pub fn builtin_networks() -> Vec<NetworkInfo> {
    vec![
        NetworkInfo {
            friendly_name: "mainnet",
            endpoint_url: "https://eth.llamarpc.com",
            chain_id: 1,
        },
        NetworkInfo {
            friendly_name: "sepolia",
            endpoint_url: "https://ethereum-sepolia-rpc.publicnode.com",
            chain_id: 11155111,
        },
        NetworkInfo {
            friendly_name: "holesky",
            endpoint_url: "https://ethereum-holesky-rpc.publicnode.com",
            chain_id: 17000,
        },
        NetworkInfo {
            friendly_name: "local",
            endpoint_url: "http://127.0.0.1:8545",
            chain_id: 31337,
        },
    ]
}

/// Look up a catalog entry by name, case-insensitively
pub fn find_network(name: &str) -> Option<NetworkInfo> {
    builtin_networks()
        .into_iter()
        .find(|network| network.friendly_name.eq_ignore_ascii_case(name))
}
