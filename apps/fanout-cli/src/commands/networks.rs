use crate::config::builtin_networks;
use crate::error::CliResult;

/// Print the built-in endpoint catalog
pub fn execute() -> CliResult<()> {
    println!("🌐 Available networks:\n");
    for network in builtin_networks() {
        println!(
            "  {:<10} chain id {:<10} {}",
            network.friendly_name, network.chain_id, network.endpoint_url
        );
    }
    println!("\nPick one with `fanout send --network <name>`, or pass --rpc-url and --chain-id.");
    Ok(())
}
