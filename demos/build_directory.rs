//! Builds the full international station directory and writes it to
//! data/stations.csv without downloading any observations.

use mesonet::{Mesonet, MesonetError, Network};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), MesonetError> {
    env_logger::init();

    let client = Mesonet::new().await?;

    let directory = client
        .build_directory()
        .networks(&Network::all_asos())
        .station_list(PathBuf::from("data/stations.csv"))
        .call()
        .await?;

    println!(
        "Discovered {} stations across {} networks",
        directory.len(),
        Network::all_asos().len()
    );
    Ok(())
}
