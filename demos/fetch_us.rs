//! Full pipeline: discover every US ASOS station, then download one day of
//! one-minute station pressure observations into ./data.

use chrono::{TimeZone, Utc};
use mesonet::{Mesonet, MesonetError, Network, TimeWindow};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), MesonetError> {
    env_logger::init();

    let client = Mesonet::new().await?;
    let window = TimeWindow::new(
        Utc.with_ymd_and_hms(2022, 1, 15, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2022, 1, 16, 0, 0, 0).unwrap(),
    );

    let directory = client
        .build_directory()
        .networks(&Network::us_asos())
        .station_list(PathBuf::from("data/stations_US.csv"))
        .call()
        .await?;
    println!("Discovered {} stations", directory.len());

    let report = client
        .download()
        .stations(directory.stations())
        .window(window)
        .call()
        .await?;

    println!(
        "Done: {} fetched, {} exhausted, {} write failures",
        report.fetched, report.exhausted, report.write_failures
    );
    Ok(())
}
