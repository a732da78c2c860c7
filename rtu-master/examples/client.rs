use std::error::Error;
use std::time::Duration;

use rtu_master::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    // Create a client, the port is opened explicitly
    let client = RtuClient::serial(
        &path,
        SerialSettings::default(),
        ClientConfig::default().with_decode(AppDecodeLevel::DataValues.into()),
    );
    client.open().await?;

    let param = RequestParam::new(UnitId::new(1), Duration::from_secs(1));

    for (index, value) in client
        .read_coils(param, AddressRange::try_from(0, 10)?)
        .await?
        .iter()
        .enumerate()
    {
        println!("index: {index} value: {value}");
    }

    let value = client.read_holding_register(param, 0x000B).await?;
    println!("holding register 11: {value}");

    client.close().await;
    Ok(())
}
