use std::error::Error;
use std::time::Duration;

use rtu_master::prelude::*;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "/dev/ttyUSB0".to_string());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let client = SyncClient::new(
        RtuClient::serial(&path, SerialSettings::default(), ClientConfig::default()),
        runtime.handle().clone(),
    );
    client.open()?;

    let param = RequestParam::new(UnitId::new(1), Duration::from_secs(1));

    client.write_single_register(param, Indexed::new(0x000B, 0x1234))?;
    let registers = client.read_holding_registers(param, AddressRange::try_from(0x000A, 3)?)?;
    println!("registers: {registers:?}");

    let status = client.read_exception_status(param)?;
    println!("exception status: {status:#010b}");

    client.close();
    Ok(())
}
