//! Command-line Modbus RTU master

use std::num::ParseIntError;
use std::str::FromStr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use rtu_master::prelude::*;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("{0}")]
    BadRange(#[from] InvalidRange),
    #[error("{0}")]
    BadInt(#[from] ParseIntError),
    #[error("bad character in bit string: {0}")]
    BadCharInBitString(char),
    #[error("hex data must have an even number of digits: {0}")]
    OddHexString(String),
    #[error("{0}")]
    Request(#[from] RequestError),
}

impl From<InvalidRequest> for Error {
    fn from(err: InvalidRequest) -> Self {
        Error::Request(err.into())
    }
}

#[derive(Parser)]
#[command(name = "rtu-master-client")]
#[command(about = "A command line program for making Modbus RTU requests over a serial port")]
#[command(version)]
struct Cli {
    #[arg(long, help = "The serial port, e.g. /dev/ttyUSB0 or COM3")]
    port: String,

    #[arg(short = 'b', long, default_value = "9600", help = "The baud rate")]
    baud: u32,

    #[arg(long, value_enum, default_value = "none", help = "The parity")]
    parity: ParityArg,

    #[arg(long, value_enum, default_value = "1", help = "The number of stop bits")]
    stop_bits: StopBitsArg,

    #[arg(short = 'i', long, default_value = "1", help = "The unit id of the Modbus slave")]
    id: u8,

    #[arg(short = 'p', long, help = "Optional polling period in milliseconds")]
    period: Option<u64>,

    #[arg(long, default_value = "100", help = "Delay between request and response read in milliseconds")]
    settle: u64,

    #[arg(short = 't', long, default_value = "1000", help = "Response timeout in milliseconds")]
    timeout: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, ValueEnum)]
enum ParityArg {
    None,
    Odd,
    Even,
}

impl From<ParityArg> for Parity {
    fn from(from: ParityArg) -> Self {
        match from {
            ParityArg::None => Parity::None,
            ParityArg::Odd => Parity::Odd,
            ParityArg::Even => Parity::Even,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StopBitsArg {
    #[value(name = "1")]
    One,
    #[value(name = "2")]
    Two,
}

impl From<StopBitsArg> for StopBits {
    fn from(from: StopBitsArg) -> Self {
        match from {
            StopBitsArg::One => StopBits::One,
            StopBitsArg::Two => StopBits::Two,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(name = "rc", about = "read coils")]
    ReadCoils(ReadArgs),

    #[command(name = "rdi", about = "read discrete inputs")]
    ReadDiscreteInputs(ReadArgs),

    #[command(name = "rhr", about = "read holding registers")]
    ReadHoldingRegisters(ReadArgs),

    #[command(name = "rir", about = "read input registers")]
    ReadInputRegisters(ReadArgs),

    #[command(name = "wsc", about = "write single coil")]
    WriteSingleCoil(WriteSingleCoilArgs),

    #[command(name = "wsr", about = "write single register")]
    WriteSingleRegister(WriteSingleRegisterArgs),

    #[command(name = "wmc", about = "write multiple coils")]
    WriteMultipleCoils(WriteMultipleCoilsArgs),

    #[command(name = "wmr", about = "write multiple registers")]
    WriteMultipleRegisters(WriteMultipleRegistersArgs),

    #[command(name = "res", about = "read exception status")]
    ReadExceptionStatus,

    #[command(name = "echo", about = "diagnostics return query data")]
    Echo(EchoArgs),
}

#[derive(Args)]
struct ReadArgs {
    #[arg(short = 's', long, help = "the starting address")]
    start: u16,

    #[arg(short = 'q', long, help = "quantity of values")]
    quantity: u16,
}

#[derive(Args)]
struct WriteSingleCoilArgs {
    #[arg(short = 'i', long, help = "the address of the coil")]
    index: u16,

    #[arg(short = 'v', long, help = "the value of the coil (true or false)")]
    value: bool,
}

#[derive(Args)]
struct WriteSingleRegisterArgs {
    #[arg(short = 'i', long, help = "the address of the register")]
    index: u16,

    #[arg(short = 'v', long, help = "the value of the register")]
    value: u16,
}

#[derive(Args)]
struct WriteMultipleCoilsArgs {
    #[arg(short = 's', long, help = "the starting address of the coils")]
    start: u16,

    #[arg(
        short = 'v',
        long,
        help = "the values of the coils specified as a string of 1 and 0 (e.g. 10100011)"
    )]
    values: String,
}

#[derive(Args)]
struct WriteMultipleRegistersArgs {
    #[arg(short = 's', long, help = "the starting address of the registers")]
    start: u16,

    #[arg(
        short = 'v',
        long,
        help = "the values of the registers specified as a comma delimited list (e.g. 1,4,7)"
    )]
    values: String,
}

#[derive(Args)]
struct EchoArgs {
    #[arg(short = 'd', long, help = "the data to echo as hex (e.g. 01ab)")]
    data: String,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    if let Err(ref e) = run().await {
        println!("error: {e}");
    }

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = SerialSettings {
        baud_rate: cli.baud,
        parity: cli.parity.into(),
        stop_bits: cli.stop_bits.into(),
        ..SerialSettings::default()
    };

    let config = ClientConfig::default()
        .with_settle_delay(Duration::from_millis(cli.settle))
        .with_decode(AppDecodeLevel::DataValues.into());

    let client = RtuClient::serial(&cli.port, settings, config);
    client.open().await?;

    let params = RequestParam::new(UnitId::new(cli.id), Duration::from_millis(cli.timeout));

    match cli.period {
        None => run_command(&cli.command, &client, params)
            .await
            .map_err(Into::into),
        Some(period_ms) => {
            let period = Duration::from_millis(period_ms);
            loop {
                if let Err(err) = run_command(&cli.command, &client, params).await {
                    tracing::warn!("{err}");
                }
                tokio::time::sleep(period).await
            }
        }
    }
}

async fn run_command(
    command: &Command,
    client: &RtuClient,
    params: RequestParam,
) -> Result<(), Error> {
    match command {
        Command::ReadCoils(args) => {
            let range = AddressRange::try_from(args.start, args.quantity)?;
            print_values(range.start, client.read_coils(params, range).await?);
        }
        Command::ReadDiscreteInputs(args) => {
            let range = AddressRange::try_from(args.start, args.quantity)?;
            print_values(range.start, client.read_discrete_inputs(params, range).await?);
        }
        Command::ReadHoldingRegisters(args) => {
            let range = AddressRange::try_from(args.start, args.quantity)?;
            print_values(range.start, client.read_holding_registers(params, range).await?);
        }
        Command::ReadInputRegisters(args) => {
            let range = AddressRange::try_from(args.start, args.quantity)?;
            print_values(range.start, client.read_input_registers(params, range).await?);
        }
        Command::WriteSingleCoil(args) => {
            let indexed = Indexed::new(args.index, args.value);
            client.write_single_coil(params, indexed).await?;
        }
        Command::WriteSingleRegister(args) => {
            let indexed = Indexed::new(args.index, args.value);
            client.write_single_register(params, indexed).await?;
        }
        Command::WriteMultipleCoils(args) => {
            let values = parse_bit_values(&args.values)?;
            let write_multiple = WriteMultiple::from(args.start, values)?;
            client.write_multiple_coils(params, write_multiple).await?;
        }
        Command::WriteMultipleRegisters(args) => {
            let values = parse_register_values(&args.values)?;
            let write_multiple = WriteMultiple::from(args.start, values)?;
            client.write_multiple_registers(params, write_multiple).await?;
        }
        Command::ReadExceptionStatus => {
            let status = client.read_exception_status(params).await?;
            println!("status: {status:#010b}");
        }
        Command::Echo(args) => {
            let data = parse_hex(&args.data)?;
            let echo = client.diagnostics_echo(params, &data).await?;
            if echo != data {
                println!("echo differs from request");
            }
            println!("{echo:02X?}");
        }
    }
    Ok(())
}

fn print_values<T: std::fmt::Display>(start: u16, values: Vec<T>) {
    for (offset, value) in values.iter().enumerate() {
        println!("index: {} value: {value}", start as usize + offset)
    }
}

fn parse_bit_values(values_str: &str) -> Result<Vec<bool>, Error> {
    let mut values: Vec<bool> = Vec::new();
    for c in values_str.chars().rev() {
        match c {
            '0' => values.push(false),
            '1' => values.push(true),
            _ => return Err(Error::BadCharInBitString(c)),
        }
    }
    Ok(values)
}

fn parse_register_values(values_str: &str) -> Result<Vec<u16>, ParseIntError> {
    let mut values: Vec<u16> = Vec::new();
    for value in values_str.split(',') {
        values.push(u16::from_str(value)?);
    }
    Ok(values)
}

fn parse_hex(data: &str) -> Result<Vec<u8>, Error> {
    if data.len() % 2 != 0 {
        return Err(Error::OddHexString(data.to_string()));
    }
    let mut bytes = Vec::with_capacity(data.len() / 2);
    for i in (0..data.len()).step_by(2) {
        let digits = data
            .get(i..i + 2)
            .ok_or_else(|| Error::OddHexString(data.to_string()))?;
        bytes.push(u8::from_str_radix(digits, 16)?);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(stop_bits: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from([
            "rtu-master-client",
            "--port",
            "/dev/ttyUSB0",
            "--stop-bits",
            stop_bits,
            "res",
        ])
    }

    #[test]
    fn stop_bits_accept_only_one_or_two() {
        assert_eq!(parse("1").unwrap().stop_bits, StopBitsArg::One);
        assert_eq!(
            StopBits::from(parse("2").unwrap().stop_bits),
            StopBits::Two
        );
        assert_eq!(
            parse("3").err().map(|err| err.kind()),
            Some(clap::error::ErrorKind::InvalidValue)
        );
    }

    #[test]
    fn bit_strings_are_read_right_to_left() {
        assert_eq!(
            parse_bit_values("10100011").unwrap(),
            vec![true, true, false, false, false, true, false, true]
        );
        assert!(matches!(
            parse_bit_values("10x"),
            Err(Error::BadCharInBitString('x'))
        ));
    }

    #[test]
    fn register_lists_are_comma_separated() {
        assert_eq!(parse_register_values("1,4,7").unwrap(), vec![1, 4, 7]);
        assert!(parse_register_values("1,,7").is_err());
    }

    #[test]
    fn hex_data_is_parsed_in_pairs() {
        assert_eq!(parse_hex("01ab").unwrap(), vec![0x01, 0xAB]);
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert!(matches!(parse_hex("abc"), Err(Error::OddHexString(_))));
        assert!(matches!(parse_hex("zz"), Err(Error::BadInt(_))));
    }
}
