#![deny(clippy::unwrap_used)]

use clap::{arg, command, value_parser};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::exit;

use v8145ctrl::device::{CHANNEL, MODEL, VENDOR};
use v8145ctrl::measurement::Measurement;
use v8145ctrl::proto::conv::pretty_ts;
use v8145ctrl::proto::{self, Result};
use v8145ctrl::serial::{SerialParams, DEFAULT_SERIALCOMM};
use v8145ctrl::{Device, Host, DEFAULT_TTY};

#[tokio::main]
async fn main() -> tokio_serial::Result<()> {
    let matches = command!() // requires `cargo` feature
        .arg(
            arg!(
                -p --device <PORT> "Port for USB adapter"
            )
            .default_value(DEFAULT_TTY)
            .required(false)
            .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(
                -c --serialcomm <SERIALCOMM> "Serial parameters, e.g. 9600/8n1/flow=1"
            )
            .default_value(DEFAULT_SERIALCOMM)
            .required(false),
        )
        .arg(arg!(
            -d --debug ... "Turn debugging information on"
        ))
        .subcommand(clap::Command::new("ident").about("Device identification"))
        .subcommand(
            clap::Command::new("mea")
                .about("Get measurements")
                .arg(
                    arg!(-n --samples <COUNT> "Number of samples to take")
                        .default_value("1")
                        .value_parser(value_parser!(u64).range(1..)),
                )
                .arg(arg!(
                    --"watch" "Poll measurements until interrupted"
                )),
        )
        .subcommand(clap::Command::new("reset").about("Reset device"))
        .subcommand_required(true)
        .get_matches();

    init_logging(matches.get_count("debug"));

    match handle_args(&matches).await {
        Ok(()) => {}
        Err(e) => {
            let port = matches
                .get_one::<PathBuf>("device")
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            match e {
                proto::ProtoError::Serial(err) => {
                    if err.kind() == tokio_serial::ErrorKind::NoDevice
                        || matches!(err.kind(), tokio_serial::ErrorKind::Io(ErrorKind::NotFound))
                    {
                        eprintln!("{}: File not found", port);
                    } else {
                        eprintln!("I/O Error: {} [device: {}]", err, port,);
                    }
                    exit(-1);
                }
                proto::ProtoError::Io(err) => {
                    if err.kind() == ErrorKind::NotFound {
                        eprintln!("{}: File not found", port);
                    } else {
                        eprintln!("I/O Error: {} [device: {}]", err, port,);
                    }
                    exit(-1);
                }
                proto::ProtoError::Timeout => {
                    eprintln!("Device did not accept the command in time, aborting!");
                    exit(-1);
                }
                proto::ProtoError::SerialComm(err) => {
                    eprintln!("Invalid serial parameters: {}", err);
                    exit(-1);
                }
                proto::ProtoError::Abort => {
                    eprintln!("Failed to communicate with device, aborting!");
                    exit(-1);
                }
                err => {
                    eprintln!("Error: {}", err);
                    exit(-1);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(level: u8) {
    let filter = match level {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format_timestamp_millis()
        .init();
}

async fn handle_args(matches: &clap::ArgMatches) -> Result<()> {
    let params: SerialParams = matches
        .get_one::<String>("serialcomm")
        .map(String::as_str)
        .unwrap_or(DEFAULT_SERIALCOMM)
        .parse()?;

    if let Some(port_path) = matches.get_one::<PathBuf>("device") {
        let mut device = Device::new(port_path.to_string_lossy(), &params)?;

        eprintln!("Connected to: {} ({})\n", port_path.display(), params);

        match matches.subcommand() {
            Some(("ident", _args)) => {
                let ident = device.ident().await?;
                println!("Vendor:   {}", VENDOR);
                println!("Model:    {}", MODEL);
                println!("Channel:  {}", CHANNEL);
                println!("Response: {}", ident.as_deref().unwrap_or("<none>"));
            }

            Some(("mea", args)) => {
                let watch = args.get_flag("watch");
                let samples = args.get_one::<u64>("samples").copied().unwrap_or(1);

                device.ident().await?;
                device.set_limit_samples(if watch { None } else { Some(samples) });

                let mut host = PrintHost::default();
                let interrupted = tokio::select! {
                    res = device.acquire(&mut host) => {
                        res?;
                        false
                    }
                    _ = tokio::signal::ctrl_c() => true,
                };
                if interrupted {
                    device.acquisition_stop(&mut host).await?;
                }
                eprintln!("\n{} samples", host.count);
                device.close().await?;
            }

            Some(("reset", _args)) => {
                device.reset().await?;
                println!("Device reset");
            }

            _ => {
                unreachable!("Unknown subcommand");
            }
        }
    }

    Ok(())
}

#[derive(Default)]
struct PrintHost {
    count: u64,
}

impl Host for PrintHost {
    fn register_readiness_callback(&mut self) -> Result<()> {
        Ok(())
    }

    fn deregister_readiness_callback(&mut self) -> Result<()> {
        Ok(())
    }

    fn send_sample(&mut self, measurement: Measurement) -> Result<()> {
        self.count += 1;
        pretty_value(self.count, &measurement);
        Ok(())
    }
}

fn pretty_value(idx: u64, mea: &Measurement) {
    let block1 = format!("{:>6}: {:10}", idx, mea);
    println!("{:<35} [{}]", block1, pretty_ts(&mea.ts));
}
