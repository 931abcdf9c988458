// src/bin/crypto1_trace.rs
//
// Small diagnostic tool around the cipher core: run an authentication
// setup and dump keystream, or step the tag PRNG. Useful when comparing
// against a live card trace or another implementation.

use anyhow::{bail, Context, Result};
use clap::{App, Arg};
use log::info;
use mifare_crypto1::{prng_successor, Crypto1State};

fn parse_hex<const N: usize>(name: &str, value: &str) -> Result<[u8; N]> {
    let bytes = hex::decode(value).with_context(|| format!("{} is not valid hex", name))?;
    if bytes.len() != N {
        bail!("{} must be exactly {} bytes ({} hex chars)", name, N, N * 2);
    }
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes);
    Ok(out)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let matches = App::new("crypto1_trace")
        .version(mifare_crypto1::VERSION)
        .about("Trace the Crypto1 cipher and the Mifare tag PRNG")
        .subcommand(
            App::new("keystream")
                .about("Run authentication setup and dump keystream bytes")
                .arg(
                    Arg::with_name("key")
                        .short('k')
                        .long("key")
                        .value_name("KEY")
                        .help("48-bit sector key (12 hex chars)")
                        .takes_value(true)
                        .default_value("FFFFFFFFFFFF"),
                )
                .arg(
                    Arg::with_name("uid")
                        .short('u')
                        .long("uid")
                        .value_name("UID")
                        .help("4-byte card UID (8 hex chars)")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("nonce")
                        .short('n')
                        .long("nonce")
                        .value_name("NT")
                        .help("4-byte card nonce (8 hex chars)")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("reader-nonce")
                        .short('r')
                        .long("reader-nonce")
                        .value_name("ENC_NR")
                        .help("Encrypted 4-byte reader nonce to absorb before dumping")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("count")
                        .short('c')
                        .long("count")
                        .value_name("COUNT")
                        .help("Number of keystream bytes to dump")
                        .takes_value(true)
                        .default_value("16"),
                ),
        )
        .subcommand(
            App::new("prng")
                .about("Step the 16-bit tag PRNG from a 32-bit nonce")
                .arg(
                    Arg::with_name("nonce")
                        .short('n')
                        .long("nonce")
                        .value_name("NT")
                        .help("Starting 32-bit nonce (8 hex chars)")
                        .takes_value(true)
                        .required(true),
                )
                .arg(
                    Arg::with_name("steps")
                        .short('s')
                        .long("steps")
                        .value_name("STEPS")
                        .help("Number of PRNG steps")
                        .takes_value(true)
                        .default_value("64"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("keystream", sub)) => {
            let key: [u8; 6] = parse_hex("key", sub.value_of("key").unwrap_or_default())?;
            let uid: [u8; 4] = parse_hex("uid", sub.value_of("uid").unwrap_or_default())?;
            let mut nonce: [u8; 4] =
                parse_hex("nonce", sub.value_of("nonce").unwrap_or_default())?;
            let count: usize = sub
                .value_of("count")
                .unwrap_or_default()
                .parse()
                .context("count must be a number")?;

            let plain = nonce;
            let mut state = Crypto1State::setup(&key, &uid, &mut nonce);
            info!("card nonce {} encrypts to {}", hex::encode(plain), hex::encode(nonce));
            println!("encrypted nonce: {}", hex::encode_upper(nonce));

            if let Some(enc_nr) = sub.value_of("reader-nonce") {
                let enc_nr: [u8; 4] = parse_hex("reader-nonce", enc_nr)?;
                state.absorb_reader_nonce(&enc_nr);
                println!("absorbed reader nonce {}", hex::encode_upper(enc_nr));
            }

            println!("lfsr: {:012X}", state.lfsr());
            let mut ks = vec![0u8; count];
            state.xor_bytes(&mut ks);
            println!("keystream: {}", hex::encode_upper(&ks));
        }
        Some(("prng", sub)) => {
            let nonce: [u8; 4] = parse_hex("nonce", sub.value_of("nonce").unwrap_or_default())?;
            let steps: u32 = sub
                .value_of("steps")
                .unwrap_or_default()
                .parse()
                .context("steps must be a number")?;
            let start = u32::from_be_bytes(nonce);
            println!(
                "suc{}({:08X}) = {:08X}",
                steps,
                start,
                prng_successor(start, steps)
            );
        }
        _ => {
            println!("No subcommand given. Try 'crypto1_trace keystream --help'.");
        }
    }

    Ok(())
}
