//! Decoding and encoding a small service config.
//!
//! Run with: cargo run --example config

use serde::{Deserialize, Serialize};
use serde_kvconf::convert::{MarshalKv, UnmarshalKv};
use serde_kvconf::{from_str, to_string, to_string_pretty};
use std::collections::BTreeMap;
use std::error::Error;
use std::num::ParseIntError;

/// A listen port with its own text form.
#[derive(Debug, Default, Clone, Copy)]
struct Port(u16);

impl UnmarshalKv for Port {
    type Error = ParseIntError;

    fn unmarshal_kv(&mut self, raw: &str) -> Result<(), Self::Error> {
        self.0 = raw.parse()?;
        Ok(())
    }
}

impl MarshalKv for Port {
    type Error = std::convert::Infallible;

    fn marshal_kv(&self) -> Result<String, Self::Error> {
        Ok(self.0.to_string())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    #[serde(with = "serde_kvconf::convert")]
    listen: Port,
    log_dir: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let data = "
    # trim the left space
    listen = 8080
    log_dir = /var/log/kvconf.log # trim this";

    println!("======= decode =======");

    let config: Config = from_str(data)?;
    println!(
        "struct: listen={}, log_dir={}",
        config.listen.0, config.log_dir
    );

    let map: BTreeMap<String, String> = from_str(data)?;
    println!(
        "map: listen={}, log_dir={}",
        map["listen"], map["log_dir"]
    );

    println!("======= encode =======");

    println!("struct:\n{}", to_string(&config)?);
    println!("map:\n{}", to_string_pretty(&map)?);

    Ok(())
}
