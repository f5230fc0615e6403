// SPDX-License-Identifier: Apache-2.0

//! Decodes a JSON document into an nvlist and encodes it back to stdout.
//!
//! ```text
//! nvjson pool.json
//! echo '{"a": [{"b": 1}]}' | RUST_LOG=nvlist=trace nvjson --dump
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use nvlist::{decode_with, encode, DecodeOptions, IoReader, IoWriter, NvFlags, NvList, Value};

#[derive(Parser, Debug)]
#[command(version, about = "Round-trip a JSON document through an nvlist")]
struct Args {
    /// Input document; stdin when omitted
    file: Option<PathBuf>,

    /// Print the decoded tree to stderr
    #[arg(long)]
    dump: bool,

    /// Keep duplicate keys instead of rejecting the document
    #[arg(long)]
    no_unique: bool,

    /// Treat keys that differ only in ASCII case as the same name
    #[arg(long)]
    ignore_case: bool,

    /// Deepest allowed nesting
    #[arg(long, default_value_t = DecodeOptions::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut flags = NvFlags::empty();
    flags.set(NvFlags::NO_UNIQUE, args.no_unique);
    flags.set(NvFlags::IGNORE_CASE, args.ignore_case);
    let options = DecodeOptions {
        flags,
        max_depth: args.max_depth,
    };

    let input: Box<dyn Read> = match &args.file {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                eprintln!("Error: Unable to open file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => Box::new(io::stdin().lock()),
    };

    let nvl = match decode_with(IoReader::new(input), options) {
        Ok(nvl) => nvl,
        Err(e) => {
            eprintln!("Error: JSON decoding failed: {}", e);
            process::exit(1);
        }
    };
    log::info!("decoded {} top-level entries", nvl.len());

    if args.dump {
        dump(&nvl, 0);
    }

    if let Err(e) = encode(&nvl, IoWriter::new(io::stdout().lock())) {
        eprintln!("Error: JSON encoding failed: {}", e);
        process::exit(1);
    }
}

fn dump(nvl: &NvList, indent: usize) {
    for (name, value) in nvl {
        let pad = indent * 2;
        match value {
            Value::NvList(child) => {
                eprintln!("{:pad$}{:?} ({})", "", name, value.kind());
                dump(child, indent + 1);
            }
            Value::NvListArray(children) => {
                eprintln!("{:pad$}{:?} ({}, {} items)", "", name, value.kind(), children.len());
                for (i, child) in children.iter().enumerate() {
                    eprintln!("{:pad$}  [{}]", "", i);
                    dump(child, indent + 2);
                }
            }
            _ => eprintln!("{:pad$}{:?} ({}) = {:?}", "", name, value.kind(), value),
        }
    }
}
