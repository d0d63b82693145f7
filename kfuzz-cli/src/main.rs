//! Entrypoint for CLI
use std::{env, fs, path::Path, process};

use kfuzz::{blob::BlobView, lex::Lexer, IMPL_VERSION};
use kfuzz_cli::{AppError, BridgeConf, ControlFile, CONF_ENV};
use log::{error, info, trace};

static USAGE: &str = r#"
usage: kfuzz-bridge PROGRAM TARGET SEED

arguments:
    PROGRAM   Input description, either a file path or the text itself
    TARGET    Name of the fuzz target to invoke
    SEED      File of random bytes used to fill field contents

environment:
    KFUZZ_CONF    YAML configuration file
    RUST_LOG      Log level, trace also dumps the token stream

examples:
    kfuzz-bridge "buf { arr[u8, 64] } args { ptr[buf], u64 }" test_parse /dev/urandom
    kfuzz-bridge input.kfz test_parse seed.bin
"#;

fn main() {
    if let Err(err) = simple_logger::SimpleLogger::new().env().init() {
        eprintln!("failed to install logger: {err}");
    }

    let Some(args) = parse_args() else {
        print_usage();
        // FreeBSD EX_USAGE (64)
        process::exit(64)
    };

    if let Err(err) = run(args) {
        error!("{err}");
        process::exit(1)
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let conf = BridgeConf::from_env()?;
    let source = read_program(&args.program)?;

    dump_tokens(&source);

    let blob = kfuzz::compile_with_seed(&source, &args.seed_path, &conf.kfuzz).map_err(|err| {
        error!("compile error\n{}", err.render(&source));
        err
    })?;
    info!("compiled {} bytes", blob.len());

    if conf.dump {
        info!("blob layout\n{}", BlobView::decode(&blob)?);
    }

    let control = ControlFile::new(&conf.control_root, &args.target)?;
    control.write_blob(&blob)
}

/// The program argument names a file when one exists at that path,
/// otherwise it is the program text.
fn read_program(arg: &str) -> Result<String, AppError> {
    let path = Path::new(arg);
    if path.is_file() {
        info!("reading program from {}", path.display());
        Ok(fs::read_to_string(path)?)
    } else {
        Ok(arg.to_string())
    }
}

fn dump_tokens(source: &str) {
    if !log::log_enabled!(log::Level::Trace) {
        return;
    }

    trace!("offset | len | token");
    for token in Lexer::new(source) {
        let offset = token.span.index;
        let len = token.span.size;
        let kind = format!("{:?}", token.kind); // cannot format debug print {:?} into columns
        let fragment = token.span.fragment(source);
        trace!("{offset:6}:{len: <3} {kind: <20} \"{fragment}\"");
    }
}

fn parse_args() -> Option<Args> {
    let mut args = env::args().skip(1);

    let parsed = Args {
        program: args.next()?,
        target: args.next()?,
        seed_path: args.next()?,
    };

    // Trailing arguments are a usage error.
    match args.next() {
        Some(_) => None,
        None => Some(parsed),
    }
}

fn print_usage() {
    println!("kfuzz-bridge v{IMPL_VERSION}");
    println!("{USAGE}");
    println!("configuration is read from ${CONF_ENV} when set");
}

struct Args {
    /// Program text or path
    program: String,
    target: String,
    seed_path: String,
}
