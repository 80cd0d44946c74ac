use clap::Parser;
use colored::*;
use hevc_cabac::binary_reader::read_input;
use hevc_cabac::context::ContextSet;
use hevc_cabac::diagnostics::StderrSink;
use hevc_cabac::slice_header::SliceType;
use hevc_cabac::trace::*;
use std::io::{self, Write};
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a raw CABAC slice payload ("-" reads stdin)
    #[clap(short, long)]
    input: Option<String>,
    /// Slice type (I, P or B)
    #[clap(long, default_value = "I")]
    slice_type: String,
    /// Slice QP used to initialize the contexts
    #[clap(long, default_value_t = 26)]
    slice_qp: i32,
    /// Use the alternate initialization table of P and B slices
    #[clap(long)]
    cabac_init_flag: bool,
    /// Length of a slice header preceding the slice data, in bits
    #[clap(long)]
    header_bits: Option<usize>,
    /// Syntax elements to decode (NAME[=P1:P2:...][,NAME...])
    #[clap(short, long)]
    elements: Option<String>,
    /// Print the initial context states
    #[clap(long)]
    dump_contexts: bool,
}

fn main() {
    let args = Args::parse();

    let slice_type = match args.slice_type.parse::<SliceType>() {
        Ok(slice_type) => slice_type,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            process::exit(1);
        }
    };
    let config = TraceConfig {
        slice_type,
        slice_qp: args.slice_qp,
        cabac_init_flag: args.cabac_init_flag,
        header_bits: args.header_bits,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.dump_contexts {
        let contexts = ContextSet::new(config.init_type(), config.slice_qp);
        if let Err(e) = dump_contexts(&mut out, &contexts) {
            eprintln!("{}: failed to write contexts: {}", "error".red(), e);
            process::exit(1);
        }
    }

    let script = match args.elements {
        Some(script) => script,
        None => return,
    };
    let elements = match parse_elements(&script) {
        Ok(elements) => elements,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            process::exit(1);
        }
    };
    let input = match args.input {
        Some(input) => input,
        None => {
            eprintln!("{}: --elements needs an --input payload", "error".red());
            process::exit(1);
        }
    };
    let data = match read_input(&input) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{}: failed to read input: {}", "error".red(), e);
            process::exit(1);
        }
    };

    let mut sink = StderrSink;
    let trace = run_trace(&data, &config, &elements, &mut sink);
    for (element, value) in &trace.values {
        if writeln!(out, "{:?}: {}", element, value).is_err() {
            process::exit(1);
        }
    }
    if trace.overrun {
        eprintln!(
            "{}: payload ended after {} bits, trailing values are unreliable",
            "warning".yellow(),
            trace.bit_position
        );
    }
}
