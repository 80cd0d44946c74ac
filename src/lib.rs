#![allow(clippy::too_many_arguments)]
#[macro_use]
extern crate num_derive;

pub mod binary_reader;
pub mod binary_writer;
pub mod bool_coder;
pub mod bool_decoder;
pub mod cabac_contexts;
pub mod common;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod residual;
pub mod scan;
pub mod slice_decoder;
pub mod slice_header;
pub mod syntax;
pub mod trace;
pub mod wpp;

pub use bool_decoder::{BinDecoder, CabacEngine, EngineState};
pub use context::{ContextModel, ContextSet, ContextStore, InitType};
pub use diagnostics::{Diagnostic, DiagnosticSink, StderrSink};
pub use error::{Error, Result};
pub use slice_decoder::SliceEntropyDecoder;
pub use slice_header::{SliceEntropyParams, SliceType};
pub use syntax::SyntaxDecoder;
