// Copyright 2022-2023 VMware, Inc.
// SPDX-License-Identifier: BSD-2-Clause

//! The petri-checker binary's command-line interface.

use biodivine_lib_bdd::Bdd;
use clap::Args;
use codespan_reporting::{
    files::SimpleFile,
    term::{
        self as terminal,
        termcolor::{ColorChoice, StandardStream},
    },
};
use petri::parser::{parse_error_diagnostic, parse_term};
use petri::pnml;
use petri::syntax::CtlTerm;
use std::{fs, process};
use symbolic::closure::closure;
use symbolic::ctl::{CtlEvaluator, Model};
use symbolic::encoding::Context;

#[derive(clap::ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ColorOutput {
    Never,
    Auto,
    Always,
}

#[derive(Args, Clone, Debug, PartialEq, Eq)]
struct CheckArgs {
    /// CTL formula to evaluate against the initial states (may be repeated)
    #[arg(long)]
    formula: Vec<String>,

    /// Fairness constraint, as a CTL state formula; registered before any
    /// `--formula` is evaluated (may be repeated)
    #[arg(long)]
    fair: Vec<String>,

    /// File name for a .pnml file
    file: String,
}

#[derive(clap::Subcommand, Clone, Debug, PartialEq, Eq)]
enum Command {
    /// Parse and re-print a PNML net (for debugging)
    Print {
        /// File name for a .pnml file
        file: String,
    },
    /// Compute the reachable state space of a net
    Reach {
        /// File name for a .pnml file
        file: String,
    },
    /// Compute the reachable state space and evaluate CTL formulas
    Check(CheckArgs),
}

impl Command {
    fn file(&self) -> &str {
        match self {
            Command::Print { file } => file,
            Command::Reach { file } => file,
            Command::Check(CheckArgs { file, .. }) => file,
        }
    }
}

#[derive(clap::Parser, Debug)]
#[command(about, long_about=None)]
/// Entrypoint for the petri-checker binary, including all commands.
pub struct App {
    #[arg(value_enum, long, default_value_t = ColorOutput::Auto)]
    /// Control color output. Auto disables colors with TERM=dumb or
    /// NO_COLOR=true.
    color: ColorOutput,

    #[command(subcommand)]
    /// Command to run
    command: Command,
}

impl App {
    /// Run the application.
    pub fn exec(self) {
        let file = fs::read_to_string(self.command.file()).expect("could not read input file");
        let files = SimpleFile::new(self.command.file().to_string(), &file);

        let writer = StandardStream::stderr(match &self.color {
            ColorOutput::Never => ColorChoice::Never,
            ColorOutput::Always => ColorChoice::Always,
            ColorOutput::Auto => ColorChoice::Auto,
        });
        let config = codespan_reporting::term::Config {
            start_context_lines: 3,
            end_context_lines: 3,
            ..Default::default()
        };

        let net = match pnml::parse(&file) {
            Ok(net) => net,
            Err(err) => {
                let diagnostic = err.diagnostic(());
                terminal::emit(&mut writer.lock(), &config, &files, &diagnostic).unwrap();
                process::exit(1);
            }
        };
        eprintln!(
            "read Petri net: {} places, {} transitions",
            net.num_places(),
            net.num_transitions()
        );

        if let Command::Print { .. } = self.command {
            println!("{net}");
            return;
        }

        let context = Context::new(net.num_places());
        let mut model = Model::from_net(&context, &net).unwrap_or_else(|err| {
            eprintln!("{err}");
            process::exit(1);
        });
        let init = context
            .encode_marking(net.initial_marking())
            .unwrap_or_else(|err| {
                eprintln!("{err}");
                process::exit(1);
            });
        eprintln!("initial states:   {}", context.satcount(&init));

        let reachable = closure(&context, &init, model.transitions());
        println!("reachable states: {}", context.satcount(&reachable));

        if let Command::Check(ref args) = self.command {
            // fairness sets are state sets; evaluate them before any
            // constraint is registered
            let fairness: Vec<Bdd> = {
                let eval = CtlEvaluator::new(&context, &net, &model);
                args.fair
                    .iter()
                    .map(|s| eval_or_exit(&eval, s, &writer, &config))
                    .collect()
            };
            for constraint in fairness {
                model.add_fairness(constraint);
            }

            let eval = CtlEvaluator::new(&context, &net, &model);
            for s in &args.formula {
                let states = eval_or_exit(&eval, s, &writer, &config);
                if context.subset(&init, &states) {
                    println!("{s}: formula HOLDS in all initial states");
                } else {
                    println!("{s}: formula DOES NOT HOLD in all initial states");
                }
            }
        }
    }
}

/// Parse a formula given on the command line and evaluate it, reporting a
/// diagnostic against the formula text itself on failure.
fn eval_or_exit(
    eval: &CtlEvaluator,
    formula: &str,
    writer: &StandardStream,
    config: &codespan_reporting::term::Config,
) -> Bdd {
    let term: CtlTerm = match parse_term(formula) {
        Ok(term) => term,
        Err(err) => {
            let files = SimpleFile::new("--formula".to_string(), formula);
            let diagnostic = parse_error_diagnostic((), &err);
            terminal::emit(&mut writer.lock(), config, &files, &diagnostic).unwrap();
            process::exit(1);
        }
    };
    eval.eval(&term).unwrap_or_else(|err| {
        eprintln!("{err}");
        process::exit(1);
    })
}
