mod lexer;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use lrgraph::{
    grammar::Grammar,
    graph::{ItemGraph, Strategy, LR0, LR1},
    parser::Parser as LRParser,
    samples,
    table::ParseTable,
};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The bundled grammar to build the automaton for.
    #[arg(long, value_enum, default_value_t = SampleGrammar::Expr)]
    grammar: SampleGrammar,

    /// The construction of the parse table.
    #[arg(long, value_enum, default_value_t = Variant::Slr)]
    variant: Variant,

    /// Print the canonical collection of item sets.
    #[arg(long)]
    dump_graph: bool,

    /// Print the parse table.
    #[arg(long)]
    dump_table: bool,

    /// The input to be parsed.
    input: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum SampleGrammar {
    /// `E := E plus T | T ; T := T star F | F ; F := open E close | id`
    Expr,
    /// `S := L eq R | R ; L := star R | id ; R := L`
    Assign,
}

#[derive(Debug, Copy, Clone, PartialEq, ValueEnum)]
enum Variant {
    /// LR(0) item sets, reductions on FOLLOW sets.
    Slr,
    /// Canonical LR(1) item sets.
    Lr1,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    let grammar = match args.grammar {
        SampleGrammar::Expr => Grammar::define(samples::expr),
        SampleGrammar::Assign => Grammar::define(samples::assign),
    }
    .context("failed to define the grammar")?;
    tracing::trace!("grammar:\n{}", grammar);

    match args.variant {
        Variant::Slr => process::<LR0>(&args, &grammar),
        Variant::Lr1 => process::<LR1>(&args, &grammar),
    }
}

fn process<S: Strategy>(args: &Args, grammar: &Grammar) -> anyhow::Result<()> {
    let s = Instant::now();
    let graph = ItemGraph::<S>::build(grammar);
    tracing::info!("build_graph: {:?} elapsed", s.elapsed());

    let s = Instant::now();
    let table = ParseTable::generate(&graph);
    tracing::info!("generate_table: {:?} elapsed", s.elapsed());

    if args.dump_graph {
        println!("{}", graph.display());
    }
    if args.dump_table {
        println!("{}", table.display(grammar));
    }

    let conflicted: Vec<_> = table.conflicted_states().collect();
    if !conflicted.is_empty() {
        println!(
            "[warning] The following states have conflicting actions: {:?}",
            conflicted
        );
    }

    if let Some(input) = &args.input {
        let tree = LRParser::new(grammar, &table)
            .parse(&mut lexer::tokens(grammar, input))
            .with_context(|| anyhow::anyhow!("errored during parsing {:?}", input))?;
        match tree {
            Some(tree) => println!("{}", tree.display(grammar)),
            None => println!("(no reduction)"),
        }
    }

    Ok(())
}
