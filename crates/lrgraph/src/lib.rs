//! Canonical LR item graphs, parse tables and a table-driven parser.
//!
//! ```
//! use lrgraph::{
//!     graph::{ItemGraph, LR1},
//!     grammar::Grammar,
//!     parser::Parser,
//!     samples,
//!     table::ParseTable,
//!     token::Token,
//! };
//!
//! let g = Grammar::define(samples::assign).unwrap();
//! let graph = ItemGraph::<LR1>::build(&g);
//! let table = ParseTable::generate(&graph);
//! assert!(!table.has_conflicts());
//!
//! let id = g.terminal_by_label("id").unwrap();
//! let mut tokens = vec![Token::new(id, Some("x".to_owned()))].into_iter().peekable();
//! let tree = Parser::new(&g, &table).parse(&mut tokens).unwrap().unwrap();
//! assert_eq!(tree.display(&g).to_string(), r#"S(R(L(id="x")))"#);
//! ```

pub mod first_sets;
pub mod grammar;
pub mod graph;
pub mod interner;
pub mod item;
pub mod parser;
pub mod samples;
pub mod stack;
pub mod table;
pub mod token;
pub mod tree;
pub mod util;
