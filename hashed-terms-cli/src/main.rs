//! Command-line interface (CLI) for the hashed-terms store.
//!
//! This binary builds integer lists through the bulk builder and the list
//! algorithms of a [`TermStore`], runs a collection, and prints the store
//! statistics.  It is mostly useful to watch table growth and chain
//! lengths with `RUST_LOG=debug`.
//!
//! [`TermStore`]: hashed_terms::TermStore

use clap::{Parser as ClapParser, Subcommand};
use hashed_terms::{
    StoreConfig, Symbol, Term, TermAppl, TermError, TermInt, TermList, TermStore, View,
};
use std::mem;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Builds lists and prints store statistics
    Stats {
        /// Length of each list
        #[arg(short, long, default_value_t = 1000)]
        length: usize,
        /// Number of lists
        #[arg(short = 'k', long, default_value_t = 10)]
        lists: usize,
        /// Initial intern table size as a power of two
        #[arg(long, default_value_t = StoreConfig::default().table_class)]
        table_class: u32,
        /// Maximum table load in percent
        #[arg(long, default_value_t = StoreConfig::default().max_load_pct)]
        max_load: u8,
    },
    /// Prints sizes
    Sizes {},
}

fn run_stats(store: &mut TermStore, length: usize, lists: usize) -> Result<(), TermError> {
    let mut kept = store.nil::<TermList<TermInt>>();
    for k in 0..lists {
        let start = (k * length / 2) as i64;
        let list = store.list(start..start + length as i64);
        let rev = store.reverse(list)?;
        let last = store.int(-(k as i64));
        let longer = store.push_back(rev, last)?;
        let first = store.int(start);
        let shorter = store.remove_one_element(longer, first)?;
        let joined = store.concat(list, shorter)?;
        log::info!(
            "list {}: {} elements after concat",
            k,
            joined.size(store)?
        );
        if k % 2 == 0 {
            kept = store.push_front(kept, joined);
        }
    }
    store.protect(kept);
    let before = store.stats();
    let freed = store.collect();
    println!("kept {} lists, freed {} nodes", kept.size(store)?, freed);
    println!("before collection: {before:#?}");
    println!("after collection: {:#?}", store.stats());

    if let Ok(View::Cons(..)) = store.view(kept) {
        let first = kept.front(store)?;
        println!("first kept list has {} elements", first.size(store)?);
    }
    store.unprotect(kept)?;
    Ok(())
}

fn main() -> Result<(), TermError> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Stats {
            length,
            lists,
            table_class,
            max_load,
        } => {
            let mut store = TermStore::with_config(StoreConfig {
                table_class,
                max_load_pct: max_load,
                ..StoreConfig::default()
            });
            run_stats(&mut store, length, lists)?;
        }
        Commands::Sizes {} => {
            println!("Size of Term: {}", mem::size_of::<Term>());
            println!("Size of Option<Term>: {}", mem::size_of::<Option<Term>>());
            println!("Size of Symbol: {}", mem::size_of::<Symbol>());
            println!("Size of TermAppl: {}", mem::size_of::<TermAppl>());
            println!("Size of TermList: {}", mem::size_of::<TermList>());
            println!("Size of View: {}", mem::size_of::<View>());
            println!(
                "Size of Option<View>: {}",
                mem::size_of::<Option<View>>()
            );
        }
    }

    Ok(())
}
