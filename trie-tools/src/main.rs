use std::path::{Path, PathBuf};
use structopt::StructOpt;

use predictspell::trie::{default_search_key, identity_search_key, Trie, TrieBuilder};
use predictspell::wordlist::{parse_wordlist_file, WordList};

#[derive(Debug, StructOpt)]
#[structopt(name = "trie-tools", about = "Weighted lexicon trie toolkit.")]
enum Opts {
    #[structopt(about = "Compile word lists into a trie model")]
    Build {
        #[structopt(
            long,
            default_value = "default",
            possible_values = &["default", "identity"],
            help = "Search key function"
        )]
        key: String,

        #[structopt(short, long, parse(from_os_str), help = "Output model path")]
        output: PathBuf,

        #[structopt(parse(from_os_str), required = true)]
        wordlists: Vec<PathBuf>,
    },

    #[structopt(about = "Print statistics for a trie model")]
    Info {
        #[structopt(parse(from_os_str))]
        path: PathBuf,
    },
}

fn build(key: &str, output: &Path, wordlists: &[PathBuf]) -> Result<(), std::io::Error> {
    let mut wordlist = WordList::new();

    for path in wordlists {
        println!("Reading {:?}...", path);
        parse_wordlist_file(&mut wordlist, path).map_err(|e| e.into_io_error())?;
    }

    println!(
        "Building trie from {} word-forms (total weight {})...",
        wordlist.len(),
        wordlist.total_weight()
    );

    let builder = match key {
        "identity" => TrieBuilder::new().key_function(identity_search_key),
        _ => TrieBuilder::new().key_function(default_search_key),
    };
    let trie = builder.build(&wordlist).map_err(|e| e.into_io_error())?;

    trie.save(output).map_err(|e| e.into_io_error())?;
    println!("Wrote to {:?}.", output);

    Ok(())
}

fn info(path: &Path) -> Result<(), std::io::Error> {
    let trie = Trie::from_path(path).map_err(|e| e.into_io_error())?;

    println!("Total weight: {}", trie.total_weight);
    println!("Max weight: {}", trie.root.weight());
    println!(
        "{}",
        serde_json::to_string_pretty(&trie.stats()).map_err(std::io::Error::from)?
    );

    Ok(())
}

fn main() -> Result<(), std::io::Error> {
    pretty_env_logger::init();

    let opts = Opts::from_args();

    match opts {
        Opts::Build {
            key,
            output,
            wordlists,
        } => build(&key, &output, &wordlists),
        Opts::Info { path } => info(&path),
    }
}
