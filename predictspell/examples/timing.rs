use std::time::Instant;

use predictspell::correction::{suggest_word, SearchConfig};
use predictspell::trie::{build_trie, default_search_key, Trie};
use predictspell::wordlist::{parse_wordlist_file, WordList};

fn time_suggest(trie: &Trie, word: &str, cfg: &SearchConfig) -> String {
    let now = Instant::now();
    let res = suggest_word(trie, &default_search_key(word), cfg);
    let then = now.elapsed();

    let out: Vec<String> = res
        .iter()
        .map(|x| format!("    {:>8.3}  {:>8}  {}", x.cost(), x.weight(), x.value()))
        .collect();

    format!(
        "{} -> {} results in {}.{:03}s\n{}",
        word,
        res.len(),
        then.as_secs(),
        then.subsec_millis(),
        out.join("\n")
    )
}

fn main() {
    let mut args = std::env::args().skip(1);
    let path = match args.next() {
        Some(v) => v,
        None => {
            eprintln!("Usage: timing WORDLIST WORD...");
            return;
        }
    };

    let mut wordlist = WordList::new();
    if let Err(e) = parse_wordlist_file(&mut wordlist, &path) {
        eprintln!("{}", e);
        return;
    }

    let now = Instant::now();
    let trie = match build_trie(&wordlist, default_search_key) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    println!("Built trie of {} words in {:?}", wordlist.len(), now.elapsed());

    let cfg = SearchConfig::default();
    for word in args {
        println!("{}", time_suggest(&trie, &word, &cfg));
    }
}
