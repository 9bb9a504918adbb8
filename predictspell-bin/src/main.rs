use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use gumdrop::Options;
use serde::Serialize;

use predictspell::correction::{
    collect_suggestions, suggest_word, SearchConfig, SearchSpace, Suggestion,
};
use predictspell::trie::{default_search_key, identity_search_key, Trie};
use predictspell::types::{Distribution, ProbabilityMass, Transform};

trait OutputWriter {
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]);
    fn finish(&mut self);
}

struct StdoutWriter;

impl OutputWriter for StdoutWriter {
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]) {
        println!("Input: {}", &word);
        for sugg in suggestions {
            let marker = match sugg.completed {
                Some(false) => "\t[completion]",
                _ => "",
            };
            println!("{}\t\t{}\t{}{}", sugg.value, sugg.cost, sugg.weight, marker);
        }
        println!();
    }

    fn finish(&mut self) {}
}

#[derive(Serialize)]
struct SuggestionRequest {
    word: String,
    suggestions: Vec<Suggestion>,
}

#[derive(Serialize)]
struct JsonWriter {
    results: Vec<SuggestionRequest>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter { results: vec![] }
    }
}

impl OutputWriter for JsonWriter {
    fn write_suggestions(&mut self, word: &str, suggestions: &[Suggestion]) {
        self.results.push(SuggestionRequest {
            word: word.to_owned(),
            suggestions: suggestions.to_vec(),
        });
    }

    fn finish(&mut self) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{:?}", e),
        }
    }
}

#[derive(Debug, Options)]
struct Args {
    #[options(help = "print help message")]
    help: bool,

    #[options(command)]
    command: Option<Command>,
}

#[derive(Debug, Options)]
enum Command {
    #[options(help = "get suggestions for provided words")]
    Suggest(SuggestArgs),

    #[options(help = "search with explicit ambiguous input events")]
    Events(EventsArgs),
}

#[derive(Debug, Options)]
struct SuggestArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "trie model to be used", required)]
    model: PathBuf,

    #[options(help = "JSON search configuration")]
    config: Option<PathBuf>,

    #[options(no_short, help = "search key function applied to input: default, identity")]
    key: Option<String>,

    #[options(no_short, long = "max-distance", help = "maximum edit distance")]
    max_distance: Option<u32>,

    #[options(no_short, long = "max-cost", help = "maximum cost for suggestions")]
    max_cost: Option<f64>,

    #[options(help = "maximum number of results")]
    nbest: Option<usize>,

    #[options(no_short, long = "no-completions", help = "disables predicting completions")]
    no_completions: bool,

    #[options(no_short, long = "json", help = "output in JSON format")]
    use_json: bool,

    #[options(free, help = "words to be processed")]
    inputs: Vec<String>,
}

#[derive(Debug, Options)]
struct EventsArgs {
    #[options(help = "print help message")]
    help: bool,

    #[options(help = "trie model to be used", required)]
    model: PathBuf,

    #[options(no_short, long = "max-distance", help = "maximum edit distance")]
    max_distance: Option<u32>,

    #[options(help = "maximum number of batches to print")]
    batches: Option<usize>,

    #[options(
        free,
        help = "input events, each as text[=p][,text[=p]...]; prefix text with N< to delete N characters first"
    )]
    events: Vec<String>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SearchConfig> {
    match path {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening config {}", path.display()))?;
            Ok(serde_json::from_reader(io::BufReader::new(file))?)
        }
        None => Ok(SearchConfig::default()),
    }
}

fn load_model(path: &Path) -> anyhow::Result<Trie> {
    Trie::from_path(path).with_context(|| format!("loading model {}", path.display()))
}

fn search_key(name: Option<&str>) -> anyhow::Result<fn(&str) -> String> {
    match name {
        None | Some("default") => Ok(default_search_key),
        Some("identity") => Ok(identity_search_key),
        Some(other) => anyhow::bail!("Unknown key function: {}", other),
    }
}

/// Parses `text[=p][,text[=p]...]`. Alternatives without a probability share
/// whatever mass the others leave.
fn parse_event(event: &str) -> anyhow::Result<Distribution<Transform>> {
    let mut parsed = vec![];

    for alternative in event.split(',') {
        let (text, p) = match alternative.rsplit_once('=') {
            Some((text, p)) => {
                let p = p
                    .parse::<f64>()
                    .with_context(|| format!("bad probability in {:?}", alternative))?;
                (text, Some(p))
            }
            None => (alternative, None),
        };

        let transform = match text.split_once('<') {
            Some((n, insert)) if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) => {
                Transform::new(insert, n.parse()?)
            }
            _ => Transform::insert(text),
        };

        parsed.push((transform, p));
    }

    let given: f64 = parsed.iter().filter_map(|(_, p)| *p).sum();
    let unspecified = parsed.iter().filter(|(_, p)| p.is_none()).count();
    let share = if unspecified > 0 {
        ((1.0 - given) / unspecified as f64).max(0.0)
    } else {
        0.0
    };

    Ok(parsed
        .into_iter()
        .map(|(transform, p)| ProbabilityMass::new(transform, p.unwrap_or(share)))
        .collect())
}

fn read_words(inputs: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !inputs.is_empty() {
        return Ok(inputs);
    }

    eprintln!("Reading from stdin...");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("reading stdin")?;

    Ok(buffer
        .lines()
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect())
}

fn suggest(args: SuggestArgs) -> anyhow::Result<()> {
    let mut suggest_cfg = load_config(args.config.as_deref())?;

    if let Some(v) = args.nbest {
        if v == 0 {
            suggest_cfg.n_best = None;
        } else {
            suggest_cfg.n_best = Some(v);
        }
    }

    if let Some(v) = args.max_cost.filter(|x| x >= &0.0) {
        suggest_cfg.max_cost = Some(v);
    }

    if let Some(v) = args.max_distance {
        suggest_cfg.max_edit_distance = v;
    }

    if args.no_completions {
        suggest_cfg.predict_completions = false;
    }

    let key = search_key(args.key.as_deref())?;
    let trie = load_model(&args.model)?;

    let mut writer: Box<dyn OutputWriter> = if args.use_json {
        Box::new(JsonWriter::new())
    } else {
        Box::new(StdoutWriter)
    };

    for word in read_words(args.inputs)? {
        let suggestions = suggest_word(&trie, &key(&word), &suggest_cfg);
        writer.write_suggestions(&word, &suggestions);
    }

    writer.finish();

    Ok(())
}

fn events(args: EventsArgs) -> anyhow::Result<()> {
    let mut cfg = SearchConfig::default();
    if let Some(v) = args.max_distance {
        cfg.max_edit_distance = v;
    }

    let trie = load_model(&args.model)?;
    let mut space = SearchSpace::with_config(trie.traversal(), &cfg);

    for event in &args.events {
        space.add_input(parse_event(event)?);
    }

    let limit = args.batches.unwrap_or(10);
    for (i, batch) in space.get_best_matches().take(limit).enumerate() {
        println!("[{}] {:.4}\t{}", i, batch.cost, batch.keys().join(" "));
    }

    println!();
    for sugg in collect_suggestions(&mut space, &cfg) {
        println!("{}\t\t{}\t{}", sugg.value, sugg.cost, sugg.weight);
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let args = Args::parse_args_default_or_exit();

    match args.command {
        None => Ok(()),
        Some(Command::Suggest(args)) => suggest(args),
        Some(Command::Events(args)) => events(args),
    }
}
