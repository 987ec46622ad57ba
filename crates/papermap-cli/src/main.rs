use papermap_core::mindmap::{DiagramDocument, ParseReport};
use papermap_core::{DetailLevel, Pipeline, PipelineConfig, build_prompt, clean_response};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Papermap(papermap_core::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Papermap(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<papermap_core::Error> for CliError {
    fn from(value: papermap_core::Error) -> Self {
        Self::Papermap(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Process,
    Normalize,
    Filter,
    Expand,
    Colorize,
    Prompt,
    Inspect,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    detail: DetailLevel,
    max_depth: Option<usize>,
    config: Option<String>,
    out: Option<String>,
    pretty: bool,
    stats: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InspectOut<'a> {
    node_count: usize,
    max_depth: usize,
    report: &'a ParseReport,
    document: &'a DiagramDocument,
}

fn usage() -> &'static str {
    "papermap\n\
\n\
USAGE:\n\
  papermap [process] [--detail simple|detailed|advanced] [--stats] [--pretty] [--config <path>] [--out <path>] [<path>|-]\n\
  papermap normalize [--config <path>] [--out <path>] [<path>|-]\n\
  papermap filter [--max-depth <n>|--detail <level>] [--config <path>] [--out <path>] [<path>|-]\n\
  papermap expand [--detail <level>] [--config <path>] [--out <path>] [<path>|-]\n\
  papermap colorize [--out <path>] [<path>|-]\n\
  papermap prompt [--detail <level>] [--pretty] [--config <path>] [<path>|-]\n\
  papermap inspect [--pretty] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - process prints the finished diagram and never fails on bad diagram text; --stats prints\n\
    JSON with the diagram and per-stage counts instead (and fails on unusable input).\n\
  - prompt reads document text and prints the generation prompt as JSON.\n\
  - inspect prints the parsed tree as JSON.\n\
  - Config files may be .json, .json5, .yaml or .yml.\n\
  - Logs go to stderr; set PAPERMAP_LOG (or RUST_LOG), e.g. PAPERMAP_LOG=debug.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "process" => args.command = Command::Process,
            "normalize" => args.command = Command::Normalize,
            "filter" => args.command = Command::Filter,
            "expand" => args.command = Command::Expand,
            "colorize" => args.command = Command::Colorize,
            "prompt" => args.command = Command::Prompt,
            "inspect" => args.command = Command::Inspect,
            "--pretty" => args.pretty = true,
            "--stats" => args.stats = true,
            "--detail" => {
                let Some(level) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.detail = level
                    .parse::<DetailLevel>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--max-depth" => {
                let Some(depth) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let depth = depth
                    .parse::<usize>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if depth == 0 {
                    return Err(CliError::Usage(usage()));
                }
                args.max_depth = Some(depth);
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    text.push('\n');
    write_text(&text, out)
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn build_pipeline(config: Option<&str>) -> Result<Pipeline, CliError> {
    let Some(path) = config else {
        return Ok(Pipeline::default());
    };
    let config = PipelineConfig::from_path(path)?;
    tracing::debug!(path, "loaded pipeline config");
    Ok(Pipeline::with_config(config)?)
}

fn run(args: Args) -> Result<(), CliError> {
    let pipeline = build_pipeline(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;
    let out = args.out.as_deref();

    match args.command {
        Command::Process => {
            if args.stats {
                let processed = pipeline.try_process(&input, args.detail)?;
                return write_json(&processed, args.pretty, out);
            }
            write_text(&pipeline.process(&input, args.detail), out)
        }
        Command::Normalize => write_text(&pipeline.normalize_root(&input), out),
        Command::Filter => {
            let max_depth = args
                .max_depth
                .unwrap_or_else(|| pipeline.config().max_depth(args.detail));
            write_text(&pipeline.filter_by_depth(&input, max_depth), out)
        }
        Command::Expand => write_text(&pipeline.auto_expand(&input, args.detail), out),
        Command::Colorize => write_text(&pipeline.colorize(&input), out),
        Command::Prompt => {
            let prompt = build_prompt(&input, args.detail, pipeline.config());
            write_json(&prompt, args.pretty, out)
        }
        Command::Inspect => {
            let cleaned = clean_response(&input);
            let (document, report) =
                papermap_core::parse_mindmap(&cleaned, pipeline.config().max_label_width);
            let inspect = InspectOut {
                node_count: document.node_count(),
                max_depth: document.max_depth(),
                report: &report,
                document: &document,
            };
            write_json(&inspect, args.pretty, out)
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PAPERMAP_LOG")
        .or_else(|_| tracing_subscriber::EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    std::panic::set_hook(Box::new(|info| {
        tracing::error!(panic = %info, "papermap panicked");
    }));
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("papermap")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn defaults_to_process_from_stdin() {
        let args = parse_args(&argv(&[])).unwrap();
        assert!(matches!(args.command, Command::Process));
        assert_eq!(args.detail, DetailLevel::Detailed);
        assert_eq!(args.input, None);
    }

    #[test]
    fn parses_command_flags_and_path() {
        let args = parse_args(&argv(&[
            "filter",
            "--max-depth",
            "4",
            "--out",
            "out.mmd",
            "in.mmd",
        ]))
        .unwrap();
        assert!(matches!(args.command, Command::Filter));
        assert_eq!(args.max_depth, Some(4));
        assert_eq!(args.out.as_deref(), Some("out.mmd"));
        assert_eq!(args.input.as_deref(), Some("in.mmd"));
    }

    #[test]
    fn dash_means_stdin_and_double_dash_ends_flags() {
        let args = parse_args(&argv(&["-"])).unwrap();
        assert_eq!(args.input.as_deref(), Some("-"));
        let args = parse_args(&argv(&["--", "--weird-name.mmd"])).unwrap();
        assert_eq!(args.input.as_deref(), Some("--weird-name.mmd"));
    }

    #[test]
    fn rejects_bad_usage() {
        for bad in [
            vec!["--detail", "verbose"],
            vec!["--detail"],
            vec!["--max-depth", "0"],
            vec!["--unknown"],
            vec!["a.mmd", "b.mmd"],
        ] {
            assert!(
                matches!(parse_args(&argv(&bad)), Err(CliError::Usage(_))),
                "{bad:?}"
            );
        }
    }
}
