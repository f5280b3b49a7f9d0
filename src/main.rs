use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

use office_from_html::bundle::bundle;
use office_from_html::{convert_all, render, Conversion, ConvertOptions, ImageSource, SourceKind, TargetFormat};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Docx,
    Pptx,
    Pdf,
}

impl From<Format> for TargetFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Docx => TargetFormat::Docx,
            Format::Pptx => TargetFormat::Pptx,
            Format::Pdf => TargetFormat::Pdf,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input HTML or Markdown files. Several inputs are bundled into one zip.
    inputs: Vec<PathBuf>,

    /// Convert this text instead of reading files.
    #[arg(long, conflicts_with = "inputs")]
    text: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Docx)]
    format: Format,

    /// Treat input as Markdown regardless of file extension.
    #[arg(long, conflicts_with = "html")]
    markdown: bool,

    /// Treat input as HTML regardless of file extension.
    #[arg(long)]
    html: bool,

    /// Output path. Defaults to the input name with the format's extension,
    /// or `converted.zip` for several inputs.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Document title metadata.
    #[arg(long)]
    title: Option<String>,

    /// Language assumed for code blocks that do not declare one.
    #[arg(long)]
    language: Option<String>,

    /// Emit code blocks as plain monospace text.
    #[arg(long)]
    no_highlight: bool,

    /// More log output (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn kind_for(&self, path: Option<&Path>) -> SourceKind {
        if self.markdown {
            SourceKind::Markdown
        } else if self.html {
            SourceKind::Html
        } else {
            path.map(SourceKind::from_path).unwrap_or(SourceKind::Html)
        }
    }

    fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions {
            highlight_code: !self.no_highlight,
            title: self.title.clone(),
            ..ConvertOptions::default()
        };
        if let Some(lang) = &self.language {
            options.default_code_language = lang.clone();
        }
        options
    }
}

/// Reads images from disk next to the input. Remote URLs are never fetched.
struct FsImageSource {
    base: PathBuf,
}

impl ImageSource for FsImageSource {
    fn load(&self, src: &str) -> Option<Vec<u8>> {
        let src = src.strip_prefix("file://").unwrap_or(src);
        if src.contains("://") || src.starts_with("//") || src.starts_with("data:") {
            warn!("not fetching remote image {}", src);
            return None;
        }
        let path = Path::new(src);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        };
        fs::read(&path).ok()
    }
}

struct Input {
    name: String,
    base: PathBuf,
    source: String,
    kind: SourceKind,
}

fn read_inputs(args: &Args) -> Result<Vec<Input>> {
    if let Some(text) = &args.text {
        return Ok(vec![Input {
            name: "output".to_string(),
            base: PathBuf::from("."),
            source: text.clone(),
            kind: args.kind_for(None),
        }]);
    }
    if args.inputs.is_empty() {
        bail!("no input: pass one or more files, or --text");
    }
    args.inputs
        .iter()
        .map(|path| {
            let source = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            Ok(Input {
                name: path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("output")
                    .to_string(),
                base: path.parent().map(Path::to_path_buf).unwrap_or_default(),
                source,
                kind: args.kind_for(Some(path)),
            })
        })
        .collect()
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let target = TargetFormat::from(args.format);
    let options = args.options();
    let inputs = read_inputs(&args)?;

    let sources: Vec<(String, SourceKind)> = inputs.iter().map(|i| (i.source.clone(), i.kind)).collect();
    let conversions = convert_all(&sources, target, &options);

    let mut outputs = Vec::new();
    for (input, conversion) in inputs.iter().zip(conversions) {
        let doc = match conversion {
            Conversion::Document(doc) => doc,
            Conversion::Empty if inputs.len() == 1 => bail!("nothing to convert: {} is blank", input.name),
            Conversion::Empty => {
                warn!("skipping blank input {}", input.name);
                continue;
            }
        };
        let images = FsImageSource {
            base: input.base.clone(),
        };
        let bytes = render(&doc, &options, &images).with_context(|| format!("write {}", target.extension()))?;
        outputs.push((format!("{}.{}", input.name, target.extension()), bytes));
    }

    let (out, bytes) = match outputs.len() {
        0 => bail!("nothing to convert: every input is blank"),
        1 if inputs.len() == 1 => {
            let (name, bytes) = outputs.remove(0);
            let out = args.out.clone().unwrap_or_else(|| match args.inputs.first() {
                Some(path) => path.with_extension(target.extension()),
                None => PathBuf::from(name),
            });
            (out, bytes)
        }
        _ => {
            let out = args.out.clone().unwrap_or_else(|| PathBuf::from("converted.zip"));
            (out, bundle(&outputs).context("bundle outputs")?)
        }
    };

    fs::write(&out, bytes).with_context(|| format!("write {}", out.display()))?;
    println!("{}", out.display());
    Ok(())
}
