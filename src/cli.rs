use crate::config::{Config, load_config};
use crate::error::Severity;
use crate::layout::compute_layout;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::parser::parse_sankey_with_limits;
use crate::render::{render_svg, write_output_png, write_output_svg};
use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sankey", version, about = "Sankey flow diagram renderer")]
pub struct Args {
    /// Input file (.sankey or .md) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png/json). Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config file (JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Only parse and report diagnostics
    #[arg(long = "check")]
    pub check: bool,

    /// Increase log verbosity
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Json => "json",
        }
    }
}

/// A diagram source and the 1-based line it starts on in the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SourceBlock {
    first_line: usize,
    text: String,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    config.sync_layout_bounds();

    let (input, is_markdown) = read_input(args.input.as_deref())?;
    let blocks = if is_markdown {
        extract_sankey_blocks(&input)
    } else {
        vec![SourceBlock {
            first_line: 1,
            text: input,
        }]
    };

    if blocks.is_empty() {
        return Err(anyhow::anyhow!("No sankey diagrams found in input"));
    }

    if args.check {
        let name = args
            .input
            .as_deref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<stdin>".to_string());
        return check_blocks(&name, &blocks, &config);
    }

    if blocks.len() == 1 {
        let output = match args.output_format {
            OutputFormat::Png => Some(ensure_output(&args.output, "png")?),
            _ => args.output.clone(),
        };
        return render_block(&blocks[0].text, &config, args.output_format, output.as_deref());
    }

    let outputs = resolve_multi_outputs(args.output.as_deref(), args.output_format, blocks.len())?;
    for (idx, block) in blocks.iter().enumerate() {
        render_block(&block.text, &config, args.output_format, Some(&outputs[idx]))
            .with_context(|| format!("diagram {} (line {})", idx + 1, block.first_line))?;
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn render_block(
    text: &str,
    config: &Config,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<()> {
    let graph = parse_sankey_with_limits(text, &config.limits)?;
    let layout = compute_layout(&graph, &config.theme, &config.layout)?;
    match format {
        OutputFormat::Json => match output {
            Some(path) => write_layout_dump(path, &layout)?,
            None => println!("{}", LayoutDump::from_layout(&layout).to_json()?),
        },
        OutputFormat::Svg => {
            let svg = render_svg(&layout, &config.theme, &config.render);
            write_output_svg(&svg, output, &config.render)?;
        }
        OutputFormat::Png => {
            let output = output.ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            let svg = render_svg(&layout, &config.theme, &config.render);
            write_output_png(&svg, output, &config.render, &config.theme)?;
        }
    }
    Ok(())
}

fn check_blocks(name: &str, blocks: &[SourceBlock], config: &Config) -> Result<()> {
    let mut errors = 0usize;
    for block in blocks {
        let Err(err) = parse_sankey_with_limits(&block.text, &config.limits) else {
            continue;
        };
        let diagnostic = err.to_diagnostic();
        let line = diagnostic.line.unwrap_or(1) + block.first_line - 1;
        println!("{}", format_diagnostic(name, line, diagnostic.severity, &diagnostic.message));
        if diagnostic.severity == Severity::Error {
            errors += 1;
        }
    }
    if errors > 0 {
        return Err(anyhow::anyhow!("{errors} diagram(s) failed validation"));
    }
    Ok(())
}

fn format_diagnostic(name: &str, line: usize, severity: Severity, message: &str) -> String {
    format!("{name}:{line}: {severity}: {message}")
}

fn read_input(path: Option<&Path>) -> Result<(String, bool)> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok((buf, false));
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let is_md = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|ext| matches!(ext, "md" | "markdown"))
            .unwrap_or(false);
        return Ok((content, is_md));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok((buf, false))
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

fn extract_sankey_blocks(input: &str) -> Vec<SourceBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, usize, Vec<&str>)> = None;

    for (idx, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        match current.take() {
            None => {
                if let Some(fence) = detect_sankey_fence(trimmed) {
                    current = Some((fence, idx + 2, Vec::new()));
                }
            }
            Some((fence, first_line, mut lines)) => {
                if is_fence_end(trimmed, &fence) {
                    blocks.push(SourceBlock {
                        first_line,
                        text: lines.join("\n"),
                    });
                } else {
                    lines.push(line);
                    current = Some((fence, first_line, lines));
                }
            }
        }
    }

    blocks
}

fn detect_sankey_fence(line: &str) -> Option<String> {
    for fence in ["```", "~~~"] {
        if let Some(rest) = line.strip_prefix(fence) {
            let rest = rest.trim_start_matches(fence.chars().next().unwrap_or('`')).trim();
            if rest.starts_with("sankey") {
                return Some(fence.to_string());
            }
        }
    }
    None
}

fn is_fence_end(line: &str, fence: &str) -> bool {
    if !line.starts_with(fence) {
        return false;
    }
    line[fence.len()..].trim().is_empty()
}

fn resolve_multi_outputs(
    output: Option<&Path>,
    format: OutputFormat,
    count: usize,
) -> Result<Vec<PathBuf>> {
    let ext = format.extension();
    let base = output.ok_or_else(|| anyhow::anyhow!("Output path required for markdown input"))?;
    if base.is_dir() {
        let mut outputs = Vec::new();
        for idx in 0..count {
            outputs.push(base.join(format!("diagram-{}.{}", idx + 1, ext)));
        }
        return Ok(outputs);
    }
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("diagram");
    let parent = base.parent().unwrap_or_else(|| Path::new("."));
    let mut outputs = Vec::new();
    for idx in 0..count {
        outputs.push(parent.join(format!("{}-{}.{}", stem, idx + 1, ext)));
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_sankey_blocks() {
        let input = r#"# Flows
text
``` sankey
A --> B: 1
```
more
~~~sankey
X --> Y: 2
Y --> Z: 2
~~~
```rust
fn main() {}
```
"#;
        let blocks = extract_sankey_blocks(input);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].first_line, 4);
        assert_eq!(blocks[0].text, "A --> B: 1");
        assert_eq!(blocks[1].first_line, 8);
        assert!(blocks[1].text.contains("Y --> Z"));
    }

    #[test]
    fn unterminated_block_is_dropped() {
        let blocks = extract_sankey_blocks("```sankey\nA --> B: 1\n");
        assert!(blocks.is_empty());
    }

    #[test]
    fn multi_outputs_are_numbered() {
        let outputs =
            resolve_multi_outputs(Some(Path::new("out/flows.svg")), OutputFormat::Svg, 2).unwrap();
        assert_eq!(
            outputs,
            vec![PathBuf::from("out/flows-1.svg"), PathBuf::from("out/flows-2.svg")]
        );
        assert!(resolve_multi_outputs(None, OutputFormat::Png, 2).is_err());
    }

    #[test]
    fn diagnostics_follow_compiler_format() {
        assert_eq!(
            format_diagnostic("a.sankey", 3, Severity::Error, "line 3: syntax error: x"),
            "a.sankey:3: error: line 3: syntax error: x"
        );
    }

    #[test]
    fn check_reports_block_relative_lines() {
        let blocks = vec![SourceBlock {
            first_line: 10,
            text: "A --> B: 1\nA --> B: nope".to_string(),
        }];
        assert!(check_blocks("doc.md", &blocks, &Config::default()).is_err());
        let ok = vec![SourceBlock {
            first_line: 1,
            text: "A --> B: 1".to_string(),
        }];
        assert!(check_blocks("doc.md", &ok, &Config::default()).is_ok());
    }
}
