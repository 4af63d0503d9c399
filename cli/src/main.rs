//! The `glslfront` command-line driver.
//!
//! Each subcommand runs the front end up to a certain stage and writes the result to a file:
//! - `purify` writes the purified source text,
//! - `process` writes the preprocessed token stream as text, or as JSON with `--json`,
//! - `compile` writes the opcode stream as a table of decimal values.

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use glslfront::{
	lexer::Token, printing, purify::PurifyOptions, Context, Options, ShaderStage,
};
use log::{debug, info, LevelFilter};
use serde::Serialize;
use std::{fmt, fs, io, path::PathBuf, process::ExitCode};

/// The number of opcode values written per line by `compile`.
const VALUES_PER_LINE: usize = 16;

#[derive(Debug, Parser)]
#[command(name = "glslfront", version, about)]
struct Cli {
	#[command(subcommand)]
	command: Command,
	#[command(flatten)]
	common: CommonArgs,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Normalize line endings, splice continued lines and strip comments.
	Purify {
		input: PathBuf,
		output: PathBuf,
	},
	/// Run the preprocessor and write the resulting tokens.
	Process {
		input: PathBuf,
		output: PathBuf,
		/// Write a JSON array of `{kind, text}` objects instead of source text.
		#[arg(long)]
		json: bool,
	},
	/// Preprocess and parse a shader, writing the opcode stream.
	Compile {
		input: PathBuf,
		output: PathBuf,
		#[arg(long, value_enum)]
		stage: Stage,
		/// Accept the syntax reserved for the built-in library.
		#[arg(long)]
		builtin: bool,
	},
}

#[derive(Debug, Args)]
struct CommonArgs {
	/// Register a supported extension. Can be repeated.
	#[arg(long = "extension", value_name = "NAME", global = true)]
	extensions: Vec<String>,
	/// Predefine an integer macro. Can be repeated.
	#[arg(long = "define", value_name = "NAME=VALUE", value_parser = parse_define, global = true)]
	defines: Vec<(String, i64)>,
	/// Replace block comments by as many spaces as they were wide.
	#[arg(long, global = true)]
	preserve_columns: bool,
	/// The tab width used when counting columns.
	#[arg(long, default_value_t = 4, global = true)]
	tab_width: u8,
	/// Log everything, including every macro expansion and parser token fetch.
	#[arg(long, global = true)]
	trace: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Stage {
	Vertex,
	Fragment,
}

impl From<Stage> for ShaderStage {
	fn from(stage: Stage) -> Self {
		match stage {
			Stage::Vertex => ShaderStage::Vertex,
			Stage::Fragment => ShaderStage::Fragment,
		}
	}
}

fn parse_define(s: &str) -> Result<(String, i64), String> {
	let (name, value) = s
		.split_once('=')
		.ok_or_else(|| format!("`{s}' is not of the form NAME=VALUE"))?;
	let value = value
		.trim()
		.parse::<i64>()
		.map_err(|e| format!("invalid value for `{name}': {e}"))?;
	Ok((name.trim().to_owned(), value))
}

/// A token of the `process --json` output.
#[derive(Debug, Serialize)]
struct JsonToken {
	kind: &'static str,
	text: String,
}

#[derive(Debug)]
enum CliError {
	Read(PathBuf, io::Error),
	Write(PathBuf, io::Error),
	Json(serde_json::Error),
	Front(glslfront::Error),
}

impl fmt::Display for CliError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CliError::Read(path, e) => {
				write!(f, "cannot read `{}': {e}", path.display())
			}
			CliError::Write(path, e) => {
				write!(f, "cannot write `{}': {e}", path.display())
			}
			CliError::Json(e) => write!(f, "cannot serialize tokens: {e}"),
			CliError::Front(e) => write!(f, "{e}"),
		}
	}
}

impl From<glslfront::Error> for CliError {
	fn from(e: glslfront::Error) -> Self {
		CliError::Front(e)
	}
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	let level = if cli.common.trace {
		LevelFilter::Trace
	} else {
		LevelFilter::Info
	};
	env_logger::Builder::from_default_env()
		.default_format_timestamp_nanos(true)
		.filter_level(level)
		.init();

	match run(cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("error: {e}");
			eprintln!("{}", Cli::command().render_usage());
			ExitCode::FAILURE
		}
	}
}

fn run(cli: Cli) -> Result<(), CliError> {
	let mut ctx = create_context(&cli.common)?;

	match cli.command {
		Command::Purify { input, output } => {
			let source = read(&input)?;
			let text = ctx.purify(&source)?;
			write(&output, &text)
		}
		Command::Process {
			input,
			output,
			json,
		} => {
			let source = read(&input)?;
			let tokens = preprocess(&mut ctx, &source)?;
			let text = if json {
				let tokens: Vec<JsonToken> = tokens
					.iter()
					.map(|t| JsonToken {
						kind: t.kind_name(),
						text: printing::token_text(ctx.pool(), t),
					})
					.collect();
				serde_json::to_string_pretty(&tokens).map_err(CliError::Json)?
			} else {
				printing::render_tokens(&ctx, &tokens)
			};
			write(&output, &text)
		}
		Command::Compile {
			input,
			output,
			stage,
			builtin,
		} => {
			let source = read(&input)?;
			let opcodes = ctx.compile(&source, stage.into(), builtin)?;
			info!("compiled {} into {} bytes", input.display(), opcodes.len());
			write(&output, &opcode_table(&input, &opcodes))
		}
	}
}

fn create_context(args: &CommonArgs) -> Result<Context, CliError> {
	let options = Options {
		purify: PurifyOptions {
			preserve_columns: args.preserve_columns,
			tab_width: args.tab_width,
		},
		..Options::default()
	};
	let mut ctx = Context::with_options(options)?;
	for name in &args.extensions {
		ctx.add_extension(name)?;
	}
	for (name, value) in &args.defines {
		debug!("predefining `{name}` as {value}");
		ctx.add_predefined_macro(name, *value)?;
	}
	Ok(ctx)
}

fn preprocess(ctx: &mut Context, source: &str) -> Result<Vec<Token>, CliError> {
	let text = ctx.purify(source)?;
	let tokens = ctx.tokenize(&text);
	let (version, consumed) = ctx.parse_version_directive(&tokens)?;
	debug!("version {version}, {consumed} tokens in the version block");
	Ok(ctx.preprocess(&tokens[consumed..])?)
}

/// Formats the opcode stream as a comma-separated table which can be included into a C-like array initializer.
fn opcode_table(input: &std::path::Path, opcodes: &[u8]) -> String {
	let mut out = format!(
		"/* DO NOT EDIT - THIS FILE IS AUTOMATICALLY GENERATED FROM {} */\n",
		input.display()
	);
	for line in opcodes.chunks(VALUES_PER_LINE) {
		let values: Vec<String> =
			line.iter().map(|b| format!("{b:>3},")).collect();
		out.push_str(values.join(" ").trim_start());
		out.push('\n');
	}
	out
}

fn read(path: &PathBuf) -> Result<String, CliError> {
	fs::read_to_string(path).map_err(|e| CliError::Read(path.clone(), e))
}

fn write(path: &PathBuf, text: &str) -> Result<(), CliError> {
	fs::write(path, text).map_err(|e| CliError::Write(path.clone(), e))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn define_values() {
		assert_eq!(parse_define("DEBUG=1"), Ok(("DEBUG".to_owned(), 1)));
		assert_eq!(parse_define("LEVEL = -3"), Ok(("LEVEL".to_owned(), -3)));
		assert!(parse_define("DEBUG").is_err());
		assert!(parse_define("DEBUG=yes").is_err());
	}

	#[test]
	fn table_layout() {
		let opcodes: Vec<u8> = (0..20).collect();
		let table = opcode_table(std::path::Path::new("a.frag"), &opcodes);
		let lines: Vec<&str> = table.lines().collect();
		assert_eq!(lines.len(), 3);
		assert!(lines[0].starts_with("/*"));
		assert!(lines[1].starts_with("0,   1,"));
		assert!(lines[1].ends_with(" 15,"));
		assert_eq!(lines[2], "16,  17,  18,  19,");
	}

	#[test]
	fn arguments() {
		Cli::command().debug_assert();
		let cli = Cli::parse_from([
			"glslfront",
			"compile",
			"in.frag",
			"out.h",
			"--stage",
			"fragment",
			"--define",
			"X=2",
			"--extension",
			"GL_foo",
		]);
		assert!(matches!(
			cli.command,
			Command::Compile {
				stage: Stage::Fragment,
				builtin: false,
				..
			}
		));
		assert_eq!(cli.common.defines, vec![("X".to_owned(), 2)]);
		assert_eq!(cli.common.extensions, vec!["GL_foo".to_owned()]);
	}
}
