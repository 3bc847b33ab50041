//! bactpipe
use anyhow::{bail, Context, Result};
use bp_lib::classifier::classify;
use bp_lib::normalize::{normalize_batch, samples_from_table, SampleInput};
use bp_lib::pipeline::{assembly_pipeline, build_runner, variant_pipeline, Pipeline, REPORT_FILE};
use bp_lib::step::Stage;
use bp_wrap::utils::print_error_chain;
use chrono::Local;
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use parameters_toml::Parameters;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

const CMD: &str = "bactpipe";

/// Run bacterial sequencing reads through trimming, assembly, annotation and
/// variant calling.
#[derive(Parser, Debug)]
#[clap(name = CMD, version)]
struct Bactpipe {
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Parser, Debug)]
enum SubCommand {
    /// Trim, assemble and annotate every sample.
    #[clap(name = "assemble")]
    Assemble(RunArgs),

    /// Trim every sample and call its variants against a reference.
    #[clap(name = "call-variants")]
    CallVariants(CallVariants),

    /// Print which stage produced each folder.
    #[clap(name = "classify")]
    Classify(Classify),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Folder holding one subfolder of raw or trimmed reads per sample.
    #[clap(long, value_name = "PATH", required_unless_present = "sample_table")]
    input: Option<PathBuf>,

    /// Tab separated table with the columns sampleName, forwardRead and reverseRead.
    #[clap(long, value_name = "TSV", conflicts_with = "input")]
    sample_table: Option<PathBuf>,

    /// Output folder. Each sample is written to its own subfolder.
    #[clap(long, value_name = "PATH")]
    output: PathBuf,

    /// Tool parameters. Defaults are used for anything not given.
    #[clap(long, value_name = "TOML")]
    parameters: Option<PathBuf>,

    /// Write the commands to the transcript without running them.
    #[clap(long)]
    dry_run: bool,
}

#[derive(Parser, Debug)]
struct CallVariants {
    /// The reference to call variants against.
    #[clap(long, value_name = "PATH")]
    reference: PathBuf,

    #[clap(flatten)]
    run: RunArgs,
}

#[derive(Parser, Debug)]
struct Classify {
    /// Fail on folders that cannot be classified.
    #[clap(long)]
    strict: bool,

    #[clap(value_name = "FOLDER", required = true)]
    folders: Vec<PathBuf>,
}

impl RunArgs {
    fn parameters(&self) -> Result<Parameters> {
        let mut params = Parameters::load_or_default(self.parameters.as_deref())?;
        params.runner.dry_run |= self.dry_run;
        Ok(params)
    }
}

fn run_pipeline<S: Stage<SampleInput>>(
    pipeline: Pipeline<S>,
    args: &RunArgs,
    params: &Parameters,
) -> Result<ExitCode> {
    let batch = match (&args.input, &args.sample_table) {
        (_, Some(table)) => samples_from_table(table)?,
        (Some(input), None) => normalize_batch(input)?,
        (None, None) => bail!("either --input or --sample-table is required"),
    };
    std::fs::create_dir_all(&args.output)
        .with_context(|| args.output.display().to_string())?;
    let runner = build_runner(&params.runner, &args.output)?;

    let report = pipeline.run(batch, &args.output, &runner)?;
    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!(
            "{} sample(s) failed, see {}",
            report.failed.len(),
            args.output.join(REPORT_FILE).display()
        );
        Ok(ExitCode::FAILURE)
    }
}

fn inner_main() -> Result<ExitCode> {
    let opts = Bactpipe::parse();
    match opts.subcmd {
        SubCommand::Assemble(args) => {
            let params = args.parameters()?;
            run_pipeline(assembly_pipeline(&params), &args, &params)
        }
        SubCommand::CallVariants(c) => {
            let params = c.run.parameters()?;
            run_pipeline(variant_pipeline(&params, &c.reference), &c.run, &params)
        }
        SubCommand::Classify(c) => {
            for folder in &c.folders {
                match classify(folder, c.strict)? {
                    Some(tag) => println!("{}\t{tag}", folder.display()),
                    None => println!("{}\tunknown", folder.display()),
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    Builder::new()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] - {}",
                Local::now().format("%Y-%m-%dT%H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .filter(None, LevelFilter::Info)
        .parse_env("RUST_LOG")
        .init();

    match inner_main() {
        Ok(exit_code) => exit_code,
        Err(err) => {
            print_error_chain(&err);
            ExitCode::FAILURE
        }
    }
}
