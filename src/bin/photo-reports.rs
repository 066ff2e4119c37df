//! Photo Reports CLI tool
//!
//! Builds a PDF report for every folder of photographs under a directory
//! and merges them into a master PDF.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use photo_reports::config::{OutputNaming, PageSize, ReportConfig, TitlePolicy, WalkStrategy};
use photo_reports::pdf::{extract_metadata, merge_tree, MergeOutcome};
use photo_reports::pipeline;
use photo_reports::title::resolver_for;
use photo_reports::walker::ProgressSink;

/// Photo Reports - Turn folders of photos into PDF reports
#[derive(Parser)]
#[command(name = "photo-reports")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # One PDF per photo folder, then a master PDF at the root
    photo-reports build \"Photos/Lincoln ISD\" --merge

    # Name reports after their titles and walk only two levels deep
    photo-reports build Photos --naming titles --walk nested

    # Re-merge existing reports without a cover page
    photo-reports merge Photos --no-cover

    # Check which titles a folder would get
    photo-reports titles \"Photos/Lincoln ISD/Elementary/Room 4\"")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug details
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Settings shared by commands that render pages
#[derive(Args)]
struct RenderArgs {
    /// Logo image for the title block
    #[arg(long, conflicts_with = "no_logo")]
    logo: Option<PathBuf>,

    /// Leave the logo out
    #[arg(long)]
    no_logo: bool,

    /// Page size
    #[arg(long, value_enum)]
    page_size: Option<PageSize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a PDF report for every folder that contains JPEG photos
    Build {
        /// Root directory of the photo collection
        root: PathBuf,

        /// Merge all reports into a master PDF afterwards
        #[arg(long)]
        merge: bool,

        /// Which directories to visit
        #[arg(long, value_enum)]
        walk: Option<WalkStrategy>,

        /// How report files are named
        #[arg(long, value_enum)]
        naming: Option<OutputNaming>,

        /// How folder titles are derived
        #[arg(long, value_enum)]
        title_policy: Option<TitlePolicy>,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Merge existing reports under a directory into a master PDF
    Merge {
        /// Root directory of the photo collection
        root: PathBuf,

        /// Title for the master PDF (defaults to the root folder name)
        #[arg(long)]
        title: Option<String>,

        /// Skip the generated cover page
        #[arg(long)]
        no_cover: bool,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Show the main title and subtitle a folder would get
    Titles {
        /// Folder to resolve
        folder: PathBuf,

        /// Traversal root (used by the fixed-depth policy; defaults to the grandparent)
        #[arg(long)]
        root: Option<PathBuf>,

        /// How folder titles are derived
        #[arg(long, value_enum)]
        title_policy: Option<TitlePolicy>,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = photo_reports::logging::init(cli.verbose) {
        eprintln!("Warning: {:#}", e);
    }

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Build { root, merge, walk, naming, title_policy, render } => {
            let mut config = apply_render_args(config, render);
            config.walk = walk.unwrap_or(config.walk);
            config.naming = naming.unwrap_or(config.naming);
            config.title_policy = title_policy.unwrap_or(config.title_policy);
            cmd_build(&root, &config, merge)
        }
        Commands::Merge { root, title, no_cover, render } => {
            let mut config = apply_render_args(config, render);
            config.master_title = title.or(config.master_title);
            config.cover_page = config.cover_page && !no_cover;
            cmd_merge(&root, &config)
        }
        Commands::Titles { folder, root, title_policy } => {
            let mut config = config;
            config.title_policy = title_policy.unwrap_or(config.title_policy);
            cmd_titles(&folder, root.as_deref(), &config)
        }
        Commands::Info { input } => cmd_info(&input),
    });

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReportConfig> {
    match path {
        Some(path) => ReportConfig::load(path)
            .with_context(|| format!("load config {}", path.display())),
        None => Ok(ReportConfig::default()),
    }
}

fn apply_render_args(mut config: ReportConfig, render: RenderArgs) -> ReportConfig {
    if render.no_logo {
        config.logo_path = None;
    } else if let Some(logo) = render.logo {
        config.logo_path = Some(logo);
    }
    config.page_size = render.page_size.unwrap_or(config.page_size);
    config
}

/// Prints one line per visited directory
#[derive(Default)]
struct ConsoleProgress {
    maximum: usize,
    current: usize,
}

impl ProgressSink for ConsoleProgress {
    fn set_maximum(&mut self, maximum: usize) {
        self.maximum = maximum;
    }

    fn advance(&mut self, folder: &Path) {
        self.current += 1;
        eprintln!("[{}/{}] {}", self.current, self.maximum, folder.display());
    }

    fn finish(&mut self, message: &str) {
        println!("{}", message);
    }
}

fn report_merge(outcome: &MergeOutcome) {
    match outcome {
        MergeOutcome::Merged { path, inputs, pages } => {
            eprintln!("Merged {} reports ({} pages) to: {}", inputs.len(), pages, path.display());
        }
        MergeOutcome::NothingToMerge => eprintln!("No PDFs found to merge"),
    }
}

/// Build every folder report, optionally followed by the master PDF
fn cmd_build(root: &Path, config: &ReportConfig, merge: bool) -> anyhow::Result<()> {
    let mut progress = ConsoleProgress::default();
    let summary = pipeline::run(root, config, &mut progress, merge)
        .with_context(|| format!("process {}", root.display()))?;

    eprintln!(
        "Wrote {} reports from {} folders",
        summary.walk.reports.len(),
        summary.walk.visited
    );
    for report in &summary.walk.reports {
        if !report.skipped.is_empty() {
            eprintln!("  {}: skipped {} unreadable images", report.output.display(), report.skipped.len());
        }
    }
    for folder in &summary.walk.failed {
        eprintln!("  failed: {}", folder.display());
    }
    if let Some(outcome) = &summary.merge {
        report_merge(outcome);
    }

    Ok(())
}

/// Merge existing reports into a master PDF
fn cmd_merge(root: &Path, config: &ReportConfig) -> anyhow::Result<()> {
    let outcome = merge_tree(root, config)
        .with_context(|| format!("merge {}", root.display()))?;
    report_merge(&outcome);
    Ok(())
}

/// Print the resolved title pair for a folder
fn cmd_titles(folder: &Path, root: Option<&Path>, config: &ReportConfig) -> anyhow::Result<()> {
    // Without a root, the grandparent keeps the fixed-depth title two levels up
    let root = root
        .or_else(|| folder.ancestors().nth(2))
        .or_else(|| folder.parent())
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let resolver = resolver_for(config, &root)?;
    let titles = resolver.resolve(folder);

    println!("Main title: {}", titles.main_title);
    println!("Subtitle: {}", titles.sub_title);

    Ok(())
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> anyhow::Result<()> {
    let metadata = extract_metadata(input)?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    if let Some(producer) = metadata.producer {
        println!("Producer: {}", producer);
    }

    Ok(())
}
