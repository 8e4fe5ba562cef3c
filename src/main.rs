use cafe_press::generate::{self, GenerateError, SitePaths};
use cafe_press::scaffold::{self, NewPost};
use cafe_press::{authors, catalog, config, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "cafe-press")]
#[command(about = "Static site builder for markdown blogs")]
#[command(long_about = "\
Static site builder for markdown blogs

Posts are markdown files whose first lines are a metadata comment. Images
for a post live in a directory named after its slug.

Site structure:

  config.toml                      # Site config (domain, title, sizes, colors)
  authors.json                     # {\"jane\": {\"name\": \"Jane Doe\"}}
  content/
  ├── first-post.md                # <!-- author: jane / date: 2020-05-02 ... -->
  └── first-post/                  # Images copied next to the rendered post
      └── cover.jpg                # headerImg: resized to every thumbnail size
  theme/
  ├── style.css                    # Optional; a built-in stylesheet is used otherwise
  └── static/                      # Copied to build/static/

Header fields: title, author (required), date (required), description,
subtitle, tags (comma separated), headerImg.

Run 'cafe-press gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    content: PathBuf,

    /// Output directory (removed and recreated by every build)
    #[arg(long, default_value = "build", global = true)]
    output: PathBuf,

    /// Site config file
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Author table
    #[arg(long, default_value = "authors.json", global = true)]
    authors: PathBuf,

    /// Theme directory
    #[arg(long, default_value = "theme", global = true)]
    theme: PathBuf,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the whole site into the output directory
    Build,
    /// Load and validate all posts without writing anything
    Check {
        /// Print the loaded posts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new post file with a filled-in header
    New(NewArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct NewArgs {
    #[arg(long)]
    title: String,
    /// Defaults to the slugified title
    #[arg(long)]
    slug: Option<String>,
    /// Author id from the author table
    #[arg(long)]
    author: String,
    #[arg(long, default_value = "")]
    description: String,
    /// "YYYY-MM-DD HH:MM:SS"; defaults to now
    #[arg(long)]
    date: Option<String>,
    /// Comma separated, no spaces
    #[arg(long)]
    tags: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    cafe_press::init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(build) = err.downcast_ref::<GenerateError>() {
                eprintln!("build failed during {}", build.stage());
                if let Some(slug) = build.slug() {
                    eprintln!("document: {slug}");
                }
            }
            output::eprint_error(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Build => {
            let site_config = config::load_config(&cli.config)?;
            let author_table = authors::load_authors(&cli.authors)?;
            init_thread_pool(&site_config.processing);

            let paths = SitePaths {
                content: cli.content,
                output: cli.output,
                theme: cli.theme,
            };
            println!("==> Building {} → {}", paths.content.display(), paths.output.display());
            let report = generate::generate(&paths, &site_config, &author_table)?;
            output::print_build_report(&report, &paths.output);
        }
        Command::Check { json } => {
            let site_config = config::load_config(&cli.config)?;
            let author_table = authors::load_authors(&cli.authors)?;
            let loaded =
                catalog::load_catalog(&cli.content, &author_table, &site_config, &cli.output)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&loaded.documents)?);
            } else {
                println!("==> Checking {}", cli.content.display());
                output::print_catalog(&loaded);
                println!("==> Content is valid");
            }
        }
        Command::New(args) => {
            let author_table = authors::load_authors(&cli.authors)?;
            let post = NewPost {
                title: args.title,
                slug: args.slug,
                author: args.author,
                description: args.description,
                date: args.date,
                tags: args.tags,
            };
            let path = scaffold::create_post(&cli.content, &post, &author_table)?;
            println!("Created {}", display_relative(&path));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the config can constrain down,
/// not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn display_relative(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
