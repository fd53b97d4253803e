use clap::{ArgGroup, CommandFactory, Parser, Subcommand};

mod commands;
mod config;
mod context;
mod format;

use commands::image::delete::DeleteOptions;

/// nexus - tag housekeeping for Nexus Docker repositories
///
/// Lists images and tags of a private registry and deletes old tags under a
/// retention policy.
#[derive(Parser, Debug)]
#[command(name = "nexus")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Control colored output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configure Nexus host, repository and credentials
    Configure,
    /// Manage Docker images
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Display version information
    Version,
    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
enum ImageCommands {
    /// List all images in the repository
    #[command(visible_alias = "ls")]
    List {
        /// Output format: pretty, json, yaml
        #[arg(short, long)]
        format: Option<String>,
        /// Show only image names
        #[arg(short, long)]
        quiet: bool,
    },
    /// List the tags of an image, oldest first
    Tags {
        /// Image name
        #[arg(short, long)]
        name: String,
        /// Sort strategy: semver (default) or nosemver
        #[arg(short, long)]
        sort: Option<String>,
        /// Tags sorted last (comma separated or repeated); latest always is
        #[arg(short, long, value_delimiter = ',')]
        exclude: Vec<String>,
        /// Output format: pretty, json, yaml
        #[arg(short, long)]
        format: Option<String>,
        /// Show only tag names
        #[arg(short, long)]
        quiet: bool,
    },
    /// Show the config size and layers of a tag
    Info {
        /// Image name
        #[arg(short, long)]
        name: String,
        /// Tag
        #[arg(short, long)]
        tag: String,
        /// Output format: pretty, json, yaml
        #[arg(short, long)]
        format: Option<String>,
    },
    /// Delete one tag, or old tags under a keep policy
    #[command(group(ArgGroup::new("target").required(true).args(["tag", "keep"])))]
    Delete {
        /// Image name
        #[arg(short, long)]
        name: String,
        /// Delete exactly this tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Keep policy, e.g. "prod,stage:3,others:5"
        #[arg(short, long)]
        keep: Option<String>,
        /// Sort strategy: semver (default) or nosemver
        #[arg(short, long)]
        sort: Option<String>,
        /// Tags never deleted (comma separated or repeated); latest always is
        #[arg(short, long, value_delimiter = ',')]
        exclude: Vec<String>,
        /// Show what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
        /// Output format: pretty, json, yaml
        #[arg(short, long)]
        format: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbosity = context::VerbosityLevel::from_count(cli.verbose);
    context::init_tracing(verbosity);

    // Build context with precedence: defaults > config file > env vars > CLI flags
    let ctx = context::AppContext::build(
        cli.color.as_deref().map(format::ColorChoice::from),
        verbosity,
    );

    let output_format = |flag: Option<String>| {
        flag.as_deref()
            .map(format::OutputFormat::from)
            .unwrap_or(ctx.config.output.format)
    };

    match cli.command {
        Commands::Configure => commands::configure::handle_configure(&ctx),
        Commands::Image { command } => match command {
            ImageCommands::List { format, quiet } => {
                commands::image::list::handle_image_list(&ctx, output_format(format), quiet).await;
            }
            ImageCommands::Tags {
                name,
                sort,
                exclude,
                format,
                quiet,
            } => {
                commands::image::tags::handle_image_tags(
                    &ctx,
                    &name,
                    sort.as_deref(),
                    &exclude,
                    output_format(format),
                    quiet,
                )
                .await;
            }
            ImageCommands::Info { name, tag, format } => {
                commands::image::info::handle_image_info(&ctx, &name, &tag, output_format(format))
                    .await;
            }
            ImageCommands::Delete {
                name,
                tag,
                keep,
                sort,
                exclude,
                dry_run,
                format,
            } => {
                let options = DeleteOptions {
                    tag,
                    keep,
                    sort,
                    exclude,
                    dry_run,
                };
                commands::image::delete::handle_image_delete(
                    &ctx,
                    &name,
                    options,
                    output_format(format),
                )
                .await;
            }
        },
        Commands::Version => {
            commands::version::print_version();
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let bin_name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }
    }
}
