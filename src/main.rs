// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use docxlate::app_config::{self, Config, TranslationProvider};
use docxlate::app_controller::{Controller, RunOutcome};
use docxlate::database::{DatabaseConnection, UsageTracker};
use docxlate::identity;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Google,
    #[value(name = "openai")]
    OpenAI,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Google => TranslationProvider::Google,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate a .docx document or every document in a folder (default command)
    Translate(TranslateArgs),

    /// Show translation statistics for the current user
    Stats(UserArgs),

    /// Show translation statistics across all users
    Analytics {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for docxlate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct UserArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// User id to report on (defaults to the stored id)
    #[arg(long)]
    user_id: Option<String>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Input .docx file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    #[command(flatten)]
    options: TranslateOptions,
}

#[derive(Args, Debug)]
struct TranslateOptions {
    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// OpenAI API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name to use for OpenAI translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'de', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'de', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Directory for translated files (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// User id the translation is counted against
    #[arg(long)]
    user_id: Option<String>,

    /// Maximum translations per user per day
    #[arg(long)]
    daily_limit: Option<u32>,
}

/// docxlate - translate Word documents in place
///
/// Translates the paragraphs and table cells of .docx documents with Google
/// Translate or OpenAI, keeping the document's formatting.
#[derive(Parser, Debug)]
#[command(name = "docxlate")]
#[command(version)]
#[command(about = "Translate .docx documents with Google Translate or OpenAI")]
#[command(long_about = "docxlate translates the text of .docx documents and writes translated_<name>.docx next to the input.

EXAMPLES:
    docxlate report.docx                          # Translate using default config
    docxlate -f report.docx                       # Force overwrite existing output
    docxlate -s en -t de report.docx              # Translate from English to German
    docxlate -p openai -m gpt-4o report.docx      # Use OpenAI (key from OPENAI_API_KEY)
    docxlate -o out/ /docs/                       # Process an entire directory
    docxlate stats                                # Show your usage
    docxlate completions bash > docxlate.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    google - Google Translate (no key required, default)
    openai - OpenAI chat completions (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input .docx file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    #[command(flatten)]
    options: TranslateOptions,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // Filtering happens through log::max_level so the level can change later
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI colour for log level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, colour) = Self::decoration(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config or CLI says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "docxlate", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Stats(args)) => show_user_stats(args).await,
        Some(Commands::Analytics { config_path }) => show_analytics(&config_path).await,
        Some(Commands::Translate(args)) => exit_on_failure(run_translate(args).await),
        None => {
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;

            let translate_args = TranslateArgs {
                input_path,
                options: cli.options,
            };
            exit_on_failure(run_translate(translate_args).await)
        }
    }
}

fn exit_on_failure(result: Result<()>) -> Result<()> {
    if let Err(e) = result {
        error!("An error occurred during translation: {:#}", e);
        error!("Please try again or check your language codes.");
        std::process::exit(1);
    }
    Ok(())
}

// @loads: Config file with CLI overrides applied
fn load_config(options: &TranslateOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&options.config_path)?;

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.openai.api_key = api_key.clone();
    }
    if let Some(model) = &options.model {
        config.translation.openai.model = model.clone();
    }
    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }
    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Some(daily_limit) = options.daily_limit {
        config.usage.daily_limit = daily_limit;
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn open_tracker(config: &Config) -> Result<UsageTracker> {
    match &config.usage.database_path {
        Some(path) => Ok(UsageTracker::new(DatabaseConnection::new(path)?)),
        None => UsageTracker::new_default(),
    }
}

fn resolve_user(config: &Config, explicit: Option<&str>) -> Result<String> {
    let store_path = match &config.usage.identity_path {
        Some(path) => PathBuf::from(path),
        None => identity::default_identity_path()?,
    };
    identity::resolve(explicit, &store_path)
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    let options = &args.options;
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(options)?;
    log::set_max_level(config.log_level.to_level_filter());

    let tracker = open_tracker(&config)?;
    let user_id = resolve_user(&config, options.user_id.as_deref())?;
    info!("User id: {} (pass --user-id to reuse it elsewhere)", user_id);

    let controller = Controller::new(config, tracker, user_id).with_progress_bars();

    if args.input_path.is_file() {
        let outcome = controller
            .run(&args.input_path, options.output_dir.as_deref(), options.force_overwrite)
            .await?;
        if let RunOutcome::Translated { output, .. } = outcome {
            println!("{}", output.display());
        }
    } else if args.input_path.is_dir() {
        if options.output_dir.is_some() {
            log::warn!("--output-dir is ignored for folders; outputs are written next to each source");
        }
        let summary = controller.run_folder(&args.input_path, options.force_overwrite).await?;
        if summary.translated == 0 && summary.failed > 0 {
            return Err(anyhow!("No document in {:?} could be translated", args.input_path));
        }
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    Ok(())
}

fn load_config_quietly(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        Config::load_or_create(config_path)
    } else {
        Ok(Config::default())
    }
}

async fn show_user_stats(args: UserArgs) -> Result<()> {
    let config = load_config_quietly(&args.config_path)?;
    let tracker = open_tracker(&config)?;
    let user_id = resolve_user(&config, args.user_id.as_deref())?;

    let stats = tracker.get_user_stats(&user_id).await?;
    println!("User: {}", user_id);
    println!("Today: {}/{}", stats.today_count, config.usage.daily_limit);
    println!("Total translations: {}", stats.total_translations);
    println!(
        "First translation: {}",
        stats.first_translation.as_deref().unwrap_or("never")
    );
    if !stats.popular_languages.is_empty() {
        println!("Popular language pairs:");
        for pair in &stats.popular_languages {
            println!("  {}", pair);
        }
    }

    Ok(())
}

async fn show_analytics(config_path: &str) -> Result<()> {
    let config = load_config_quietly(config_path)?;
    let tracker = open_tracker(&config)?;

    let analytics = tracker.get_analytics().await?;
    println!("Total users: {}", analytics.total_users);
    println!("Total translations: {}", analytics.total_translations);
    println!("Active today: {}", analytics.active_today);
    if !analytics.popular_pairs.is_empty() {
        println!("Popular language pairs:");
        for pair in &analytics.popular_pairs {
            println!("  {}", pair);
        }
    }

    Ok(())
}
