use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use mailpad_config::{AppConfig, DraftKey, DraftStore};
use mailpad_core::export::{export_template, export_templates};
use mailpad_core::language::language_name;
use mailpad_core::sanitize::{html_summary, sanitize_html};
use mailpad_core::validation::{validate_template, TemplateFields, ValidationLimits};
use mailpad_core::{EmailCategory, EmailTemplate, TemplateLibrary};

/// Characters of body text shown in listings.
const PREVIEW_CHARS: usize = 150;

/// Email template editor: browse and export templates, manage drafts.
#[derive(Debug, Parser)]
#[command(name = "mailpad", version, about)]
pub struct Cli {
    /// Config file (defaults to mailpad.json next to the executable).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory holding the draft database.
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the built-in templates.
    Templates {
        #[arg(long)]
        category: Option<EmailCategory>,
        /// Only templates whose name, title or tags contain this text.
        #[arg(long)]
        search: Option<String>,
    },

    /// Print one template.
    Show {
        id: u32,
        /// Print the sanitized HTML body instead of a text preview.
        #[arg(long)]
        html: bool,
    },

    /// Export one template as an HTML file.
    Export {
        id: u32,
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export every template into a dated bundle directory.
    #[command(name = "export-all")]
    ExportAll {
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage saved drafts.
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Check template fields against the configured limits.
    Validate(ValidateArgs),
}

#[derive(Debug, Subcommand)]
pub enum DraftCommand {
    /// Save a draft.
    Save {
        /// Template the draft belongs to; omitted means the default slot.
        #[arg(long)]
        template: Option<u32>,
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// Print a draft.
    Show {
        #[arg(long)]
        template: Option<u32>,
    },
    /// List all drafts.
    List,
    /// Delete one draft, or all of them with --all.
    Clear {
        #[arg(long, conflicts_with = "all")]
        template: Option<u32>,
        #[arg(long)]
        all: bool,
    },
    /// Delete drafts older than the configured expiry.
    Cleanup,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub content: String,
    #[arg(long)]
    pub category: Option<EmailCategory>,
}

/// Resolved environment a command runs in.
#[derive(Debug)]
pub struct AppContext {
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub library: TemplateLibrary,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Self {
        let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
        Self {
            config: AppConfig::load_or_create(&config_path),
            data_dir: cli
                .data_dir
                .clone()
                .unwrap_or_else(mailpad_mod_history::config::resolve_data_dir),
            library: TemplateLibrary::builtin(),
        }
    }

    fn template(&self, id: u32) -> Result<&EmailTemplate> {
        self.library
            .get(id)
            .with_context(|| format!("No template with id {id}"))
    }

    fn drafts(&self) -> Result<DraftStore> {
        DraftStore::open(&DraftStore::draft_path(&self.data_dir))
    }

    fn export_dir(&self, out: Option<PathBuf>) -> Result<PathBuf> {
        out.or_else(|| self.config.resolve_export_dir())
            .context("No export directory: pass --out or set export_dir")
    }
}

/// Runs `command`, returning the text to print.
pub fn run(command: Commands, ctx: &AppContext) -> Result<String> {
    match command {
        Commands::Templates { category, search } => Ok(list_templates(ctx, category, search.as_deref())),
        Commands::Show { id, html } => Ok(show_template(ctx.template(id)?, html)),
        Commands::Export { id, out } => {
            let path = export_template(ctx.template(id)?, &ctx.export_dir(out)?)?;
            Ok(format!("Exported to {}", path.display()))
        }
        Commands::ExportAll { out } => {
            let templates: Vec<EmailTemplate> = ctx.library.iter().cloned().collect();
            let today = chrono::Local::now().date_naive();
            let (bundle, files) = export_templates(&templates, &ctx.export_dir(out)?, today)?;
            Ok(format!("Exported {} template(s) to {}", files.len(), bundle.display()))
        }
        Commands::Draft(cmd) => run_draft(cmd, ctx),
        Commands::Validate(args) => validate(&args, &ctx.config),
    }
}

fn list_templates(ctx: &AppContext, category: Option<EmailCategory>, search: Option<&str>) -> String {
    let matches: Vec<&EmailTemplate> = match search {
        Some(query) => ctx.library.search(query),
        None => ctx.library.iter().collect(),
    };
    let lines: Vec<String> = matches
        .into_iter()
        .filter(|t| category.map_or(true, |c| t.category == c))
        .map(|t| format!("{:>3}  {:<13} {:<24} {}", t.id, t.category.as_str(), t.name, t.title))
        .collect();
    if lines.is_empty() {
        "No templates found".to_string()
    } else {
        lines.join("\n")
    }
}

fn show_template(template: &EmailTemplate, html: bool) -> String {
    let body = if html {
        sanitize_html(&template.content)
    } else {
        html_summary(&template.content, PREVIEW_CHARS)
    };
    format!(
        "Name:     {}\nTitle:    {}\nCategory: {}\nLanguage: {}\n\n{body}",
        template.name,
        template.title,
        template.category.label(),
        language_name(&template.language)
    )
}

fn run_draft(cmd: DraftCommand, ctx: &AppContext) -> Result<String> {
    let store = ctx.drafts()?;
    match cmd {
        DraftCommand::Save {
            template,
            title,
            content,
        } => {
            if let Some(id) = template {
                ctx.template(id)?;
            }
            let key = DraftKey::for_template(template);
            store.save_draft(key, &title, &content)?;
            Ok(format!("Saved draft ({key})"))
        }
        DraftCommand::Show { template } => {
            let key = DraftKey::for_template(template);
            match store.load_draft(key)? {
                Some(draft) => Ok(format!(
                    "Title: {}\nSaved: {}\n\n{}",
                    draft.title,
                    format_timestamp(draft.timestamp),
                    draft.content
                )),
                None => Ok(format!("No draft ({key})")),
            }
        }
        DraftCommand::List => {
            let drafts = store.list_drafts()?;
            if drafts.is_empty() {
                return Ok("No drafts".to_string());
            }
            Ok(drafts
                .iter()
                .map(|(key, draft)| {
                    format!(
                        "{:<14} {}  {}",
                        key.to_string(),
                        format_timestamp(draft.timestamp),
                        draft.title
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
        DraftCommand::Clear { template, all } => {
            if all {
                store.clear()?;
                return Ok("Cleared all drafts".to_string());
            }
            let key = DraftKey::for_template(template);
            if store.delete_draft(key)? {
                Ok(format!("Deleted draft ({key})"))
            } else {
                Ok(format!("No draft ({key})"))
            }
        }
        DraftCommand::Cleanup => {
            let now_ms = chrono::Utc::now().timestamp_millis();
            let removed = store.cleanup_expired(ctx.config.storage_expiry(), now_ms)?;
            Ok(format!("Removed {removed} expired draft(s)"))
        }
    }
}

fn validate(args: &ValidateArgs, config: &AppConfig) -> Result<String> {
    let fields = TemplateFields {
        name: &args.name,
        title: &args.title,
        content: &args.content,
        category: args.category,
    };
    let report = validate_template(&fields, &ValidationLimits::from(config));
    if report.is_valid() {
        Ok("Valid".to_string())
    } else {
        bail!("Validation failed:\n{}", report.summary())
    }
}

fn format_timestamp(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|| "unknown".to_string())
}
