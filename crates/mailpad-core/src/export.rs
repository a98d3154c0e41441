/// Export of templates as standalone HTML documents.
///
/// A single template becomes `<name>.html`; a batch export writes every
/// template into a dated bundle directory `email_templates_<YYYY-MM-DD>/`.
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::sanitize::{escape_html, sanitize_html};
use crate::template::EmailTemplate;

const STYLE: &str = "\
        body {
            font-family: Arial, Helvetica, sans-serif;
            line-height: 1.6;
            color: #333;
            max-width: 800px;
            margin: 0 auto;
            padding: 20px;
        }
        .template-header {
            margin-bottom: 20px;
            padding-bottom: 10px;
            border-bottom: 1px solid #eaeaea;
        }
        .template-title {
            font-size: 24px;
            font-weight: bold;
            color: #333;
            margin-bottom: 10px;
        }
        .template-meta {
            font-size: 14px;
            color: #666;
        }
        .template-category {
            display: inline-block;
            background-color: #e6f7ff;
            color: #0066cc;
            padding: 3px 8px;
            border-radius: 12px;
            font-size: 12px;
            margin-left: 10px;
        }
        .template-content {
            margin-top: 20px;
        }";

/// Renders a template as a complete HTML document.
///
/// Title and name are escaped; the body is sanitized.
pub fn render_template_html(template: &EmailTemplate) -> String {
    let title = escape_html(&template.title);
    let name = escape_html(&template.name);
    let lang = escape_html(&template.language);
    let category = template.category.label();
    let content = sanitize_html(&template.content);

    format!(
        "<!DOCTYPE html>
<html lang=\"{lang}\">
<head>
    <meta charset=\"UTF-8\">
    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">
    <title>{title}</title>
    <style>
{STYLE}
    </style>
</head>
<body>
    <div class=\"template-header\">
        <div class=\"template-title\">{title}</div>
        <div class=\"template-meta\">
            Template: {name}
            <span class=\"template-category\">{category}</span>
        </div>
    </div>

    <div class=\"template-content\">
        {content}
    </div>
</body>
</html>
"
    )
}

/// Turns a template name into a portable file stem.
///
/// Path separators, reserved characters and control characters become `_`;
/// leading and trailing dots and spaces are trimmed.
pub fn safe_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if trimmed.is_empty() {
        "template".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Name of the bundle directory for an export made on `date`.
pub fn bundle_dir_name(date: NaiveDate) -> String {
    format!("email_templates_{}", date.format("%Y-%m-%d"))
}

/// Writes one template to `<dir>/<name>.html`, creating `dir` if needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn export_template(template: &EmailTemplate, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {}", dir.display()))?;
    let path = dir.join(format!("{}.html", safe_file_name(&template.name)));
    write_html(template, &path)?;
    Ok(path)
}

/// Writes every template into `<dir>/email_templates_<date>/`.
///
/// Templates whose names collide get a ` (2)`, ` (3)`... suffix.
/// Returns the bundle directory and the written files in input order.
///
/// # Errors
///
/// Returns an error if the bundle directory or any file cannot be written.
pub fn export_templates(
    templates: &[EmailTemplate],
    dir: &Path,
    date: NaiveDate,
) -> Result<(PathBuf, Vec<PathBuf>)> {
    let bundle = dir.join(bundle_dir_name(date));
    std::fs::create_dir_all(&bundle)
        .with_context(|| format!("Failed to create export bundle: {}", bundle.display()))?;

    let mut used = HashSet::new();
    let mut files = Vec::with_capacity(templates.len());
    for template in templates {
        let stem = safe_file_name(&template.name);
        let mut candidate = stem.clone();
        let mut n = 2;
        while !used.insert(candidate.to_lowercase()) {
            candidate = format!("{stem} ({n})");
            n += 1;
        }
        let path = bundle.join(format!("{candidate}.html"));
        write_html(template, &path)?;
        files.push(path);
    }
    tracing::info!("Exported {} template(s) to {}", files.len(), bundle.display());
    Ok((bundle, files))
}

fn write_html(template: &EmailTemplate, path: &Path) -> Result<()> {
    std::fs::write(path, render_template_html(template))
        .with_context(|| format!("Failed to write {}", path.display()))
}
