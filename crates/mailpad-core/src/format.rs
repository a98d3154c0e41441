/// Rich-text formatting commands and HTML snippet builders.
use crate::sanitize::escape_html;

/// Block elements offered by the heading picker.
pub const HEADING_LEVELS: &[(&str, &str)] = &[
    ("Paragraph", "p"),
    ("Heading 1", "h1"),
    ("Heading 2", "h2"),
    ("Heading 3", "h3"),
    ("Heading 4", "h4"),
    ("Heading 5", "h5"),
    ("Heading 6", "h6"),
];

pub const FONT_SIZES: &[&str] = &[
    "12px", "14px", "16px", "18px", "20px", "24px", "28px", "32px", "36px", "48px",
];

/// A hyperlink to insert at the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    pub text: String,
    pub url: String,
    /// Browsing context, usually `_blank` or `_self`.
    pub target: String,
}

/// Shape of a table to insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub rows: usize,
    pub cols: usize,
    pub has_header: bool,
    pub has_border: bool,
}

/// One editing command sent to the host document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatCommand {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    JustifyFull,
    UnorderedList,
    OrderedList,
    Indent,
    Outdent,
    Link(LinkSpec),
    Image(String),
    Table(TableSpec),
    HorizontalRule,
    RemoveFormat,
    /// Wraps the current block in the given element (`p`, `h1`..`h6`).
    Heading(String),
    FontSize(String),
    ForeColor(String),
    BackColor(String),
    InsertHtml(String),
}

impl FormatCommand {
    /// Host command name (the `execCommand` vocabulary).
    pub fn command_name(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::StrikeThrough => "strikeThrough",
            Self::JustifyLeft => "justifyLeft",
            Self::JustifyCenter => "justifyCenter",
            Self::JustifyRight => "justifyRight",
            Self::JustifyFull => "justifyFull",
            Self::UnorderedList => "insertUnorderedList",
            Self::OrderedList => "insertOrderedList",
            Self::Indent => "indent",
            Self::Outdent => "outdent",
            Self::Image(_) => "insertImage",
            Self::HorizontalRule => "insertHorizontalRule",
            Self::RemoveFormat => "removeFormat",
            Self::Heading(_) => "formatBlock",
            Self::FontSize(_) => "fontSize",
            Self::ForeColor(_) => "foreColor",
            Self::BackColor(_) => "backColor",
            Self::Link(_) | Self::Table(_) | Self::InsertHtml(_) => "insertHTML",
        }
    }

    /// Argument passed along with [`command_name`](Self::command_name).
    pub fn value(&self) -> Option<String> {
        match self {
            Self::Link(link) => Some(link_html(link)),
            Self::Table(table) => Some(table_html(table)),
            Self::Heading(tag) => Some(format!("<{tag}>")),
            Self::Image(v) | Self::FontSize(v) | Self::ForeColor(v) | Self::BackColor(v) | Self::InsertHtml(v) => {
                Some(v.clone())
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    Format,
    Align,
    List,
    Indent,
    Insert,
}

/// A toolbar button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolbarTool {
    pub label: &'static str,
    /// Toolbar command id.
    pub command: &'static str,
    pub category: ToolCategory,
}

const fn tool(label: &'static str, command: &'static str, category: ToolCategory) -> ToolbarTool {
    ToolbarTool {
        label,
        command,
        category,
    }
}

const TOOLBAR: &[ToolbarTool] = &[
    tool("Bold", "bold", ToolCategory::Format),
    tool("Italic", "italic", ToolCategory::Format),
    tool("Underline", "underline", ToolCategory::Format),
    tool("Strikethrough", "strikeThrough", ToolCategory::Format),
    tool("Align left", "justifyLeft", ToolCategory::Align),
    tool("Align center", "justifyCenter", ToolCategory::Align),
    tool("Align right", "justifyRight", ToolCategory::Align),
    tool("Justify", "justifyFull", ToolCategory::Align),
    tool("Bulleted list", "insertUnorderedList", ToolCategory::List),
    tool("Numbered list", "insertOrderedList", ToolCategory::List),
    tool("Decrease indent", "outdent", ToolCategory::Indent),
    tool("Increase indent", "indent", ToolCategory::Indent),
    tool("Insert link", "createLink", ToolCategory::Insert),
    tool("Insert image", "insertImage", ToolCategory::Insert),
    tool("Insert table", "insertTable", ToolCategory::Insert),
    tool("Horizontal rule", "insertHorizontalRule", ToolCategory::Insert),
];

/// The full toolbar in display order.
pub fn toolbar_tools() -> &'static [ToolbarTool] {
    TOOLBAR
}

pub fn tools_in(category: ToolCategory) -> impl Iterator<Item = &'static ToolbarTool> {
    TOOLBAR.iter().filter(move |t| t.category == category)
}

/// `<a>` markup for a link. `_blank` targets get `rel="noopener noreferrer"`.
pub fn link_html(link: &LinkSpec) -> String {
    let rel = if link.target == "_blank" {
        " rel=\"noopener noreferrer\""
    } else {
        ""
    };
    format!(
        "<a href=\"{}\" target=\"{}\"{rel}>{}</a>",
        escape_html(&link.url),
        escape_html(&link.target),
        escape_html(&link.text)
    )
}

/// `<table>` markup with empty cells, followed by a `<br>`.
pub fn table_html(table: &TableSpec) -> String {
    let rows = table.rows.max(1);
    let cols = table.cols.max(1);
    let border = if table.has_border {
        "border: 1px solid #ccc; "
    } else {
        ""
    };

    let mut html = String::from("<table style=\"");
    if table.has_border {
        html.push_str("border-collapse: collapse; border: 1px solid #ccc; ");
    }
    html.push_str("width: 100%\">");

    if table.has_header {
        html.push_str("<thead><tr>");
        for col in 1..=cols {
            html.push_str(&format!(
                "<th style=\"{border}padding: 8px; background-color: #f5f5f5;\">Column {col}</th>"
            ));
        }
        html.push_str("</tr></thead>");
    }

    html.push_str("<tbody>");
    for _ in 0..rows {
        html.push_str("<tr>");
        for _ in 0..cols {
            html.push_str(&format!("<td style=\"{border}padding: 8px;\">&nbsp;</td>"));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table><br>");
    html
}
