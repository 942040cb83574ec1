//! # Rendering
//!
//! Turns command results into terminal text. Every `render_*` function
//! returns a `String` so it can be tested without a terminal; `commands.rs`
//! does the printing.
//!
//! Layout math (width, truncation, padding) is Unicode-aware via
//! `unicode-width`. Colors come from `colored`, which turns itself off when
//! stdout is not a terminal or `NO_COLOR` is set.

use campusapp::api::{AdminRow, Homepage, WhoAmI};
use campusapp::commands::{CmdMessage, MessageLevel};
use campusapp::listing::Page;
use campusapp::model::{
    CampaignStatus, EmailCampaign, GalleryItem, GuidanceSession, Priority, SchoolInfo,
};
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;
const ID_WIDTH: usize = 10;

pub fn render_messages(messages: &[CmdMessage]) -> String {
    let mut out = String::new();
    for message in messages {
        let line = match message.level {
            MessageLevel::Info => message.content.dimmed(),
            MessageLevel::Success => message.content.green(),
            MessageLevel::Warning => message.content.yellow(),
            MessageLevel::Error => message.content.red(),
        };
        out.push_str(&format!("{}\n", line));
    }
    out
}

/// The `--json` document: data and messages together.
pub fn render_json<T: Serialize>(data: Option<&T>, messages: &[CmdMessage]) -> String {
    #[derive(Serialize)]
    struct Envelope<'a, T> {
        data: Option<&'a T>,
        messages: &'a [CmdMessage],
    }
    serde_json::to_string_pretty(&Envelope { data, messages })
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

pub fn render_admins(page: &Page<AdminRow>) -> String {
    if page.is_empty() {
        return "No admins found.\n".to_string();
    }
    let mut out = String::new();
    for row in &page.items {
        let admin = &row.admin;
        let marker = if row.is_self { "*" } else { " " };
        let label = format!("{} <{}>", admin.name, admin.email);
        let right = format!(
            "{:<11} {:<8}",
            admin.role.as_str().to_lowercase(),
            admin.status.as_str()
        );
        let line = columns(&format!("{} ", marker), &short_id(&admin.id), &label, &right);
        out.push_str(&if row.is_self {
            line.bold().to_string()
        } else {
            line
        });
        out.push('\n');
    }
    out.push_str(&page_footer(page));
    out
}

pub fn render_campaigns(page: &Page<EmailCampaign>) -> String {
    if page.is_empty() {
        return "No campaigns found.\n".to_string();
    }
    let mut out = String::new();
    for campaign in &page.items {
        let status = match campaign.status {
            CampaignStatus::Draft => "draft    ".yellow(),
            CampaignStatus::Published => "published".green(),
        };
        let label = format!("{}: {}", campaign.title, campaign.subject);
        let recipients = format!(
            "{} ({})",
            campaign.recipient_type,
            campaign.recipient_count
        );
        let right = format!("{:<14} {}", truncate_to_width(&recipients, 14), status);
        out.push_str(&columns("  ", &short_id(&campaign.id), &label, &right));
        out.push('\n');
    }
    out.push_str(&page_footer(page));
    out
}

/// A gallery item with its derived values, for JSON output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryRow<'a> {
    #[serde(flatten)]
    pub item: &'a GalleryItem,
    pub file_type: &'static str,
    pub file_count: usize,
}

pub fn gallery_rows(page: &Page<GalleryItem>) -> Page<GalleryRow<'_>> {
    Page {
        items: page
            .items
            .iter()
            .map(|item| GalleryRow {
                item,
                file_type: item.file_type().as_str(),
                file_count: item.file_count(),
            })
            .collect(),
        page: page.page,
        total_pages: page.total_pages,
        total_items: page.total_items,
        page_size: page.page_size,
    }
}

pub fn render_gallery(page: &Page<GalleryItem>) -> String {
    if page.is_empty() {
        return "No gallery items found.\n".to_string();
    }
    let mut out = String::new();
    for item in &page.items {
        let right = format!(
            "{:<16} {:>2} {:<5} {}",
            truncate_to_width(item.category.label(), 16),
            item.file_count(),
            item.file_type().as_str(),
            format_time_ago(item.created_at)
        );
        out.push_str(&columns("  ", &short_id(&item.id), &item.title, &right));
        out.push('\n');
    }
    out.push_str(&page_footer(page));
    out
}

pub fn render_guidance(page: &Page<GuidanceSession>) -> String {
    if page.is_empty() {
        return "No guidance sessions found.\n".to_string();
    }
    let mut out = String::new();
    for session in &page.items {
        let priority = match session.priority {
            Priority::High => "high  ".red(),
            Priority::Medium => "medium".yellow(),
            Priority::Low => "low   ".normal(),
        };
        let label = format!("{} ({})", session.counselor, session.category);
        let right = format!(
            "{:<13} {} {:<5} {}",
            session.kind.as_str(),
            session.date.format("%Y-%m-%d"),
            session.time,
            priority
        );
        out.push_str(&columns("  ", &short_id(&session.id), &label, &right));
        out.push('\n');
    }
    out.push_str(&page_footer(page));
    out
}

pub fn render_school(info: &SchoolInfo) -> String {
    let mut out = format!("{}\n", info.name.bold());
    if !info.motto.is_empty() {
        out.push_str(&format!("{}\n", info.motto.italic()));
    }
    out.push('\n');

    let list = |items: &[String]| {
        if items.is_empty() {
            "-".to_string()
        } else {
            items.join(", ")
        }
    };
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let fields = [
        ("Description", info.description.clone()),
        ("Vision", info.vision.clone()),
        ("Mission", info.mission.clone()),
        ("Students", info.student_count.to_string()),
        ("Staff", info.staff_count.to_string()),
        ("Term", format!("{} to {}", info.open_date, info.close_date)),
        ("Subjects", list(&info.subjects)),
        ("Departments", list(&info.departments)),
        (
            "Video tour",
            match &info.video_tour {
                Some(url) => format!("{} ({})", url, info.video_type),
                None => "-".to_string(),
            },
        ),
        (
            "Admissions",
            format!(
                "{} to {}",
                info.admission_open_date, info.admission_close_date
            ),
        ),
        ("Requirements", info.admission_requirements.clone()),
        ("Fee", optional(&info.admission_fee)),
        (
            "Capacity",
            info.admission_capacity
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        ("Contact", info.admission_contact_email.clone()),
        ("Phone", optional(&info.admission_contact_phone)),
    ];
    for (label, value) in fields {
        out.push_str(&format!("{:<13} {}\n", label.dimmed(), value));
    }
    out
}

pub fn render_homepage(home: &Homepage) -> String {
    let mut out = format!("{}\n", home.school.name.bold());
    if let Some(motto) = &home.school.motto {
        out.push_str(&format!("{}\n", motto.italic()));
    }

    out.push_str(&format!("\n{}\n", "Upcoming events".underline()));
    if home.events.is_empty() {
        out.push_str("  none\n");
    }
    for event in &home.events {
        let place = event.location.as_deref().unwrap_or("");
        out.push_str(&format!(
            "  {}  {} {}\n",
            event.date.format("%Y-%m-%d").to_string().yellow(),
            event.title,
            place.dimmed()
        ));
    }

    out.push_str(&format!("\n{}\n", "News".underline()));
    if home.news.is_empty() {
        out.push_str("  none\n");
    }
    for item in &home.news {
        out.push_str(&format!("  {}\n", item.title));
        if let Some(summary) = &item.summary {
            out.push_str(&format!(
                "    {}\n",
                truncate_to_width(summary, LINE_WIDTH - 4).dimmed()
            ));
        }
    }
    out
}

pub fn render_whoami(who: &WhoAmI) -> String {
    let mut out = format!(
        "{} <{}> {}\n",
        who.user.name.bold(),
        who.user.email,
        who.user.role.as_str().to_lowercase().dimmed()
    );
    if let Some(at) = who.signed_in_at {
        out.push_str(&format!("signed in {}\n", format_time_ago(Some(at)).trim()));
    }
    if let Some(at) = who.expires_at {
        out.push_str(&format!("token expires {}\n", at.format("%Y-%m-%d %H:%M UTC")));
    }
    out
}

fn page_footer<T>(page: &Page<T>) -> String {
    format!(
        "{}\n",
        format!(
            "page {} of {} ({} {})",
            page.page,
            page.total_pages.max(1),
            page.total_items,
            if page.total_items == 1 { "item" } else { "items" }
        )
        .dimmed()
    )
}

/// `prefix id  label......  right`, fitted to the line width.
fn columns(prefix: &str, id: &str, label: &str, right: &str) -> String {
    let id_col = format!("{:<width$}", id, width = ID_WIDTH);
    let fixed = prefix.width() + ID_WIDTH + 1 + 1 + plain_width(right);
    let available = LINE_WIDTH.saturating_sub(fixed);
    let label = truncate_to_width(label, available);
    let padding = available.saturating_sub(label.width());
    format!(
        "{}{} {}{} {}",
        prefix,
        id_col.dimmed(),
        label,
        " ".repeat(padding),
        right
    )
}

/// Display width ignoring ANSI escape sequences.
fn plain_width(s: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in s.chars() {
        match (in_escape, c) {
            (false, '\u{1b}') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, c) => width += c.width().unwrap_or(0),
        }
    }
    width
}

fn short_id(id: &str) -> String {
    truncate_to_width(id, ID_WIDTH)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_time_ago(timestamp: Option<DateTime<Utc>>) -> String {
    let Some(timestamp) = timestamp else {
        return format!("{:>width$}", "", width = TIME_WIDTH);
    };
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use campusapp::model::{AdminRecord, GalleryCategory, Permissions, Role};

    fn plain() {
        colored::control::set_override(false);
    }

    fn page<T>(items: Vec<T>) -> Page<T> {
        let n = items.len();
        Page {
            items,
            page: 1,
            total_pages: 1,
            total_items: n,
            page_size: 8,
        }
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate_to_width("abcdef", 4), "abc…");
        assert_eq!(truncate_to_width("abc", 4), "abc");
        assert_eq!(truncate_to_width("日本語です", 5), "日本…");
    }

    #[test]
    fn plain_width_skips_ansi() {
        assert_eq!(plain_width("\u{1b}[32mok\u{1b}[0m"), 2);
    }

    #[test]
    fn rows_fit_the_line() {
        plain();
        let line = columns("  ", "abc", &"x".repeat(300), "right");
        assert_eq!(line.width(), LINE_WIDTH);
    }

    #[test]
    fn own_admin_row_is_marked() {
        plain();
        let admin = |id: &str, name: &str| AdminRecord {
            id: id.into(),
            name: name.into(),
            email: format!("{}@school.test", name.to_lowercase()),
            phone: String::new(),
            role: Role::Admin,
            status: Default::default(),
            permissions: Permissions::default(),
            created_at: None,
            updated_at: None,
        };
        let rows = page(vec![
            AdminRow {
                admin: admin("a1", "Ada"),
                is_self: true,
                can_delete: false,
            },
            AdminRow {
                admin: admin("b2", "Bola"),
                is_self: false,
                can_delete: true,
            },
        ]);

        let out = render_admins(&rows);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("* a1"));
        assert!(lines[1].starts_with("  b2"));
        assert!(lines[2].contains("page 1 of 1 (2 items)"));
    }

    #[test]
    fn gallery_rows_carry_derived_fields() {
        let item = GalleryItem {
            id: "g1".into(),
            title: "Sports Day".into(),
            description: String::new(),
            category: GalleryCategory::SportsDay,
            files: vec!["/u/a.jpg".into()],
            created_at: None,
            updated_at: None,
        };
        let items = page(vec![item]);
        let json = serde_json::to_value(gallery_rows(&items)).unwrap();
        assert_eq!(json["items"][0]["fileType"], "image");
        assert_eq!(json["items"][0]["fileCount"], 1);
        assert_eq!(json["items"][0]["category"], "SPORTS_DAY");
    }

    #[test]
    fn empty_pages_say_so() {
        plain();
        assert_eq!(render_campaigns(&page(vec![])), "No campaigns found.\n");
    }

    #[test]
    fn json_envelope_has_data_and_messages() {
        let out = render_json(Some(&vec![1, 2]), &[CmdMessage::success("done")]);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["data"], serde_json::json!([1, 2]));
        assert_eq!(value["messages"][0]["level"], "success");
    }
}
