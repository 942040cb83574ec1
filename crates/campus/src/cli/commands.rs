//! # CLI Layer
//!
//! This module is **one possible UI client** for campus, not the application
//! itself. It is the only place that knows about stdout, stderr and argument
//! parsing.
//!
//! ## Structure
//!
//! - `run()`: parse, set up logging, build the context, dispatch
//! - `handle_*()`: per-command handlers that call [`CampusApi`] and print
//! - rendering lives in `render.rs` and returns strings
//!
//! Errors from the library are reduced to their user-facing message here;
//! transport details go to the debug log.
//!
//! [`CampusApi`]: campusapp::api::CampusApi

use super::render::{
    gallery_rows, render_admins, render_campaigns, render_gallery, render_guidance,
    render_homepage, render_json, render_messages, render_school, render_whoami,
};
use super::setup::{
    AdminCommands, CampaignCommands, Cli, Commands, GalleryCommands, GuidanceCommands,
    GuidanceFields, Paging, SchoolCommands, SchoolFields,
};
use anyhow::{anyhow, Result};
use campusapp::api::{
    AdminDraft, CampaignDraft, Credentials, GalleryDraft, GuidanceDraft, ListQuery,
    SchoolInfoDraft,
};
use campusapp::commands::CmdResult;
use campusapp::error::CampusError;
use campusapp::init::{initialize, CampusContext};
use campusapp::staging::FileChange;
use clap::Parser;
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

struct AppContext {
    inner: CampusContext,
    json: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Login { email, password } => handle_login(&mut ctx, email, password),
        Commands::Logout => handle_logout(&mut ctx),
        Commands::Whoami => handle_whoami(&ctx),
        Commands::Admins(cmd) => handle_admins(&mut ctx, cmd),
        Commands::Campaigns(cmd) => handle_campaigns(&ctx, cmd),
        Commands::Gallery(cmd) => handle_gallery(&ctx, cmd),
        Commands::Guidance(cmd) => handle_guidance(&ctx, cmd),
        Commands::School(cmd) => handle_school(&ctx, cmd),
        Commands::Home => handle_home(&ctx),
    }
}

/// Logs go to stderr so stdout stays clean for `--json`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let inner = initialize(cli.data_dir.clone(), cli.api_url.clone()).map_err(user_error)?;
    debug!(api_url = %inner.config.api_url(), "context ready");
    Ok(AppContext {
        inner,
        json: cli.json,
    })
}

fn user_error(e: CampusError) -> anyhow::Error {
    debug!(error = ?e, "command failed");
    anyhow!("{}", e.user_message())
}

/// Print a result, either as JSON or through `render` plus the messages.
fn emit<T: Serialize>(
    ctx: &AppContext,
    result: CmdResult<T>,
    render: impl FnOnce(&T) -> String,
) -> Result<()> {
    if ctx.json {
        println!("{}", render_json(result.data.as_ref(), &result.messages));
    } else {
        if let Some(data) = &result.data {
            print!("{}", render(data));
        }
        print!("{}", render_messages(&result.messages));
    }
    Ok(())
}

fn emit_messages(ctx: &AppContext, result: CmdResult) -> Result<()> {
    emit(ctx, result, |_| String::new())
}

fn query<F: Default>(paging: Paging, filter: F) -> ListQuery<F> {
    ListQuery {
        search: paging.search.unwrap_or_default(),
        filter,
        page: paging.page,
    }
}

// --- session ---

fn handle_login(ctx: &mut AppContext, email: String, password: String) -> Result<()> {
    let result = ctx
        .inner
        .api
        .login(Credentials { email, password })
        .map_err(user_error)?;
    emit(ctx, result, |_| String::new())
}

fn handle_logout(ctx: &mut AppContext) -> Result<()> {
    let result = ctx.inner.api.logout().map_err(user_error)?;
    emit_messages(ctx, result)
}

fn handle_whoami(ctx: &AppContext) -> Result<()> {
    let result = ctx.inner.api.whoami().map_err(user_error)?;
    emit(ctx, result, render_whoami)
}

// --- admins ---

fn handle_admins(ctx: &mut AppContext, cmd: AdminCommands) -> Result<()> {
    match cmd {
        AdminCommands::List {
            paging,
            role,
            status,
        } => {
            let filter = campusapp::model::AdminFilter { role, status };
            let result = ctx
                .inner
                .api
                .list_admins(query(paging, filter))
                .map_err(user_error)?;
            emit(ctx, result, render_admins)
        }
        AdminCommands::Add {
            name,
            email,
            password,
            phone,
            role,
            status,
        } => {
            let draft = AdminDraft {
                name,
                email,
                phone,
                role,
                status,
                permissions: None,
                password,
            };
            let result = ctx.inner.api.create_admin(draft).map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        AdminCommands::Edit {
            id,
            name,
            email,
            phone,
            role,
            status,
        } => {
            let result = ctx
                .inner
                .api
                .update_admin(&id, |draft| {
                    if let Some(name) = name {
                        draft.name = name;
                    }
                    if let Some(email) = email {
                        draft.email = email;
                    }
                    if let Some(phone) = phone {
                        draft.phone = phone;
                    }
                    if let Some(role) = role {
                        draft.role = role;
                        draft.permissions = None;
                    }
                    if let Some(status) = status {
                        draft.status = status;
                    }
                })
                .map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        AdminCommands::Remove { id } => {
            let result = ctx.inner.api.delete_admin(&id).map_err(user_error)?;
            emit_messages(ctx, result)
        }
    }
}

// --- campaigns ---

fn handle_campaigns(ctx: &AppContext, cmd: CampaignCommands) -> Result<()> {
    let api = &ctx.inner.api;
    match cmd {
        CampaignCommands::List { paging, status } => {
            let filter = campusapp::model::CampaignFilter { status };
            let result = api
                .list_campaigns(query(paging, filter))
                .map_err(user_error)?;
            emit(ctx, result, render_campaigns)
        }
        CampaignCommands::Create {
            title,
            subject,
            content,
            to,
        } => {
            let draft = CampaignDraft {
                title,
                subject,
                content,
                recipients: to,
            };
            let result = api.create_campaign(draft).map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        CampaignCommands::Edit {
            id,
            title,
            subject,
            content,
            to,
        } => {
            let result = api
                .update_campaign(&id, |draft| {
                    if let Some(title) = title {
                        draft.title = title;
                    }
                    if let Some(subject) = subject {
                        draft.subject = subject;
                    }
                    if let Some(content) = content {
                        draft.content = content;
                    }
                    if let Some(to) = to {
                        draft.recipients = to;
                    }
                })
                .map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        CampaignCommands::Send { id } => {
            let result = api.send_campaign(&id).map_err(user_error)?;
            emit_messages(ctx, result)
        }
        CampaignCommands::Remove { id } => {
            let result = api.delete_campaign(&id).map_err(user_error)?;
            emit_messages(ctx, result)
        }
    }
}

// --- gallery ---

fn handle_gallery(ctx: &AppContext, cmd: GalleryCommands) -> Result<()> {
    let api = &ctx.inner.api;
    match cmd {
        GalleryCommands::List {
            paging,
            category,
            file_type,
        } => {
            let filter = campusapp::model::GalleryFilter {
                category,
                file_type,
            };
            let result = api
                .list_gallery(query(paging, filter))
                .map_err(user_error)?;
            if ctx.json {
                let rows = result.data.as_ref().map(gallery_rows);
                println!("{}", render_json(rows.as_ref(), &result.messages));
                return Ok(());
            }
            emit(ctx, result, render_gallery)
        }
        GalleryCommands::Create {
            title,
            description,
            category,
            files,
        } => {
            let draft = GalleryDraft {
                title,
                description,
                category: Some(category),
            };
            let result = api.create_gallery_item(draft, files).map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        GalleryCommands::Edit {
            id,
            title,
            description,
            category,
            add,
            remove,
        } => {
            let file_changes: Vec<FileChange> = remove
                .into_iter()
                .map(FileChange::Remove)
                .chain(add.into_iter().map(FileChange::Add))
                .collect();
            let result = api
                .update_gallery_item(
                    &id,
                    |draft| {
                        if let Some(title) = title {
                            draft.title = title;
                        }
                        if let Some(description) = description {
                            draft.description = description;
                        }
                        if category.is_some() {
                            draft.category = category;
                        }
                    },
                    file_changes,
                )
                .map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        GalleryCommands::Remove { id } => {
            let result = api.delete_gallery_item(&id).map_err(user_error)?;
            emit_messages(ctx, result)
        }
    }
}

// --- guidance ---

fn apply_guidance(fields: GuidanceFields, draft: &mut GuidanceDraft) {
    if let Some(counselor) = fields.counselor {
        draft.counselor = counselor;
    }
    if fields.category.is_some() {
        draft.category = fields.category;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if fields.notes.is_some() {
        draft.notes = fields.notes;
    }
    if fields.date.is_some() {
        draft.date = fields.date;
    }
    if let Some(time) = fields.time {
        draft.time = time;
    }
    if fields.kind.is_some() {
        draft.kind = fields.kind;
    }
    if fields.priority.is_some() {
        draft.priority = fields.priority;
    }
    if fields.image.is_some() {
        draft.image = fields.image;
    }
}

fn handle_guidance(ctx: &AppContext, cmd: GuidanceCommands) -> Result<()> {
    let api = &ctx.inner.api;
    match cmd {
        GuidanceCommands::List {
            paging,
            category,
            priority,
            kind,
        } => {
            let filter = campusapp::model::GuidanceFilter {
                category,
                priority,
                kind,
            };
            let result = api
                .list_guidance(query(paging, filter))
                .map_err(user_error)?;
            emit(ctx, result, render_guidance)
        }
        GuidanceCommands::Create { fields } => {
            let mut draft = GuidanceDraft::default();
            apply_guidance(fields, &mut draft);
            let result = api.create_guidance(draft).map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        GuidanceCommands::Edit { id, fields } => {
            let result = api
                .update_guidance(&id, |draft| apply_guidance(fields, draft))
                .map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        GuidanceCommands::Remove { id } => {
            let result = api.delete_guidance(&id).map_err(user_error)?;
            emit_messages(ctx, result)
        }
    }
}

// --- school ---

fn apply_school(fields: SchoolFields, draft: &mut SchoolInfoDraft) {
    macro_rules! set {
        ($($field:ident),+ $(,)?) => {
            $(if let Some(value) = fields.$field {
                draft.$field = value;
            })+
        };
    }
    macro_rules! set_optional {
        ($($field:ident),+ $(,)?) => {
            $(if fields.$field.is_some() {
                draft.$field = fields.$field;
            })+
        };
    }

    set!(
        name,
        description,
        motto,
        vision,
        mission,
        student_count,
        staff_count,
        open_date,
        close_date,
        subjects,
        departments,
        video_type,
        admission_open_date,
        admission_close_date,
        admission_requirements,
        admission_contact_email,
    );
    set_optional!(
        video_tour,
        admission_fee,
        admission_capacity,
        admission_contact_phone,
    );
}

fn handle_school(ctx: &AppContext, cmd: SchoolCommands) -> Result<()> {
    let api = &ctx.inner.api;
    match cmd {
        SchoolCommands::Show => {
            let result = api.school_info().map_err(user_error)?;
            emit(ctx, result, render_school)
        }
        SchoolCommands::Save { fields } => {
            let result = api
                .save_school_info(|draft| apply_school(fields, draft))
                .map_err(user_error)?;
            emit(ctx, result, |_| String::new())
        }
        SchoolCommands::Remove => {
            let result = api.delete_school_info().map_err(user_error)?;
            emit_messages(ctx, result)
        }
    }
}

// --- public ---

fn handle_home(ctx: &AppContext) -> Result<()> {
    let result = ctx.inner.api.homepage().map_err(user_error)?;
    emit(ctx, result, render_homepage)
}
