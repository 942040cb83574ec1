//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer. It is the single
//! entry point for every campus operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Dispatches** to the appropriate command function
//! - **Wires collaborators**: the HTTP client, the session, the admin store,
//!   the shared [`RequestTracker`]
//! - **Normalizes list inputs** into a [`ListState`] (search, then filters,
//!   then page, so the page survives the resets the first two perform)
//! - **Returns structured types** (`Result<CmdResult<T>>`)
//!
//! ## What the API Does NOT Do
//!
//! - **Business logic**: that belongs in `commands/*.rs`
//! - **I/O to the terminal**: no stdout, stderr or formatting
//!
//! ## Generic Over Storage
//!
//! `CampusApi<A, B>` is generic over the admin repository and the session
//! backend:
//! - Production: [`LocalRepository`] and [`Session`] over [`FsBackend`]
//! - Testing: the same over [`crate::store::mem_backend::MemBackend`]

use crate::client::ApiClient;
use crate::commands::{self, CmdResult};
use crate::error::Result;
use crate::listing::{ListState, Page};
use crate::model::{
    AdminFilter, AdminRecord, CampaignFilter, EmailCampaign, GalleryFilter, GalleryItem,
    GuidanceFilter, GuidanceSession, SchoolInfo,
};
use crate::recipients::RemoteDirectory;
use crate::requests::RequestTracker;
use crate::session::{Session, SessionUser};
use crate::staging::FileChange;
use crate::store::backend::StorageBackend;
use crate::store::fs_backend::FsBackend;
use crate::store::local::LocalRepository;
use crate::store::resource::ResourceStore;
use crate::store::rest::{RemoteRecord, RestRepository};
use crate::store::singleton::SchoolInfoStore;
use crate::store::Repository;
use std::path::PathBuf;

pub use commands::admins::{AdminDraft, AdminRow};
pub use commands::campaigns::CampaignDraft;
pub use commands::gallery::GalleryDraft;
pub use commands::guidance::GuidanceDraft;
pub use commands::homepage::Homepage;
pub use commands::school_info::SchoolInfoDraft;
pub use commands::session::{Credentials, WhoAmI};

/// What the caller wants to see of a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery<F> {
    pub search: String,
    pub filter: F,
    /// 1-based; clamped to the available pages.
    pub page: usize,
}

impl<F: Default> ListQuery<F> {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            filter: F::default(),
            page: 1,
        }
    }
}

impl<F: Default> ListQuery<F> {
    fn into_state(self, page_size: usize) -> ListState<F> {
        let mut state = ListState::new(page_size);
        state.set_search(self.search);
        state.set_filter(self.filter);
        state.set_page(self.page);
        state
    }
}

/// Production wiring: admins and session on disk.
pub type FsCampusApi = CampusApi<LocalRepository<AdminRecord, FsBackend>, FsBackend>;

pub struct CampusApi<A, B> {
    client: ApiClient,
    session: Session<B>,
    admins: ResourceStore<AdminRecord, A>,
    tracker: RequestTracker,
}

impl<A: Repository<AdminRecord>, B: StorageBackend> CampusApi<A, B> {
    /// The client's token is replaced by the session's.
    pub fn new(client: ApiClient, session: Session<B>, admins: A) -> Self {
        let tracker = RequestTracker::new();
        let client = client.with_token(session.token().map(str::to_string));
        Self {
            client,
            session,
            admins: ResourceStore::new(admins).with_tracker(tracker.clone()),
            tracker,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session<B> {
        &self.session
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        self.session.user()
    }

    fn remote<T: RemoteRecord>(&self) -> ResourceStore<T, RestRepository<T>> {
        ResourceStore::new(RestRepository::new(self.client.clone()))
            .with_tracker(self.tracker.clone())
    }

    fn directory(&self) -> RemoteDirectory {
        RemoteDirectory::new(self.client.clone())
    }

    fn school_store(&self) -> SchoolInfoStore {
        SchoolInfoStore::new(self.client.clone())
    }

    // --- session ---

    pub fn login(&mut self, credentials: Credentials) -> Result<CmdResult<SessionUser>> {
        commands::session::login(&mut self.client, &mut self.session, credentials)
    }

    pub fn logout(&mut self) -> Result<CmdResult> {
        commands::session::logout(&mut self.client, &mut self.session)
    }

    pub fn whoami(&self) -> Result<CmdResult<WhoAmI>> {
        commands::session::whoami(&self.session)
    }

    // --- admins ---

    pub fn list_admins(&mut self, query: ListQuery<AdminFilter>) -> Result<CmdResult<Page<AdminRow>>> {
        let mut state = query.into_state(commands::admins::PAGE_SIZE);
        commands::admins::list(&mut self.admins, &mut state, self.session.user())
    }

    pub fn create_admin(&mut self, draft: AdminDraft) -> Result<CmdResult<AdminRecord>> {
        commands::admins::create(&mut self.admins, &self.client, draft)
    }

    pub fn update_admin(
        &mut self,
        id: &str,
        change: impl FnOnce(&mut AdminDraft),
    ) -> Result<CmdResult<AdminRecord>> {
        commands::admins::update(&mut self.admins, id, change)
    }

    pub fn delete_admin(&mut self, id: &str) -> Result<CmdResult> {
        commands::admins::delete(&mut self.admins, id, self.session.user())
    }

    // --- campaigns ---

    pub fn list_campaigns(
        &self,
        query: ListQuery<CampaignFilter>,
    ) -> Result<CmdResult<Page<EmailCampaign>>> {
        let mut state = query.into_state(commands::campaigns::PAGE_SIZE);
        commands::campaigns::list(&mut self.remote(), &mut state)
    }

    pub fn create_campaign(&self, draft: CampaignDraft) -> Result<CmdResult<EmailCampaign>> {
        commands::campaigns::create(&mut self.remote(), &self.directory(), draft)
    }

    pub fn update_campaign(
        &self,
        id: &str,
        change: impl FnOnce(&mut CampaignDraft),
    ) -> Result<CmdResult<EmailCampaign>> {
        commands::campaigns::update(&mut self.remote(), &self.directory(), id, change)
    }

    pub fn send_campaign(&self, id: &str) -> Result<CmdResult> {
        commands::campaigns::send(&mut self.remote(), id)
    }

    pub fn delete_campaign(&self, id: &str) -> Result<CmdResult> {
        commands::campaigns::delete(&mut self.remote(), id)
    }

    // --- gallery ---

    pub fn list_gallery(
        &self,
        query: ListQuery<GalleryFilter>,
    ) -> Result<CmdResult<Page<GalleryItem>>> {
        let mut state = query.into_state(commands::gallery::PAGE_SIZE);
        commands::gallery::list(&mut self.remote(), &mut state)
    }

    pub fn create_gallery_item(
        &self,
        draft: GalleryDraft,
        files: Vec<PathBuf>,
    ) -> Result<CmdResult<GalleryItem>> {
        commands::gallery::create(&mut self.remote(), draft, files)
    }

    pub fn update_gallery_item(
        &self,
        id: &str,
        change: impl FnOnce(&mut GalleryDraft),
        file_changes: Vec<FileChange>,
    ) -> Result<CmdResult<GalleryItem>> {
        commands::gallery::update(&mut self.remote(), id, change, file_changes)
    }

    pub fn delete_gallery_item(&self, id: &str) -> Result<CmdResult> {
        commands::gallery::delete(&mut self.remote(), id)
    }

    // --- guidance ---

    pub fn list_guidance(
        &self,
        query: ListQuery<GuidanceFilter>,
    ) -> Result<CmdResult<Page<GuidanceSession>>> {
        let mut state = query.into_state(commands::guidance::PAGE_SIZE);
        commands::guidance::list(&mut self.remote(), &mut state)
    }

    pub fn create_guidance(&self, draft: GuidanceDraft) -> Result<CmdResult<GuidanceSession>> {
        commands::guidance::create(&mut self.remote(), draft)
    }

    pub fn update_guidance(
        &self,
        id: &str,
        change: impl FnOnce(&mut GuidanceDraft),
    ) -> Result<CmdResult<GuidanceSession>> {
        commands::guidance::update(&mut self.remote(), id, change)
    }

    pub fn delete_guidance(&self, id: &str) -> Result<CmdResult> {
        commands::guidance::delete(&mut self.remote(), id)
    }

    // --- school info ---

    pub fn school_info(&self) -> Result<CmdResult<SchoolInfo>> {
        commands::school_info::show(&self.school_store())
    }

    pub fn save_school_info(
        &self,
        change: impl FnOnce(&mut SchoolInfoDraft),
    ) -> Result<CmdResult<SchoolInfo>> {
        commands::school_info::save(&self.school_store(), change)
    }

    pub fn delete_school_info(&self) -> Result<CmdResult> {
        commands::school_info::remove(&self.school_store())
    }

    // --- public ---

    pub fn homepage(&self) -> Result<CmdResult<Homepage>> {
        commands::homepage::load(&self.client)
    }
}
