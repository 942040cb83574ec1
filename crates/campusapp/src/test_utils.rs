use crate::client::ApiClient;
use crate::commands::admins::{AdminDraft, Registrar};
use crate::error::Result;
use crate::model::{AdminRecord, Permissions, Role, SchoolInfo, VideoType};
use crate::recipients::Directory;
use crate::session::SessionUser;
use crate::store::local::LocalRepository;
use crate::store::mem_backend::MemBackend;
use crate::store::resource::ResourceStore;
use crate::store::Repository;
use std::cell::RefCell;
use std::time::Duration;

/// Client pointed at a mock server, no token.
#[cfg(test)]
pub fn test_client(server: &mockito::ServerGuard) -> ApiClient {
    client_for(&server.url())
}

pub fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(base_url, Duration::from_secs(5), "campus-tests")
        .expect("mock server url is valid")
}

/// The admin every session-aware test is signed in as.
pub fn signed_in_user() -> SessionUser {
    SessionUser {
        id: "a1".into(),
        name: "Ada Obi".into(),
        email: "ada@school.test".into(),
        role: Role::SuperAdmin,
    }
}

/// A directory with fixed rosters.
#[derive(Debug, Clone, Default)]
pub struct FixedDirectory {
    pub students: Vec<String>,
    pub staff: Vec<String>,
}

impl Directory for FixedDirectory {
    fn student_emails(&self) -> Result<Vec<String>> {
        Ok(self.students.clone())
    }

    fn staff_emails(&self) -> Result<Vec<String>> {
        Ok(self.staff.clone())
    }
}

/// An in-memory admin list, pre-populated through the builder methods.
pub struct AdminFixture {
    backend: MemBackend,
    seeded: usize,
}

impl Default for AdminFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminFixture {
    pub fn new() -> Self {
        Self {
            backend: MemBackend::new(),
            seeded: 0,
        }
    }

    pub fn with_admin(mut self, admin: AdminRecord) -> Self {
        let repo = LocalRepository::<AdminRecord, _>::new(&self.backend);
        let mut all = repo.list().expect("reading seeded admins");
        all.push(admin);
        repo.replace_all(&all).expect("seeding admins");
        self.seeded += 1;
        self
    }

    pub fn with_named(self, name: &str, email: &str) -> Self {
        let id = format!("seed-{}", self.seeded + 1);
        self.with_admin(AdminRecord {
            id,
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            role: Role::Admin,
            status: Default::default(),
            permissions: Permissions::for_role(Role::Admin),
            created_at: None,
            updated_at: None,
        })
    }

    pub fn backend(&self) -> &MemBackend {
        &self.backend
    }

    pub fn store(&self) -> ResourceStore<AdminRecord, LocalRepository<AdminRecord, &MemBackend>> {
        ResourceStore::new(LocalRepository::new(&self.backend))
    }
}

/// Records every registration and answers with a fixed server id.
pub struct FakeRegistrar {
    id: String,
    calls: RefCell<Vec<String>>,
}

impl FakeRegistrar {
    pub fn returning_id(id: &str) -> Self {
        Self {
            id: id.into(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Emails of every draft registered so far, as given.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Registrar for FakeRegistrar {
    fn register(&self, draft: &AdminDraft) -> Result<Option<AdminRecord>> {
        self.calls.borrow_mut().push(draft.email.clone());
        Ok(Some(AdminRecord {
            id: self.id.clone(),
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            role: draft.role,
            status: draft.status,
            permissions: Permissions::for_role(draft.role),
            created_at: None,
            updated_at: None,
        }))
    }
}

/// A school profile that passes every wizard step.
pub fn complete_school_info() -> SchoolInfo {
    SchoolInfo {
        name: "Hillcrest High".into(),
        description: "A day school on the hill.".into(),
        motto: "Rise and shine".into(),
        vision: "Every learner ready".into(),
        mission: "Teach well".into(),
        student_count: 820,
        staff_count: 64,
        open_date: "2024-09-02".into(),
        close_date: "2025-07-18".into(),
        subjects: vec!["Maths".into(), "Biology".into()],
        departments: vec!["Sciences".into()],
        video_tour: None,
        video_type: VideoType::Youtube,
        admission_open_date: "2025-01-06".into(),
        admission_close_date: "2025-03-28".into(),
        admission_requirements: "Entrance exam and interview".into(),
        admission_fee: Some("5000".into()),
        admission_capacity: Some(120),
        admission_contact_email: "admissions@hillcrest.test".into(),
        admission_contact_phone: None,
    }
}
