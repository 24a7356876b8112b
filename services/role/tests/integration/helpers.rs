use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use shop_core::cache::EntityCache;
use shop_core::context::RequestContext;
use shop_domain::pagination::{Page, PageRequest};
use shop_domain::role::{Role, UserRole};
use shop_domain::view::ListView;
use shop_role::domain::repository::{RoleRepository, UserRoleRepository};
use shop_role::error::RoleServiceError;
use shop_role::state::ROLE_KEYS;
use shop_role::usecase::role::{RoleCommandUseCase, RoleQueryUseCase};
use shop_role::usecase::user_role::UserRoleUseCase;
use shop_testing::cache::InMemoryCache;
use shop_testing::fixture;
use shop_testing::store::{next_id, paginate, transition};

// ── MockRoleRepo ─────────────────────────────────────────────────────────────

/// Roles and assignments share one store so `find_by_user_id` can join them.
#[derive(Clone, Default)]
pub struct MockRoleRepo {
    pub roles: Arc<Mutex<Vec<Role>>>,
    pub assignments: Arc<Mutex<Vec<UserRole>>>,
    pub reads: Arc<AtomicUsize>,
    pub fail_writes: Arc<AtomicBool>,
}

impl MockRoleRepo {
    pub fn new(roles: Vec<Role>) -> Self {
        Self {
            roles: Arc::new(Mutex::new(roles)),
            ..Default::default()
        }
    }

    pub fn with_assignments(self, assignments: Vec<UserRole>) -> Self {
        *self.assignments.lock().unwrap() = assignments;
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, id: i32) -> Option<Role> {
        self.roles.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    pub fn assignments(&self) -> Vec<UserRole> {
        self.assignments.lock().unwrap().clone()
    }

    fn check_write(&self) -> Result<(), RoleServiceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(anyhow::anyhow!("connection reset by peer").into())
        } else {
            Ok(())
        }
    }
}

impl RoleRepository for MockRoleRepo {
    async fn find_page(
        &self,
        _ctx: &RequestContext,
        view: ListView,
        page: &PageRequest,
    ) -> Result<Page<Role>, RoleServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let roles = self.roles.lock().unwrap();
        Ok(paginate(&roles, view, page, |r| r.name.contains(&page.search)))
    }

    async fn find_by_id(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.get(id))
    }

    async fn find_by_name(
        &self,
        _ctx: &RequestContext,
        name: &str,
    ) -> Result<Option<Role>, RoleServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .roles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.name == name && r.deleted_at.is_none())
            .cloned())
    }

    async fn find_by_user_id(
        &self,
        _ctx: &RequestContext,
        user_id: i32,
    ) -> Result<Vec<Role>, RoleServiceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let roles = self.roles.lock().unwrap();
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| {
                roles
                    .iter()
                    .find(|r| r.id == a.role_id && r.deleted_at.is_none())
                    .cloned()
            })
            .collect())
    }

    async fn create(&self, _ctx: &RequestContext, name: &str) -> Result<Role, RoleServiceError> {
        self.check_write()?;
        let mut roles = self.roles.lock().unwrap();
        let role = fixture::role(next_id(&roles), name);
        roles.push(role.clone());
        Ok(role)
    }

    async fn update(
        &self,
        _ctx: &RequestContext,
        id: i32,
        name: &str,
    ) -> Result<Option<Role>, RoleServiceError> {
        self.check_write()?;
        let mut roles = self.roles.lock().unwrap();
        Ok(roles
            .iter_mut()
            .find(|r| r.id == id && r.deleted_at.is_none())
            .map(|r| {
                r.name = name.to_owned();
                r.updated_at = Utc::now();
                r.clone()
            }))
    }

    async fn trash(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError> {
        self.check_write()?;
        Ok(transition(&mut self.roles.lock().unwrap(), id, true))
    }

    async fn restore(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError> {
        self.check_write()?;
        Ok(transition(&mut self.roles.lock().unwrap(), id, false))
    }

    async fn delete_permanent(
        &self,
        _ctx: &RequestContext,
        id: i32,
    ) -> Result<Option<Role>, RoleServiceError> {
        self.check_write()?;
        let mut roles = self.roles.lock().unwrap();
        let Some(pos) = roles.iter().position(|r| r.id == id) else {
            return Ok(None);
        };
        self.assignments.lock().unwrap().retain(|a| a.role_id != id);
        Ok(Some(roles.remove(pos)))
    }

    async fn restore_all(&self, _ctx: &RequestContext) -> Result<u64, RoleServiceError> {
        self.check_write()?;
        let mut roles = self.roles.lock().unwrap();
        let mut affected = 0;
        for r in roles.iter_mut().filter(|r| r.deleted_at.is_some()) {
            r.deleted_at = None;
            affected += 1;
        }
        Ok(affected)
    }

    async fn delete_all_permanent(&self, _ctx: &RequestContext) -> Result<u64, RoleServiceError> {
        self.check_write()?;
        let mut roles = self.roles.lock().unwrap();
        let before = roles.len();
        roles.retain(|r| r.deleted_at.is_none());
        Ok((before - roles.len()) as u64)
    }
}

impl UserRoleRepository for MockRoleRepo {
    async fn assign(
        &self,
        _ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<UserRole, RoleServiceError> {
        self.check_write()?;
        let mut assignments = self.assignments.lock().unwrap();
        if assignments
            .iter()
            .any(|a| a.user_id == user_id && a.role_id == role_id)
        {
            return Err(RoleServiceError::AlreadyAssigned);
        }
        let id = assignments.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let assignment = fixture::user_role(id, user_id, role_id);
        assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn update_role(
        &self,
        _ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<Option<UserRole>, RoleServiceError> {
        self.check_write()?;
        let mut assignments = self.assignments.lock().unwrap();
        let mut updated = None;
        for a in assignments.iter_mut().filter(|a| a.user_id == user_id) {
            a.role_id = role_id;
            a.updated_at = Utc::now();
            updated.get_or_insert_with(|| a.clone());
        }
        Ok(updated)
    }

    async fn remove(
        &self,
        _ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<bool, RoleServiceError> {
        self.check_write()?;
        let mut assignments = self.assignments.lock().unwrap();
        let before = assignments.len();
        assignments.retain(|a| !(a.user_id == user_id && a.role_id == role_id));
        Ok(assignments.len() < before)
    }
}

// ── Builders ─────────────────────────────────────────────────────────────────

pub fn ctx() -> RequestContext {
    RequestContext::new().with_trace_id("test-trace")
}

pub fn queries(
    repo: &MockRoleRepo,
    cache: &InMemoryCache,
) -> RoleQueryUseCase<MockRoleRepo, InMemoryCache> {
    RoleQueryUseCase {
        repo: repo.clone(),
        cache: EntityCache::new(cache.clone(), ROLE_KEYS),
    }
}

pub fn commands(
    repo: &MockRoleRepo,
    cache: &InMemoryCache,
) -> RoleCommandUseCase<MockRoleRepo, InMemoryCache> {
    RoleCommandUseCase {
        repo: repo.clone(),
        cache: EntityCache::new(cache.clone(), ROLE_KEYS),
    }
}

pub fn user_roles(
    repo: &MockRoleRepo,
    cache: &InMemoryCache,
) -> UserRoleUseCase<MockRoleRepo, MockRoleRepo, InMemoryCache> {
    UserRoleUseCase {
        roles: repo.clone(),
        user_roles: repo.clone(),
        cache: EntityCache::new(cache.clone(), ROLE_KEYS),
    }
}

pub fn first_page() -> PageRequest {
    PageRequest::new(1, 10, "")
}
