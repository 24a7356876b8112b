use shop_core::context::RequestContext;

use crate::domain::repository::RoleRepository;
use crate::error::RoleServiceError;

/// Create each named role that has no active row yet. Returns how many were created.
pub async fn seed_roles<R: RoleRepository>(
    repo: &R,
    ctx: &RequestContext,
    names: &[&str],
) -> Result<usize, RoleServiceError> {
    let mut created = 0;
    for name in names {
        if repo.find_by_name(ctx, name).await?.is_some() {
            continue;
        }
        repo.create(ctx, name).await?;
        tracing::info!(role = name, "seeded role");
        created += 1;
    }
    Ok(created)
}
