use sorcha_core::Result;

/// Thin collaborator interface onto multi-tenant authorization — out of
/// scope per §1 ("user/organization authentication... out of scope"), but
/// the orchestrator still needs a hook to reject a tenant at `initiate`
/// time (`TenantRejected`).
pub trait TenantPolicy: Send + Sync {
    fn check(&self, tenant_id: &str) -> Result<()>;
}

/// Default policy used where no real tenant service is wired in: every
/// tenant id is accepted.
pub struct AllowAllTenants;

impl TenantPolicy for AllowAllTenants {
    fn check(&self, _tenant_id: &str) -> Result<()> {
        Ok(())
    }
}
