//! Resolution of company, plan, runtime, and technology drift.
//!
//! Everything here works on lists already fetched from the API.

use rosti_common::{Company, Plan, Runtime, Tech};

use crate::domain::error::SelectionError;

/// Result of company resolution when no prompt is needed or one is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyResolution {
    /// The company is known and accessible.
    Resolved(u64),
    /// More than one company is accessible and none was named.
    Choose(Vec<Company>),
}

/// Determine the target company: explicit flag, then stored state, then the
/// single accessible company, otherwise ask the caller to choose.
///
/// # Errors
///
/// Fails when the account has no companies or the named id is not among them.
pub fn resolve_company(
    explicit: Option<u64>,
    stored: u64,
    companies: &[Company],
) -> Result<CompanyResolution, SelectionError> {
    if companies.is_empty() {
        return Err(SelectionError::NoCompany);
    }
    let wanted = explicit.filter(|id| *id != 0).or((stored != 0).then_some(stored));
    match wanted {
        Some(id) if companies.iter().any(|c| c.id == id) => Ok(CompanyResolution::Resolved(id)),
        Some(id) => Err(SelectionError::CompanyNotFound(id)),
        None if companies.len() == 1 => Ok(CompanyResolution::Resolved(companies[0].id)),
        None => Ok(CompanyResolution::Choose(companies.to_vec())),
    }
}

/// Map a plan slug to its id by case-insensitive name match.
///
/// # Errors
///
/// Returns [`SelectionError::PlanNotFound`] when no plan carries that name.
pub fn resolve_plan(slug: &str, plans: &[Plan]) -> Result<u64, SelectionError> {
    plans
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(slug))
        .map(|p| p.id)
        .ok_or_else(|| SelectionError::PlanNotFound(slug.to_string()))
}

/// Pick the runtime image: the requested one if it exists, the platform
/// default when none is requested.
///
/// # Errors
///
/// Fails when the requested image is unknown or no default is marked.
pub fn resolve_runtime(requested: &str, runtimes: &[Runtime]) -> Result<String, SelectionError> {
    if requested.is_empty() {
        return runtimes
            .iter()
            .find(|r| r.default)
            .map(|r| r.image.clone())
            .ok_or(SelectionError::NoRuntime);
    }
    runtimes
        .iter()
        .find(|r| r.image == requested)
        .map(|r| r.image.clone())
        .ok_or_else(|| SelectionError::RuntimeNotFound(requested.to_string()))
}

/// Technology change required to match the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechDrift {
    pub technology: String,
    /// Empty when the manifest does not pin a version.
    pub version: String,
}

/// Compare the manifest's technology with what the container reports.
///
/// The version only counts when the manifest names one.
#[must_use]
pub fn detect_drift(technology: &str, version: &str, active: &Tech) -> Option<TechDrift> {
    if technology.is_empty() {
        return None;
    }
    let name_differs = active.name != technology;
    let version_differs = !version.is_empty() && active.version != version;
    (name_differs || version_differs).then(|| TechDrift {
        technology: technology.to_string(),
        version: version.to_string(),
    })
}
