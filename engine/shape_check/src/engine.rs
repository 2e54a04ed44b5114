//! The engine facade.
//!
//! Hosts declare one type per call site (a parameter position, a return
//! check, an assignment) during loading, then funnel every runtime check
//! through [`Engine::check`]. The engine owns the parsed type, the
//! escape-analysis disposition, and the counters; parsing happens once
//! per site, never per check.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use shape_diagnostic::{Diagnostic, ErrorCode};
use shape_ir::{StringInterner, TypeExpr, Value};
use shape_parse::{parse_type_expr, ParseError};
use shape_registry::{ResolveError, ShapeRegistry};
use thiserror::Error;

use crate::cache;
use crate::escape::ConstExpr;
use crate::outcome::{Outcome, Violation};
use crate::validator::{InstancePredicate, NominalInstanceOf, Validator};

/// Process-wide call-site id source. Ids are unique across engines so
/// the thread-local cache needs no per-engine namespacing.
static NEXT_SITE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque handle to a declared call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallSiteId(u64);

/// How checks at a site are carried out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Disposition {
    /// Every check walks the value (modulo the fingerprint cache).
    Checked,
    /// The site's value is a constant already validated at declaration
    /// time; checks return valid without looking at the value.
    Exempt,
}

struct SiteDecl {
    ty: TypeExpr,
    source: String,
    disposition: Disposition,
}

/// Error constructing an engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The registry must be sealed (cycle-checked, read-only) before
    /// validation begins.
    #[error("registry must be sealed before building an engine")]
    RegistryNotSealed,
}

/// Error declaring a call site.
#[derive(Debug, Error)]
pub enum DeclareError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The declared type references something unknown, discovered while
    /// validating a constant literal.
    #[error(transparent)]
    Defect(#[from] ResolveError),

    /// The site's constant literal does not conform to its declared
    /// type. Caught at declaration time; the site is never created.
    #[error("constant literal does not conform to its declared type")]
    ConstantMismatch(Box<Violation>),
}

impl DeclareError {
    /// Convert to a diagnostic.
    pub fn to_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        match self {
            DeclareError::Parse(parse) => parse.to_diagnostic(),
            DeclareError::Defect(defect) => defect.to_diagnostic(),
            DeclareError::ConstantMismatch(violation) => {
                Diagnostic::error(ErrorCode::E9003)
                    .with_message(self.to_string())
                    .with_note(violation.message(interner))
            }
        }
    }
}

/// Error checking a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    /// The handle does not belong to this engine.
    #[error("call site was not declared on this engine")]
    UnknownCallSite(CallSiteId),

    /// The type definition is defective: a reference failed to resolve
    /// during the walk. Configuration error, not a data failure.
    #[error(transparent)]
    Defect(#[from] ResolveError),
}

/// Counter snapshot for observing engine behavior.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Full structural walks performed.
    pub validations: u64,
    /// Checks answered by the fingerprint cache.
    pub cache_hits: u64,
    /// Checks answered by a constant-literal exemption.
    pub exemptions: u64,
}

/// The validation engine.
///
/// Cheap to share: all interior state is behind locks or atomics, and
/// `check` only ever takes read locks.
pub struct Engine {
    registry: Arc<ShapeRegistry>,
    classes: Arc<dyn InstancePredicate>,
    sites: RwLock<FxHashMap<CallSiteId, Arc<SiteDecl>>>,
    validations: AtomicU64,
    cache_hits: AtomicU64,
    exemptions: AtomicU64,
}

impl Engine {
    /// Build an engine over a sealed registry, judging class membership
    /// by registered name and parent chain.
    pub fn new(registry: Arc<ShapeRegistry>) -> Result<Self, EngineError> {
        let classes = Arc::new(NominalInstanceOf::new(Arc::clone(&registry)));
        Engine::with_instance_predicate(registry, classes)
    }

    /// Build an engine with a host-supplied class membership predicate.
    pub fn with_instance_predicate(
        registry: Arc<ShapeRegistry>,
        classes: Arc<dyn InstancePredicate>,
    ) -> Result<Self, EngineError> {
        if !registry.is_sealed() {
            return Err(EngineError::RegistryNotSealed);
        }
        Ok(Engine {
            registry,
            classes,
            sites: RwLock::new(FxHashMap::default()),
            validations: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            exemptions: AtomicU64::new(0),
        })
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn interner(&self) -> &StringInterner {
        self.registry.interner()
    }

    /// Declare a call site with the given surface-syntax type. The text
    /// is parsed here, once.
    pub fn declare(&self, type_text: &str) -> Result<CallSiteId, DeclareError> {
        let ty = parse_type_expr(type_text, self.registry.interner())?;
        Ok(self.insert_site(ty, type_text.to_owned(), Disposition::Checked))
    }

    /// Declare a call site whose value construction the host can
    /// describe. If the description is fully constant, the value is
    /// validated now and the site exempted from runtime checks; a
    /// non-conforming constant fails the declaration itself.
    pub fn declare_with_literal(
        &self,
        type_text: &str,
        literal: &ConstExpr,
    ) -> Result<CallSiteId, DeclareError> {
        let ty = parse_type_expr(type_text, self.registry.interner())?;
        let disposition = match literal.try_materialize(self.registry.interner()) {
            Some(value) => {
                let validator = Validator::new(&self.registry, self.classes.as_ref());
                match validator.validate(&value, &ty)? {
                    Outcome::Valid => Disposition::Exempt,
                    Outcome::Invalid(violation) => {
                        return Err(DeclareError::ConstantMismatch(Box::new(violation)));
                    }
                }
            }
            None => Disposition::Checked,
        };
        Ok(self.insert_site(ty, type_text.to_owned(), disposition))
    }

    /// Declare a call site from an already-built type expression.
    pub fn declare_type(&self, ty: TypeExpr) -> CallSiteId {
        let source = ty.display(self.registry.interner()).to_string();
        self.insert_site(ty, source, Disposition::Checked)
    }

    fn insert_site(&self, ty: TypeExpr, source: String, disposition: Disposition) -> CallSiteId {
        let site = CallSiteId(NEXT_SITE_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(?site, %source, ?disposition, "declared call site");
        self.sites.write().insert(
            site,
            Arc::new(SiteDecl {
                ty,
                source,
                disposition,
            }),
        );
        site
    }

    /// Check a value against the site's declared type.
    pub fn check(&self, site: CallSiteId, value: &Value) -> Result<Outcome, CheckError> {
        let decl = self
            .sites
            .read()
            .get(&site)
            .cloned()
            .ok_or(CheckError::UnknownCallSite(site))?;

        if decl.disposition == Disposition::Exempt {
            self.exemptions.fetch_add(1, Ordering::Relaxed);
            return Ok(Outcome::Valid);
        }

        let fingerprint = value.fingerprint();
        if let Some(fp) = fingerprint {
            if cache::hit(site, fp) {
                self.cache_hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(?site, "fingerprint cache hit");
                return Ok(Outcome::Valid);
            }
        }

        let validator = Validator::new(&self.registry, self.classes.as_ref());
        let outcome = validator.validate(value, &decl.ty)?;
        self.validations.fetch_add(1, Ordering::Relaxed);

        if outcome.is_valid() {
            if let Some(fp) = fingerprint {
                cache::record(site, fp);
            }
        }
        Ok(outcome)
    }

    /// The declared type of a site, if the handle belongs to this engine.
    pub fn site_type(&self, site: CallSiteId) -> Option<TypeExpr> {
        self.sites.read().get(&site).map(|decl| decl.ty.clone())
    }

    /// The declared type's original source text.
    pub fn site_source(&self, site: CallSiteId) -> Option<String> {
        self.sites
            .read()
            .get(&site)
            .map(|decl| decl.source.clone())
    }

    /// Counter snapshot.
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            validations: self.validations.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            exemptions: self.exemptions.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("sites", &self.sites.read().len())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
