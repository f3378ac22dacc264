//! Ordered, fail-fast execution of a feature set.
use crate::error::{SchedulerError, SelectionError};
use crate::features::{BuiltinFeature, Context, Feature};
use crate::logging::FeatureStatus;

/// Token that selects every registered feature.
pub const ALL: &str = "all";

/// The features selected for a run, sorted by ascending order.
pub struct FeatureSet {
    features: Vec<Box<dyn Feature>>,
}

impl std::fmt::Debug for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl FeatureSet {
    /// Build a set from `features`.
    ///
    /// The sort is stable: features with equal order keep their input order.
    #[must_use]
    pub fn new(mut features: Vec<Box<dyn Feature>>) -> Self {
        features.sort_by_key(|f| f.order());
        Self { features }
    }

    /// Every builtin feature.
    #[must_use]
    pub fn all() -> Self {
        Self::new(BuiltinFeature::all())
    }

    /// Build a set from user-supplied names.
    ///
    /// Names are matched case-insensitively and duplicates are dropped. The
    /// token `all` anywhere in the list selects every builtin feature, once
    /// the other names have been checked.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Empty`] when no names are given and
    /// [`SelectionError::UnknownFeature`] for the first unrecognised name.
    pub fn from_selection<S: AsRef<str>>(names: &[S]) -> Result<Self, SelectionError> {
        let names: Vec<&str> = names
            .iter()
            .map(|n| n.as_ref().trim())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            return Err(SelectionError::Empty);
        }
        let mut wants_all = false;
        let mut selected: Vec<BuiltinFeature> = Vec::new();
        for name in names {
            if name.eq_ignore_ascii_case(ALL) {
                wants_all = true;
                continue;
            }
            let feature =
                BuiltinFeature::from_name(name).ok_or_else(|| SelectionError::UnknownFeature {
                    name: name.to_string(),
                    known: BuiltinFeature::names().join(", "),
                })?;
            if !selected.contains(&feature) {
                selected.push(feature);
            }
        }
        if wants_all {
            return Ok(Self::all());
        }
        Ok(Self::new(
            selected
                .into_iter()
                .map(|f| Box::new(f) as Box<dyn Feature>)
                .collect(),
        ))
    }

    /// Feature names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    /// Features in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Feature> {
        self.features.iter().map(AsRef::as_ref)
    }

    /// Whether `name` is part of the set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.iter().any(|f| f.name().eq_ignore_ascii_case(name))
    }

    /// Number of features in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Install every feature in order, skipping those already installed.
    ///
    /// With `force_reinstall` the idempotency check is bypassed. In dry-run
    /// mode nothing is installed. The first failure stops the run.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Install`] naming the first feature that
    /// failed.
    pub fn apply_features(&self, ctx: &Context) -> Result<(), SchedulerError> {
        for feature in self.iter() {
            let name = feature.name();
            ctx.log.stage(name);

            if !ctx.force() && feature.installed(ctx) {
                ctx.log.info("already installed");
                ctx.log
                    .record_feature(name, FeatureStatus::AlreadyInstalled, None);
                continue;
            }

            if ctx.dry_run {
                ctx.log.dry_run(&format!("would install {name}"));
                ctx.log.record_feature(name, FeatureStatus::DryRun, None);
                continue;
            }

            match feature.install(ctx) {
                Ok(()) => ctx.log.record_feature(name, FeatureStatus::Installed, None),
                Err(e) => {
                    let message = format!("{e:#}");
                    ctx.log.error(&format!("{name}: {message}"));
                    ctx.log
                        .record_feature(name, FeatureStatus::Failed, Some(&message));
                    return Err(SchedulerError::Install {
                        feature: name.to_string(),
                        source: e.into(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Remove every feature in order. There is no idempotency check.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Remove`] naming the first feature that
    /// failed.
    pub fn remove_features(&self, ctx: &Context) -> Result<(), SchedulerError> {
        for feature in self.iter() {
            let name = feature.name();
            ctx.log.stage(name);

            if ctx.dry_run {
                ctx.log.dry_run(&format!("would remove {name}"));
                ctx.log.record_feature(name, FeatureStatus::DryRun, None);
                continue;
            }

            match feature.remove(ctx) {
                Ok(()) => ctx.log.record_feature(name, FeatureStatus::Removed, None),
                Err(e) => {
                    let message = format!("{e:#}");
                    ctx.log.error(&format!("{name}: {message}"));
                    ctx.log
                        .record_feature(name, FeatureStatus::Failed, Some(&message));
                    return Err(SchedulerError::Remove {
                        feature: name.to_string(),
                        source: e.into(),
                    });
                }
            }
        }
        Ok(())
    }
}
