//! Maps a model's declared memory regions to the counter groups shown in a report.
//!
//! Region descriptions are free-form text coming from the model database; this is
//! the only place that interprets them. Everything downstream works with
//! [`CounterKind`].

pub mod overrides;

use std::collections::{HashMap, HashSet};

use inkpad_common::InkpadError;
use inkpad_common::address::{dedup_addresses, format_addresses};
use inkpad_common::counter::{CounterGroup, CounterKind};
use inkpad_common::device::ModelSpec;
use tracing::{debug, warn};

pub use overrides::{CounterOverride, FamilyOverrides, OverrideTable};

/// Addresses that frequently mirror the main waste counter. Diagnostic only.
pub const AMBIGUOUS_ADDRESSES: [u8; 3] = [0x2c, 0x2d, 0x2e];
pub const AMBIGUOUS_LABEL: &str = "AMBIGUOUS";
pub const MANUAL_LABEL: &str = "Manual counter";

const WASTE_DESCRIPTION: &str = "waste counter";
const PLATEN_DESCRIPTION: &str = "platen pad counter";

fn region_kind(description: &str) -> Option<CounterKind> {
    let description = description.trim();
    if description.eq_ignore_ascii_case(WASTE_DESCRIPTION) {
        Some(CounterKind::Waste)
    } else if description.eq_ignore_ascii_case(PLATEN_DESCRIPTION) {
        Some(CounterKind::Platen)
    } else {
        None
    }
}

fn default_label(kind: CounterKind) -> &'static str {
    match kind {
        CounterKind::Waste => "Waste counter",
        CounterKind::Platen => "Platen pad counter",
        CounterKind::Ambiguous => AMBIGUOUS_LABEL,
        CounterKind::Raw => MANUAL_LABEL,
    }
}

pub fn ambiguous_group() -> CounterGroup {
    CounterGroup::new(AMBIGUOUS_LABEL, CounterKind::Ambiguous, &AMBIGUOUS_ADDRESSES)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ClassifyOptions<'a> {
    /// Manual address list, used only when the model declares no counters.
    pub explicit_addresses: Option<&'a [u8]>,
    pub show_ambiguous: bool,
}

struct Candidate {
    kind: CounterKind,
    addresses: Vec<u8>,
}

pub struct Classifier<'a> {
    overrides: &'a OverrideTable,
}

impl<'a> Classifier<'a> {
    pub fn new(overrides: &'a OverrideTable) -> Self {
        Self { overrides }
    }

    /// Builds the ordered list of counter groups for `model`.
    ///
    /// Fails with [`InkpadError::NoCountersAvailable`] when the model declares no
    /// counters and no manual addresses were given, or when every declared counter
    /// was filtered out and the ambiguous group was not requested.
    pub fn classify(
        &self,
        spec: &ModelSpec,
        model: &str,
        options: ClassifyOptions<'_>,
    ) -> Result<Vec<CounterGroup>, InkpadError> {
        let candidates = collect_candidates(spec);
        let explicit = options.explicit_addresses.filter(|addrs| !addrs.is_empty());

        if candidates.is_empty() {
            let Some(addresses) = explicit else {
                return Err(InkpadError::NoCountersAvailable {
                    model: model.to_string(),
                });
            };
            debug!(addresses = %format_addresses(addresses), "using manual address list");
            let mut groups = vec![CounterGroup::new(MANUAL_LABEL, CounterKind::Raw, addresses)];
            if options.show_ambiguous {
                groups.push(ambiguous_group());
            }
            return Ok(groups);
        }

        if let Some(addresses) = explicit {
            warn!(
                "Ignoring manual addresses {}: {} declares its own counters",
                format_addresses(addresses),
                model
            );
        }

        let mut groups = self.apply_overrides(candidates, model);
        ensure_unique_labels(&mut groups);

        if groups.is_empty() && !options.show_ambiguous {
            return Err(InkpadError::NoCountersAvailable {
                model: model.to_string(),
            });
        }

        if options.show_ambiguous {
            groups.push(ambiguous_group());
        }

        Ok(groups)
    }

    fn apply_overrides(&self, candidates: Vec<Candidate>, model: &str) -> Vec<CounterGroup> {
        let family = self.overrides.for_model(model);
        if let Some(family) = family {
            debug!(family = %family.name, model, "applying counter overrides");
        }

        let mut ordinals: HashMap<CounterKind, usize> = HashMap::new();
        let mut groups: Vec<CounterGroup> = Vec::new();

        for candidate in candidates {
            let matched = family.and_then(|f| f.lookup(&candidate.addresses));

            if candidate.kind == CounterKind::Waste && family.is_some() && matched.is_none() {
                debug!(
                    addresses = %format_addresses(&candidate.addresses),
                    "skipping unrecognized waste region"
                );
                continue;
            }

            let group = match matched {
                Some(counter) => CounterGroup::new(&counter.label, candidate.kind, &candidate.addresses)
                    .with_capacity(counter.capacity),
                None => {
                    let ordinal = ordinals.entry(candidate.kind).or_insert(0);
                    *ordinal += 1;
                    let base = default_label(candidate.kind);
                    let label = match *ordinal {
                        1 => base.to_string(),
                        n => format!("{base} #{n}"),
                    };
                    CounterGroup::new(label, candidate.kind, &candidate.addresses)
                }
            };
            groups.push(group);
        }

        groups
    }
}

fn collect_candidates(spec: &ModelSpec) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = spec
        .regions
        .iter()
        .filter_map(|region| {
            let kind = region_kind(&region.description)?;
            if region.addresses.is_empty() {
                debug!(description = %region.description, "region declares no addresses");
                return None;
            }
            Some(Candidate {
                kind,
                addresses: dedup_addresses(&region.addresses),
            })
        })
        .collect();

    if candidates.is_empty() {
        if let Some(region) = spec.merged_region(WASTE_DESCRIPTION) {
            if !region.addresses.is_empty() {
                debug!("falling back to merged waste counter region");
                candidates.push(Candidate {
                    kind: CounterKind::Waste,
                    addresses: dedup_addresses(&region.addresses),
                });
            }
        }
    }

    candidates
}

/// Appends an ordinal to any label already used by an earlier group.
fn ensure_unique_labels(groups: &mut [CounterGroup]) {
    let mut seen: HashSet<String> = HashSet::new();
    for group in groups.iter_mut() {
        if seen.insert(group.label.clone()) {
            continue;
        }
        let base = group.label.clone();
        let mut ordinal = 2;
        while !seen.insert(format!("{base} #{ordinal}")) {
            ordinal += 1;
        }
        group.label = format!("{base} #{ordinal}");
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
