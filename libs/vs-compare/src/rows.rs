//! One comparison row per bound NCTS value set

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use vsdiff_models::{is_ncts_value_set, Binding, ReleaseId, ValueSetDefinition};
use vsdiff_package::ValueSetIndex;
use vsdiff_tx_client::ValueSetExpander;

/// A StructureDefinition binding the row's value set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StructureRef {
    pub name: String,
    pub url: String,
}

/// Expansion counts for one value set across releases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub value_set_url: String,
    pub value_set_name: String,
    /// Published by the national terminology authority
    pub ncts: bool,
    /// The local definition draws on SNOMED CT-AU
    pub snomed_au: bool,
    /// Binding structures, first-seen order, without duplicates
    pub structure_definitions: Vec<StructureRef>,
    /// One entry per reported release; `None` where expansion failed
    pub counts: BTreeMap<ReleaseId, Option<u64>>,
}

impl Row {
    pub fn count(&self, release: &ReleaseId) -> Option<u64> {
        self.counts.get(release).copied().flatten()
    }
}

/// Rows plus the releases they report, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowSet {
    pub releases: Vec<ReleaseId>,
    pub rows: Vec<Row>,
}

/// Drop bindings repeating an earlier `(value set, structure)` pair.
pub fn dedup_bindings(bindings: impl IntoIterator<Item = Binding>) -> Vec<Binding> {
    let mut seen = HashSet::new();
    bindings
        .into_iter()
        .filter(|binding| {
            seen.insert((
                binding.value_set_url.clone(),
                binding.structure_url.clone(),
            ))
        })
        .collect()
}

/// Accumulates one mutable row per value set before expansion.
struct PendingRow<'a> {
    value_set_url: String,
    definition: Option<&'a ValueSetDefinition>,
    structures: Vec<StructureRef>,
    counts: BTreeMap<ReleaseId, Option<u64>>,
    server_title: Option<String>,
}

impl PendingRow<'_> {
    fn add_structure(&mut self, binding: &Binding) {
        let structure = StructureRef {
            name: binding.structure_name.clone(),
            url: binding.structure_url.clone(),
        };
        if !self.structures.contains(&structure) {
            self.structures.push(structure);
        }
    }

    fn finish(self) -> Row {
        let value_set_name = self
            .definition
            .and_then(ValueSetDefinition::display_name)
            .map(str::to_string)
            .or(self.server_title)
            .unwrap_or_default();

        Row {
            value_set_url: self.value_set_url,
            value_set_name,
            ncts: true,
            snomed_au: self
                .definition
                .is_some_and(ValueSetDefinition::contains_regional_code_system),
            structure_definitions: self.structures,
            counts: self.counts,
        }
    }
}

/// Joins bindings, local ValueSet definitions and server expansions into rows.
pub struct RowBuilder<'a> {
    index: &'a ValueSetIndex,
    releases: &'a [ReleaseId],
    max_concurrent: usize,
}

impl<'a> RowBuilder<'a> {
    /// `releases` must be the validated list, newest first.
    pub fn new(index: &'a ValueSetIndex, releases: &'a [ReleaseId]) -> Self {
        Self {
            index,
            releases,
            max_concurrent: 1,
        }
    }

    /// Allow up to `max_concurrent` expansion requests in flight. Results are
    /// applied in request order regardless.
    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Build one row per distinct NCTS value set in `bindings`.
    ///
    /// Non-NCTS bindings are dropped before any request is made. Each value
    /// set is expanded once per release. Releases with no count in any row
    /// are removed from the result.
    pub async fn build(&self, bindings: &[Binding], expander: &dyn ValueSetExpander) -> RowSet {
        let mut pending: Vec<PendingRow<'_>> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for binding in bindings
            .iter()
            .filter(|binding| is_ncts_value_set(&binding.value_set_url))
        {
            let position = *positions
                .entry(binding.value_set_url.as_str())
                .or_insert_with(|| {
                    pending.push(PendingRow {
                        value_set_url: binding.value_set_url.clone(),
                        definition: self.index.get(&binding.value_set_url),
                        structures: Vec::new(),
                        counts: self.releases.iter().map(|release| (*release, None)).collect(),
                        server_title: None,
                    });
                    pending.len() - 1
                });
            pending[position].add_structure(binding);
        }

        tracing::info!(
            value_sets = pending.len(),
            releases = self.releases.len(),
            "Expanding NCTS value sets"
        );

        let jobs: Vec<(usize, &str, Option<&ValueSetDefinition>, ReleaseId)> = pending
            .iter()
            .enumerate()
            .flat_map(|(position, row)| {
                self.releases.iter().map(move |&release| {
                    (position, row.value_set_url.as_str(), row.definition, release)
                })
            })
            .collect();

        let results: Vec<_> = stream::iter(jobs)
            .map(|(position, url, definition, release)| async move {
                (position, release, expander.expand(url, release, definition).await)
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        for (position, release, result) in results {
            let row = &mut pending[position];
            row.counts.insert(release, result.count);
            if row.server_title.is_none() {
                row.server_title = result.title.filter(|title| !title.is_empty());
            }
        }

        let mut rows: Vec<Row> = pending.into_iter().map(PendingRow::finish).collect();
        let releases: Vec<ReleaseId> = self
            .releases
            .iter()
            .copied()
            .filter(|release| rows.iter().any(|row| row.count(release).is_some()))
            .collect();
        for row in &mut rows {
            row.counts.retain(|release, _| releases.contains(release));
        }

        RowSet { releases, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use vsdiff_tx_client::{ExpansionIssue, ExpansionResult};

    const STATES: &str = "https://healthterminologies.gov.au/fhir/ValueSet/australian-states-territories-2";
    const BODY_SITE: &str = "https://healthterminologies.gov.au/fhir/ValueSet/body-site-1";
    const GENDER: &str = "http://hl7.org/fhir/ValueSet/administrative-gender";

    /// Serves fixed counts per (value set, release); anything else fails.
    struct TableStub {
        counts: HashMap<(String, String), u64>,
        title: Option<String>,
        calls: Mutex<Vec<String>>,
    }

    impl TableStub {
        fn new(entries: &[(&str, &str, u64)]) -> Self {
            Self {
                counts: entries
                    .iter()
                    .map(|(vs, release, count)| ((vs.to_string(), release.to_string()), *count))
                    .collect(),
                title: Some("Server Title".into()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ValueSetExpander for TableStub {
        async fn expand(
            &self,
            value_set_url: &str,
            release: ReleaseId,
            _definition: Option<&ValueSetDefinition>,
        ) -> ExpansionResult {
            self.calls.lock().unwrap().push(value_set_url.to_string());
            match self.counts.get(&(value_set_url.to_string(), release.to_string())) {
                Some(&count) => ExpansionResult::counted(count, self.title.clone()),
                None => ExpansionResult::unusable(ExpansionIssue::HttpStatus { status: 404 }),
            }
        }
    }

    fn release(id: &str) -> ReleaseId {
        id.parse().unwrap()
    }

    fn binding(vs: &str, sd: &str) -> Binding {
        Binding::new(vs, format!("http://hl7.org.au/fhir/StructureDefinition/{sd}"), sd).unwrap()
    }

    fn index() -> ValueSetIndex {
        [ValueSetDefinition::from_resource(&json!({
            "resourceType": "ValueSet",
            "url": STATES,
            "name": "AustralianStatesAndTerritories",
            "compose": { "include": [{ "system": "https://healthterminologies.gov.au/fhir/CodeSystem/australian-states-territories-1" }] }
        }))
        .unwrap()]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_dedup_by_value_set_and_structure() {
        let bindings = vec![
            binding(STATES, "AUAddress"),
            binding(STATES, "AUAddress"),
            binding(STATES, "AUPatient"),
        ];
        let deduped = dedup_bindings(bindings);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[1].structure_name, "AUPatient");
    }

    #[tokio::test]
    async fn test_non_ncts_value_sets_never_expanded() {
        let stub = TableStub::new(&[(STATES, "20240229", 9)]);
        let releases = [release("20240229")];
        let index = index();
        let bindings = vec![
            binding(GENDER, "AUPatient"),
            binding(STATES, "AUAddress"),
            binding(GENDER, "AUPractitioner"),
        ];

        let set = RowBuilder::new(&index, &releases).build(&bindings, &stub).await;

        assert_eq!(set.rows.len(), 1);
        assert_eq!(set.rows[0].value_set_url, STATES);
        assert!(stub.calls.lock().unwrap().iter().all(|url| url == STATES));
    }

    #[tokio::test]
    async fn test_bindings_merge_into_one_row() {
        let stub = TableStub::new(&[
            (STATES, "20240229", 9),
            (STATES, "20240131", 9),
            (BODY_SITE, "20240229", 31016),
        ]);
        let releases = [release("20240229"), release("20240131")];
        let index = index();
        let bindings = vec![
            binding(STATES, "AUAddress"),
            binding(BODY_SITE, "AUBodyStructure"),
            binding(STATES, "AUPatient"),
            binding(STATES, "AUAddress"),
        ];

        let set = RowBuilder::new(&index, &releases).build(&bindings, &stub).await;

        assert_eq!(set.rows.len(), 2);
        let states = &set.rows[0];
        assert_eq!(states.value_set_name, "AustralianStatesAndTerritories");
        assert!(!states.snomed_au);
        assert_eq!(
            states
                .structure_definitions
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>(),
            vec!["AUAddress", "AUPatient"]
        );
        assert_eq!(states.count(&release("20240229")), Some(9));
        assert_eq!(states.count(&release("20240131")), Some(9));

        let body_site = &set.rows[1];
        assert_eq!(body_site.value_set_name, "Server Title");
        assert_eq!(body_site.count(&release("20240229")), Some(31016));
        assert_eq!(body_site.counts.get(&release("20240131")), Some(&None));

        // one expansion per value set and release
        assert_eq!(stub.calls.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_release_without_any_data_is_dropped() {
        let stub = TableStub::new(&[(STATES, "20240131", 9)]);
        let releases = [release("20240229"), release("20240131"), release("20231231")];
        let index = index();

        let set = RowBuilder::new(&index, &releases)
            .with_concurrency(4)
            .build(&[binding(STATES, "AUAddress")], &stub)
            .await;

        assert_eq!(set.releases, vec![release("20240131")]);
        assert_eq!(set.rows[0].counts.len(), 1);
        assert_eq!(set.rows[0].count(&release("20240131")), Some(9));
    }

    #[tokio::test]
    async fn test_no_ncts_bindings_yields_no_rows() {
        let stub = TableStub::new(&[]);
        let releases = [release("20240229")];
        let index = ValueSetIndex::new();

        let set = RowBuilder::new(&index, &releases)
            .build(&[binding(GENDER, "AUPatient")], &stub)
            .await;

        assert!(set.rows.is_empty());
        assert!(set.releases.is_empty());
        assert!(stub.calls.lock().unwrap().is_empty());
    }
}
