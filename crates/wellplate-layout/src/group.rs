use std::collections::HashMap;

use wellplate_core::Sample;

/// Samples sharing a case number, in placement order: child, alleged
/// father, mother, then everyone else. Ties keep their input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseGroup {
    pub case_number: Option<String>,
    pub members: Vec<Sample>,
}

impl CaseGroup {
    #[must_use]
    pub fn new(case_number: Option<String>, mut members: Vec<Sample>) -> Self {
        // stable sort keeps input order within a relation
        members.sort_by_key(|s| s.relation.group_rank());
        Self {
            case_number,
            members,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Groups samples by case number in order of first appearance. Samples
/// without a case number each form their own group.
#[must_use]
pub fn group_by_case(samples: &[Sample]) -> Vec<CaseGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<(Option<String>, Vec<Sample>)> = Vec::new();
    for sample in samples {
        match sample.case_number.as_deref().filter(|c| !c.trim().is_empty()) {
            Some(case) => match index.get(case) {
                Some(&pos) => buckets[pos].1.push(sample.clone()),
                None => {
                    index.insert(case, buckets.len());
                    buckets.push((Some(case.to_string()), vec![sample.clone()]));
                }
            },
            None => buckets.push((None, vec![sample.clone()])),
        }
    }
    buckets
        .into_iter()
        .map(|(case, members)| CaseGroup::new(case, members))
        .collect()
}

/// Flattens groups back into the ordered list auto-fill consumes.
#[must_use]
pub fn flatten_groups(groups: &[CaseGroup]) -> Vec<Sample> {
    groups
        .iter()
        .flat_map(|g| g.members.iter().cloned())
        .collect()
}
