use crate::dispatch_outcome::DispatchOutcome;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// Outcomes of one dispatch, in the order the requests were submitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchResult {
    outcomes: Vec<DispatchOutcome>,
}

impl BatchResult {
    pub fn new(outcomes: Vec<DispatchOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[DispatchOutcome] {
        &self.outcomes
    }

    pub fn into_outcomes(self) -> Vec<DispatchOutcome> {
        self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn sent_count(&self) -> usize {
        self.outcomes.iter().filter(|it| it.is_sent()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.total() - self.sent_count()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl Serialize for BatchResult {
    fn serialize<S>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("BatchResult", 4)?;
        state.serialize_field("total", &self.total())?;
        state.serialize_field("sentCount", &self.sent_count())?;
        state.serialize_field("failedCount", &self.failed_count())?;
        state.serialize_field("outcomes", &self.outcomes)?;
        state.end()
    }
}
